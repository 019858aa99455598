#![deny(bare_trait_objects)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! f32 geometric primitives and helpers shared by the facet crates,
//! on top of euclid.
//!
//! Everything here works in screen space: x grows to the right, y grows
//! downwards, angles are measured in degrees.

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod utils;

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Tolerance used by the comparisons and degenerate-case checks in this
/// crate and in the tessellators built on top of it.
pub const EPSILON: f32 = 1e-4;
