#![deny(bare_trait_objects)]
#![allow(clippy::too_many_arguments)]

//! Shape, outline and line tessellation routines for 2D vector graphics.
//!
//! The tessellators turn high level shapes (rectangles, circles, n-gons,
//! convex polygons, polylines, bezier curves and text) into batched
//! vertex/index buffers that a GPU renderer can upload as-is. Geometry
//! produced with the same shader family, draw order and user data lands
//! in the same [`DrawBuffer`], so an entire frame usually collapses into
//! a handful of draw calls.
//!
//! ## The frame cycle
//!
//! ```ignore
//! let mut tess = Tessellator::new(Config::DEFAULT);
//!
//! tess.draw_rect(point(10.0, 10.0), point(60.0, 40.0), &style, 0.0, 0)?;
//! tess.draw_circle(point(100.0, 40.0), 25.0, 36, &style, 0.0, 0.0, 360.0, 1)?;
//!
//! tess.flush(&mut backend); // submit buffers in draw order
//! tess.clear();             // recycle allocations for the next frame
//! ```
//!
//! The engine is single threaded by design: one `Tessellator` value per
//! thread, exclusivity enforced by `&mut self`.

pub extern crate facet_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
extern crate serde;

pub mod math {
    //! f32 geometry types used everywhere, from `facet_geom`.
    pub use facet_geom::{point, vector, Point, Vector, EPSILON};
}

mod basic_shapes;
mod buffer;
mod error;
mod outline;
mod stroke;
mod tessellator;
mod text;

#[cfg(test)]
mod shape_tests;

pub use crate::buffer::{
    Backend, BufferId, BufferStore, DrawBuffer, DrawBufferKind, ShapeKind, Vertex,
};
pub use crate::error::{TessellationError, TessellationResult};
pub use crate::stroke::{LineCapDirection, LineJoin};
pub use crate::tessellator::Tessellator;
pub use crate::text::{FontHandle, Glyph, GlyphSource, TextAlignment, TextOptions};

use crate::math::*;
use arrayvec::ArrayVec;

/// An RGBA color with f32 channels in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Color {
        Color { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// How a [`Gradient`] interpolates between its two colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum GradientKind {
    /// Left to right across the shape bounds.
    Horizontal,
    /// Top to bottom across the shape bounds.
    Vertical,
    /// Start color at the shape center, end color on the boundary.
    Radial,
    /// Radial falloff normalized so the bounding box corners reach the
    /// end color exactly.
    RadialCorner,
}

/// A two color gradient. A gradient whose colors are equal behaves as a
/// flat color and batches into the default shader family.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Gradient {
    pub start: Color,
    pub end: Color,
    pub kind: GradientKind,
}

impl Gradient {
    /// A flat color.
    #[inline]
    pub const fn uniform(color: Color) -> Self {
        Gradient {
            start: color,
            end: color,
            kind: GradientKind::Horizontal,
        }
    }

    #[inline]
    pub const fn new(start: Color, end: Color, kind: GradientKind) -> Self {
        Gradient { start, end, kind }
    }

    /// Whether both colors are equal, in which case no gradient shader
    /// is needed.
    pub fn is_uniform(&self) -> bool {
        self.start == self.end
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Gradient::uniform(Color::WHITE)
    }
}

/// Stroke thickness, interpolated from `start` to `end` along a
/// polyline. Shapes only use `start`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Thickness {
    pub start: f32,
    pub end: f32,
}

impl Thickness {
    #[inline]
    pub const fn uniform(thickness: f32) -> Self {
        Thickness {
            start: thickness,
            end: thickness,
        }
    }

    #[inline]
    pub const fn new(start: f32, end: f32) -> Self {
        Thickness { start, end }
    }
}

/// Opaque handle to a texture owned by the rendering backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TextureHandle(pub u32);

/// A texture binding with its UV transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub uv_tiling: Vector,
    pub uv_offset: Vector,
}

impl Texture {
    pub fn tiled(handle: TextureHandle) -> Self {
        Texture {
            handle,
            uv_tiling: vector(1.0, 1.0),
            uv_offset: vector(0.0, 0.0),
        }
    }
}

/// Which side of the boundary an outline grows towards.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum OutlinePlacement {
    Outwards,
    Inwards,
    /// Half the outline thickness on each side.
    Both,
}

/// Outline drawn around a shape boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineOptions {
    pub thickness: f32,
    pub color: Gradient,
    pub placement: OutlinePlacement,
    pub texture: Option<Texture>,
}

impl OutlineOptions {
    pub fn new(thickness: f32, color: Color) -> Self {
        OutlineOptions {
            thickness,
            color: Gradient::uniform(color),
            placement: OutlinePlacement::Outwards,
            texture: None,
        }
    }

    pub fn with_placement(mut self, placement: OutlinePlacement) -> Self {
        self.placement = placement;
        self
    }
}

/// Parameters shared by every shape tessellator.
///
/// A style is a plain value: the tessellators never mutate the caller's
/// style, recursive passes (outlines, anti-aliasing fringes) work on
/// local copies.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleOptions {
    /// Fill the shape interior (`true`) or stroke its boundary with
    /// `thickness` (`false`).
    pub filled: bool,
    pub color: Gradient,
    /// Boundary stroke thickness for unfilled shapes and polylines.
    pub thickness: Thickness,
    /// Corner rounding in `[0, 1]`. Zero keeps sharp corners.
    pub rounding: f32,
    /// When non-empty, restricts rounding to the listed corner indices
    /// (clockwise from top-left for rectangles).
    pub only_round_corners: ArrayVec<usize, 8>,
    /// Anti-aliasing fringe around the produced geometry.
    pub aa: bool,
    /// Per-shape multiplier over [`Config::aa_multiplier`].
    pub aa_multiplier: f32,
    pub outline: Option<OutlineOptions>,
    pub texture: Option<Texture>,
    /// Forwarded to the buffer batching key and the backend untouched.
    pub user_data: u32,
}

impl StyleOptions {
    pub const DEFAULT: StyleOptions = StyleOptions {
        filled: true,
        color: Gradient::uniform(Color::WHITE),
        thickness: Thickness::uniform(1.0),
        rounding: 0.0,
        only_round_corners: ArrayVec::new_const(),
        aa: false,
        aa_multiplier: 1.0,
        outline: None,
        texture: None,
        user_data: 0,
    };

    pub fn filled(color: Color) -> Self {
        StyleOptions {
            color: Gradient::uniform(color),
            ..Self::DEFAULT
        }
    }

    pub fn stroked(color: Color, thickness: f32) -> Self {
        StyleOptions {
            filled: false,
            color: Gradient::uniform(color),
            thickness: Thickness::uniform(thickness),
            ..Self::DEFAULT
        }
    }

    pub fn with_gradient(mut self, gradient: Gradient) -> Self {
        self.color = gradient;
        self
    }

    pub fn with_rounding(mut self, rounding: f32) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_aa(mut self) -> Self {
        self.aa = true;
        self
    }

    pub fn with_outline(mut self, outline: OutlineOptions) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_user_data(mut self, user_data: u32) -> Self {
        self.user_data = user_data;
        self
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Engine wide tunables. Owned by the [`Tessellator`] and read-only
/// while a frame is being built.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Global multiplier applied to every anti-aliasing fringe.
    pub aa_multiplier: f32,
    /// Scale between logical units and framebuffer pixels. Outline and
    /// fringe thicknesses are multiplied by it.
    pub framebuffer_scale: f32,
    /// Maximum turn angle, in degrees, a miter joint is kept for.
    /// Sharper joints fall back to a bevel.
    pub miter_limit: f32,
    /// Cache laid out text across frames, keyed by content and layout
    /// parameters.
    pub text_caching: bool,
    /// Same as `text_caching`, for SDF fonts.
    pub sdf_text_caching: bool,
}

impl Config {
    pub const DEFAULT: Config = Config {
        aa_multiplier: 1.0,
        framebuffer_scale: 1.0,
        miter_limit: 150.0,
        text_caching: false,
        sdf_text_caching: false,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn default_style() {
    let style = StyleOptions::default();
    assert!(style.filled);
    assert!(style.color.is_uniform());
    assert_eq!(style.rounding, 0.0);
    assert!(style.outline.is_none());
}

#[test]
fn style_builders() {
    let style = StyleOptions::stroked(Color::BLACK, 4.0)
        .with_rounding(0.5)
        .with_aa();
    assert!(!style.filled);
    assert_eq!(style.thickness, Thickness::uniform(4.0));
    assert_eq!(style.rounding, 0.5);
    assert!(style.aa);
}

#[test]
fn uniform_gradients() {
    assert!(Gradient::uniform(Color::WHITE).is_uniform());
    assert!(!Gradient::new(Color::BLACK, Color::WHITE, GradientKind::Vertical).is_uniform());
}
