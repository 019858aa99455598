//! Scalar and vector helpers used by the tessellators.

use crate::{point, vector, Point, Vector, EPSILON};

use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Linearly remap `v` from the `[from_min, from_max]` range to the
/// `[to_min, to_max]` range.
#[inline]
pub fn remap(v: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    to_min + (v - from_min) * (to_max - to_min) / (from_max - from_min)
}

/// Rotate a vector by 90 degrees.
///
/// `clockwise` is meant visually, in y-down screen space: rotating
/// `(1, 0)` clockwise yields `(0, 1)`.
#[inline]
pub fn rotate90(v: Vector, clockwise: bool) -> Vector {
    if clockwise {
        vector(-v.y, v.x)
    } else {
        vector(v.y, -v.x)
    }
}

/// Rotate `p` around `center` by `degrees` (clockwise in screen space).
pub fn rotate_around(p: Point, center: Point, degrees: f32) -> Point {
    let rad = degrees * PI / 180.0;
    let (sin, cos) = (rad.sin(), rad.cos());
    let d = p - center;
    center + vector(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Point on the circle of the given center and radius at `angle_degrees`.
///
/// Angle 0 points towards +x, 90 towards +y (downwards on screen), 270
/// towards -y.
#[inline]
pub fn point_on_circle(center: Point, radius: f32, angle_degrees: f32) -> Point {
    let rad = angle_degrees * PI / 180.0;
    center + vector(rad.cos(), rad.sin()) * radius
}

/// Angle in degrees of `p` as seen from `center`, wrapped to `[0, 360)`.
pub fn angle_from_center(center: Point, p: Point) -> f32 {
    let d = p - center;
    let mut deg = d.y.atan2(d.x) * 180.0 / PI;
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

/// Signed angle in degrees between two directions, positive when `b`
/// turns clockwise (downwards) from `a`.
pub fn angle_between(a: Vector, b: Vector) -> f32 {
    a.cross(b).atan2(a.dot(b)) * 180.0 / PI
}

/// True when the two directions are parallel (pointing the same way or
/// opposite ways).
#[inline]
pub fn are_parallel(a: Vector, b: Vector) -> bool {
    a.cross(b).abs() < EPSILON
}

/// Intersection of the infinite lines `(p0, p1)` and `(p2, p3)`.
///
/// The caller is responsible for ruling the parallel case out with
/// [`are_parallel`] first; parallel inputs return the midpoint of `p1`
/// and `p2` as a safe fallback.
pub fn line_intersection(p0: Point, p1: Point, p2: Point, p3: Point) -> Point {
    let d1 = p1 - p0;
    let d2 = p3 - p2;
    let denom = d1.cross(d2);
    if denom.abs() < EPSILON {
        return p1.lerp(p2, 0.5);
    }
    let t = (p2 - p0).cross(d2) / denom;
    p0 + d1 * t
}

/// Averaged unit normal at `p` given its ring neighbors. Open ends pass
/// `None` for the missing side and get the single edge normal.
pub fn vertex_normal(prev: Option<Point>, p: Point, next: Option<Point>) -> Vector {
    let n1 = prev.map(|q| edge_normal(q, p));
    let n2 = next.map(|q| edge_normal(p, q));
    match (n1, n2) {
        (Some(a), Some(b)) => {
            let sum = a + b;
            if sum.square_length() < EPSILON {
                a
            } else {
                sum.normalize()
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => vector(0.0, 0.0),
    }
}

/// Unit normal of the edge `a -> b`, pointing to the outside of a ring
/// wound clockwise on screen (top-left, top-right, bottom-right, ...).
#[inline]
pub fn edge_normal(a: Point, b: Point) -> Vector {
    let d = b - a;
    let len = d.length();
    if len < EPSILON {
        return vector(0.0, 0.0);
    }
    rotate90(d / len, false)
}

/// Offset `p` along its miter normal so that the extruded ring stays
/// parallel to the source ring, exactly `amount` away from it.
///
/// Extruding by `amount` and then by `-amount` returns the original
/// point. The neighbors follow the same `Option` convention as
/// [`vertex_normal`].
pub fn extrude(p: Point, prev: Option<Point>, next: Option<Point>, amount: f32) -> Point {
    let (mut v1, mut v2) = match (prev, next) {
        (Some(a), Some(b)) => (unit_or_zero(p - a), unit_or_zero(b - p)),
        (Some(a), None) => {
            let v = unit_or_zero(p - a);
            (v, v)
        }
        (None, Some(b)) => {
            let v = unit_or_zero(b - p);
            (v, v)
        }
        (None, None) => return p,
    };

    // A zero-length edge (duplicate ring point) borrows the direction
    // of its sibling.
    if v1.square_length() < EPSILON {
        v1 = v2;
    }
    if v2.square_length() < EPSILON {
        v2 = v1;
    }
    if v1.square_length() < EPSILON {
        return p;
    }

    let n1 = rotate90(v1, false);
    let v12 = v1 + v2;
    if v12.square_length() < EPSILON {
        return p + n1 * amount;
    }

    let n = rotate90(v12.normalize(), false);
    let inv_len = n.dot(n1);
    if inv_len.abs() < EPSILON {
        return p + n1 * amount;
    }

    p + (n / inv_len) * amount
}

#[inline]
fn unit_or_zero(v: Vector) -> Vector {
    let len = v.length();
    if len < EPSILON {
        vector(0.0, 0.0)
    } else {
        v / len
    }
}

/// Point of a cubic bezier segment at `t`.
pub fn sample_cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let one_t = 1.0 - t;
    let one_t2 = one_t * one_t;
    let t2 = t * t;
    let mut out = p0.to_vector() * (one_t2 * one_t);
    out += p1.to_vector() * (3.0 * one_t2 * t);
    out += p2.to_vector() * (3.0 * one_t * t2);
    out += p3.to_vector() * (t2 * t);
    out.to_point()
}

/// Point of a parabola joining `from` to `to` at `t`, bulging along
/// `direction` with the given peak `radius` at `t = 0.5`.
#[inline]
pub fn sample_parabola(from: Point, to: Point, direction: Vector, radius: f32, t: f32) -> Point {
    from.lerp(to, t) + direction * (radius * 4.0 * t * (1.0 - t))
}

/// Axis-aligned bounds of a point slice.
pub fn bounds(points: &[Point]) -> (Point, Point) {
    let mut min = point(f32::MAX, f32::MAX);
    let mut max = point(f32::MIN, f32::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

#[cfg(test)]
fn assert_almost_eq_point(a: Point, b: Point) {
    if (a - b).square_length() > 0.00001 {
        panic!("assert almost equal: {:?} != {:?}", a, b);
    }
}

#[test]
fn test_rotate90() {
    assert_eq!(rotate90(vector(1.0, 0.0), true), vector(0.0, 1.0));
    assert_eq!(rotate90(vector(1.0, 0.0), false), vector(0.0, -1.0));
    assert_eq!(rotate90(vector(0.0, 1.0), true), vector(-1.0, 0.0));
}

#[test]
fn test_point_on_circle() {
    let c = point(10.0, 10.0);
    assert_almost_eq_point(point_on_circle(c, 5.0, 0.0), point(15.0, 10.0));
    assert_almost_eq_point(point_on_circle(c, 5.0, 90.0), point(10.0, 15.0));
    assert_almost_eq_point(point_on_circle(c, 5.0, 270.0), point(10.0, 5.0));
}

#[test]
fn test_angle_from_center() {
    let c = point(0.0, 0.0);
    assert!((angle_from_center(c, point(1.0, 0.0)) - 0.0).abs() < 0.001);
    assert!((angle_from_center(c, point(0.0, 1.0)) - 90.0).abs() < 0.001);
    assert!((angle_from_center(c, point(-1.0, 0.0)) - 180.0).abs() < 0.001);
    assert!((angle_from_center(c, point(0.0, -1.0)) - 270.0).abs() < 0.001);
}

#[test]
fn test_line_intersection() {
    let p = line_intersection(
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(5.0, -5.0),
        point(5.0, 5.0),
    );
    assert_almost_eq_point(p, point(5.0, 0.0));
}

#[test]
fn test_extrude_round_trip() {
    let prev = Some(point(0.0, 0.0));
    let next = Some(point(10.0, 4.0));
    let p = point(5.0, 1.0);
    let out = extrude(p, prev, next, 2.5);
    let back = extrude(out, Some(extrude(prev.unwrap(), None, Some(p), 2.5)), Some(extrude(next.unwrap(), Some(p), None, 2.5)), -2.5);
    assert_almost_eq_point(back, p);
}

#[test]
fn test_extrude_open_end() {
    // A lone horizontal edge extrudes straight up.
    let p = extrude(point(0.0, 0.0), None, Some(point(10.0, 0.0)), 3.0);
    assert_almost_eq_point(p, point(0.0, -3.0));
}

#[test]
fn test_sample_parabola() {
    let a = point(0.0, 0.0);
    let b = point(10.0, 0.0);
    let dir = vector(0.0, -1.0);
    assert_almost_eq_point(sample_parabola(a, b, dir, 2.0, 0.0), a);
    assert_almost_eq_point(sample_parabola(a, b, dir, 2.0, 1.0), b);
    assert_almost_eq_point(sample_parabola(a, b, dir, 2.0, 0.5), point(5.0, -2.0));
}

#[test]
fn test_remap() {
    assert!((remap(0.5, 0.0, 1.0, 0.4, 0.1) - 0.25).abs() < 0.001);
    assert!((remap(0.0, 0.0, 100.0, 0.15, 0.01) - 0.15).abs() < 0.001);
}
