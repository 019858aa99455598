//! Tessellation routines for simple convex shapes.
//!
//! Every shape goes through the same pipeline: build the boundary ring,
//! triangulate it (fan when filled, extruded quad strip when stroked),
//! then texture/color/rotate the produced vertex range in place.

use crate::buffer::{DrawBuffer, Vertex};
use crate::math::*;
use crate::{Color, Gradient, GradientKind};

use facet_geom::utils;

/// Where a tessellated shape landed inside its draw buffer. The outline
/// and anti-aliasing passes work from this.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ShapeGeometry {
    /// First vertex of the shape (the center vertex when `has_center`).
    pub start: u32,
    pub has_center: bool,
    /// Boundary point count. Stroked shapes store two rings of this
    /// length (inner first, outer second).
    pub ring_len: u32,
    /// False for partial arcs: the ring does not loop back on itself.
    pub closed: bool,
    pub double_ring: bool,
}

impl ShapeGeometry {
    /// Vertex ids of the boundary ring (the outer ring for stroked
    /// shapes).
    pub fn outer_ring(&self) -> impl Iterator<Item = u32> {
        let first = if self.double_ring {
            self.start + self.ring_len
        } else {
            self.start + if self.has_center { 1 } else { 0 }
        };
        first..first + self.ring_len
    }

    /// Vertex ids of the inner ring of a stroked shape.
    pub fn inner_ring(&self) -> impl Iterator<Item = u32> {
        debug_assert!(self.double_ring);
        self.start..self.start + self.ring_len
    }

    /// One past the last vertex of the shape.
    pub fn end(&self) -> u32 {
        let rings = if self.double_ring { 2 } else { 1 };
        let center = if self.has_center { 1 } else { 0 };
        self.start + center + self.ring_len * rings
    }
}

#[inline]
fn vertex(position: Point, color: Color) -> Vertex {
    Vertex {
        position,
        uv: point(0.0, 0.0),
        color,
    }
}

/// Fan-triangulate a convex boundary around a center vertex.
///
/// The center defaults to the vertex average. Open rings (partial arcs)
/// skip the closing triangle so the pie mouth stays open.
pub(crate) fn fill_convex(
    buf: &mut DrawBuffer,
    points: &[Point],
    color: Color,
    center: Option<Point>,
    closed: bool,
) -> ShapeGeometry {
    let start = buf.vertices.len() as u32;
    let center = center.unwrap_or_else(|| vertex_average(points));
    buf.push_vertex(vertex(center, color));
    for &p in points {
        buf.push_vertex(vertex(p, color));
    }

    let n = points.len() as u32;
    for i in 1..n {
        buf.push_triangle(start, start + i, start + i + 1);
    }
    if closed {
        buf.push_triangle(start, start + n, start + 1);
    }

    ShapeGeometry {
        start,
        has_center: true,
        ring_len: n,
        closed,
        double_ring: false,
    }
}

/// Triangulate a small fixed shape without a center vertex, with an
/// explicit index list (local to `points`).
pub(crate) fn fill_plain(
    buf: &mut DrawBuffer,
    points: &[Point],
    triangles: &[[u32; 3]],
    color: Color,
) -> ShapeGeometry {
    let start = buf.vertices.len() as u32;
    for &p in points {
        buf.push_vertex(vertex(p, color));
    }
    for t in triangles {
        buf.push_triangle(start + t[0], start + t[1], start + t[2]);
    }
    ShapeGeometry {
        start,
        has_center: false,
        ring_len: points.len() as u32,
        closed: true,
        double_ring: false,
    }
}

/// Stroke a boundary ring: offset it half the thickness inwards and
/// half outwards along the vertex normals and stitch the two rings into
/// a quad strip. Open rings leave the two ends unstitched.
pub(crate) fn extrude_ring(
    buf: &mut DrawBuffer,
    points: &[Point],
    color: Color,
    half_thickness: f32,
    closed: bool,
) -> ShapeGeometry {
    let n = points.len();
    let start = buf.vertices.len() as u32;

    for ring in &[-half_thickness, half_thickness] {
        for i in 0..n {
            let prev = ring_neighbor(points, i, -1, closed);
            let next = ring_neighbor(points, i, 1, closed);
            let p = utils::extrude(points[i], prev, next, *ring);
            buf.push_vertex(vertex(p, color));
        }
    }

    let n = n as u32;
    let quads = if closed { n } else { n - 1 };
    for i in 0..quads {
        let a = start + i;
        let b = start + (i + 1) % n;
        let c = a + n;
        let d = b + n;
        buf.push_triangle(a, b, c);
        buf.push_triangle(b, d, c);
    }

    ShapeGeometry {
        start,
        has_center: false,
        ring_len: n,
        closed,
        double_ring: true,
    }
}

fn ring_neighbor(points: &[Point], i: usize, step: isize, closed: bool) -> Option<Point> {
    let n = points.len() as isize;
    let j = i as isize + step;
    if closed {
        Some(points[((j + n) % n) as usize])
    } else if j < 0 || j >= n {
        None
    } else {
        Some(points[j as usize])
    }
}

pub(crate) fn vertex_average(points: &[Point]) -> Point {
    let mut sum = vector(0.0, 0.0);
    for p in points {
        sum += p.to_vector();
    }
    (sum / points.len() as f32).to_point()
}

// ---------- boundary ring builders ----------

/// Clockwise rect corners: top-left, top-right, bottom-right,
/// bottom-left.
pub(crate) fn rect_points(min: Point, max: Point) -> [Point; 4] {
    [min, point(max.x, min.y), max, point(min.x, max.y)]
}

/// Arc sampling step for a rounding amount: tighter rounding gets finer
/// steps.
pub(crate) fn angle_increase(rounding: f32) -> f32 {
    if rounding >= 0.75 {
        5.0
    } else if rounding >= 0.5 {
        10.0
    } else if rounding >= 0.25 {
        15.0
    } else {
        20.0
    }
}

fn corner_is_rounded(corners: &[usize], index: usize) -> bool {
    corners.is_empty() || corners.contains(&index)
}

/// Boundary of a rounded rect. Rounding is clamped to `[0, 0.9]` of the
/// shorter half-extent; `corners` optionally restricts which corners
/// are rounded (clockwise from top-left).
pub(crate) fn rounded_rect_points(
    min: Point,
    max: Point,
    rounding: f32,
    corners: &[usize],
) -> Vec<Point> {
    let rounding = rounding.max(0.0).min(0.9);
    let size = max - min;
    let mag = rounding * size.x.min(size.y) / 2.0;

    let rect = rect_points(min, max);
    // Arc centers are inset diagonally from each corner.
    let insets = [
        vector(mag, mag),
        vector(-mag, mag),
        vector(-mag, -mag),
        vector(mag, -mag),
    ];

    let inc = angle_increase(rounding);
    let mut out = Vec::new();
    let mut start_angle = 180.0;
    for (i, (&corner, inset)) in rect.iter().zip(insets.iter()).enumerate() {
        if corner_is_rounded(corners, i) {
            let center = corner + *inset;
            let end_angle = start_angle + 90.0;
            let mut a = start_angle;
            while a < end_angle + 2.5 {
                out.push(utils::point_on_circle(center, mag, a));
                a += inc;
            }
        } else {
            out.push(corner);
        }
        start_angle += 90.0;
    }
    out
}

/// Boundary of a rounded triangle. Rounding is clamped to `[0, 1]`,
/// scaled by half the shortest edge.
pub(crate) fn rounded_triangle_points(
    top: Point,
    right: Point,
    left: Point,
    rounding: f32,
    corners: &[usize],
) -> Vec<Point> {
    let rounding = rounding.max(0.0).min(1.0);
    let pts = [top, right, left];
    let shortest = (top - right)
        .length()
        .min((right - left).length())
        .min((left - top).length());
    let mag = rounding * shortest / 2.0;
    let centroid = vertex_average(&pts);

    let mut out = Vec::new();
    for i in 0..3 {
        let corner = pts[i];
        if !corner_is_rounded(corners, i) || mag < EPSILON {
            out.push(corner);
            continue;
        }
        let prev = pts[(i + 2) % 3];
        let next = pts[(i + 1) % 3];
        let p_in = corner + (prev - corner).normalize() * mag;
        let p_out = corner + (next - corner).normalize() * mag;
        let center = corner + (centroid - corner).normalize() * mag;

        let a_in = utils::angle_from_center(center, p_in);
        let a_out = utils::angle_from_center(center, p_out);
        let mut sweep = a_out - a_in;
        if sweep < -180.0 {
            sweep += 360.0;
        } else if sweep > 180.0 {
            sweep -= 360.0;
        }
        let radius = (p_in - center).length();
        let steps = (sweep.abs() / angle_increase(rounding)).ceil().max(1.0);
        let step = sweep / steps;
        let mut a = a_in;
        for _ in 0..=steps as u32 {
            out.push(utils::point_on_circle(center, radius, a));
            a += step;
        }
    }
    out
}

/// Boundary of a regular n-gon inscribed in the given circle.
pub(crate) fn ngon_points(center: Point, radius: f32, sides: u32) -> Vec<Point> {
    let mut out = Vec::with_capacity(sides as usize);
    let inc = 360.0 / sides as f32;
    for i in 0..sides {
        out.push(utils::point_on_circle(center, radius, inc * i as f32));
    }
    out
}

/// Boundary samples of a circle or circular arc.
///
/// Segments are clamped to `[6, 180]`, negative angles wrapped by 360.
/// Returns the samples and whether the arc closes into a full circle
/// (a full circle omits the duplicate closing sample).
pub(crate) fn arc_points(
    center: Point,
    radius: f32,
    segments: u32,
    start_angle: f32,
    end_angle: f32,
) -> (Vec<Point>, bool) {
    let segments = segments.max(6).min(180);
    let mut start = start_angle;
    let mut end = end_angle;
    if start < 0.0 {
        start += 360.0;
    }
    if end < 0.0 {
        end += 360.0;
    }
    if end <= start {
        end += 360.0;
    }
    let full = end - start >= 360.0 - EPSILON;

    let inc = 360.0 / segments as f32;
    let stop = if full { start + 360.0 } else { end + inc };
    let mut out = Vec::new();
    let mut a = start;
    while a < stop - 0.001 {
        out.push(utils::point_on_circle(center, radius, a));
        a += inc;
    }
    (out, full)
}

// ---------- in-place vertex range post processing ----------

/// Rotate a vertex range around `pivot`, defaulting to the average of
/// the range's positions. Shapes with a true center (circles, pies,
/// n-gons) pass it so the fan center vertex does not skew the pivot.
pub(crate) fn rotate_range(
    buf: &mut DrawBuffer,
    start: u32,
    end: u32,
    degrees: f32,
    pivot: Option<Point>,
) {
    if degrees.abs() < EPSILON {
        return;
    }
    let verts = &mut buf.vertices[start as usize..end as usize];
    let center = match pivot {
        Some(p) => p,
        None => {
            let mut sum = vector(0.0, 0.0);
            for v in verts.iter() {
                sum += v.position.to_vector();
            }
            (sum / verts.len() as f32).to_point()
        }
    };
    for v in verts.iter_mut() {
        v.position = utils::rotate_around(v.position, center, degrees);
    }
}

/// Planar-map the vertex range's bounding box to UV space, optionally
/// into an explicit sub-window (used by textured image quads).
pub(crate) fn set_uvs(buf: &mut DrawBuffer, start: u32, end: u32, window: Option<(Point, Point)>) {
    let verts = &mut buf.vertices[start as usize..end as usize];
    let (min, max) = range_bounds(verts);
    let size = max - min;
    let w = if size.x.abs() < EPSILON { 1.0 } else { size.x };
    let h = if size.y.abs() < EPSILON { 1.0 } else { size.y };
    let (uv_min, uv_max) = window.unwrap_or((point(0.0, 0.0), point(1.0, 1.0)));
    for v in verts.iter_mut() {
        let tx = (v.position.x - min.x) / w;
        let ty = (v.position.y - min.y) / h;
        v.uv = point(
            uv_min.x + (uv_max.x - uv_min.x) * tx,
            uv_min.y + (uv_max.y - uv_min.y) * ty,
        );
    }
}

/// Resolve a gradient into per-vertex colors over the range's bounding
/// box. `center` is the fan center vertex when the shape has one.
pub(crate) fn apply_gradient(
    buf: &mut DrawBuffer,
    start: u32,
    end: u32,
    gradient: &Gradient,
    center: Option<u32>,
) {
    if gradient.is_uniform() {
        return;
    }
    let verts = &mut buf.vertices[start as usize..end as usize];
    let (min, max) = range_bounds(verts);
    let size = max - min;

    match gradient.kind {
        GradientKind::Horizontal => {
            let w = if size.x.abs() < EPSILON { 1.0 } else { size.x };
            for v in verts.iter_mut() {
                let t = (v.position.x - min.x) / w;
                v.color = gradient.start.lerp(gradient.end, t);
            }
        }
        GradientKind::Vertical => {
            let h = if size.y.abs() < EPSILON { 1.0 } else { size.y };
            for v in verts.iter_mut() {
                let t = (v.position.y - min.y) / h;
                v.color = gradient.start.lerp(gradient.end, t);
            }
        }
        GradientKind::Radial | GradientKind::RadialCorner => {
            if let Some(center) = center {
                // Fan shapes: exact endpoint colors.
                for v in verts.iter_mut() {
                    v.color = gradient.end;
                }
                buf.vertices[center as usize].color = gradient.start;
            } else {
                let mid = min.lerp(max, 0.5);
                let half = size / 2.0;
                let reach = match gradient.kind {
                    GradientKind::RadialCorner => half.length(),
                    _ => half.x.min(half.y),
                };
                let reach = if reach < EPSILON { 1.0 } else { reach };
                for v in verts.iter_mut() {
                    let t = ((v.position - mid).length() / reach).min(1.0);
                    v.color = gradient.start.lerp(gradient.end, t);
                }
            }
        }
    }
}

fn range_bounds(verts: &[Vertex]) -> (Point, Point) {
    let mut min = point(f32::MAX, f32::MAX);
    let mut max = point(f32::MIN, f32::MIN);
    for v in verts {
        min.x = min.x.min(v.position.x);
        min.y = min.y.min(v.position.y);
        max.x = max.x.max(v.position.x);
        max.y = max.y.max(v.position.y);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferStore, DrawBufferKind, ShapeKind};

    fn scratch(store: &mut BufferStore) -> crate::buffer::BufferId {
        store.get_buffer(DrawBufferKind::Default, ShapeKind::Shape, 0, 0)
    }

    #[test]
    fn full_circle_samples() {
        let (pts, full) = arc_points(point(0.0, 0.0), 10.0, 36, 0.0, 360.0);
        assert!(full);
        assert_eq!(pts.len(), 36);
    }

    #[test]
    fn quarter_arc_samples() {
        let (pts, full) = arc_points(point(0.0, 0.0), 10.0, 36, 0.0, 90.0);
        assert!(!full);
        // 0..=90 degrees in 10 degree steps.
        assert_eq!(pts.len(), 10);
    }

    #[test]
    fn circle_fan_counts() {
        let mut store = BufferStore::new();
        let id = scratch(&mut store);
        let (pts, full) = arc_points(point(0.0, 0.0), 10.0, 36, 0.0, 360.0);
        let geo = fill_convex(store.buffer_mut(id), &pts, Color::WHITE, None, full);
        let buf = store.buffer(id);
        assert_eq!(buf.vertices.len(), 37);
        assert_eq!(buf.indices.len(), 36 * 3);
        assert_eq!(geo.end(), 37);
    }

    #[test]
    fn extruded_rect_is_a_double_ring() {
        let mut store = BufferStore::new();
        let id = scratch(&mut store);
        let pts = rect_points(point(0.0, 0.0), point(10.0, 10.0));
        let geo = extrude_ring(store.buffer_mut(id), &pts, Color::WHITE, 1.0, true);
        let buf = store.buffer(id);
        assert_eq!(buf.vertices.len(), 8);
        assert_eq!(buf.indices.len(), 4 * 2 * 3);
        assert!(geo.double_ring);

        // Outer ring is outside the inner ring.
        let inner: Vec<u32> = geo.inner_ring().collect();
        let outer: Vec<u32> = geo.outer_ring().collect();
        let c = point(5.0, 5.0);
        for (&i, &o) in inner.iter().zip(outer.iter()) {
            let di = (buf.vertices[i as usize].position - c).length();
            let do_ = (buf.vertices[o as usize].position - c).length();
            assert!(do_ > di);
        }
    }

    #[test]
    fn rounding_zero_keeps_corners() {
        let pts = rounded_rect_points(point(0.0, 0.0), point(10.0, 10.0), 0.0, &[]);
        // Zero magnitude arcs collapse onto the corners.
        for p in &pts {
            let on_corner = [
                point(0.0, 0.0),
                point(10.0, 0.0),
                point(10.0, 10.0),
                point(0.0, 10.0),
            ]
            .iter()
            .any(|c| (*c - *p).length() < 0.001);
            assert!(on_corner, "{:?} is not a rect corner", p);
        }
    }

    #[test]
    fn horizontal_gradient_endpoints() {
        let mut store = BufferStore::new();
        let id = scratch(&mut store);
        let pts = rect_points(point(0.0, 0.0), point(10.0, 4.0));
        fill_plain(
            store.buffer_mut(id),
            &pts,
            &[[0, 1, 3], [1, 2, 3]],
            Color::WHITE,
        );
        let gradient = Gradient::new(Color::BLACK, Color::WHITE, GradientKind::Horizontal);
        apply_gradient(store.buffer_mut(id), 0, 4, &gradient, None);
        let buf = store.buffer(id);
        assert_eq!(buf.vertices[0].color, Color::BLACK); // top-left
        assert_eq!(buf.vertices[1].color, Color::WHITE); // top-right
        assert_eq!(buf.vertices[2].color, Color::WHITE); // bottom-right
        assert_eq!(buf.vertices[3].color, Color::BLACK); // bottom-left
    }
}
