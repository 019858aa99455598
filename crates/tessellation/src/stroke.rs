//! Multi-segment line tessellation: per-segment quads, joint resolution
//! and cap geometry.
//!
//! Each segment becomes a 4-vertex quad. Consecutive quads are welded
//! by a joint strategy, and the whole polyline keeps two index rails
//! (upper and lower edge) so outlines and anti-aliasing fringes can
//! walk its boundary as a single closed ring afterwards.

use crate::basic_shapes::{apply_gradient, rotate_range, set_uvs};
use crate::buffer::{BufferStore, DrawBufferKind, ShapeKind, Vertex};
use crate::math::*;
use crate::outline::{aa_thickness, outline_pass, outline_thickness, OutlineCallKind};
use crate::{Color, Config, OutlinePlacement, StyleOptions, TessellationError, TessellationResult};

use facet_geom::utils;

/// How two consecutive line segments are welded together.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// Snap the shared vertex pair to the average of the two edges.
    /// Cheapest, fine for near-straight polylines.
    VertexAverage,
    /// Extend the edges to their intersection. Falls back to a bevel
    /// past the miter angle limit.
    Miter,
    /// A single triangle on the outer side.
    Bevel,
    /// A fan of triangles approximating an arc on the outer side.
    /// Degenerates to `Bevel` when the style rounding is zero.
    BevelRound,
}

impl Default for LineJoin {
    fn default() -> Self {
        LineJoin::Miter
    }
}

/// Which polyline ends receive a cap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCapDirection {
    None,
    Left,
    Right,
    Both,
}

impl LineCapDirection {
    fn left(self) -> bool {
        matches!(self, LineCapDirection::Left | LineCapDirection::Both)
    }
    fn right(self) -> bool {
        matches!(self, LineCapDirection::Right | LineCapDirection::Both)
    }
}

/// Joints under this turn angle always use the vertex-average weld.
const VERTEX_AVERAGE_ANGLE: f32 = 15.0;

/// One segment quad inside the polyline scratch space.
///
/// Vertex roles: `v[0]` upper-left, `v[1]` upper-right, `v[2]`
/// lower-right, `v[3]` lower-left, with "upper" meaning the -y side
/// when the segment points towards +x.
struct LineQuad {
    v: [u32; 4],
    dir: Vector,
    upper: Vec<u32>,
    lower: Vec<u32>,
    left_cap: Vec<u32>,
    right_cap: Vec<u32>,
}

/// Polyline geometry assembled locally before being committed to a draw
/// buffer, so a failed draw call never leaves partial output behind.
#[derive(Default)]
struct PolyBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl PolyBuilder {
    fn push(&mut self, position: Point, color: Color) -> u32 {
        let id = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position,
            uv: point(0.0, 0.0),
            color,
        });
        id
    }

    fn pos(&self, id: u32) -> Point {
        self.vertices[id as usize].position
    }

    fn set_pos(&mut self, id: u32, p: Point) {
        self.vertices[id as usize].position = p;
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }
}

/// Build one segment quad, with cap fans on the requested ends.
fn calculate_line(
    builder: &mut PolyBuilder,
    start: Point,
    end: Point,
    half_start: f32,
    half_end: f32,
    cap: LineCapDirection,
    rounding: f32,
    color: Color,
) -> LineQuad {
    let dir = (end - start).normalize();
    let up = utils::rotate90(dir, false);

    let v0 = builder.push(start + up * half_start, color);
    let v1 = builder.push(end + up * half_end, color);
    let v2 = builder.push(end - up * half_end, color);
    let v3 = builder.push(start - up * half_start, color);
    builder.triangle(v0, v1, v3);
    builder.triangle(v1, v2, v3);

    let mut quad = LineQuad {
        v: [v0, v1, v2, v3],
        dir,
        upper: vec![v0, v1],
        lower: vec![v3, v2],
        left_cap: Vec::new(),
        right_cap: Vec::new(),
    };

    if cap.left() {
        quad.left_cap = cap_fan(builder, v0, v3, -dir, half_start, rounding, color);
    }
    if cap.right() {
        quad.right_cap = cap_fan(builder, v1, v2, dir, half_end, rounding, color);
    }
    quad
}

/// Cap geometry: a parabola sampled from one edge corner to the other,
/// bulging along the line direction, fanned from the edge midpoint.
fn cap_fan(
    builder: &mut PolyBuilder,
    corner_a: u32,
    corner_b: u32,
    direction: Vector,
    half: f32,
    rounding: f32,
    color: Color,
) -> Vec<u32> {
    let a = builder.pos(corner_a);
    let b = builder.pos(corner_b);
    let mid = builder.push(a.lerp(b, 0.5), color);
    let radius = half * 0.6;

    let step = utils::remap(rounding.max(0.0).min(1.0), 0.0, 1.0, 0.4, 0.1);
    let mut arc = Vec::new();
    let mut prev = corner_a;
    let mut t = step;
    while t < 1.0 {
        let id = builder.push(utils::sample_parabola(a, b, direction, radius, t), color);
        builder.triangle(mid, prev, id);
        arc.push(id);
        prev = id;
        t += step;
    }
    builder.triangle(mid, prev, corner_b);
    arc
}

/// Weld two consecutive quads.
fn join_lines(
    builder: &mut PolyBuilder,
    prev: &mut LineQuad,
    next: &mut LineQuad,
    joint: LineJoin,
    rounding: f32,
    miter_limit: f32,
    color: Color,
) {
    let d1 = prev.dir;
    let d2 = next.dir;

    if utils::are_parallel(d1, d2) && d1.dot(d2) > 0.0 {
        // Collinear continuation: the shared pair already coincides.
        // Drop the duplicates from the rails so the boundary ring does
        // not double back; the vertices themselves stay.
        builder.set_pos(next.v[0], builder.pos(prev.v[1]));
        builder.set_pos(next.v[3], builder.pos(prev.v[2]));
        next.upper.remove(0);
        next.lower.remove(0);
        return;
    }

    let angle = utils::angle_between(d1, d2);
    let mut joint = joint;
    if angle.abs() < VERTEX_AVERAGE_ANGLE {
        joint = LineJoin::VertexAverage;
    }
    if joint == LineJoin::BevelRound && rounding < EPSILON {
        joint = LineJoin::Bevel;
    }

    if joint == LineJoin::Miter {
        // Turns sharper than the miter angle limit fall back.
        if angle.abs() <= miter_limit {
            let upper = upper_intersection(builder, prev, next);
            let lower = lower_intersection(builder, prev, next);
            builder.set_pos(prev.v[1], upper);
            builder.set_pos(next.v[0], upper);
            builder.set_pos(prev.v[2], lower);
            builder.set_pos(next.v[3], lower);
            return;
        }
        joint = if rounding < EPSILON {
            LineJoin::Bevel
        } else {
            LineJoin::BevelRound
        };
    }

    match joint {
        LineJoin::VertexAverage => {
            let upper = builder.pos(prev.v[1]).lerp(builder.pos(next.v[0]), 0.5);
            let lower = builder.pos(prev.v[2]).lerp(builder.pos(next.v[3]), 0.5);
            builder.set_pos(prev.v[1], upper);
            builder.set_pos(next.v[0], upper);
            builder.set_pos(prev.v[2], lower);
            builder.set_pos(next.v[3], lower);
        }
        LineJoin::Bevel | LineJoin::BevelRound => {
            // Positive turn angle opens the gap on the upper side.
            let upper_outer = angle > 0.0;
            let (inner_prev, inner_next, outer_prev, outer_next) = if upper_outer {
                (prev.v[2], next.v[3], prev.v[1], next.v[0])
            } else {
                (prev.v[1], next.v[0], prev.v[2], next.v[3])
            };

            let inner = if upper_outer {
                lower_intersection(builder, prev, next)
            } else {
                upper_intersection(builder, prev, next)
            };
            builder.set_pos(inner_prev, inner);
            builder.set_pos(inner_next, inner);

            if joint == LineJoin::Bevel {
                builder.triangle(outer_prev, outer_next, inner_prev);
            } else {
                bevel_round(
                    builder, prev, inner_prev, outer_prev, outer_next, upper_outer, rounding,
                    color,
                );
            }
        }
        LineJoin::Miter => unreachable!(),
    }
}

fn upper_intersection(builder: &PolyBuilder, prev: &LineQuad, next: &LineQuad) -> Point {
    utils::line_intersection(
        builder.pos(prev.v[0]),
        builder.pos(prev.v[1]),
        builder.pos(next.v[0]),
        builder.pos(next.v[1]),
    )
}

fn lower_intersection(builder: &PolyBuilder, prev: &LineQuad, next: &LineQuad) -> Point {
    utils::line_intersection(
        builder.pos(prev.v[3]),
        builder.pos(prev.v[2]),
        builder.pos(next.v[3]),
        builder.pos(next.v[2]),
    )
}

/// Fill the outer gap of a joint with an arc fan around the inner
/// vertex.
fn bevel_round(
    builder: &mut PolyBuilder,
    prev: &mut LineQuad,
    inner: u32,
    outer_prev: u32,
    outer_next: u32,
    upper_outer: bool,
    rounding: f32,
    color: Color,
) {
    let center = builder.pos(inner);
    let from = builder.pos(outer_prev);
    let to = builder.pos(outer_next);
    let radius = (from - center).length();

    let a0 = utils::angle_from_center(center, from);
    let a1 = utils::angle_from_center(center, to);
    let mut sweep = a1 - a0;
    if sweep > 180.0 {
        sweep -= 360.0;
    } else if sweep < -180.0 {
        sweep += 360.0;
    }

    let step = utils::remap(rounding.max(0.0).min(1.0), 0.0, 1.0, 45.0, 6.0);
    let steps = (sweep.abs() / step).ceil().max(1.0) as u32;

    let mut fan_prev = outer_prev;
    for k in 1..steps {
        let ang = a0 + sweep * k as f32 / steps as f32;
        let id = builder.push(utils::point_on_circle(center, radius, ang), color);
        builder.triangle(inner, fan_prev, id);
        // Arc points extend the outer boundary between the two quads.
        if upper_outer {
            prev.upper.push(id);
        } else {
            prev.lower.push(id);
        }
        fan_prev = id;
    }
    builder.triangle(inner, fan_prev, outer_next);
}

/// Closed boundary ring of the whole polyline: upper rails forward,
/// right cap, lower rails backward, left cap.
fn boundary_ring(quads: &[LineQuad]) -> Vec<u32> {
    let mut ring = Vec::new();
    for quad in quads {
        ring.extend_from_slice(&quad.upper);
    }
    if let Some(last) = quads.last() {
        ring.extend_from_slice(&last.right_cap);
    }
    for quad in quads.iter().rev() {
        ring.extend(quad.lower.iter().rev());
    }
    if let Some(first) = quads.first() {
        ring.extend(first.left_cap.iter().rev());
    }
    ring
}

/// Tessellate a polyline into its style's draw buffer, then run the
/// outline and anti-aliasing passes over its boundary.
pub(crate) fn draw_polyline(
    store: &mut BufferStore,
    config: &Config,
    points: &[Point],
    style: &StyleOptions,
    joint: LineJoin,
    cap: LineCapDirection,
    rotation: f32,
    draw_order: i32,
) -> TessellationResult {
    if points.len() < 3 {
        return Err(TessellationError::TooFewPoints {
            expected: 3,
            got: points.len() as u32,
        });
    }

    let color = style.color.start;
    let fb = config.framebuffer_scale;
    let segments = points.len() - 1;

    let mut builder = PolyBuilder::default();
    let mut quads: Vec<LineQuad> = Vec::with_capacity(segments);

    for i in 0..segments {
        let t0 = i as f32 / segments as f32;
        let t1 = (i + 1) as f32 / segments as f32;
        let half0 = lerp_thickness(style, t0) * fb / 2.0;
        let half1 = lerp_thickness(style, t1) * fb / 2.0;
        let seg_cap = match (i == 0, i == segments - 1) {
            (true, false) if cap.left() => LineCapDirection::Left,
            (false, true) if cap.right() => LineCapDirection::Right,
            (true, true) => cap,
            _ => LineCapDirection::None,
        };
        quads.push(calculate_line(
            &mut builder,
            points[i],
            points[i + 1],
            half0,
            half1,
            seg_cap,
            style.rounding,
            color,
        ));
    }

    for i in 1..quads.len() {
        let (a, b) = quads.split_at_mut(i);
        join_lines(
            &mut builder,
            &mut a[i - 1],
            &mut b[0],
            joint,
            style.rounding,
            config.miter_limit,
            color,
        );
    }

    // Commit the scratch geometry.
    let family = if let Some(texture) = &style.texture {
        DrawBufferKind::Textured(*texture)
    } else if !style.color.is_uniform() {
        DrawBufferKind::Gradient(style.color)
    } else {
        DrawBufferKind::Default
    };
    let dest = store.get_buffer(family, ShapeKind::Shape, draw_order, style.user_data);
    let buf = store.buffer_mut(dest);
    let base = buf.vertices.len() as u32;
    for v in &builder.vertices {
        buf.push_vertex(*v);
    }
    for tri in builder.indices.chunks(3) {
        buf.push_triangle(base + tri[0], base + tri[1], base + tri[2]);
    }
    let end = base + builder.vertices.len() as u32;

    set_uvs(store.buffer_mut(dest), base, end, None);
    apply_gradient(store.buffer_mut(dest), base, end, &style.color, None);
    rotate_range(store.buffer_mut(dest), base, end, rotation, None);

    let ring: Vec<u32> = boundary_ring(&quads).iter().map(|&i| base + i).collect();

    if let Some(outline) = &style.outline {
        let thickness = outline_thickness(config, outline.thickness);
        match outline.placement {
            OutlinePlacement::Outwards => {
                outline_pass(
                    store,
                    config,
                    dest,
                    &ring,
                    true,
                    thickness,
                    style,
                    OutlineCallKind::Normal,
                    draw_order,
                );
            }
            OutlinePlacement::Inwards => {
                outline_pass(
                    store,
                    config,
                    dest,
                    &ring,
                    true,
                    -thickness,
                    style,
                    OutlineCallKind::Normal,
                    draw_order,
                );
            }
            OutlinePlacement::Both => {
                for amount in &[thickness / 2.0, -thickness / 2.0] {
                    outline_pass(
                        store,
                        config,
                        dest,
                        &ring,
                        true,
                        *amount,
                        style,
                        OutlineCallKind::Normal,
                        draw_order,
                    );
                }
            }
        }
    } else if style.aa {
        outline_pass(
            store,
            config,
            dest,
            &ring,
            true,
            aa_thickness(config, style),
            style,
            OutlineCallKind::AntiAliasing,
            draw_order,
        );
    }

    Ok(())
}

fn lerp_thickness(style: &StyleOptions, t: f32) -> f32 {
    style.thickness.start + (style.thickness.end - style.thickness.start) * t
}

/// Flatten a cubic bezier into a polyline and tessellate it.
///
/// `segments` is clamped to `[0, 100]` and remapped to a sampling step:
/// higher segment counts sample the curve more densely.
pub(crate) fn draw_bezier(
    store: &mut BufferStore,
    config: &Config,
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    style: &StyleOptions,
    joint: LineJoin,
    cap: LineCapDirection,
    segments: u32,
    rotation: f32,
    draw_order: i32,
) -> TessellationResult {
    let points = flatten_bezier(p0, p1, p2, p3, segments);
    draw_polyline(
        store, config, &points, style, joint, cap, rotation, draw_order,
    )
}

fn flatten_bezier(p0: Point, p1: Point, p2: Point, p3: Point, segments: u32) -> Vec<Point> {
    let segments = segments.min(100) as f32;
    let step = utils::remap(segments, 0.0, 100.0, 0.15, 0.01);

    let mut points = Vec::new();
    let mut t = 0.0;
    while t < 1.0 {
        points.push(utils::sample_cubic_bezier(p0, p1, p2, p3, t));
        t += step;
    }
    // Force the endpoint, unless the sampling already landed on it.
    let last = utils::sample_cubic_bezier(p0, p1, p2, p3, 1.0);
    match points.last() {
        Some(p) if (last - *p).length() < EPSILON => {}
        _ => points.push(last),
    }
    points
}
