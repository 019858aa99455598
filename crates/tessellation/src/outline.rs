//! Outline bands and anti-aliasing fringes extruded from existing
//! geometry.
//!
//! Both are the same operation: walk a boundary ring that already lives
//! in a draw buffer, copy it into a destination buffer, push a second
//! ring extruded along the vertex normals and stitch the two into a quad
//! strip. An outline band carries its own colors; a fringe copies the
//! source colors and fades the extruded ring to alpha zero.

use crate::basic_shapes::{apply_gradient, set_uvs};
use crate::buffer::{BufferId, BufferStore, DrawBufferKind, ShapeKind, Vertex};
use crate::math::*;
use crate::{Config, Gradient, StyleOptions, Texture};

use facet_geom::utils;

/// What kind of extrusion pass is running. Recursion is bounded by the
/// tag: a fringe never spawns another fringe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum OutlineCallKind {
    /// A colored outline band around a shape boundary.
    Normal,
    /// Anti-aliasing fringe around a shape boundary.
    AntiAliasing,
    /// Anti-aliasing fringe around an outline band's edge.
    OutlineAntiAliasing,
}

/// Effective anti-aliasing fringe thickness.
pub(crate) fn aa_thickness(config: &Config, style: &StyleOptions) -> f32 {
    config.framebuffer_scale * style.aa_multiplier * config.aa_multiplier
}

/// Effective outline band thickness.
pub(crate) fn outline_thickness(config: &Config, thickness: f32) -> f32 {
    thickness * config.framebuffer_scale
}

fn family(texture: Option<&Texture>, color: &Gradient) -> DrawBufferKind {
    if let Some(texture) = texture {
        DrawBufferKind::Textured(*texture)
    } else if !color.is_uniform() {
        DrawBufferKind::Gradient(*color)
    } else {
        DrawBufferKind::Default
    }
}

fn ring_vertices(store: &BufferStore, src: BufferId, ring: &[u32]) -> Vec<Vertex> {
    let buf = store.buffer(src);
    ring.iter().map(|&i| buf.vertices[i as usize]).collect()
}

fn extruded_positions(points: &[Point], amount: f32, closed: bool) -> Vec<Point> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let prev = if closed {
                Some(points[(i + n - 1) % n])
            } else if i > 0 {
                Some(points[i - 1])
            } else {
                None
            };
            let next = if closed {
                Some(points[(i + 1) % n])
            } else if i + 1 < n {
                Some(points[i + 1])
            } else {
                None
            };
            utils::extrude(points[i], prev, next, amount)
        })
        .collect()
}

fn stitch(buf: &mut crate::buffer::DrawBuffer, start: u32, n: u32, closed: bool) {
    let quads = if closed { n } else { n - 1 };
    for i in 0..quads {
        let a = start + i;
        let b = start + (i + 1) % n;
        let c = a + n;
        let d = b + n;
        buf.push_triangle(a, b, c);
        buf.push_triangle(b, d, c);
    }
}

/// Extrude one pass around `ring` (vertex ids in `src`, wound
/// clockwise on screen so a positive `amount` grows outwards).
///
/// Returns the destination buffer holding the band or fringe: its last
/// `2 * ring.len()` vertices are the copied ring followed by the
/// extruded ring.
pub(crate) fn outline_pass(
    store: &mut BufferStore,
    config: &Config,
    src: BufferId,
    ring: &[u32],
    closed: bool,
    amount: f32,
    style: &StyleOptions,
    kind: OutlineCallKind,
    draw_order: i32,
) -> BufferId {
    let source = ring_vertices(store, src, ring);
    let points: Vec<Point> = source.iter().map(|v| v.position).collect();
    let extruded = extruded_positions(&points, amount, closed);
    let n = ring.len() as u32;

    match kind {
        OutlineCallKind::Normal => {
            let opts = match &style.outline {
                Some(opts) => opts.clone(),
                None => return src,
            };
            let dest = store.get_buffer(
                family(opts.texture.as_ref(), &opts.color),
                ShapeKind::Shape,
                draw_order,
                style.user_data,
            );
            let buf = store.buffer_mut(dest);
            let start = buf.vertices.len() as u32;
            for p in points.iter().chain(extruded.iter()) {
                buf.push_vertex(Vertex {
                    position: *p,
                    uv: point(0.0, 0.0),
                    color: opts.color.start,
                });
            }
            stitch(buf, start, n, closed);
            let end = start + n * 2;
            set_uvs(store.buffer_mut(dest), start, end, None);
            apply_gradient(store.buffer_mut(dest), start, end, &opts.color, None);

            if style.aa {
                // Soften both edges of the band. The fringes work from
                // the band's own vertices and never recurse further.
                let mut band_style = style.clone();
                band_style.texture = opts.texture;
                band_style.color = opts.color;
                let aa = aa_thickness(config, style).copysign(amount);
                let inner: Vec<u32> = (start..start + n).collect();
                let outer: Vec<u32> = (start + n..end).collect();
                outline_pass(
                    store,
                    config,
                    dest,
                    &outer,
                    closed,
                    aa,
                    &band_style,
                    OutlineCallKind::OutlineAntiAliasing,
                    draw_order,
                );
                outline_pass(
                    store,
                    config,
                    dest,
                    &inner,
                    closed,
                    -aa,
                    &band_style,
                    OutlineCallKind::OutlineAntiAliasing,
                    draw_order,
                );
            }
            dest
        }
        OutlineCallKind::AntiAliasing | OutlineCallKind::OutlineAntiAliasing => {
            let dest = store.get_buffer(
                family(style.texture.as_ref(), &style.color),
                ShapeKind::AntiAliasing,
                draw_order,
                style.user_data,
            );
            let buf = store.buffer_mut(dest);
            let start = buf.vertices.len() as u32;
            for v in &source {
                buf.push_vertex(*v);
            }
            for (v, p) in source.iter().zip(extruded.iter()) {
                buf.push_vertex(Vertex {
                    position: *p,
                    uv: v.uv,
                    color: v.color.with_alpha(0.0),
                });
            }
            stitch(buf, start, n, closed);
            dest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_shapes::{fill_plain, rect_points};
    use crate::{Color, OutlineOptions};

    fn filled_rect(store: &mut BufferStore) -> (BufferId, Vec<u32>) {
        let id = store.get_buffer(DrawBufferKind::Default, ShapeKind::Shape, 0, 0);
        let pts = rect_points(point(0.0, 0.0), point(10.0, 10.0));
        let geo = fill_plain(
            store.buffer_mut(id),
            &pts,
            &[[0, 1, 3], [1, 2, 3]],
            Color::WHITE,
        );
        (id, geo.outer_ring().collect())
    }

    #[test]
    fn fringe_fades_to_transparent() {
        let mut store = BufferStore::new();
        let config = Config::DEFAULT;
        let (src, ring) = filled_rect(&mut store);

        let style = StyleOptions::filled(Color::WHITE);
        let dest = outline_pass(
            &mut store,
            &config,
            src,
            &ring,
            true,
            1.0,
            &style,
            OutlineCallKind::AntiAliasing,
            0,
        );

        assert_ne!(dest, src);
        let buf = store.buffer(dest);
        assert_eq!(buf.shape, ShapeKind::AntiAliasing);
        assert_eq!(buf.vertices.len(), 8);
        for v in &buf.vertices[..4] {
            assert_eq!(v.color.a, 1.0);
        }
        for v in &buf.vertices[4..] {
            assert_eq!(v.color.a, 0.0);
        }
    }

    #[test]
    fn outline_band_grows_outwards() {
        let mut store = BufferStore::new();
        let config = Config::DEFAULT;
        let (src, ring) = filled_rect(&mut store);

        let style = StyleOptions::filled(Color::WHITE)
            .with_outline(OutlineOptions::new(2.0, Color::BLACK));
        let dest = outline_pass(
            &mut store,
            &config,
            src,
            &ring,
            true,
            2.0,
            &style,
            OutlineCallKind::Normal,
            0,
        );

        // A uniform black band shares the default-family batch with the
        // source rect, so its 8 vertices land after the rect's 4.
        assert_eq!(dest, src);
        let buf = store.buffer(dest);
        assert_eq!(buf.vertices.len(), 12);
        assert_eq!(buf.indices.len(), 2 * 3 + 4 * 2 * 3);
        let c = point(5.0, 5.0);
        for (base, ext) in buf.vertices[4..8].iter().zip(buf.vertices[8..].iter()) {
            assert!((ext.position - c).length() > (base.position - c).length());
            assert_eq!(base.color, Color::BLACK);
        }
    }

    #[test]
    fn outline_aa_does_not_recurse() {
        let mut store = BufferStore::new();
        let config = Config::DEFAULT;
        let (src, ring) = filled_rect(&mut store);

        let style = StyleOptions::filled(Color::WHITE)
            .with_outline(OutlineOptions::new(2.0, Color::BLACK))
            .with_aa();
        outline_pass(
            &mut store,
            &config,
            src,
            &ring,
            true,
            2.0,
            &style,
            OutlineCallKind::Normal,
            0,
        );

        // The uniform band batches with the source rect; both its
        // fringes batch into one fringe buffer. Nothing recursed deeper.
        let mut recorder = Vec::new();
        struct Count<'a>(&'a mut Vec<ShapeKind>);
        impl<'a> crate::buffer::Backend for Count<'a> {
            fn draw(&mut self, buffer: &crate::buffer::DrawBuffer) {
                self.0.push(buffer.shape);
            }
        }
        store.flush(&mut Count(&mut recorder));
        assert_eq!(recorder, vec![ShapeKind::Shape, ShapeKind::AntiAliasing]);

        let fringe = store.get_buffer(DrawBufferKind::Default, ShapeKind::AntiAliasing, 0, 0);
        // Two fringes, 8 vertices each.
        assert_eq!(store.buffer(fringe).vertices.len(), 16);
    }
}
