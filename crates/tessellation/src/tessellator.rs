//! The engine entry point: owns the buffer store and the configuration,
//! exposes one `draw_*` operation per shape family.

use crate::basic_shapes::{
    apply_gradient, arc_points, extrude_ring, fill_convex, fill_plain, ngon_points, rect_points,
    rotate_range, rounded_rect_points, rounded_triangle_points, set_uvs, vertex_average,
    ShapeGeometry,
};
use crate::buffer::{Backend, BufferId, BufferStore, DrawBufferKind, ShapeKind};
use crate::math::*;
use crate::outline::{aa_thickness, outline_pass, outline_thickness, OutlineCallKind};
use crate::stroke::{self, LineCapDirection, LineJoin};
use crate::text::{self, GlyphSource, TextOptions};
use crate::{
    Color, Config, GradientKind, OutlinePlacement, StyleOptions, TessellationError,
    TessellationResult, Texture, TextureHandle,
};

use facet_geom::utils;

/// The tessellation engine. One per thread; draw calls accumulate
/// batched geometry until [`Tessellator::flush`] hands it to a
/// [`Backend`] and [`Tessellator::clear`] recycles it.
pub struct Tessellator {
    store: BufferStore,
    config: Config,
}

impl Tessellator {
    pub fn new(config: Config) -> Self {
        Tessellator {
            store: BufferStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configuration is meant to be adjusted between frames, not
    /// while one is being built.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn store(&self) -> &BufferStore {
        &self.store
    }

    /// Axis-aligned rectangle between `min` and `max`.
    pub fn draw_rect(
        &mut self,
        min: Point,
        max: Point,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        self.fill_rect(min, max, style, rotation, draw_order, None)
    }

    /// Textured rectangle centered on `pos`. The UV window selects the
    /// sub-region of the texture mapped onto the quad.
    pub fn draw_image(
        &mut self,
        texture: TextureHandle,
        pos: Point,
        size: Vector,
        tint: Color,
        rotation: f32,
        draw_order: i32,
        uv_tl: Point,
        uv_br: Point,
    ) -> TessellationResult {
        let style = StyleOptions::filled(tint).with_texture(Texture::tiled(texture));
        let half = size / 2.0;
        self.fill_rect(
            pos - half,
            pos + half,
            &style,
            rotation,
            draw_order,
            Some((uv_tl, uv_br)),
        )
    }

    /// A tiny screen-space dot.
    pub fn draw_point(&mut self, pos: Point, color: Color, draw_order: i32) -> TessellationResult {
        let half = vector(1.0, 1.0) * self.config.framebuffer_scale;
        let style = StyleOptions::filled(color);
        self.fill_rect(pos - half, pos + half, &style, 0.0, draw_order, None)
    }

    /// A single straight line: a filled quad around the segment. Use
    /// [`Tessellator::draw_lines`] for polylines with joints.
    pub fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        let dir = (end - start).normalize();
        let up = utils::rotate90(dir, false);
        let half = style.thickness.start * self.config.framebuffer_scale / 2.0;
        let quad = [
            start + up * half,
            end + up * half,
            end - up * half,
            start - up * half,
        ];
        let mut style = style.clone();
        style.filled = true;
        self.add_shape(
            &quad,
            Some(&[[0, 1, 3], [1, 2, 3]]),
            None,
            true,
            &style,
            rotation,
            draw_order,
            None,
        )
    }

    fn fill_rect(
        &mut self,
        min: Point,
        max: Point,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
        uv_window: Option<(Point, Point)>,
    ) -> TessellationResult {
        if style.rounding < EPSILON {
            let pts = rect_points(min, max);
            self.add_shape(
                &pts,
                Some(&[[0, 1, 3], [1, 2, 3]]),
                None,
                true,
                style,
                rotation,
                draw_order,
                uv_window,
            )
        } else {
            let pts = rounded_rect_points(min, max, style.rounding, &style.only_round_corners);
            self.add_shape(
                &pts, None, None, true, style, rotation, draw_order, uv_window,
            )
        }
    }

    /// Triangle given clockwise as top, bottom-right, bottom-left.
    pub fn draw_triangle(
        &mut self,
        top: Point,
        right: Point,
        left: Point,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        if style.rounding < EPSILON {
            let pts = [top, right, left];
            self.add_shape(
                &pts,
                Some(&[[0, 1, 2]]),
                None,
                true,
                style,
                rotation,
                draw_order,
                None,
            )
        } else {
            let pts =
                rounded_triangle_points(top, right, left, style.rounding, &style.only_round_corners);
            self.add_shape(&pts, None, None, true, style, rotation, draw_order, None)
        }
    }

    /// Regular n-gon inscribed in the circle of the given radius.
    pub fn draw_ngon(
        &mut self,
        center: Point,
        radius: f32,
        sides: u32,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        let pts = ngon_points(center, radius, sides.max(3));
        self.add_shape(
            &pts,
            None,
            Some(center),
            true,
            style,
            rotation,
            draw_order,
            None,
        )
    }

    /// Circle or pie slice. A full sweep (`end - start >= 360`) closes
    /// the ring; a partial sweep keeps the center vertex so the pie
    /// stays convex, with an open boundary.
    pub fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        segments: u32,
        style: &StyleOptions,
        rotation: f32,
        start_angle: f32,
        end_angle: f32,
        draw_order: i32,
    ) -> TessellationResult {
        let (pts, full) = arc_points(center, radius, segments, start_angle, end_angle);
        self.add_shape(
            &pts,
            None,
            Some(center),
            full,
            style,
            rotation,
            draw_order,
            None,
        )
    }

    /// Convex polygon. The polygon is trusted to be convex; concave
    /// input produces overlapping triangles, not an error.
    pub fn draw_convex(
        &mut self,
        points: &[Point],
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        if points.len() < 3 {
            return Err(TessellationError::TooFewPoints {
                expected: 3,
                got: points.len() as u32,
            });
        }
        self.add_shape(points, None, None, true, style, rotation, draw_order, None)
    }

    /// Polyline with per-segment joints and optional end caps.
    pub fn draw_lines(
        &mut self,
        points: &[Point],
        style: &StyleOptions,
        joint: LineJoin,
        cap: LineCapDirection,
        rotation: f32,
        draw_order: i32,
    ) -> TessellationResult {
        stroke::draw_polyline(
            &mut self.store,
            &self.config,
            points,
            style,
            joint,
            cap,
            rotation,
            draw_order,
        )
    }

    /// Cubic bezier flattened into a polyline.
    pub fn draw_bezier(
        &mut self,
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
        stroke::draw_bezier(
            &mut self.store,
            &self.config,
            p0,
            p1,
            p2,
            p3,
            style,
            joint,
            cap,
            segments,
            rotation,
            draw_order,
        )
    }

    /// Text through a plain bitmap font.
    pub fn draw_text(
        &mut self,
        glyphs: &dyn GlyphSource,
        text: &str,
        pos: Point,
        opts: &TextOptions,
        draw_order: i32,
    ) -> TessellationResult {
        text::draw_text(
            &mut self.store,
            &self.config,
            glyphs,
            text,
            pos,
            opts,
            false,
            draw_order,
        )
    }

    /// Text through a signed distance field font.
    pub fn draw_text_sdf(
        &mut self,
        glyphs: &dyn GlyphSource,
        text: &str,
        pos: Point,
        opts: &TextOptions,
        draw_order: i32,
    ) -> TessellationResult {
        text::draw_text(
            &mut self.store,
            &self.config,
            glyphs,
            text,
            pos,
            opts,
            true,
            draw_order,
        )
    }

    /// Measure a text block without drawing it.
    pub fn text_size(&self, glyphs: &dyn GlyphSource, text: &str, opts: &TextOptions) -> Vector {
        text::text_size(glyphs, text, opts)
    }

    /// Submit the frame's buffers to the backend in draw order.
    pub fn flush(&mut self, backend: &mut dyn Backend) {
        self.store.flush(backend);
    }

    /// End the frame, keeping allocations and the text cache.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Drop all buffers and the text cache.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// Shared tail of every shape tessellator: triangulate the boundary,
    /// texture/color/rotate it, then run the outline and anti-aliasing
    /// passes.
    fn add_shape(
        &mut self,
        points: &[Point],
        plain_triangles: Option<&[[u32; 3]]>,
        center: Option<Point>,
        closed: bool,
        style: &StyleOptions,
        rotation: f32,
        draw_order: i32,
        uv_window: Option<(Point, Point)>,
    ) -> TessellationResult {
        let family = shape_family(style);
        let dest = self
            .store
            .get_buffer(family, ShapeKind::Shape, draw_order, style.user_data);
        let buf = self.store.buffer_mut(dest);
        let color = style.color.start;

        let geo = if style.filled {
            let radial = matches!(
                style.color.kind,
                GradientKind::Radial | GradientKind::RadialCorner
            ) && !style.color.is_uniform();
            match plain_triangles {
                // Radial gradients need the center vertex of the fan.
                Some(tris) if !radial => fill_plain(buf, points, tris, color),
                _ => {
                    let center = center.unwrap_or_else(|| vertex_average(points));
                    fill_convex(buf, points, color, Some(center), closed)
                }
            }
        } else {
            let half = style.thickness.start * self.config.framebuffer_scale / 2.0;
            extrude_ring(buf, points, color, half, closed)
        };

        let (start, end) = (geo.start, geo.end());
        let center_vertex = if geo.has_center { Some(geo.start) } else { None };
        set_uvs(self.store.buffer_mut(dest), start, end, uv_window);
        apply_gradient(
            self.store.buffer_mut(dest),
            start,
            end,
            &style.color,
            center_vertex,
        );
        rotate_range(self.store.buffer_mut(dest), start, end, rotation, center);

        self.boundary_passes(dest, &geo, style, draw_order);
        Ok(())
    }

    /// Outline band and/or anti-aliasing fringe around a tessellated
    /// shape.
    fn boundary_passes(
        &mut self,
        dest: BufferId,
        geo: &ShapeGeometry,
        style: &StyleOptions,
        draw_order: i32,
    ) {
        let outer: Vec<u32> = geo.outer_ring().collect();
        let inner: Option<Vec<u32>> = if geo.double_ring {
            Some(geo.inner_ring().collect())
        } else {
            None
        };
        // Inward passes run on the inner ring when the shape stores
        // one, otherwise on its single boundary ring.
        let inward: &[u32] = inner.as_deref().unwrap_or(&outer);

        // Partial arcs close their boundary for the wrap-around passes:
        // a pie loops through its center vertex, a stroked arc across
        // its ring ends (outer half forward, inner half reversed).
        let around: Option<Vec<u32>> = if geo.closed {
            None
        } else if let Some(inner) = &inner {
            Some(outer.iter().chain(inner.iter().rev()).copied().collect())
        } else if geo.has_center {
            Some(
                core::iter::once(geo.start)
                    .chain(outer.iter().copied())
                    .collect(),
            )
        } else {
            None
        };

        if let Some(outline) = &style.outline {
            let thickness = outline_thickness(&self.config, outline.thickness);
            // A stroked arc keeps per-side placements; only `Both`
            // wraps the whole shape in a single band.
            let wrap = if geo.double_ring && outline.placement != OutlinePlacement::Both {
                None
            } else {
                around.as_deref()
            };
            if let Some(ring) = wrap {
                outline_pass(
                    &mut self.store,
                    &self.config,
                    dest,
                    ring,
                    true,
                    thickness,
                    style,
                    OutlineCallKind::Normal,
                    draw_order,
                );
                return;
            }
            let mut passes: Vec<(&[u32], f32)> = Vec::new();
            match outline.placement {
                OutlinePlacement::Outwards => passes.push((&outer, thickness)),
                OutlinePlacement::Inwards => passes.push((inward, -thickness)),
                OutlinePlacement::Both => {
                    passes.push((&outer, thickness / 2.0));
                    passes.push((inward, -thickness / 2.0));
                }
            }
            for (ring, amount) in passes {
                outline_pass(
                    &mut self.store,
                    &self.config,
                    dest,
                    ring,
                    geo.closed,
                    amount,
                    style,
                    OutlineCallKind::Normal,
                    draw_order,
                );
            }
        } else if style.aa {
            let aa = aa_thickness(&self.config, style);
            match around.as_deref() {
                Some(ring) if !geo.double_ring => {
                    // A pie's fringe wraps its radial edges too.
                    outline_pass(
                        &mut self.store,
                        &self.config,
                        dest,
                        ring,
                        true,
                        aa,
                        style,
                        OutlineCallKind::AntiAliasing,
                        draw_order,
                    );
                }
                _ => {
                    outline_pass(
                        &mut self.store,
                        &self.config,
                        dest,
                        &outer,
                        geo.closed,
                        aa,
                        style,
                        OutlineCallKind::AntiAliasing,
                        draw_order,
                    );
                    if geo.double_ring {
                        outline_pass(
                            &mut self.store,
                            &self.config,
                            dest,
                            inward,
                            geo.closed,
                            -aa,
                            style,
                            OutlineCallKind::AntiAliasing,
                            draw_order,
                        );
                    }
                }
            }
        }
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Tessellator::new(Config::DEFAULT)
    }
}

fn shape_family(style: &StyleOptions) -> DrawBufferKind {
    if let Some(texture) = &style.texture {
        DrawBufferKind::Textured(*texture)
    } else if !style.color.is_uniform() {
        DrawBufferKind::Gradient(style.color)
    } else {
        DrawBufferKind::Default
    }
}
