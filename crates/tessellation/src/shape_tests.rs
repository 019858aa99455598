//! End to end scenarios over the public tessellator surface.

use crate::math::*;
use crate::*;

fn tess() -> Tessellator {
    Tessellator::new(Config::DEFAULT)
}

fn first_buffer(tess: &Tessellator) -> &DrawBuffer {
    tess.store().buffer(BufferId(0))
}

struct Recorder(Vec<(i32, usize)>);

impl Backend for Recorder {
    fn draw(&mut self, buffer: &DrawBuffer) {
        self.0.push((buffer.draw_order, buffer.vertices.len()));
    }
}

#[test]
fn plain_rect_is_two_triangles() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 5.0), &style, 0.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices.len(), 4);
    assert_eq!(buf.indices, vec![0, 1, 3, 1, 2, 3]);
    assert_eq!(buf.vertices[0].position, point(0.0, 0.0));
    assert_eq!(buf.vertices[2].position, point(10.0, 5.0));
}

#[test]
fn full_circle_fan() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 0.0, 0.0, 360.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices.len(), 37);
    assert_eq!(buf.indices.len(), 36 * 3);
}

#[test]
fn pie_keeps_the_mouth_open() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 0.0, 0.0, 90.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // Center plus the 0..=90 degree samples, fan without the closing
    // triangle.
    assert_eq!(buf.vertices.len(), 11);
    assert_eq!(buf.indices.len(), 9 * 3);
}

#[test]
fn zero_rounding_matches_the_plain_path() {
    let mut plain = tess();
    let mut rounded = tess();
    let style = StyleOptions::filled(Color::WHITE);
    plain
        .draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();
    rounded
        .draw_rect(
            point(0.0, 0.0),
            point(10.0, 10.0),
            &style.clone().with_rounding(0.0),
            0.0,
            0,
        )
        .unwrap();

    assert_eq!(first_buffer(&plain), first_buffer(&rounded));
}

#[test]
fn rounded_rect_grows_a_ring() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE).with_rounding(0.4);
    tess.draw_rect(point(0.0, 0.0), point(20.0, 20.0), &style, 0.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // Center vertex plus an arc-sampled boundary.
    assert!(buf.vertices.len() > 5);
    // All boundary points stay inside the rect.
    for v in &buf.vertices {
        assert!(v.position.x >= -0.001 && v.position.x <= 20.001);
        assert!(v.position.y >= -0.001 && v.position.y <= 20.001);
    }
}

#[test]
fn horizontal_gradient_rect_corners() {
    let mut tess = tess();
    let style = StyleOptions::DEFAULT.with_gradient(Gradient::new(
        Color::new(1.0, 0.0, 0.0, 1.0),
        Color::new(0.0, 0.0, 1.0, 1.0),
        GradientKind::Horizontal,
    ));
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert!(matches!(buf.kind, DrawBufferKind::Gradient(_)));
    assert_eq!(buf.vertices[0].color, Color::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(buf.vertices[1].color, Color::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(buf.vertices[2].color, Color::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(buf.vertices[3].color, Color::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn radial_gradient_circle_endpoints() {
    let mut tess = tess();
    let style = StyleOptions::DEFAULT.with_gradient(Gradient::new(
        Color::WHITE,
        Color::BLACK,
        GradientKind::Radial,
    ));
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 0.0, 0.0, 360.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices[0].color, Color::WHITE);
    for v in &buf.vertices[1..] {
        assert_eq!(v.color, Color::BLACK);
    }
}

#[test]
fn stroked_rect_is_a_quad_strip() {
    let mut tess = tess();
    let style = StyleOptions::stroked(Color::WHITE, 2.0);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices.len(), 8);
    assert_eq!(buf.indices.len(), 4 * 2 * 3);
    // Centered stroke: inner ring inside the boundary, outer outside.
    let c = point(5.0, 5.0);
    for i in 0..4 {
        let inner = (buf.vertices[i].position - c).length();
        let outer = (buf.vertices[i + 4].position - c).length();
        assert!(inner < outer);
    }
}

#[test]
fn same_style_batches_into_one_buffer() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();
    tess.draw_rect(point(20.0, 0.0), point(30.0, 10.0), &style, 0.0, 0)
        .unwrap();

    let mut recorder = Recorder(Vec::new());
    tess.flush(&mut recorder);
    assert_eq!(recorder.0, vec![(0, 8)]);
}

#[test]
fn draw_orders_split_and_sort() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 5)
        .unwrap();
    tess.draw_rect(point(20.0, 0.0), point(30.0, 10.0), &style, 0.0, -1)
        .unwrap();

    let mut recorder = Recorder(Vec::new());
    tess.flush(&mut recorder);
    assert_eq!(recorder.0, vec![(-1, 4), (5, 4)]);
}

#[test]
fn convex_needs_three_points() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    let result = tess.draw_convex(&[point(0.0, 0.0), point(1.0, 1.0)], &style, 0.0, 0);
    assert_eq!(
        result,
        Err(TessellationError::TooFewPoints {
            expected: 3,
            got: 2
        })
    );
}

#[test]
fn image_uses_the_uv_window() {
    let mut tess = tess();
    tess.draw_image(
        TextureHandle(7),
        point(50.0, 50.0),
        vector(20.0, 20.0),
        Color::WHITE,
        0.0,
        0,
        point(0.25, 0.25),
        point(0.75, 0.75),
    )
    .unwrap();

    let buf = first_buffer(&tess);
    assert!(matches!(buf.kind, DrawBufferKind::Textured(_)));
    assert_eq!(buf.vertices[0].uv, point(0.25, 0.25));
    assert_eq!(buf.vertices[2].uv, point(0.75, 0.75));
}

#[test]
fn rotation_spins_the_quad() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 90.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // Top-left corner lands where the top-right corner was.
    assert!((buf.vertices[0].position - point(10.0, 0.0)).length() < 0.001);
}

#[test]
fn ngon_fans_around_its_center() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_ngon(point(0.0, 0.0), 10.0, 6, &style, 0.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices.len(), 7);
    assert_eq!(buf.vertices[0].position, point(0.0, 0.0));
    assert_eq!(buf.indices.len(), 6 * 3);
}

#[test]
fn aa_lands_in_its_own_buffer() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE).with_aa();
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();

    let mut recorder = Recorder(Vec::new());
    tess.flush(&mut recorder);
    // The shape quad, then its 8 vertex fringe.
    assert_eq!(recorder.0, vec![(0, 4), (0, 8)]);
}

#[test]
fn pie_outline_wraps_the_radial_edges() {
    let mut tess = tess();
    let style =
        StyleOptions::filled(Color::WHITE).with_outline(OutlineOptions::new(2.0, Color::BLACK));
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 0.0, 0.0, 90.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // The fan (center plus 10 samples) and one closed band looping
    // through the center vertex, batched into the same buffer.
    assert_eq!(buf.vertices.len(), 11 + 22);
    assert_eq!(buf.indices.len(), 9 * 3 + 11 * 2 * 3);
    // The band covers the two radial edges: its base ring passes
    // through the pie center, not just along the arc.
    let closest = buf.vertices[11..]
        .iter()
        .map(|v| v.position.to_vector().length())
        .fold(f32::MAX, f32::min);
    assert!(closest < 0.001);
}

#[test]
fn stroked_arc_outline_is_one_closed_band() {
    let mut tess = tess();
    let style = StyleOptions::stroked(Color::WHITE, 2.0).with_outline(
        OutlineOptions::new(1.0, Color::BLACK).with_placement(OutlinePlacement::Both),
    );
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 0.0, 0.0, 90.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // The arc's double ring (20 vertices, 9 quads) plus a single band
    // stitched around both rails and the two open ends: 40 vertices,
    // 20 closed quads, instead of two open bands.
    assert_eq!(buf.vertices.len(), 20 + 40);
    assert_eq!(buf.indices.len(), 9 * 2 * 3 + 20 * 2 * 3);
}

#[test]
fn pie_rotates_about_the_circle_center() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_circle(point(0.0, 0.0), 20.0, 36, &style, 180.0, 0.0, 90.0, 0)
        .unwrap();

    let buf = first_buffer(&tess);
    // The pivot is the circle center, not the average of the fan
    // vertices: the center stays put and the 0 degree sample lands at
    // 180 degrees.
    assert!((buf.vertices[0].position - point(0.0, 0.0)).length() < 0.001);
    assert!((buf.vertices[1].position - point(-20.0, 0.0)).length() < 0.001);
}

#[test]
fn clear_recycles_between_frames() {
    let mut tess = tess();
    let style = StyleOptions::filled(Color::WHITE);
    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();
    tess.clear();

    let mut recorder = Recorder(Vec::new());
    tess.flush(&mut recorder);
    assert!(recorder.0.is_empty());

    tess.draw_rect(point(0.0, 0.0), point(10.0, 10.0), &style, 0.0, 0)
        .unwrap();
    let buf = first_buffer(&tess);
    assert_eq!(buf.vertices.len(), 4);
}
