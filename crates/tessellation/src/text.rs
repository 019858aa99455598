//! Text layout: one textured quad per glyph.
//!
//! The engine never touches font files or atlases. Glyph metrics and
//! atlas UVs come from a [`GlyphSource`] collaborator; this module only
//! decides where the quads go (pen advance, kerning, word wrap,
//! alignment) and how they are colored.

use crate::buffer::{fnv1a, fnv1a_init, BufferStore, CachedText, DrawBufferKind, ShapeKind, Vertex};
use crate::math::*;
use crate::{Color, Config, Gradient, GradientKind, TessellationError, TessellationResult};

/// Opaque handle to a font owned by the glyph provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FontHandle(pub u32);

/// Metrics and atlas location of one glyph, in unscaled font units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Pen advance after this glyph.
    pub advance: Vector,
    /// Offset from the pen position to the top-left of the glyph box
    /// (y-down).
    pub bearing: Vector,
    /// Size of the glyph box.
    pub size: Vector,
    pub uv_min: Point,
    pub uv_max: Point,
}

/// Provider of glyph metrics, typically backed by a rasterized font
/// atlas.
pub trait GlyphSource {
    fn glyph(&self, font: FontHandle, ch: char) -> Option<Glyph>;
    fn line_height(&self, font: FontHandle) -> f32;
    fn space_advance(&self, font: FontHandle) -> f32;
    /// Kerning adjustment between two consecutive glyphs, in font
    /// units.
    fn kern(&self, _font: FontHandle, _prev: char, _next: char) -> f32 {
        0.0
    }
    /// Whether the font's atlas holds signed distance fields.
    fn is_sdf(&self, _font: FontHandle) -> bool {
        false
    }
}

/// Horizontal placement of each laid out line relative to the draw
/// position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TextAlignment {
    /// Lines start at the draw position.
    Left,
    /// Lines are centered on the draw position.
    Center,
    /// Lines end at the draw position.
    Right,
}

/// Parameters of a text draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub font: FontHandle,
    pub color: Gradient,
    /// Uniform scale over the font units.
    pub scale: f32,
    /// Extra advance between characters.
    pub spacing: f32,
    /// Wrap lines longer than this width; zero disables wrapping.
    pub wrap_width: f32,
    /// Extra vertical space between lines.
    pub new_line_spacing: f32,
    pub alignment: TextAlignment,
    pub user_data: u32,
}

impl TextOptions {
    pub fn new(font: FontHandle) -> Self {
        TextOptions {
            font,
            color: Gradient::uniform(Color::WHITE),
            scale: 1.0,
            spacing: 0.0,
            wrap_width: 0.0,
            new_line_spacing: 0.0,
            alignment: TextAlignment::Left,
            user_data: 0,
        }
    }
}

/// Split `text` into laid out lines, honoring explicit newlines and the
/// wrap width. Words wider than the wrap width still emit on their own
/// line.
fn wrap_text(glyphs: &dyn GlyphSource, text: &str, opts: &TextOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if opts.wrap_width <= 0.0 {
            lines.push(paragraph.to_string());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split(' ') {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let mut candidate = current.clone();
            candidate.push(' ');
            candidate.push_str(word);
            if line_width(glyphs, &candidate, opts) > opts.wrap_width {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

fn line_width(glyphs: &dyn GlyphSource, line: &str, opts: &TextOptions) -> f32 {
    let mut width = 0.0;
    let mut prev: Option<char> = None;
    for ch in line.chars() {
        if ch == ' ' {
            width += glyphs.space_advance(opts.font) * opts.scale + opts.spacing;
            prev = None;
            continue;
        }
        if let Some(glyph) = glyphs.glyph(opts.font, ch) {
            if let Some(p) = prev {
                width += glyphs.kern(opts.font, p, ch) * opts.scale;
            }
            width += glyph.advance.x * opts.scale + opts.spacing;
        }
        prev = Some(ch);
    }
    width
}

/// Measure a text block without emitting geometry.
pub(crate) fn text_size(glyphs: &dyn GlyphSource, text: &str, opts: &TextOptions) -> Vector {
    let lines = wrap_text(glyphs, text, opts);
    let mut width = 0.0f32;
    for line in &lines {
        width = width.max(line_width(glyphs, line, opts));
    }
    let line_h = glyphs.line_height(opts.font) * opts.scale;
    let height = lines.len() as f32 * line_h
        + (lines.len().saturating_sub(1)) as f32 * opts.new_line_spacing;
    vector(width, height)
}

/// Lay out `text` relative to the origin: quads, indices, colors. The
/// output is origin-relative so it can be cached and replayed at any
/// position.
fn layout(glyphs: &dyn GlyphSource, text: &str, opts: &TextOptions) -> CachedText {
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let lines = wrap_text(glyphs, text, opts);
    let line_h = glyphs.line_height(opts.font) * opts.scale;
    let mut pen_y = 0.0;

    for line in &lines {
        let width = line_width(glyphs, line, opts);
        let mut pen_x = match opts.alignment {
            TextAlignment::Left => 0.0,
            TextAlignment::Center => -width / 2.0,
            TextAlignment::Right => -width,
        };

        let mut prev: Option<char> = None;
        for ch in line.chars() {
            if ch == ' ' {
                pen_x += glyphs.space_advance(opts.font) * opts.scale + opts.spacing;
                prev = None;
                continue;
            }
            let glyph = match glyphs.glyph(opts.font, ch) {
                Some(glyph) => glyph,
                // Unknown codepoints are skipped rather than aborting
                // the whole draw.
                None => continue,
            };
            if let Some(p) = prev {
                pen_x += glyphs.kern(opts.font, p, ch) * opts.scale;
            }

            let min = point(pen_x, pen_y) + glyph.bearing * opts.scale;
            let max = min + glyph.size * opts.scale;
            let base = vertices.len() as u32;
            let color = opts.color.start;
            for &(p, uv) in &[
                (min, glyph.uv_min),
                (point(max.x, min.y), point(glyph.uv_max.x, glyph.uv_min.y)),
                (max, glyph.uv_max),
                (point(min.x, max.y), point(glyph.uv_min.x, glyph.uv_max.y)),
            ] {
                vertices.push(Vertex {
                    position: p,
                    uv,
                    color,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 3, base + 1, base + 2, base + 3]);

            pen_x += glyph.advance.x * opts.scale + opts.spacing;
            prev = Some(ch);
        }
        pen_y += line_h + opts.new_line_spacing;
    }

    apply_text_gradient(&mut vertices, &opts.color);
    CachedText { vertices, indices }
}

/// Text gradients resolve against the laid out block: horizontal across
/// the whole block, vertical within each glyph quad.
fn apply_text_gradient(vertices: &mut [Vertex], gradient: &Gradient) {
    if gradient.is_uniform() || vertices.is_empty() {
        return;
    }
    match gradient.kind {
        GradientKind::Vertical => {
            for quad in vertices.chunks_mut(4) {
                quad[0].color = gradient.start;
                quad[1].color = gradient.start;
                quad[2].color = gradient.end;
                quad[3].color = gradient.end;
            }
        }
        _ => {
            let mut min_x = f32::MAX;
            let mut max_x = f32::MIN;
            for v in vertices.iter() {
                min_x = min_x.min(v.position.x);
                max_x = max_x.max(v.position.x);
            }
            let w = (max_x - min_x).max(EPSILON);
            for v in vertices.iter_mut() {
                let t = (v.position.x - min_x) / w;
                v.color = gradient.start.lerp(gradient.end, t);
            }
        }
    }
}

fn cache_key(text: &str, opts: &TextOptions, sdf: bool) -> u64 {
    let mut h = fnv1a(fnv1a_init(), text.as_bytes());
    h = fnv1a(h, &opts.font.0.to_le_bytes());
    h = fnv1a(h, &opts.scale.to_bits().to_le_bytes());
    h = fnv1a(h, &opts.spacing.to_bits().to_le_bytes());
    h = fnv1a(h, &opts.wrap_width.to_bits().to_le_bytes());
    h = fnv1a(h, &opts.new_line_spacing.to_bits().to_le_bytes());
    h = fnv1a(h, &[opts.alignment as u8, sdf as u8]);
    h
}

fn append(store: &mut BufferStore, entry: &CachedText, origin: Point, opts: &TextOptions, sdf: bool, draw_order: i32) {
    let kind = if sdf {
        DrawBufferKind::SdfText(opts.font)
    } else {
        DrawBufferKind::SimpleText(opts.font)
    };
    let id = store.get_buffer(kind, ShapeKind::Shape, draw_order, opts.user_data);
    let buf = store.buffer_mut(id);
    let base = buf.vertices.len() as u32;
    for v in &entry.vertices {
        buf.push_vertex(Vertex {
            position: v.position + origin.to_vector(),
            ..*v
        });
    }
    for tri in entry.indices.chunks(3) {
        buf.push_triangle(base + tri[0], base + tri[1], base + tri[2]);
    }
}

/// Tessellate a text block at `origin`.
pub(crate) fn draw_text(
    store: &mut BufferStore,
    config: &Config,
    glyphs: &dyn GlyphSource,
    text: &str,
    origin: Point,
    opts: &TextOptions,
    sdf: bool,
    draw_order: i32,
) -> TessellationResult {
    if glyphs.is_sdf(opts.font) != sdf {
        return Err(TessellationError::MismatchedFontKind);
    }

    let caching = if sdf {
        config.sdf_text_caching
    } else {
        config.text_caching
    };

    if caching {
        let key = cache_key(text, opts, sdf);
        if store.cached_text(key).is_none() {
            let entry = layout(glyphs, text, opts);
            store.store_cached_text(key, entry);
        }
        // Replay the cached layout at the requested origin.
        let entry = match store.cached_text(key) {
            Some(entry) => entry.clone(),
            None => return Ok(()),
        };
        append(store, &entry, origin, opts, sdf, draw_order);
        return Ok(());
    }

    let entry = layout(glyphs, text, opts);
    append(store, &entry, origin, opts, sdf, draw_order);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospaced 8x8 test font with a 10 unit advance.
    struct MonoFont {
        sdf: bool,
    }

    impl GlyphSource for MonoFont {
        fn glyph(&self, _font: FontHandle, ch: char) -> Option<Glyph> {
            if ch == '?' {
                return None;
            }
            Some(Glyph {
                advance: vector(10.0, 0.0),
                bearing: vector(1.0, -8.0),
                size: vector(8.0, 8.0),
                uv_min: point(0.0, 0.0),
                uv_max: point(0.1, 0.1),
            })
        }
        fn line_height(&self, _font: FontHandle) -> f32 {
            12.0
        }
        fn space_advance(&self, _font: FontHandle) -> f32 {
            10.0
        }
        fn is_sdf(&self, _font: FontHandle) -> bool {
            self.sdf
        }
    }

    const FONT: FontHandle = FontHandle(1);

    #[test]
    fn one_quad_per_glyph() {
        let mut store = BufferStore::new();
        let font = MonoFont { sdf: false };
        let opts = TextOptions::new(FONT);
        draw_text(
            &mut store,
            &Config::DEFAULT,
            &font,
            "ab c",
            point(100.0, 50.0),
            &opts,
            false,
            0,
        )
        .unwrap();

        let id = store.get_buffer(DrawBufferKind::SimpleText(FONT), ShapeKind::Shape, 0, 0);
        let buf = store.buffer(id);
        // Three glyphs, the space only advances the pen.
        assert_eq!(buf.vertices.len(), 3 * 4);
        assert_eq!(buf.indices.len(), 3 * 6);
        // First glyph box starts at origin + bearing.
        assert_eq!(buf.vertices[0].position, point(101.0, 42.0));
    }

    #[test]
    fn mismatched_font_kind() {
        let mut store = BufferStore::new();
        let font = MonoFont { sdf: true };
        let opts = TextOptions::new(FONT);
        let result = draw_text(
            &mut store,
            &Config::DEFAULT,
            &font,
            "hi",
            point(0.0, 0.0),
            &opts,
            false,
            0,
        );
        assert_eq!(result, Err(TessellationError::MismatchedFontKind));
    }

    #[test]
    fn word_wrap_breaks_lines() {
        let font = MonoFont { sdf: false };
        let mut opts = TextOptions::new(FONT);
        // "aaa bbb" is 70 wide unwrapped; wrap after the first word.
        opts.wrap_width = 40.0;
        let size = text_size(&font, "aaa bbb", &opts);
        assert_eq!(size.y, 24.0);
        assert_eq!(size.x, 30.0);
    }

    #[test]
    fn unknown_glyphs_are_skipped() {
        let mut store = BufferStore::new();
        let font = MonoFont { sdf: false };
        let opts = TextOptions::new(FONT);
        draw_text(
            &mut store,
            &Config::DEFAULT,
            &font,
            "a?b",
            point(0.0, 0.0),
            &opts,
            false,
            0,
        )
        .unwrap();
        let id = store.get_buffer(DrawBufferKind::SimpleText(FONT), ShapeKind::Shape, 0, 0);
        assert_eq!(store.buffer(id).vertices.len(), 2 * 4);
    }

    #[test]
    fn right_alignment_ends_at_origin() {
        let mut store = BufferStore::new();
        let font = MonoFont { sdf: false };
        let mut opts = TextOptions::new(FONT);
        opts.alignment = TextAlignment::Right;
        draw_text(
            &mut store,
            &Config::DEFAULT,
            &font,
            "ab",
            point(0.0, 0.0),
            &opts,
            false,
            0,
        )
        .unwrap();
        let id = store.get_buffer(DrawBufferKind::SimpleText(FONT), ShapeKind::Shape, 0, 0);
        let buf = store.buffer(id);
        for v in &buf.vertices {
            assert!(v.position.x <= 0.0);
        }
    }

    #[test]
    fn cached_text_replays_with_offset() {
        let mut store = BufferStore::new();
        let mut config = Config::DEFAULT;
        config.text_caching = true;
        let font = MonoFont { sdf: false };
        let opts = TextOptions::new(FONT);

        draw_text(&mut store, &config, &font, "hi", point(0.0, 0.0), &opts, false, 0).unwrap();
        draw_text(&mut store, &config, &font, "hi", point(50.0, 0.0), &opts, false, 0).unwrap();

        let id = store.get_buffer(DrawBufferKind::SimpleText(FONT), ShapeKind::Shape, 0, 0);
        let buf = store.buffer(id);
        assert_eq!(buf.vertices.len(), 4 * 4);
        let delta = buf.vertices[8].position - buf.vertices[0].position;
        assert_eq!(delta, vector(50.0, 0.0));
    }

    #[test]
    fn vertical_gradient_colors_glyph_edges() {
        let mut store = BufferStore::new();
        let font = MonoFont { sdf: false };
        let mut opts = TextOptions::new(FONT);
        opts.color = Gradient::new(Color::WHITE, Color::BLACK, GradientKind::Vertical);
        draw_text(
            &mut store,
            &Config::DEFAULT,
            &font,
            "a",
            point(0.0, 0.0),
            &opts,
            false,
            0,
        )
        .unwrap();
        let id = store.get_buffer(DrawBufferKind::SimpleText(FONT), ShapeKind::Shape, 0, 0);
        let buf = store.buffer(id);
        assert_eq!(buf.vertices[0].color, Color::WHITE);
        assert_eq!(buf.vertices[2].color, Color::BLACK);
    }
}
