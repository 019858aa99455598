//! Batched vertex/index buffers and the per-frame store that owns them.

use crate::math::*;
use crate::text::FontHandle;
use crate::{Color, Gradient, Texture};

use std::collections::HashMap;

/// Output vertex layout, ready for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Vertex {
    pub position: Point,
    pub uv: Point,
    pub color: Color,
}

/// Shader family a buffer is drawn with. Part of the batching key: the
/// payload has to match exactly for two draws to share a buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawBufferKind {
    /// Flat vertex colors.
    Default,
    /// Two color gradient resolved in the shader.
    Gradient(Gradient),
    /// Textured geometry.
    Textured(Texture),
    /// Plain bitmap glyphs.
    SimpleText(FontHandle),
    /// Signed distance field glyphs.
    SdfText(FontHandle),
}

/// Secondary ordering within a draw order: anti-aliasing fringes draw
/// after the shapes they soften.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Shape,
    AntiAliasing,
}

impl ShapeKind {
    fn rank(self) -> u8 {
        match self {
            ShapeKind::Shape => 0,
            ShapeKind::AntiAliasing => 1,
        }
    }
}

/// Stable handle to a [`DrawBuffer`] inside its [`BufferStore`].
///
/// Handles stay valid for the whole frame; buffer growth never moves
/// them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferId(pub(crate) usize);

/// One batch of geometry: a vertex array and an index array drawn in a
/// single call by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBuffer {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub kind: DrawBufferKind,
    pub shape: ShapeKind,
    pub draw_order: i32,
    pub user_data: u32,
    in_use: bool,
}

impl DrawBuffer {
    fn new(kind: DrawBufferKind, shape: ShapeKind, draw_order: i32, user_data: u32) -> Self {
        DrawBuffer {
            vertices: Vec::with_capacity(512),
            indices: Vec::with_capacity(1024),
            kind,
            shape,
            draw_order,
            user_data,
            in_use: true,
        }
    }

    fn matches(
        &self,
        kind: &DrawBufferKind,
        shape: ShapeKind,
        draw_order: i32,
        user_data: u32,
    ) -> bool {
        self.in_use
            && self.draw_order == draw_order
            && self.shape == shape
            && self.user_data == user_data
            && self.kind == *kind
    }

    /// Append a vertex, returning its index within this buffer.
    #[inline]
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let id = self.vertices.len() as u32;
        self.vertices.push(vertex);
        id
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        debug_assert!(a != b && b != c && a != c, "degenerate triangle");
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Laid out text recorded once and replayed on later frames with a
/// position offset.
#[derive(Clone, Debug)]
pub(crate) struct CachedText {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Consumer boundary: receives finished buffers at flush time, in
/// ascending draw order. Uploading them to the GPU is the backend's
/// business.
pub trait Backend {
    fn draw(&mut self, buffer: &DrawBuffer);
}

/// Arena of draw buffers for the current frame.
///
/// Buffers are created on demand, keyed by shader family, shape kind,
/// draw order and user data. [`BufferStore::clear`] recycles them:
/// the vertex/index allocations are kept for the next frame.
#[derive(Default)]
pub struct BufferStore {
    buffers: Vec<DrawBuffer>,
    text_cache: HashMap<u64, CachedText>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the matching batch or create one.
    pub fn get_buffer(
        &mut self,
        kind: DrawBufferKind,
        shape: ShapeKind,
        draw_order: i32,
        user_data: u32,
    ) -> BufferId {
        if let Some(i) = self
            .buffers
            .iter()
            .position(|b| b.matches(&kind, shape, draw_order, user_data))
        {
            return BufferId(i);
        }

        // Recycle a cleared slot before growing the arena.
        if let Some(i) = self.buffers.iter().position(|b| !b.in_use) {
            let buf = &mut self.buffers[i];
            buf.kind = kind;
            buf.shape = shape;
            buf.draw_order = draw_order;
            buf.user_data = user_data;
            buf.in_use = true;
            return BufferId(i);
        }

        self.buffers
            .push(DrawBuffer::new(kind, shape, draw_order, user_data));
        BufferId(self.buffers.len() - 1)
    }

    #[inline]
    pub fn buffer(&self, id: BufferId) -> &DrawBuffer {
        &self.buffers[id.0]
    }

    #[inline]
    pub fn buffer_mut(&mut self, id: BufferId) -> &mut DrawBuffer {
        &mut self.buffers[id.0]
    }

    /// Submit every non-empty buffer, ordered by ascending draw order,
    /// shapes before their anti-aliasing fringes.
    pub fn flush(&mut self, backend: &mut dyn Backend) {
        let mut order: Vec<usize> = (0..self.buffers.len())
            .filter(|&i| self.buffers[i].in_use && !self.buffers[i].is_empty())
            .collect();
        order.sort_by_key(|&i| (self.buffers[i].draw_order, self.buffers[i].shape.rank(), i));
        for i in order {
            backend.draw(&self.buffers[i]);
        }
    }

    /// End the frame: empty every buffer but keep the allocations and
    /// the text cache.
    pub fn clear(&mut self) {
        for buf in &mut self.buffers {
            buf.vertices.clear();
            buf.indices.clear();
            buf.in_use = false;
        }
    }

    /// Release everything, including the text cache.
    pub fn clear_all(&mut self) {
        self.buffers.clear();
        self.text_cache.clear();
    }

    pub(crate) fn cached_text(&self, key: u64) -> Option<&CachedText> {
        self.text_cache.get(&key)
    }

    pub(crate) fn store_cached_text(&mut self, key: u64, entry: CachedText) {
        self.text_cache.insert(key, entry);
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental FNV-1a, used to key the text cache.
pub(crate) fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    let mut hash = seed;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

pub(crate) fn fnv1a_init() -> u64 {
    FNV_OFFSET_BASIS
}
