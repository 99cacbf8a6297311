//! Vertex deduplication and index store.
//!
//! [`VerticesData`] is the central geometry cache of a rendering context. It
//! deduplicates vertices by value, hands out stable indices and accumulates a
//! flat `f32` buffer with one [`VERTEX_STRIDE`]-sized record per unique vertex.
//!
//! Invariants:
//! - `data().len() == VERTEX_STRIDE * len()` after any sequence of inserts
//! - an index, once assigned, never changes (the store only grows)
//! - [`VerticesData::dump`] never mutates the store

use rustc_hash::FxHashMap;

use crate::errors::{Result, TesseraError};
use crate::resources::version_tracker::ChangeTracker;
use crate::resources::vertex::{VERTEX_OFFSETS, VERTEX_STRIDE, Vertex, VertexFieldOffsets, VertexKey};

/// Deduplicating vertex store. One instance per rendering context.
#[derive(Debug, Default)]
pub struct VerticesData {
    index_map: FxHashMap<VertexKey, u32>,
    references: Vec<u32>,
    data: Vec<f32>,
    tracker: ChangeTracker,
}

impl VerticesData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vertex and returns its index.
    ///
    /// An unseen value is appended at the next stride-aligned offset; a known
    /// value only bumps its reference count and leaves the buffer untouched.
    pub fn add(&mut self, vertex: &Vertex) -> u32 {
        let key = vertex.key();
        if let Some(&index) = self.index_map.get(&key) {
            self.references[index as usize] += 1;
            return index;
        }

        let index = self.references.len() as u32;
        self.index_map.insert(key, index);
        self.references.push(1);
        vertex.write_values(&mut self.data);
        self.tracker.changed();
        log::trace!("vertex {key} stored at index {index}");
        index
    }

    /// Registers every vertex in order.
    pub fn add_all<'a>(&mut self, vertices: impl IntoIterator<Item = &'a Vertex>) {
        for vertex in vertices {
            self.add(vertex);
        }
    }

    /// Index of `vertex`, storing it first if it is unseen. A known value
    /// keeps its reference count: a lookup is not a new reference.
    pub fn ensure(&mut self, vertex: &Vertex) -> u32 {
        match self.index_map.get(&vertex.key()) {
            Some(&index) => index,
            None => self.add(vertex),
        }
    }

    /// Indices for `vertices`, in input order, through [`VerticesData::ensure`].
    pub fn indices_for<'a>(&mut self, vertices: impl IntoIterator<Item = &'a Vertex>) -> Vec<u32> {
        vertices.into_iter().map(|vertex| self.ensure(vertex)).collect()
    }

    /// Index of a vertex that is already stored.
    #[must_use]
    pub fn index_of(&self, vertex: &Vertex) -> Option<u32> {
        self.index_map.get(&vertex.key()).copied()
    }

    /// How many times a value has been added.
    #[must_use]
    pub fn reference_count(&self, vertex: &Vertex) -> u32 {
        self.index_of(vertex)
            .map_or(0, |index| self.references[index as usize])
    }

    /// Number of unique vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Flat vertex records.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Bumped every time the buffer grows.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    /// Index width that fits every index handed out so far.
    #[must_use]
    pub fn index_format(&self) -> IndexFormat {
        IndexFormat::for_vertex_count(self.len())
    }

    /// Read-only snapshot for upload.
    #[must_use]
    pub fn dump(&self) -> VerticesSnapshot<'_> {
        VerticesSnapshot {
            data: &self.data,
            stride: VERTEX_STRIDE,
            offsets: VERTEX_OFFSETS,
            count: self.len(),
            version: self.tracker.version(),
        }
    }

    /// Drops every vertex. Only valid when the owning scene is torn down,
    /// since previously handed out indices become meaningless.
    pub fn clear(&mut self) {
        self.index_map.clear();
        self.references.clear();
        self.data.clear();
        self.tracker.changed();
    }
}

/// Borrowed view of a [`VerticesData`] ready for GPU upload.
#[derive(Debug, Clone, Copy)]
pub struct VerticesSnapshot<'a> {
    pub data: &'a [f32],
    pub stride: usize,
    pub offsets: VertexFieldOffsets,
    pub count: usize,
    pub version: u64,
}

impl VerticesSnapshot<'_> {
    /// The vertex records as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.data)
    }

    /// Size of one record in bytes.
    #[must_use]
    pub fn stride_bytes(&self) -> u64 {
        (self.stride * std::mem::size_of::<f32>()) as u64
    }
}

// ============================================================================
// Index buffers
// ============================================================================

/// Width of one index in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U8,
    U16,
}

impl IndexFormat {
    /// 8-bit for up to 256 unique vertices, 16-bit above.
    #[must_use]
    pub fn for_vertex_count(count: usize) -> Self {
        if count <= 256 { Self::U8 } else { Self::U16 }
    }
}

/// A typed index buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl IndexBuffer {
    /// Packs `indices` using the narrowest width that fits `unique_count`
    /// vertices.
    pub fn from_indices(indices: &[u32], unique_count: usize) -> Result<Self> {
        if unique_count > usize::from(u16::MAX) + 1 {
            return Err(TesseraError::IndexOverflow(unique_count));
        }
        Ok(match IndexFormat::for_vertex_count(unique_count) {
            IndexFormat::U8 => Self::U8(indices.iter().map(|&i| i as u8).collect()),
            IndexFormat::U16 => Self::U16(indices.iter().map(|&i| i as u16).collect()),
        })
    }

    #[must_use]
    pub fn format(&self) -> IndexFormat {
        match self {
            Self::U8(_) => IndexFormat::U8,
            Self::U16(_) => IndexFormat::U16,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widened copy of the indices.
    #[must_use]
    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            Self::U8(v) => v.iter().map(|&i| u32::from(i)).collect(),
            Self::U16(v) => v.iter().map(|&i| u32::from(i)).collect(),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U8(v) => v,
            Self::U16(v) => bytemuck::cast_slice(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::vector::Rgba;

    #[test]
    fn lookup_does_not_count_as_reference() {
        let mut store = VerticesData::new();
        let v = Vertex::new([0.0, 1.0, 0.0], Rgba::RED);
        store.add(&v);
        let _ = store.indices_for([&v, &v]);
        assert_eq!(store.reference_count(&v), 1);
        store.add(&v);
        assert_eq!(store.reference_count(&v), 2);
    }

    #[test]
    fn growth_bumps_version_only_for_new_values() {
        let mut store = VerticesData::new();
        let v = Vertex::new([0.0, 1.0, 0.0], Rgba::RED);
        store.add(&v);
        let version = store.version();
        store.add(&v);
        assert_eq!(store.version(), version);
        store.add(&Vertex::new([0.0, 2.0, 0.0], Rgba::RED));
        assert_ne!(store.version(), version);
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(matches!(
            IndexBuffer::from_indices(&[0], 70_000),
            Err(TesseraError::IndexOverflow(70_000))
        ));
    }
}
