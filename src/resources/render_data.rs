//! Per-shape draw data.
//!
//! [`RenderData`] is what a shape hands the renderer: index runs ordered by
//! render mode (joined across elements where the mode allows), the generic per-vertex
//! attribute streams and the generic uniform values. Index values refer to
//! the shared [`VerticesData`] buffer.

use crate::errors::Result;
use crate::resources::element::{Element, RenderMode};
use crate::resources::variable_set::GlType;
use crate::resources::vertices_data::{IndexBuffer, VerticesData};

/// One generic per-vertex data stream (`a_X` attribute or the attribute
/// feeding a `v_X` varying).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    pub name: String,
    pub gl_type: GlType,
    /// Floats per vertex.
    pub step: usize,
    pub values: Vec<f32>,
}

impl AttributeData {
    #[must_use]
    pub fn new(name: impl Into<String>, gl_type: GlType) -> Self {
        Self {
            name: name.into(),
            gl_type,
            step: gl_type.components(),
            values: Vec::new(),
        }
    }

    /// Appends values and pads with the last supplied vertex value until the
    /// stream covers `vertex_count` vertices.
    pub fn push(&mut self, values: &[f32], vertex_count: usize) {
        self.values.extend_from_slice(values);
        self.pad_to(vertex_count);
    }

    /// Repeats the last vertex value until `vertex_count` vertices are covered.
    pub fn pad_to(&mut self, vertex_count: usize) {
        let wanted = vertex_count * self.step;
        if self.values.len() >= wanted || self.values.len() < self.step {
            return;
        }
        let start = self.values.len() - self.step;
        let last: Vec<f32> = self.values[start..].to_vec();
        while self.values.len() < wanted {
            self.values.extend_from_slice(&last);
        }
    }

    /// Number of vertices covered.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.values.len() / self.step.max(1)
    }

    /// Lays the stream out in shared-buffer index space.
    ///
    /// `vertex_indices[i]` is the store index of authored vertex `i`; the
    /// result has `store_len` slots and unset slots hold `1.0`. When two
    /// authored vertices share a store index the later value wins.
    #[must_use]
    pub fn scatter(&self, vertex_indices: &[u32], store_len: usize) -> Vec<f32> {
        let step = self.step.max(1);
        let mut out = vec![1.0; store_len * step];
        for (value, &index) in self.values.chunks_exact(step).zip(vertex_indices) {
            let start = index as usize * step;
            if let Some(slot) = out.get_mut(start..start + step) {
                slot.copy_from_slice(value);
            }
        }
        out
    }
}

/// Draw-ready data of one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderData {
    /// Index runs in draw order (sorted by mode).
    pub indices: Vec<(RenderMode, Vec<u32>)>,
    /// Store index of every authored vertex, in authoring order.
    pub vertex_indices: Vec<u32>,
    /// Number of authored vertices (before deduplication).
    pub vertex_count: usize,
    pub attributes: Vec<AttributeData>,
    pub uniforms: Vec<(String, Vec<f32>)>,
}

impl RenderData {
    /// Collects the index runs of `elements`, sorted by mode.
    ///
    /// Elements of a merging mode share one run. Within a strip mode,
    /// consecutive elements are stitched with a degenerate join: the
    /// previous run's last index followed by the next run's first index.
    pub fn collect_indices<'a>(
        elements: impl IntoIterator<Item = &'a Element>,
        store: &mut VerticesData,
    ) -> Vec<(RenderMode, Vec<u32>)> {
        let mut runs: Vec<(RenderMode, Vec<u32>)> = Vec::new();
        for element in elements {
            let next = element.indices(store);
            let Some(&first) = next.first() else {
                continue;
            };
            let mode = element.mode();
            let shared = if mode.merges_runs() {
                runs.iter_mut().find(|(m, _)| *m == mode)
            } else {
                None
            };
            match shared {
                Some((_, run)) => {
                    if mode.needs_degenerate_join()
                        && let Some(&last) = run.last()
                    {
                        run.push(last);
                        run.push(first);
                    }
                    run.extend_from_slice(&next);
                }
                None => runs.push((mode, next)),
            }
        }
        runs.sort_by_key(|(mode, _)| *mode);
        runs
    }

    /// Index runs drawn with `mode`.
    pub fn runs(&self, mode: RenderMode) -> impl Iterator<Item = &[u32]> {
        self.indices
            .iter()
            .filter(move |(m, _)| *m == mode)
            .map(|(_, run)| run.as_slice())
    }

    /// True when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.iter().all(|(_, run)| run.is_empty())
    }

    /// Total index count over every mode.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.iter().map(|(_, run)| run.len()).sum()
    }

    /// Packs each run into a typed buffer sized for `unique_count` vertices.
    pub fn index_buffers(&self, unique_count: usize) -> Result<Vec<(RenderMode, IndexBuffer)>> {
        self.indices
            .iter()
            .map(|(mode, indices)| Ok((*mode, IndexBuffer::from_indices(indices, unique_count)?)))
            .collect()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_repeats_last_vertex_value() {
        let mut data = AttributeData::new("a_Tint", GlType::Vec2);
        data.push(&[1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(data.values, vec![1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 3.0, 4.0]);
        assert_eq!(data.vertex_count(), 4);
    }

    #[test]
    fn scatter_places_values_at_store_indices() {
        let mut data = AttributeData::new("a_Shade", GlType::Float);
        data.push(&[0.25, 0.5], 2);
        assert_eq!(data.scatter(&[2, 0], 4), vec![0.5, 1.0, 0.25, 1.0]);
    }

    #[test]
    fn padding_never_truncates() {
        let mut data = AttributeData::new("a_Shade", GlType::Float);
        data.push(&[1.0, 2.0, 3.0], 2);
        assert_eq!(data.values.len(), 3);
    }
}
