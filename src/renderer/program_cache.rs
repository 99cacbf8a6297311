//! Shader program cache.
//!
//! One entry per [`ProgramKey`]. An entry moves from `Unrequested` to
//! `SourcePending` when a shape first asks for it, and from there to
//! `Linked` or `Failed` when [`ProgramCache::resolve`] runs. Both final
//! states stick until [`ProgramCache::clear`]; failures are not retried.
//!
//! The cache also implements the binding discipline: [`ProgramCache::use_program`]
//! only reaches the GPU when the bound program changes, and a switch drops
//! the "already bound" flags of both programs involved.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{Result, TesseraError};
use crate::renderer::context::{GpuContext, ProgramId};
use crate::renderer::pipeline::{ShaderGenerator, ShaderSource};
use crate::resources::variable_set::VariableSet;
use crate::scene::shape::BaseType;

/// Feature combination selecting a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey {
    pub base: BaseType,
    pub light: bool,
    pub texture: bool,
}

impl ProgramKey {
    #[must_use]
    pub const fn new(base: BaseType, light: bool, texture: bool) -> Self {
        Self { base, light, texture }
    }

    /// `<base>[-light][-texture]`
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())?;
        if self.light {
            f.write_str("-light")?;
        }
        if self.texture {
            f.write_str("-texture")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramState {
    Unrequested,
    SourcePending,
    Linked(ProgramId),
    /// Carries the diagnostic text.
    Failed(String),
}

#[derive(Debug)]
struct ProgramEntry {
    state: ProgramState,
    variables: VariableSet,
    source: Option<Arc<ShaderSource>>,
    vertex_bound: bool,
    bound_texture: Option<String>,
}

impl ProgramEntry {
    fn clear_bound(&mut self) {
        self.vertex_bound = false;
        self.bound_texture = None;
    }
}

/// Outcome of one [`ProgramCache::resolve`] pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinkSummary {
    pub linked: Vec<ProgramKey>,
    pub failed: Vec<(ProgramKey, String)>,
}

#[derive(Debug, Default)]
pub struct ProgramCache {
    entries: BTreeMap<ProgramKey, ProgramEntry>,
    bound: Option<ProgramKey>,
}

impl ProgramCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, key: ProgramKey) -> ProgramState {
        self.entries
            .get(&key)
            .map_or(ProgramState::Unrequested, |e| e.state.clone())
    }

    /// Marks `key` as needed and merges the variables a shape declares.
    /// Returns `true` on the first request.
    ///
    /// Variables arriving after the program is linked are ignored; the
    /// source is generated from the set gathered up to the link.
    pub fn request(&mut self, key: ProgramKey, variables: &VariableSet) -> bool {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                if entry.state == ProgramState::SourcePending {
                    entry.variables.merge(variables);
                } else if variables.iter().any(|d| !entry.variables.contains(d.name())) {
                    log::warn!("program `{key}` is already built; new shader variables are ignored");
                }
                false
            }
            None => {
                log::debug!("program `{key}` requested");
                let mut merged = VariableSet::new();
                merged.merge(variables);
                self.entries.insert(
                    key,
                    ProgramEntry {
                        state: ProgramState::SourcePending,
                        variables: merged,
                        source: None,
                        vertex_bound: false,
                        bound_texture: None,
                    },
                );
                true
            }
        }
    }

    /// The linked program for `key`, requesting it when it is unknown.
    pub fn get_program(&mut self, key: ProgramKey, variables: &VariableSet) -> Option<ProgramId> {
        if let ProgramState::Linked(id) = self.state(key) {
            return Some(id);
        }
        self.request(key, variables);
        None
    }

    #[must_use]
    pub fn program(&self, key: ProgramKey) -> Option<ProgramId> {
        match self.entries.get(&key)?.state {
            ProgramState::Linked(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn source(&self, key: ProgramKey) -> Option<&Arc<ShaderSource>> {
        self.entries.get(&key)?.source.as_ref()
    }

    #[must_use]
    pub fn error(&self, key: ProgramKey) -> Option<&str> {
        match &self.entries.get(&key)?.state {
            ProgramState::Failed(log) => Some(log),
            _ => None,
        }
    }

    /// Generates and compiles every pending program, in key order.
    ///
    /// A failing key is recorded as `Failed` and logged; the others still
    /// link.
    pub async fn resolve<C: GpuContext>(&mut self, ctx: &mut C) -> LinkSummary {
        let mut summary = LinkSummary::default();
        for (&key, entry) in &mut self.entries {
            if entry.state != ProgramState::SourcePending {
                continue;
            }
            let result = match ShaderGenerator::generate(key, &entry.variables) {
                Ok(source) => {
                    let source = Arc::new(source);
                    entry.source = Some(source.clone());
                    ctx.compile_program(&source).await
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(id) => {
                    log::debug!("program `{key}` linked");
                    entry.state = ProgramState::Linked(id);
                    summary.linked.push(key);
                }
                Err(e) => {
                    let message = match e {
                        TesseraError::ShaderCompile { log, .. } => log,
                        other => other.to_string(),
                    };
                    log::error!("program `{key}` failed:\n{message}");
                    entry.state = ProgramState::Failed(message.clone());
                    summary.failed.push((key, message));
                }
            }
        }
        summary
    }

    /// Binds `key`. Returns `true` when the GPU binding changed.
    pub fn use_program<C: GpuContext>(&mut self, ctx: &mut C, key: ProgramKey) -> Result<bool> {
        if self.bound == Some(key) {
            return Ok(false);
        }
        let id = self
            .program(key)
            .ok_or_else(|| TesseraError::UnknownResource(format!("program `{key}` is not linked")))?;
        ctx.use_program(id)?;
        if let Some(previous) = self.bound.and_then(|k| self.entries.get_mut(&k)) {
            previous.clear_bound();
        }
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.clear_bound();
        }
        self.bound = Some(key);
        Ok(true)
    }

    #[must_use]
    pub fn bound(&self) -> Option<ProgramKey> {
        self.bound
    }

    #[must_use]
    pub fn is_vertex_bound(&self, key: ProgramKey) -> bool {
        self.entries.get(&key).is_some_and(|e| e.vertex_bound)
    }

    pub fn mark_vertex_bound(&mut self, key: ProgramKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.vertex_bound = true;
        }
    }

    #[must_use]
    pub fn bound_texture(&self, key: ProgramKey) -> Option<&str> {
        self.entries.get(&key)?.bound_texture.as_deref()
    }

    pub fn mark_texture_bound(&mut self, key: ProgramKey, url: &str) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.bound_texture = Some(url.to_string());
        }
    }

    /// Forgets every bound flag, forcing rebinds on next use.
    pub fn clear_buffered_status(&mut self) {
        for entry in self.entries.values_mut() {
            entry.clear_bound();
        }
    }

    /// Forgets the bound program (a new frame starts with nothing bound).
    pub fn reset_binding(&mut self) {
        self.bound = None;
        self.clear_buffered_status();
    }

    /// Keys in draw order.
    pub fn keys(&self) -> impl Iterator<Item = ProgramKey> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, releasing linked programs.
    pub fn clear<C: GpuContext>(&mut self, ctx: &mut C) {
        for entry in self.entries.values() {
            if let ProgramState::Linked(id) = entry.state {
                ctx.destroy_program(id);
            }
        }
        self.entries.clear();
        self.bound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_follow_features() {
        assert_eq!(ProgramKey::new(BaseType::Basic, false, false).name(), "basic");
        assert_eq!(ProgramKey::new(BaseType::Basic, true, true).name(), "basic-light-texture");
        assert_eq!(ProgramKey::new(BaseType::Point, false, true).name(), "point-texture");
    }

    #[test]
    fn first_request_moves_to_pending() {
        let mut cache = ProgramCache::new();
        let key = ProgramKey::new(BaseType::Basic, true, false);
        assert_eq!(cache.state(key), ProgramState::Unrequested);
        assert!(cache.request(key, &VariableSet::new()));
        assert!(!cache.request(key, &VariableSet::new()));
        assert_eq!(cache.state(key), ProgramState::SourcePending);
        assert!(cache.get_program(key, &VariableSet::new()).is_none());
    }
}
