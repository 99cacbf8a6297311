//! Shader Variable Registry
//!
//! A [`VariableSet`] collects the shader-visible variables a shape needs,
//! partitioned by role (attribute, uniform, varying). It is the structural
//! bridge between geometry and generated shader source.
//!
//! # Rules
//!
//! - A name lives in exactly one partition.
//! - Re-adding a known name is a no-op: the first writer wins.
//! - [`VariableSet::merge`] is a per-partition union that never overwrites.
//! - [`VariableSet::dump`] lists descriptors in insertion order, which keeps
//!   generated shader source byte-identical for identical content.
//!
//! # Naming
//!
//! Attribute names start with `a_`, uniforms with `u_` and varyings with
//! `v_`. A varying `v_Foo` is fed from the per-vertex attribute `a_Foo`.

use std::borrow::Cow;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::errors::{Result, TesseraError};

/// Role of a shader variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Attribute,
    Uniform,
    Varying,
}

impl VariableKind {
    pub const ALL: [Self; 3] = [Self::Attribute, Self::Uniform, Self::Varying];

    /// Required name prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Attribute => "a_",
            Self::Uniform => "u_",
            Self::Varying => "v_",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
        }
    }

    /// Parses the textual kind used by descriptor documents.
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "attribute" => Ok(Self::Attribute),
            "uniform" => Ok(Self::Uniform),
            "varying" => Ok(Self::Varying),
            other => Err(TesseraError::InvalidVariable(format!(
                "unknown variable kind `{other}`"
            ))),
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        match self {
            Self::Attribute => 0,
            Self::Uniform => 1,
            Self::Varying => 2,
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GL-level type of a shader variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GlType {
    Bool,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Sampler2D,
}

impl GlType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat4 => "mat4",
            Self::Sampler2D => "sampler2D",
        }
    }

    pub fn parse(ty: &str) -> Result<Self> {
        match ty {
            "bool" => Ok(Self::Bool),
            "float" => Ok(Self::Float),
            "vec2" => Ok(Self::Vec2),
            "vec3" => Ok(Self::Vec3),
            "vec4" => Ok(Self::Vec4),
            "mat4" => Ok(Self::Mat4),
            "sampler2D" => Ok(Self::Sampler2D),
            other => Err(TesseraError::InvalidVariable(format!(
                "unknown GL type `{other}`"
            ))),
        }
    }

    /// Number of `f32` components one value occupies.
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            Self::Bool | Self::Float | Self::Sampler2D => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat4 => 16,
        }
    }
}

impl fmt::Display for GlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shader variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDescriptor {
    name: String,
    kind: VariableKind,
    gl_type: GlType,
    target: Option<String>,
}

impl VariableDescriptor {
    /// Validates the name against the prefix convention of `kind`.
    pub fn new(name: impl Into<String>, kind: VariableKind, gl_type: GlType) -> Result<Self> {
        let name = name.into();
        let expected = kind.prefix();
        if name.len() <= expected.len() || !name.starts_with(expected) {
            return Err(TesseraError::InvalidVariableName { name, expected });
        }
        Ok(Self {
            name,
            kind,
            gl_type,
            target: None,
        })
    }

    pub fn attribute(name: impl Into<String>, gl_type: GlType) -> Result<Self> {
        Self::new(name, VariableKind::Attribute, gl_type)
    }

    pub fn uniform(name: impl Into<String>, gl_type: GlType) -> Result<Self> {
        Self::new(name, VariableKind::Uniform, gl_type)
    }

    pub fn varying(name: impl Into<String>, gl_type: GlType) -> Result<Self> {
        Self::new(name, VariableKind::Varying, gl_type)
    }

    /// Builds a descriptor from loosely typed parts, as found in descriptor
    /// documents. A missing or unknown kind or type is `InvalidVariable`.
    pub fn from_parts(name: &str, kind: Option<&str>, gl_type: Option<&str>) -> Result<Self> {
        let kind = kind
            .ok_or_else(|| TesseraError::InvalidVariable(format!("`{name}` has no kind")))
            .and_then(VariableKind::parse)?;
        let gl_type = gl_type
            .ok_or_else(|| TesseraError::InvalidVariable(format!("`{name}` has no GL type")))
            .and_then(GlType::parse)?;
        Self::new(name, kind, gl_type)
    }

    /// Sets the l-value the generated code assigns this variable to.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn gl_type(&self) -> GlType {
        self.gl_type
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Name of the per-vertex attribute carrying this variable's data.
    /// For a varying `v_Foo` that is `a_Foo`; attributes map to themselves.
    #[must_use]
    pub fn attribute_name(&self) -> Cow<'_, str> {
        match self.kind {
            VariableKind::Varying => Cow::Owned(format!("a_{}", &self.name[2..])),
            _ => Cow::Borrowed(&self.name),
        }
    }
}

/// Name-keyed, role-partitioned set of shader variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    partitions: [Vec<String>; 3],
    descriptors: FxHashMap<String, VariableDescriptor>,
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. Returns `false` when the name is already present,
    /// in which case the existing descriptor is kept.
    pub fn add(&mut self, descriptor: VariableDescriptor) -> bool {
        if self.descriptors.contains_key(&descriptor.name) {
            log::trace!("variable `{}` already declared, keeping first", descriptor.name);
            return false;
        }
        self.partitions[descriptor.kind.slot()].push(descriptor.name.clone());
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        true
    }

    /// Adds a descriptor given as loose parts; see
    /// [`VariableDescriptor::from_parts`].
    pub fn add_parts(&mut self, name: &str, kind: Option<&str>, gl_type: Option<&str>) -> Result<bool> {
        Ok(self.add(VariableDescriptor::from_parts(name, kind, gl_type)?))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.descriptors.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<VariableDescriptor> {
        let descriptor = self.descriptors.remove(name)?;
        self.partitions[descriptor.kind.slot()].retain(|n| n != name);
        Some(descriptor)
    }

    pub fn clear(&mut self) {
        self.descriptors.clear();
        for partition in &mut self.partitions {
            partition.clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Per-partition union: every name of `other` missing here is added with
    /// `other`'s descriptor. Existing names are never overwritten.
    pub fn merge(&mut self, other: &VariableSet) {
        for kind in VariableKind::ALL {
            for descriptor in other.partition(kind) {
                if !self.contains(descriptor.name()) {
                    self.add(descriptor.clone());
                }
            }
        }
    }

    /// Descriptors of one partition in insertion order.
    pub fn partition(&self, kind: VariableKind) -> impl Iterator<Item = &VariableDescriptor> {
        self.partitions[kind.slot()]
            .iter()
            .filter_map(|name| self.descriptors.get(name))
    }

    /// All descriptors, attributes first, then uniforms, then varyings.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        VariableKind::ALL
            .into_iter()
            .flat_map(|kind| self.partition(kind))
    }

    /// Ordered per-partition snapshot.
    #[must_use]
    pub fn dump(&self) -> VariableSetDump {
        VariableSetDump {
            attributes: self.partition(VariableKind::Attribute).cloned().collect(),
            uniforms: self.partition(VariableKind::Uniform).cloned().collect(),
            varyings: self.partition(VariableKind::Varying).cloned().collect(),
        }
    }
}

/// Insertion-ordered descriptor lists of a [`VariableSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSetDump {
    pub attributes: Vec<VariableDescriptor>,
    pub uniforms: Vec<VariableDescriptor>,
    pub varyings: Vec<VariableDescriptor>,
}

impl VariableSetDump {
    /// Drops every descriptor whose name `reserved` accepts.
    #[must_use]
    pub fn without(mut self, reserved: impl Fn(&str) -> bool) -> Self {
        self.attributes.retain(|d| !reserved(d.name()));
        self.uniforms.retain(|d| !reserved(d.name()));
        self.varyings.retain(|d| !reserved(d.name()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varying_reads_from_matching_attribute() {
        let v = VariableDescriptor::varying("v_Shade", GlType::Float).unwrap();
        assert_eq!(v.attribute_name(), "a_Shade");
        let a = VariableDescriptor::attribute("a_Shade", GlType::Float).unwrap();
        assert_eq!(a.attribute_name(), "a_Shade");
    }

    #[test]
    fn remove_frees_the_name() {
        let mut set = VariableSet::new();
        set.add(VariableDescriptor::uniform("u_Time", GlType::Float).unwrap());
        assert!(set.remove("u_Time").is_some());
        assert!(set.add(VariableDescriptor::uniform("u_Time", GlType::Vec4).unwrap()));
        assert_eq!(set.get("u_Time").unwrap().gl_type(), GlType::Vec4);
    }

    #[test]
    fn first_declaration_wins() {
        let mut set = VariableSet::new();
        assert!(set.add(VariableDescriptor::uniform("u_Tint", GlType::Vec4).unwrap()));
        assert!(!set.add(VariableDescriptor::uniform("u_Tint", GlType::Float).unwrap()));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("u_Tint").unwrap().gl_type(), GlType::Vec4);
    }

    #[test]
    fn merge_only_adds_missing_names() {
        let mut set = VariableSet::new();
        set.add(VariableDescriptor::uniform("u_Tint", GlType::Vec4).unwrap());
        set.add(VariableDescriptor::attribute("a_Shade", GlType::Float).unwrap());

        let mut other = VariableSet::new();
        other.add(VariableDescriptor::attribute("a_Extra", GlType::Vec2).unwrap());
        other.add(VariableDescriptor::uniform("u_Tint", GlType::Float).unwrap());
        other.add(
            VariableDescriptor::varying("v_Glow", GlType::Vec4)
                .unwrap()
                .with_target("color"),
        );
        set.merge(&other);

        assert_eq!(set.len(), 4);
        assert_eq!(set.get("u_Tint").unwrap().gl_type(), GlType::Vec4);
        assert_eq!(set.get("v_Glow").unwrap().target(), Some("color"));
        let attributes: Vec<&str> = set
            .partition(VariableKind::Attribute)
            .map(VariableDescriptor::name)
            .collect();
        assert_eq!(attributes, vec!["a_Shade", "a_Extra"]);

        // merging again changes nothing
        let before = set.dump();
        set.merge(&other);
        assert_eq!(set.dump(), before);
    }

    #[test]
    fn bare_prefix_is_not_a_name() {
        assert!(VariableDescriptor::attribute("a_", GlType::Float).is_err());
    }
}
