//! Shader Code Generator
//!
//! Turns a [`VariableSet`] and a [`ProgramKey`] into WGSL in two steps:
//!
//! 1. [`ShaderIr::build`] lowers the variables into typed declarations and
//!    assignment statements. Reserved built-ins are filtered out here.
//! 2. [`ShaderGenerator::generate`] renders each IR node with [`WgslWriter`]
//!    and splices the chunks into the embedded template of the base type.
//!
//! Identical inputs always produce byte-identical source.

use std::fmt::Write as _;

use minijinja::context;
use xxhash_rust::xxh3::xxh3_128;

use super::shader_manager::get_env;
use super::uniform_layout::UniformLayout;
use super::vertex::VertexLayout;
use crate::errors::{Result, TesseraError};
use crate::renderer::program_cache::ProgramKey;
use crate::resources::variable_set::{GlType, VariableSet};

/// Names with hand-written declarations in every template.
pub const RESERVED_NAMES: [&str; 10] = [
    "a_Position",
    "a_PointSize",
    "a_Color",
    "a_Normal",
    "a_TexCoord",
    "u_ModelMatrix",
    "u_MvpMatrix",
    "u_Sampler",
    "v_Color",
    "v_TexCoord",
];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// WGSL spelling of a type read from a vertex stream or passed between
/// stages. Matrices can do neither.
pub fn wgsl_stream_type(name: &str, ty: GlType) -> Result<&'static str> {
    if ty == GlType::Mat4 {
        return Err(TesseraError::UnsupportedVariable {
            name: name.to_string(),
            ty: ty.as_str(),
        });
    }
    wgsl_type(name, ty)
}

/// WGSL spelling of a GL type. Booleans are carried as `f32`.
pub fn wgsl_type(name: &str, ty: GlType) -> Result<&'static str> {
    Ok(match ty {
        GlType::Bool | GlType::Float => "f32",
        GlType::Vec2 => "vec2<f32>",
        GlType::Vec3 => "vec3<f32>",
        GlType::Vec4 => "vec4<f32>",
        GlType::Mat4 => "mat4x4<f32>",
        GlType::Sampler2D => {
            return Err(TesseraError::UnsupportedVariable {
                name: name.to_string(),
                ty: ty.as_str(),
            });
        }
    })
}

// ============================================================================
// Intermediate representation
// ============================================================================

/// A value a statement reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `in.<name>` in the vertex stage.
    VertexInput(String),
    /// `in.<name>` in the fragment stage.
    Varying(String),
    /// `shape.<name>`.
    Uniform(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `<target> = <value>;`
    Assign { target: String, value: Expr },
    /// `out.<varying> = <value>;`
    Output { varying: String, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaryingDecl {
    pub name: String,
    pub ty: &'static str,
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: &'static str,
}

/// Declarations and statements of one program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderIr {
    pub key: ProgramKey,
    pub vertex_layout: VertexLayout,
    pub uniform_layout: UniformLayout,
    pub varyings: Vec<VaryingDecl>,
    pub uniforms: Vec<UniformDecl>,
    pub vertex_statements: Vec<Stmt>,
    pub fragment_statements: Vec<Stmt>,
}

impl ShaderIr {
    /// Lowers `variables` for `key`.
    ///
    /// - generic attribute `a_X`: a vertex input; with a target, assigned in
    ///   the vertex stage
    /// - generic varying `v_X`: fed from vertex input `a_X` and passed to the
    ///   fragment stage; with a target, assigned there
    /// - generic uniform `u_X`: a field of the shape uniform block; with a
    ///   target, assigned in the fragment stage
    pub fn build(key: ProgramKey, variables: &VariableSet) -> Result<Self> {
        let dump = variables.dump().without(is_reserved);
        let mut inputs: Vec<(String, GlType)> = Vec::new();
        let mut push_input = |name: &str, ty: GlType| {
            if !inputs.iter().any(|(n, _)| n == name) {
                inputs.push((name.to_string(), ty));
            }
        };

        let mut vertex_statements = Vec::new();
        let mut fragment_statements = Vec::new();

        for descriptor in &dump.attributes {
            wgsl_stream_type(descriptor.name(), descriptor.gl_type())?;
            push_input(descriptor.name(), descriptor.gl_type());
            if let Some(target) = descriptor.target() {
                vertex_statements.push(Stmt::Assign {
                    target: target.to_string(),
                    value: Expr::VertexInput(descriptor.name().to_string()),
                });
            }
        }

        // v_Color and v_TexCoord occupy locations 0 and 1
        let mut location = 2;
        let mut varyings = Vec::new();
        for descriptor in &dump.varyings {
            let ty = wgsl_stream_type(descriptor.name(), descriptor.gl_type())?;
            let source = descriptor.attribute_name().into_owned();
            if !is_reserved(&source) {
                push_input(&source, descriptor.gl_type());
            }
            varyings.push(VaryingDecl {
                name: descriptor.name().to_string(),
                ty,
                location,
            });
            location += 1;
            vertex_statements.push(Stmt::Output {
                varying: descriptor.name().to_string(),
                value: Expr::VertexInput(source),
            });
            if let Some(target) = descriptor.target() {
                fragment_statements.push(Stmt::Assign {
                    target: target.to_string(),
                    value: Expr::Varying(descriptor.name().to_string()),
                });
            }
        }

        let mut uniforms = Vec::new();
        let mut uniform_fields = Vec::new();
        for descriptor in &dump.uniforms {
            let ty = wgsl_type(descriptor.name(), descriptor.gl_type())?;
            uniforms.push(UniformDecl {
                name: descriptor.name().to_string(),
                ty,
            });
            uniform_fields.push((descriptor.name(), descriptor.gl_type()));
            if let Some(target) = descriptor.target() {
                fragment_statements.push(Stmt::Assign {
                    target: target.to_string(),
                    value: Expr::Uniform(descriptor.name().to_string()),
                });
            }
        }

        Ok(Self {
            key,
            vertex_layout: VertexLayout::new(inputs.iter().map(|(n, t)| (n.as_str(), *t))),
            uniform_layout: UniformLayout::new(uniform_fields),
            varyings,
            uniforms,
            vertex_statements,
            fragment_statements,
        })
    }
}

// ============================================================================
// Text builder
// ============================================================================

/// Renders IR nodes as WGSL text.
#[derive(Debug, Default)]
pub struct WgslWriter {
    out: String,
    indent: usize,
}

impl WgslWriter {
    #[must_use]
    pub fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn expr(expr: &Expr) -> String {
        match expr {
            Expr::VertexInput(name) | Expr::Varying(name) => format!("in.{name}"),
            Expr::Uniform(name) => format!("shape.{name}"),
        }
    }

    pub fn stmt(&mut self, stmt: &Stmt) {
        let text = match stmt {
            Stmt::Assign { target, value } => format!("{target} = {};", Self::expr(value)),
            Stmt::Output { varying, value } => format!("out.{varying} = {};", Self::expr(value)),
        };
        self.line(&text);
    }

    /// `struct VertexOutput`, with the fixed colour and texture varyings first.
    pub fn vertex_output(&mut self, texture: bool, varyings: &[VaryingDecl]) {
        self.line("struct VertexOutput {");
        self.indent += 1;
        self.line("@builtin(position) clip_position: vec4<f32>,");
        self.line("@location(0) v_Color: vec4<f32>,");
        if texture {
            self.line("@location(1) v_TexCoord: vec2<f32>,");
        }
        for varying in varyings {
            let mut text = String::new();
            let _ = write!(text, "@location({}) {}: {},", varying.location, varying.name, varying.ty);
            self.line(&text);
        }
        self.indent -= 1;
        self.line("};");
    }

    /// The generic uniform block. Nothing is written for an empty list.
    pub fn uniform_block(&mut self, uniforms: &[UniformDecl]) {
        if uniforms.is_empty() {
            return;
        }
        self.line("struct ShapeUniforms {");
        self.indent += 1;
        for uniform in uniforms {
            self.line(&format!("{}: {},", uniform.name, uniform.ty));
        }
        self.indent -= 1;
        self.line("};");
        self.line("@group(0) @binding(1) var<uniform> shape: ShapeUniforms;");
    }

    pub fn raw(&mut self, code: &str) {
        for line in code.lines() {
            self.line(line);
        }
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generated program source plus the layouts the backend needs to build
/// pipelines for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub key: ProgramKey,
    pub code: String,
    /// xxh3-128 of `code`.
    pub hash: u128,
    pub vertex_layout: VertexLayout,
    pub uniform_layout: UniformLayout,
}

impl ShaderSource {
    /// Program name, e.g. `basic-light-texture`.
    #[must_use]
    pub fn name(&self) -> String {
        self.key.name()
    }
}

pub struct ShaderGenerator;

impl ShaderGenerator {
    pub fn generate(key: ProgramKey, variables: &VariableSet) -> Result<ShaderSource> {
        let ir = ShaderIr::build(key, variables)?;
        Self::render(&ir)
    }

    pub fn render(ir: &ShaderIr) -> Result<ShaderSource> {
        let mut declarations = WgslWriter::new(0);
        declarations.raw(&ir.vertex_layout.vertex_input_code());
        declarations.vertex_output(ir.key.texture, &ir.varyings);
        declarations.uniform_block(&ir.uniforms);

        let mut vertex = WgslWriter::new(1);
        for stmt in &ir.vertex_statements {
            vertex.stmt(stmt);
        }
        let mut fragment = WgslWriter::new(1);
        for stmt in &ir.fragment_statements {
            fragment.stmt(stmt);
        }

        let template = get_env().get_template(ir.key.base.as_str())?;
        let body = template.render(context! {
            ENABLE_LIGHT => ir.key.light,
            ENABLE_TEXTURE => ir.key.texture,
            declarations => declarations.finish(),
            vertex_statements => vertex.finish(),
            fragment_statements => fragment.finish(),
        })?;

        let code = format!("// === Generated program {} ===\n{body}", ir.key.name());
        log::trace!("generated program `{}`:\n{code}", ir.key.name());
        Ok(ShaderSource {
            key: ir.key,
            hash: xxh3_128(code.as_bytes()),
            code,
            vertex_layout: ir.vertex_layout.clone(),
            uniform_layout: ir.uniform_layout.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::variable_set::VariableDescriptor;
    use crate::scene::shape::BaseType;

    fn key(light: bool, texture: bool) -> ProgramKey {
        ProgramKey {
            base: BaseType::Basic,
            light,
            texture,
        }
    }

    #[test]
    fn reserved_names_are_not_redeclared() {
        let mut vars = VariableSet::new();
        vars.add(VariableDescriptor::attribute("a_Color", GlType::Vec4).unwrap());
        vars.add(VariableDescriptor::attribute("a_Shade", GlType::Float).unwrap());
        let ir = ShaderIr::build(key(false, false), &vars).unwrap();
        let generic: Vec<&str> = ir.vertex_layout.generic_attributes().map(|(n, _)| n).collect();
        assert_eq!(generic, vec!["a_Shade"]);
    }

    #[test]
    fn varying_reads_its_attribute() {
        let mut vars = VariableSet::new();
        vars.add(
            VariableDescriptor::varying("v_Glow", GlType::Vec4)
                .unwrap()
                .with_target("color"),
        );
        let ir = ShaderIr::build(key(false, false), &vars).unwrap();
        assert_eq!(
            ir.vertex_statements,
            vec![Stmt::Output {
                varying: "v_Glow".into(),
                value: Expr::VertexInput("a_Glow".into()),
            }]
        );
        let mut writer = WgslWriter::new(0);
        writer.stmt(&ir.fragment_statements[0]);
        assert_eq!(writer.finish(), "color = in.v_Glow;\n");
    }

    #[test]
    fn sampler_uniforms_are_rejected() {
        let mut vars = VariableSet::new();
        vars.add(VariableDescriptor::uniform("u_Extra", GlType::Sampler2D).unwrap());
        assert!(matches!(
            ShaderIr::build(key(false, false), &vars),
            Err(TesseraError::UnsupportedVariable { .. })
        ));
    }
}
