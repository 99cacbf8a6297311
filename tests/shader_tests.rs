//! Shader Generation Tests
//!
//! Tests for:
//! - Program names per feature combination
//! - Deterministic output (same inputs, same hash)
//! - Feature blocks and generic variables in the generated WGSL
//! - Generated WGSL parses and validates for every program key

use tessera::errors::TesseraError;
use tessera::renderer::ProgramKey;
use tessera::renderer::pipeline::ShaderGenerator;
use tessera::resources::variable_set::{GlType, VariableDescriptor, VariableSet};
use tessera::scene::BaseType;

fn shade_variables() -> VariableSet {
    let mut vars = VariableSet::new();
    vars.add(VariableDescriptor::attribute("a_Shade", GlType::Float).unwrap());
    vars.add(
        VariableDescriptor::uniform("u_Tint", GlType::Vec4)
            .unwrap()
            .with_target("color"),
    );
    vars
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn program_names_list_their_features() {
    let names: Vec<String> = [
        ProgramKey::new(BaseType::Basic, false, false),
        ProgramKey::new(BaseType::Basic, true, false),
        ProgramKey::new(BaseType::Basic, true, true),
        ProgramKey::new(BaseType::Point, false, true),
    ]
    .iter()
    .map(ProgramKey::name)
    .collect();
    assert_eq!(names, vec!["basic", "basic-light", "basic-light-texture", "point-texture"]);
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn generation_is_deterministic() {
    let key = ProgramKey::new(BaseType::Basic, true, false);
    let a = ShaderGenerator::generate(key, &shade_variables()).unwrap();
    let b = ShaderGenerator::generate(key, &shade_variables()).unwrap();
    assert_eq!(a.hash, b.hash);
    assert_eq!(a.code, b.code);

    let other = ShaderGenerator::generate(key, &VariableSet::new()).unwrap();
    assert_ne!(a.hash, other.hash);
}

#[test]
fn feature_blocks_follow_the_key() {
    let plain = ShaderGenerator::generate(ProgramKey::new(BaseType::Basic, false, false), &VariableSet::new()).unwrap();
    assert!(plain.code.starts_with("// === Generated program basic ==="));
    assert!(!plain.code.contains("textureSample"));
    assert!(!plain.code.contains("diffuse ="));

    let full = ShaderGenerator::generate(ProgramKey::new(BaseType::Basic, true, true), &VariableSet::new()).unwrap();
    assert_eq!(full.name(), "basic-light-texture");
    assert!(full.code.contains("textureSample"));
    assert!(full.code.contains("let diffuse"));
}

#[test]
fn generic_variables_reach_the_source() {
    let key = ProgramKey::new(BaseType::Basic, false, false);
    let source = ShaderGenerator::generate(key, &shade_variables()).unwrap();

    assert!(source.code.contains("a_Shade"));
    assert!(source.code.contains("struct ShapeUniforms"));
    assert!(source.code.contains("color = shape.u_Tint;"));

    let generic: Vec<&str> = source.vertex_layout.generic_attributes().map(|(n, _)| n).collect();
    assert_eq!(generic, vec!["a_Shade"]);
    assert_eq!(source.uniform_layout.size(), 16);
}

#[test]
fn reserved_variables_add_nothing() {
    let key = ProgramKey::new(BaseType::Basic, false, false);
    let mut vars = VariableSet::new();
    vars.add(VariableDescriptor::attribute("a_Position", GlType::Vec3).unwrap());
    vars.add(VariableDescriptor::varying("v_Color", GlType::Vec4).unwrap());

    let source = ShaderGenerator::generate(key, &vars).unwrap();
    let bare = ShaderGenerator::generate(key, &VariableSet::new()).unwrap();
    assert_eq!(source.hash, bare.hash);
    assert!(source.uniform_layout.is_empty());
}

// ============================================================================
// Validity
// ============================================================================

fn all_keys() -> Vec<ProgramKey> {
    let mut keys = Vec::new();
    for base in [BaseType::Basic, BaseType::Point] {
        for light in [false, true] {
            for texture in [false, true] {
                keys.push(ProgramKey::new(base, light, texture));
            }
        }
    }
    keys
}

fn variable_sets() -> Vec<(&'static str, VariableSet)> {
    let mut varying = VariableSet::new();
    varying.add(
        VariableDescriptor::varying("v_Glow", GlType::Vec4)
            .unwrap()
            .with_target("color"),
    );
    varying.add(VariableDescriptor::varying("v_Weight", GlType::Float).unwrap());

    let mut attribute = VariableSet::new();
    attribute.add(
        VariableDescriptor::attribute("a_Offset", GlType::Vec4)
            .unwrap()
            .with_target("position"),
    );
    attribute.add(VariableDescriptor::attribute("a_Flag", GlType::Bool).unwrap());

    let mut mixed = shade_variables();
    mixed.merge(&varying);
    mixed.add(VariableDescriptor::uniform("u_Model", GlType::Mat4).unwrap());

    vec![
        ("none", VariableSet::new()),
        ("varyings", varying),
        ("attributes", attribute),
        ("uniforms", shade_variables()),
        ("mixed", mixed),
    ]
}

fn validate(code: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(code).map_err(|e| e.emit_to_string(code))?;
    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .map_err(|e| format!("{e:?}"))?;
    Ok(())
}

#[test]
fn every_program_validates() {
    for key in all_keys() {
        for (label, vars) in variable_sets() {
            let source = ShaderGenerator::generate(key, &vars).unwrap();
            if let Err(e) = validate(&source.code) {
                panic!("`{}` with {label} variables is invalid:\n{e}\n{}", key.name(), source.code);
            }
        }
    }
}

#[test]
fn matrices_cannot_travel_between_stages() {
    let key = ProgramKey::new(BaseType::Basic, false, false);
    for descriptor in [
        VariableDescriptor::attribute("a_Bones", GlType::Mat4).unwrap(),
        VariableDescriptor::varying("v_Bones", GlType::Mat4).unwrap(),
    ] {
        let mut vars = VariableSet::new();
        vars.add(descriptor);
        assert!(matches!(
            ShaderGenerator::generate(key, &vars),
            Err(TesseraError::UnsupportedVariable { .. })
        ));
    }
}
