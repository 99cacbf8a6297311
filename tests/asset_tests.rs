//! Asset Tests
//!
//! Tests for:
//! - Loading obj documents through an in-memory reader
//! - Material libraries resolved relative to the obj document
//! - Textures named by materials flowing into the scene

mod common;

use image::RgbaImage;

use common::{Call, RecordingContext};
use tessera::assets::{MemoryAssetReader, load_obj};
use tessera::config::SceneConfig;
use tessera::errors::TesseraError;
use tessera::resources::{DEFAULT_FACE_COLOR, RenderMode, Rgba};
use tessera::scene::{Scene, SceneEvent};

const QUAD_OBJ: &str = "\
# two triangles sharing an edge
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
";

const TEXTURED_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl wood
f 1/1 2/2 3/3
f 1/1 3/3 4/4
";

const QUAD_MTL: &str = "\
newmtl wood
Kd 0.8 0.6 0.4
map_Kd textures/wood.png
";

fn png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(2, 2, image::Rgba([200, 150, 100, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

fn scene() -> Scene {
    Scene::new(&SceneConfig::new("assets", 10.0, 10.0, 10.0)).unwrap()
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn quad_obj_becomes_one_shape_with_shared_corners() {
    let reader = MemoryAssetReader::new().with("quad.obj", QUAD_OBJ);
    let shapes = pollster::block_on(load_obj(&reader, "quad.obj")).unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].id(), "default");
    assert_eq!(shapes[0].elements().len(), 2);
    assert_eq!(shapes[0].color(), DEFAULT_FACE_COLOR);

    let mut scene = scene();
    let mut ctx = RecordingContext::new();
    for shape in shapes {
        scene.add_shape(shape);
    }
    assert_eq!(scene.vertices().len(), 4);

    pollster::block_on(scene.link(&mut ctx));
    scene.render(&mut ctx).unwrap();
    let indices: Vec<Vec<u32>> = ctx
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::CreateIndexBuffer { mode: RenderMode::Triangles, indices } => Some(indices.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![vec![0, 1, 2, 0, 2, 3]]);
    assert_eq!(ctx.draws(), vec![(RenderMode::Triangles, 6)]);
}

#[test]
fn bad_face_reports_its_line() {
    let reader = MemoryAssetReader::new().with("broken.obj", "v 0 0 0\nv 1 0 0\n\nf 1 2 7\n");
    let err = pollster::block_on(load_obj(&reader, "broken.obj")).unwrap_err();
    assert!(matches!(err, TesseraError::Parse { line: 4, .. }));
}

#[test]
fn missing_material_library_fails_the_load() {
    let reader = MemoryAssetReader::new().with("models/quad.obj", TEXTURED_OBJ);
    let err = pollster::block_on(load_obj(&reader, "models/quad.obj")).unwrap_err();
    assert!(matches!(err, TesseraError::AssetNotFound(url) if url.contains("models/quad.mtl")));
}

// ============================================================================
// Materials and textures
// ============================================================================

#[test]
fn material_colour_and_texture_reach_the_shape() {
    let reader = MemoryAssetReader::new()
        .with("models/quad.obj", TEXTURED_OBJ)
        .with("models/quad.mtl", QUAD_MTL);
    let shapes = pollster::block_on(load_obj(&reader, "models/quad.obj")).unwrap();
    let quad = &shapes[0];

    assert_eq!(quad.id(), "quad");
    assert!(quad.has_texture());
    assert_eq!(quad.texture(), Some("models/textures/wood.png"));
    let material = quad.material().unwrap();
    assert_eq!(material.name, "wood");
    assert_eq!(material.diffuse_map.as_ref().unwrap().unit, 0);

    let colors: Vec<Rgba> = quad
        .elements()
        .iter()
        .flat_map(|e| e.vertices().iter().map(|v| v.color()))
        .collect();
    assert!(colors.iter().all(|c| *c == Rgba::rgb(0.8, 0.6, 0.4)));
    let corner = quad.elements()[0].vertices()[1].texture();
    assert_eq!((corner.s(), corner.t()), (1.0, 0.0));
}

#[test]
fn textured_obj_renders_with_its_image() {
    let reader = MemoryAssetReader::new()
        .with("models/quad.obj", TEXTURED_OBJ)
        .with("models/quad.mtl", QUAD_MTL)
        .with("models/textures/wood.png", png());
    let mut scene = scene();
    let events = scene.event_channel();
    let mut ctx = RecordingContext::new();

    for shape in pollster::block_on(load_obj(&reader, "models/quad.obj")).unwrap() {
        scene.add_shape(shape);
    }
    assert_eq!(scene.pending_textures(), vec!["models/textures/wood.png".to_string()]);
    assert_eq!(pollster::block_on(scene.load_textures(&reader)), 1);
    assert!(
        events
            .try_iter()
            .any(|e| e == SceneEvent::TextureLoaded("models/textures/wood.png".into()))
    );

    let summary = pollster::block_on(scene.link(&mut ctx));
    assert_eq!(summary.linked.len(), 1);
    assert_eq!(summary.linked[0].name(), "basic-texture");

    ctx.take();
    let stats = scene.render(&mut ctx).unwrap();
    assert_eq!(stats.shapes_drawn, 1);
    assert!(ctx.calls.contains(&Call::CreateTexture("models/textures/wood.png".into())));
    assert!(ctx.calls.contains(&Call::BindTexture("models/textures/wood.png".into())));
}
