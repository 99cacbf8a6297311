//! Geometry Tests
//!
//! Tests for:
//! - VerticesData deduplication and index stability
//! - Element mode validation and face winding
//! - Render data index runs (merging, degenerate joins, per-element runs)
//! - Shape builders (cube, polygon, ball, points)
//! - Texture coordinate assignment

use glam::Vec3;

use tessera::errors::TesseraError;
use tessera::resources::primitives::{BallOptions, CubeOptions, create_ball, create_cube, create_points_at, create_polygon};
use tessera::resources::{Element, IndexBuffer, IndexFormat, RenderData, RenderMode, Rgba, TextureCoord, Vertex, VerticesData};
use tessera::scene::{BaseType, Shape};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// VerticesData
// ============================================================================

#[test]
fn equal_values_share_one_slot() {
    let mut store = VerticesData::new();
    let a = Vertex::new([1.0, 2.0, 3.0], Rgba::RED);
    let b = Vertex::new([1.0, 2.0, 3.0], Rgba::RED);
    let c = Vertex::new([1.0, 2.0, 3.0], Rgba::WHITE);

    assert_eq!(store.add(&a), 0);
    assert_eq!(store.add(&b), 0);
    assert_eq!(store.add(&c), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.data().len(), 2 * 13);
    assert_eq!(store.reference_count(&a), 2);
}

#[test]
fn indices_never_move_when_the_store_grows() {
    let mut store = VerticesData::new();
    let first = Vertex::new([0.0, 0.0, 0.0], Rgba::WHITE);
    let index = store.add(&first);
    for i in 1..100 {
        store.add(&Vertex::new([i as f32, 0.0, 0.0], Rgba::WHITE));
    }
    assert_eq!(store.index_of(&first), Some(index));
    assert_eq!(store.len(), 100);
}

#[test]
fn negative_zero_is_the_same_vertex() {
    let mut store = VerticesData::new();
    let a = store.add(&Vertex::new([0.0, 1.0, 0.0], Rgba::WHITE));
    let b = store.add(&Vertex::new([-0.0, 1.0, 0.0], Rgba::WHITE));
    assert_eq!(a, b);
}

#[test]
fn wide_stores_need_wide_indices() {
    let indices: Vec<u32> = (0..300).collect();
    assert!(matches!(IndexBuffer::from_indices(&indices, 300).unwrap(), IndexBuffer::U16(_)));
    let small = IndexBuffer::from_indices(&[0, 1, 2], 3).unwrap();
    assert_eq!(small.len(), 3);
}

#[test]
fn index_width_switches_past_256_vertices() {
    fn add_up_to(store: &mut VerticesData, count: usize) {
        for i in store.len()..count {
            store.add(&Vertex::new([i as f32, 0.0, 0.0], Rgba::WHITE));
        }
    }

    let mut store = VerticesData::new();

    add_up_to(&mut store, 250);
    assert_eq!(store.index_format(), IndexFormat::U8);
    add_up_to(&mut store, 256);
    assert_eq!(store.index_format(), IndexFormat::U8);
    let last = IndexBuffer::from_indices(&[0, 255], store.len()).unwrap();
    assert_eq!(last, IndexBuffer::U8(vec![0, 255]));

    add_up_to(&mut store, 257);
    assert_eq!(store.index_format(), IndexFormat::U16);
    let wide = IndexBuffer::from_indices(&[0, 256], store.len()).unwrap();
    assert_eq!(wide.to_u32(), vec![0, 256]);
    assert_eq!(wide.format(), IndexFormat::U16);
}

// ============================================================================
// Elements
// ============================================================================

#[test]
fn lines_reject_triangle_modes() {
    let err = Element::lines()
        .mode(RenderMode::Triangles)
        .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
        .build()
        .unwrap_err();
    assert!(matches!(err, TesseraError::InvalidRenderMode { element: "lines", .. }));
}

#[test]
fn faces_need_three_vertices() {
    let err = Element::face()
        .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
        .build()
        .unwrap_err();
    assert!(matches!(err, TesseraError::InsufficientVertices(2)));
}

#[test]
fn quad_face_swaps_its_first_two_indices() {
    let mut store = VerticesData::new();
    let face = Element::face()
        .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]])
        .build()
        .unwrap();
    assert_eq!(face.mode(), RenderMode::TriangleStrip);
    assert_eq!(face.indices(&mut store), vec![1, 0, 2, 3]);

    let triangle = Element::face()
        .coords([[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]])
        .build()
        .unwrap();
    assert_eq!(triangle.mode(), RenderMode::Triangles);
    assert_eq!(triangle.indices(&mut store), vec![4, 5, 6]);
}

#[test]
fn bare_coordinates_take_the_element_colour() {
    let element = Element::lines()
        .color(Rgba::RED)
        .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
        .vertex(Vertex::new([2.0, 0.0, 0.0], Rgba::WHITE))
        .build()
        .unwrap();
    let colors: Vec<Rgba> = element.vertices().iter().map(Vertex::color).collect();
    assert_eq!(colors, vec![Rgba::RED, Rgba::RED, Rgba::WHITE]);
}

// ============================================================================
// Render data
// ============================================================================

#[test]
fn strip_elements_are_stitched_with_degenerate_joins() {
    let mut store = VerticesData::new();
    let a = Element::triangles()
        .mode(RenderMode::TriangleStrip)
        .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        .build()
        .unwrap();
    let b = Element::triangles()
        .mode(RenderMode::TriangleStrip)
        .coords([[5.0, 0.0, 0.0], [6.0, 0.0, 0.0], [5.0, 1.0, 0.0]])
        .build()
        .unwrap();
    let runs = RenderData::collect_indices([&a, &b], &mut store);
    assert_eq!(runs, vec![(RenderMode::TriangleStrip, vec![0, 1, 2, 2, 3, 3, 4, 5])]);
}

#[test]
fn fans_and_loops_keep_one_run_per_element() {
    let mut store = VerticesData::new();
    let fan = |x: f32| {
        Element::triangles()
            .mode(RenderMode::TriangleFan)
            .coords([[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]])
            .build()
            .unwrap()
    };
    let lines = Element::lines()
        .coords([[0.0, 5.0, 0.0], [1.0, 5.0, 0.0]])
        .build()
        .unwrap();
    let (f1, f2) = (fan(0.0), fan(10.0));
    let runs = RenderData::collect_indices([&f1, &lines, &f2], &mut store);
    let modes: Vec<RenderMode> = runs.iter().map(|(m, _)| *m).collect();
    assert_eq!(modes, vec![RenderMode::Lines, RenderMode::TriangleFan, RenderMode::TriangleFan]);
}

#[test]
fn empty_shape_has_nothing_to_draw() {
    let mut store = VerticesData::new();
    let mut shape = Shape::new("empty");
    let data = shape.render_data(&mut store);
    assert!(data.is_empty());
    assert_eq!(data.index_count(), 0);
}

// ============================================================================
// Builders
// ============================================================================

#[test]
fn cube_stores_24_vertices_and_draws_34_indices() {
    let mut store = VerticesData::new();
    let mut cube = create_cube(&CubeOptions::default()).unwrap();
    cube.register_vertices(&mut store);
    assert_eq!(store.len(), 24);

    let data = cube.render_data(&mut store);
    assert_eq!(data.indices.len(), 1);
    assert_eq!(data.indices[0].0, RenderMode::TriangleStrip);
    // 6 faces of 4 plus 5 joins of 2
    assert_eq!(data.index_count(), 34);
}

#[test]
fn two_cubes_at_the_same_place_share_storage() {
    let mut store = VerticesData::new();
    create_cube(&CubeOptions::default()).unwrap().register_vertices(&mut store);
    create_cube(&CubeOptions::default()).unwrap().register_vertices(&mut store);
    assert_eq!(store.len(), 24);
}

#[test]
fn cube_face_colours_override_the_base() {
    let mut options = CubeOptions::default();
    options.face_colors.top = Some(Rgba::RED);
    let cube = create_cube(&options).unwrap();
    let red = cube
        .elements()
        .iter()
        .filter(|e| e.vertices().iter().all(|v| v.color() == Rgba::RED))
        .count();
    assert_eq!(red, 1);
}

#[test]
fn polygon_is_one_fan() {
    let polygon = create_polygon(
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [-0.5, 0.5, 0.0]],
        Rgba::WHITE,
    )
    .unwrap();
    assert_eq!(polygon.elements().len(), 1);
    assert_eq!(polygon.elements()[0].mode(), RenderMode::TriangleFan);
}

#[test]
fn ball_normals_point_outwards() {
    let ball = create_ball(&BallOptions {
        radius: 2.0,
        u_segments: 8,
        v_segments: 6,
        ..BallOptions::default()
    })
    .unwrap();
    for vertex in ball.elements().iter().flat_map(|e| e.vertices()) {
        let position = vertex.coord().as_vec3();
        assert!(approx(position.length(), 2.0));
        let normal = vertex.normal().as_vec3();
        assert!(normal.dot(position) > 0.0 || position.length() < EPSILON);
    }
}

#[test]
fn points_use_the_point_family() {
    let points = create_points_at([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]], Rgba::WHITE, 4.0).unwrap();
    assert_eq!(points.base(), BaseType::Point);
    assert!(points.elements()[0].vertices().iter().all(|v| approx(v.size(), 4.0)));
}

// ============================================================================
// Texture coordinates
// ============================================================================

#[test]
fn texture_coords_follow_authoring_order() {
    let mut shape = create_polygon([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], Rgba::WHITE).unwrap();
    let coords = [TextureCoord::new(0.0, 0.0), TextureCoord::new(1.0, 0.0), TextureCoord::new(0.0, 1.0)];
    shape.set_texture_coords(&coords).unwrap();
    let assigned: Vec<TextureCoord> = shape.elements()[0].vertices().iter().map(Vertex::texture).collect();
    assert_eq!(assigned, coords);
}

#[test]
fn texture_coord_count_must_match() {
    let mut shape = create_polygon([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], Rgba::WHITE).unwrap();
    let err = shape.set_texture_coords(&[TextureCoord::new(0.0, 0.0)]).unwrap_err();
    assert!(matches!(err, TesseraError::TextureCoordMismatch { vertices: 3, coords: 1 }));
}

#[test]
fn shape_position_is_its_initial_translation() {
    let cube = create_cube(&CubeOptions {
        position: [1.0, 2.0, 3.0],
        ..CubeOptions::default()
    })
    .unwrap();
    assert_eq!(cube.transform().position, Vec3::new(1.0, 2.0, 3.0));
}
