pub mod basic;
pub mod ball;
pub mod cube;
pub mod grid;
pub mod polygon;

pub use ball::{BallOptions, create_ball};
pub use basic::{create_lines, create_points, create_points_at, create_triangles};
pub use cube::{CubeAnchor, CubeOptions, FaceColors, create_cube};
pub use grid::{GridOptions, create_grid};
pub use polygon::create_polygon;
