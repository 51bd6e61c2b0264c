//! # raykd
//!
//! `raykd` is a k-d tree over static triangle soups for CPU ray tracing, designed to be
//! used from Rust as well as compiled to WebAssembly (WASM). It is meant for offline work
//! such as path tracing or light baking, where a scene is built once and then queried
//! with a large number of rays.
//!
//! ## Features
//!
//! - **Cost-driven splits**: split planes are chosen with a surface-area cost estimated from
//!   sorted arrays of triangle corners, without classifying every triangle against every plane.
//! - **Flat layout**: nodes, node bounds, leaf contents and per-triangle intersection data
//!   live in contiguous arrays addressed by `u32` indices.
//! - **Allocation-free traversal**: closest-hit queries walk the tree front to back with a
//!   fixed-capacity stack on the call frame; a built tree can be shared between threads.
//! - **WASM-ready**: `wasm-bindgen` wrappers for use from JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use raykd::{KdTree, Ray, Triangle};
//!
//! let triangles = vec![Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])];
//! let mut tree = KdTree::new();
//! tree.build(&triangles, 16);
//!
//! let hit = tree.traverse(&Ray::new([0.25, 0.25, 1.0], [0.0, 0.0, -1.0]));
//! assert_eq!(hit.triangle_index, Some(0));
//! ```
//!
//! See the `demos/` directory for rendering a depth image of a glTF mesh.

mod error;
pub mod geometry;
mod kdtree;
mod ray;
pub mod wasm;

pub use error::GeometryError;
pub use geometry::BoundingBox;
pub use geometry::IntersectionData;
pub use geometry::Triangle;
pub use geometry::random_triangles;
pub use geometry::triangles_from_flat;
pub use kdtree::BuildConfig;
pub use kdtree::KdTree;
pub use kdtree::Node;
pub use kdtree::Statistics;
pub use kdtree::TraverseResult;
pub use kdtree::DEPTH_LIMIT;
pub use kdtree::DETERMINANT_EPSILON;
pub use kdtree::EPSILON;
pub use kdtree::INVALID_AXIS;
pub use kdtree::INVALID_INDEX;
pub use kdtree::MIN_TRIANGLES_TO_SUBDIVIDE;
pub use ray::Ray;
