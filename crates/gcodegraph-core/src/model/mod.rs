//! Data model for toolpath graphs
//!
//! This module provides:
//! - Motion categories with their feed and extrusion policies
//! - The path graph: vertices (position + extrusion delta + category) and
//!   category-tagged edges, with adjacency for traversal
//! - Geometry primitives (3D points, edge lengths)

pub mod category;
pub mod graph;

pub use category::{CategoryPolicy, ExtrusionMode, MoveCategory};
pub use graph::{Edge, EdgeId, PathGraph, Point3, Vertex, VertexId};
