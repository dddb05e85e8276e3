//! # GCodeGraph Core
//!
//! Core data model for gcodegraph: the toolpath graph, motion categories
//! with their extrusion policies, and the structured error types shared by
//! the importer and exporter.

pub mod error;
pub mod model;

pub use error::{Error, ExportError, GraphError, ImportError, Result};
pub use model::{
    CategoryPolicy, Edge, EdgeId, ExtrusionMode, MoveCategory, PathGraph, Point3, Vertex, VertexId,
};
