//! The toolpath graph
//!
//! Vertices record commanded positions with the extrusion delta that
//! produced them; edges connect vertices that were adjacent in the original
//! command order. Edges are stored undirected (adjacency on both endpoints);
//! the exporter recovers the direction by traversal from the start vertex.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GraphError;
use crate::model::MoveCategory;

/// Point in 3D space, in machine units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point3 {
    /// Create a point with the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite(),
            "Point3 axes must be finite: x={x}, y={y}, z={z}"
        );
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Opaque vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One commanded position
///
/// `extrusion` is the delta of the extrusion axis relative to the previous
/// command, never the absolute actuator reading. Exactly one category per
/// vertex, enforced by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Commanded position
    pub position: Point3,
    /// Extrusion-axis delta relative to the previous command
    pub extrusion: f64,
    /// The motion category that produced this vertex
    pub category: MoveCategory,
}

/// A connecting move between two vertices adjacent in command order
///
/// `from`/`to` record creation order; storage is treated as undirected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// The earlier vertex in command order
    pub from: VertexId,
    /// The later vertex in command order
    pub to: VertexId,
    /// Category copied from the destination vertex at creation time
    pub category: MoveCategory,
}

/// The vertex/edge structure recording visited positions and connecting moves
///
/// Built once by the importer, consumed once by the exporter. Vertices are
/// never deleted; memory is O(vertices + edges).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// vertex index → incident edge ids, in creation order
    adjacency: Vec<Vec<EdgeId>>,
}

impl PathGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex, returning its id
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(vertex);
        self.adjacency.push(Vec::new());
        id
    }

    /// Add an edge between two existing, distinct vertices
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        category: MoveCategory,
    ) -> Result<EdgeId, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop { vertex: from });
        }
        for v in [from, to] {
            if v.0 as usize >= self.vertices.len() {
                return Err(GraphError::UnknownVertex { vertex: v });
            }
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { from, to, category });
        self.adjacency[from.0 as usize].push(id);
        self.adjacency[to.0 as usize].push(id);
        Ok(id)
    }

    /// Look up a vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0 as usize)
    }

    /// Look up an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    /// Edges incident to a vertex, in creation order
    pub fn edges_at(&self, id: VertexId) -> &[EdgeId] {
        self.adjacency
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The endpoint of `edge` that is not `vertex`
    pub fn other_end(&self, edge: EdgeId, vertex: VertexId) -> Option<VertexId> {
        let e = self.edge(edge)?;
        if e.from == vertex {
            Some(e.to)
        } else if e.to == vertex {
            Some(e.from)
        } else {
            None
        }
    }

    /// Euclidean length of an edge
    pub fn edge_length(&self, id: EdgeId) -> f64 {
        match self.edge(id) {
            Some(e) => {
                let a = self.vertices[e.from.0 as usize].position;
                let b = self.vertices[e.to.0 as usize].position;
                a.distance_to(&b)
            }
            None => 0.0,
        }
    }

    /// Iterate over all vertices with their ids
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    /// Iterate over all edges with their ids
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Find the unique start vertex (category `MoveToStart`)
    ///
    /// The importer rejects a second start annotation at parse time, so a
    /// well-formed graph has at most one.
    pub fn start_vertex(&self) -> Option<VertexId> {
        self.vertices()
            .find(|(_, v)| v.category == MoveCategory::MoveToStart)
            .map(|(id, _)| id)
    }
}

impl std::ops::Index<VertexId> for PathGraph {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0 as usize]
    }
}

impl std::ops::Index<EdgeId> for PathGraph {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0 as usize]
    }
}
