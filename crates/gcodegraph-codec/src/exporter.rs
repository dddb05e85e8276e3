//! Path-graph exporter
//!
//! Re-linearizes a `PathGraph` into an ordered command stream. The graph
//! stores no traversal order, so the exporter walks depth-first from the
//! unique start vertex, marking edges as it goes. Feed rates, the absolute
//! actuator counter, and slice boundaries are all reconstructed from
//! per-category policy and geometry; stored per-vertex extrusion deltas are
//! never consulted.
//!
//! The walk uses an explicit stack, so path length is bounded by memory
//! rather than recursion depth, and output is written incrementally to the
//! destination writer. Well-formedness (acyclic, start-reachable) is a
//! precondition; violations abort the export with no output finalized.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use gcodegraph_core::{EdgeId, ExportError, ExtrusionMode, MoveCategory, PathGraph, VertexId};

use crate::boilerplate::{POSTAMBLE, PREAMBLE};

/// Fixed slice thickness written in every slice header
pub const SLICE_THICKNESS: f64 = 0.2;

/// Fixed extrusion width written in every slice header
pub const SLICE_WIDTH: f64 = 0.4;

/// The first anchor of an export primes the extruder with this fixed amount
/// instead of its per-length extrusion
const FIRST_ANCHOR_EXTRUSION: f64 = 5.0;

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Slice counter reconstructed from geometry
///
/// Advances whenever a commanded Z strictly exceeds the running maximum.
/// The preamble carries slice 0, so the counter starts there.
#[derive(Debug, Clone)]
struct SliceTracker {
    index: u32,
    max_z: f64,
}

impl SliceTracker {
    fn new() -> Self {
        Self {
            index: 0,
            max_z: 0.0,
        }
    }

    /// Advance past `z`, returning the new slice index when a boundary opens
    fn advance(&mut self, z: f64) -> Option<u32> {
        if z > self.max_z {
            self.index += 1;
            self.max_z = z;
            Some(self.index)
        } else {
            None
        }
    }
}

/// Single-use exporter for one graph and one destination writer
///
/// Use the [`export_to_string`] / [`export_to_writer`] / [`export_to_file`]
/// entry points unless the writer needs to be recovered afterwards.
pub struct GcodeExporter<'g, W: Write> {
    graph: &'g PathGraph,
    out: W,
    /// Running absolute actuator counter (A word)
    actuator: f64,
    /// Whether the one-time first-anchor bonus has been spent
    anchored: bool,
    slice: SliceTracker,
    /// Last emitted progress percentage
    percent: usize,
    visited_edges: usize,
}

impl<'g, W: Write> GcodeExporter<'g, W> {
    /// Create an exporter writing to `out`
    pub fn new(graph: &'g PathGraph, out: W) -> Self {
        Self {
            graph,
            out,
            actuator: 0.0,
            anchored: false,
            slice: SliceTracker::new(),
            percent: 0,
            visited_edges: 0,
        }
    }

    /// Run the export, returning the writer on success
    pub fn run(mut self) -> Result<W, ExportError> {
        if self.graph.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let start = self
            .graph
            .start_vertex()
            .ok_or(ExportError::NoStartPosition)?;

        self.out.write_all(PREAMBLE.as_bytes())?;
        self.emit_vertex(start, None)?;
        self.walk(start)?;

        let unreached = self.graph.edge_count() - self.visited_edges;
        if unreached > 0 {
            return Err(ExportError::Disconnected { unreached });
        }

        self.out.write_all(POSTAMBLE.as_bytes())?;
        self.out.flush()?;
        info!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            slices = self.slice.index,
            "export complete"
        );
        Ok(self.out)
    }

    /// Depth-first walk over every edge reachable from `start`
    ///
    /// Edges are marked visited on first touch and each vertex may be
    /// reached only once; a second arrival means the graph has a cycle.
    fn walk(&mut self, start: VertexId) -> Result<(), ExportError> {
        let mut visited_edge = vec![false; self.graph.edge_count()];
        let mut visited_vertex = vec![false; self.graph.vertex_count()];
        visited_vertex[start.0 as usize] = true;

        let mut stack = vec![start];
        while let Some(&vertex) = stack.last() {
            let next = self
                .graph
                .edges_at(vertex)
                .iter()
                .copied()
                .find(|e| !visited_edge[e.0 as usize]);
            match next {
                Some(edge) => {
                    visited_edge[edge.0 as usize] = true;
                    let e = &self.graph[edge];
                    let far = if e.from == vertex { e.to } else { e.from };
                    if visited_vertex[far.0 as usize] {
                        return Err(ExportError::CyclicPath { vertex: far });
                    }
                    visited_vertex[far.0 as usize] = true;
                    self.visited_edges += 1;
                    self.emit_vertex(far, Some(edge))?;
                    stack.push(far);
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Emit the command line for one vertex, reached via `via` (absent only
    /// for the start vertex)
    fn emit_vertex(&mut self, id: VertexId, via: Option<EdgeId>) -> Result<(), ExportError> {
        let vertex = self.graph[id];
        let mut line = String::new();

        // Progress annotation for the machine's front panel
        let total = self.graph.edge_count();
        if total > 0 {
            let pct = self.visited_edges * 100 / total;
            if pct > self.percent {
                self.percent = pct;
                line.push_str(&format!("M73 P{pct};\n"));
            }
        }

        // A commanded Z strictly above the running maximum opens a new slice
        let z = round3(vertex.position.z);
        if let Some(index) = self.slice.advance(z) {
            debug!(slice = index, z, "slice boundary");
            line.push_str(&format!(
                "; Slice {index}\n; Position {z}\n; Thickness {SLICE_THICKNESS}\n; Width {SLICE_WIDTH}\n"
            ));
        }

        line.push_str(&format!(
            "G1 X{:.3} Y{:.3} Z{:.3}",
            vertex.position.x, vertex.position.y, vertex.position.z
        ));

        let policy = vertex.category.policy();
        line.push_str(&format!(" F{:.3}", policy.feed_rate));

        if vertex.category == MoveCategory::Anchor && !self.anchored {
            self.actuator += FIRST_ANCHOR_EXTRUSION;
            self.anchored = true;
        } else {
            match policy.mode {
                ExtrusionMode::Set => self.actuator += policy.extrusion_rate,
                ExtrusionMode::PerLength => {
                    let length = via.map(|e| self.graph.edge_length(e)).unwrap_or(0.0);
                    self.actuator += policy.extrusion_rate * length;
                }
            }
        }
        line.push_str(&format!(
            " A{:.3}; {}\n",
            round3(self.actuator),
            vertex.category.label()
        ));

        self.out.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Export a graph into any writer
pub fn export_to_writer<W: Write>(graph: &PathGraph, out: W) -> Result<(), ExportError> {
    GcodeExporter::new(graph, out).run().map(|_| ())
}

/// Export a graph into an in-memory string
pub fn export_to_string(graph: &PathGraph) -> Result<String, ExportError> {
    let buf = GcodeExporter::new(graph, Vec::new()).run()?;
    // Output is plain ASCII
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Export a graph to a file
///
/// Writes to a temporary file in the destination directory and persists it
/// only when the whole export succeeds, so a failed export never leaves a
/// truncated file that looks importable.
pub fn export_to_file(graph: &PathGraph, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    GcodeExporter::new(graph, BufWriter::new(tmp.as_file())).run()?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    info!(path = %path.display(), "export written");
    Ok(())
}
