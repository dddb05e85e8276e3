//! Error handling for gcodegraph
//!
//! Provides structured error types for the two halves of the codec:
//! - Graph errors (model construction violations)
//! - Import errors (command stream parsing)
//! - Export errors (graph re-linearization)
//!
//! All error types use `thiserror` for ergonomic error handling. Both codec
//! directions fail fast: a failed file is abandoned in full, with no partial
//! graph kept and no partial output left behind.

use thiserror::Error;

use crate::model::VertexId;

/// Graph construction error
///
/// Raised by `PathGraph` mutation when an operation would violate the
/// structural invariants of a toolpath graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge's two endpoints must be distinct vertices
    #[error("Edge endpoints must be distinct (both were {vertex})")]
    SelfLoop {
        /// The vertex that appeared at both ends.
        vertex: VertexId,
    },

    /// An edge referenced a vertex that does not exist
    #[error("Unknown vertex {vertex}")]
    UnknownVertex {
        /// The id that was out of range.
        vertex: VertexId,
    },
}

/// Import error type
///
/// Represents fatal conditions while parsing a G-code command stream.
/// Position and extrusion state would silently corrupt past a bad token,
/// so parsing never recovers: the first error abandons the file.
#[derive(Error, Debug)]
pub enum ImportError {
    /// A coordinate or actuator token failed numeric parsing
    #[error("Invalid numeric token '{token}' at line {line_number}: {reason}")]
    InvalidNumber {
        /// The line number where the bad token was found.
        line_number: u32,
        /// The offending token text.
        token: String,
        /// Why the token failed to parse.
        reason: String,
    },

    /// A token matched neither the axis grammar nor a trailing category word
    #[error("Unexpected token '{token}' at line {line_number}")]
    UnexpectedToken {
        /// The line number where the token was found.
        line_number: u32,
        /// The offending token text.
        token: String,
    },

    /// A trailing annotation word named no known motion category
    #[error("Unknown move category '{word}' at line {line_number}")]
    UnknownCategory {
        /// The line number where the word was found.
        line_number: u32,
        /// The unrecognized category word.
        word: String,
    },

    /// A slice marker comment carried a malformed index
    #[error("Invalid slice marker at line {line_number}: '{text}'")]
    InvalidSliceMarker {
        /// The line number of the marker.
        line_number: u32,
        /// The marker text that failed to parse.
        text: String,
    },

    /// A second command was annotated as the start position
    #[error("Duplicate start position at line {line_number}; a toolpath has exactly one")]
    DuplicateStart {
        /// The line number of the second start annotation.
        line_number: u32,
    },

    /// Graph construction failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// I/O error while reading the stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export error type
///
/// Represents fatal conditions while re-linearizing a toolpath graph into a
/// command stream. All preconditions are checked before any output is
/// written; traversal defects abort the export with no destination file.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The graph has no vertices at all
    #[error("Nothing to export: graph has no vertices")]
    NothingToExport,

    /// No vertex carries the start-position category
    #[error("No start position vertex in graph")]
    NoStartPosition,

    /// Traversal reached an already-visited vertex through a second edge
    #[error("Cycle detected at vertex {vertex}; toolpath must be acyclic")]
    CyclicPath {
        /// The vertex reached twice.
        vertex: VertexId,
    },

    /// Some edges were unreachable from the start vertex
    #[error("{unreached} edge(s) unreachable from the start position")]
    Disconnected {
        /// How many edges the traversal never touched.
        unreached: usize,
    },

    /// I/O error while writing the stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for gcodegraph
///
/// A unified error type that can represent any error from either codec
/// direction. This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Import error
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Graph construction error
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl Error {
    /// Check if this is an import error
    pub fn is_import_error(&self) -> bool {
        matches!(self, Error::Import(_))
    }

    /// Check if this is an export error
    pub fn is_export_error(&self) -> bool {
        matches!(self, Error::Export(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
