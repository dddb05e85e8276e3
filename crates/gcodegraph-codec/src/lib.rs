//! # GCodeGraph Codec
//!
//! The two halves of the G-code / toolpath-graph codec:
//! - Importer: streaming parser that reconstructs a connected path graph
//!   from an implicitly-ordered, stateful command stream
//! - Exporter: re-linearizes a graph back into an ordered command stream by
//!   depth-first traversal from the start vertex, recomputing feed rates,
//!   the absolute actuator counter, and slice boundaries
//!
//! The two directions share no runtime state; they communicate only through
//! the `PathGraph` model in `gcodegraph-core`.

pub mod boilerplate;
pub mod exporter;
pub mod importer;

pub use boilerplate::{POSTAMBLE, PREAMBLE};
pub use exporter::{export_to_file, export_to_string, export_to_writer, GcodeExporter};
pub use importer::{import_file, import_reader, import_str, GcodeImporter};
