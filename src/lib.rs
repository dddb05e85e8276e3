//! # GCodeGraph
//!
//! A codec between extrusion G-code command streams and connected toolpath
//! graphs:
//! - Import reconstructs a path graph from a stateful, implicitly-ordered
//!   command stream, deriving extrusion deltas from the absolute actuator
//!   counter and slice boundaries from comment markers
//! - Export re-linearizes the graph by depth-first traversal from the start
//!   vertex, recomputing feed rates, the actuator counter, and slice
//!   boundaries purely from geometry and per-category policy
//!
//! ## Architecture
//!
//! GCodeGraph is organized as a workspace:
//!
//! 1. **gcodegraph-core** - Toolpath graph model, motion categories, errors
//! 2. **gcodegraph-codec** - The importer and exporter
//! 3. **gcodegraph** - Facade library and command-line binary

pub use gcodegraph_codec::{
    export_to_file, export_to_string, export_to_writer, import_file, import_reader, import_str,
    GcodeExporter, GcodeImporter, POSTAMBLE, PREAMBLE,
};

pub use gcodegraph_core::{
    CategoryPolicy, Edge, EdgeId, Error, ExportError, ExtrusionMode, GraphError, ImportError,
    MoveCategory, PathGraph, Point3, Result, Vertex, VertexId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output and RUST_LOG environment
/// variable support.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
