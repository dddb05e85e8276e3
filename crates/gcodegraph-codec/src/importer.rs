//! Streaming G-code importer
//!
//! Reconstructs a `PathGraph` from a line-oriented command stream. The
//! stream is implicitly ordered and stateful: omitted axis words mean
//! "unchanged", the extrusion axis is an absolute counter whose deltas we
//! derive, and slice boundaries arrive as comment markers. Nothing before
//! the first slice marker is interpreted.
//!
//! Parsing fails fast: a malformed numeric token would silently corrupt
//! position and extrusion state, so the first bad token abandons the file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use gcodegraph_core::{ImportError, MoveCategory, PathGraph, Point3, Vertex, VertexId};

/// Comment prefix that marks a slice boundary and enables recording mode
pub const SLICE_MARKER: &str = "; Slice";

/// Instruction prefix of an interpreted motion command
const MOVE_PREFIX: &str = "G1 ";

fn slice_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^; Slice\s+(-?\d+)\s*$").expect("invalid regex pattern"))
}

/// Modal parser state carried across command lines
///
/// Coordinates persist until overwritten; the extrusion delta persists
/// across lines that carry no actuator word.
#[derive(Debug, Clone, Default)]
struct ParserState {
    x: f64,
    y: f64,
    z: f64,
    /// Extrusion delta derived from the most recent actuator word
    extrusion: f64,
    /// Last absolute actuator reading, unset until the first `A` word
    prev_actuator: Option<f64>,
    /// Vertex created by the previous qualifying line
    prev_vertex: Option<VertexId>,
    /// Current slice index; `None` until the first slice marker
    slice: Option<i32>,
    /// Set once an end-of-print command has been recorded
    done: bool,
}

/// Incremental importer that consumes one line at a time
///
/// Use the [`import_str`] / [`import_reader`] / [`import_file`] entry points
/// unless lines arrive from somewhere unusual.
#[derive(Debug, Default)]
pub struct GcodeImporter {
    state: ParserState,
    graph: PathGraph,
    line_number: u32,
}

impl GcodeImporter {
    /// Create an importer with an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an end-of-print command has been seen
    ///
    /// Further lines are ignored once this returns true; streaming callers
    /// can stop reading.
    pub fn is_finished(&self) -> bool {
        self.state.done
    }

    /// Consume the importer and return the graph built so far
    pub fn finish(self) -> PathGraph {
        info!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            lines = self.line_number,
            "import complete"
        );
        self.graph
    }

    /// Process one line of the command stream
    pub fn feed_line(&mut self, raw: &str) -> Result<(), ImportError> {
        self.line_number += 1;
        if self.state.done {
            return Ok(());
        }
        let line = raw.trim_end();

        if line.starts_with(SLICE_MARKER) {
            let index = slice_marker_regex()
                .captures(line)
                .and_then(|caps| caps[1].parse::<i32>().ok())
                .ok_or_else(|| ImportError::InvalidSliceMarker {
                    line_number: self.line_number,
                    text: line.to_string(),
                })?;
            self.state.slice = Some(index);
            debug!(slice = index, line = self.line_number, "slice marker");
            return Ok(());
        }

        // Everything before the first slice marker is preamble, and inside
        // recording mode only motion commands are interpreted.
        if self.state.slice.is_none() || !line.starts_with(MOVE_PREFIX) {
            return Ok(());
        }

        self.process_move(line)
    }

    /// Interpret one motion command line
    fn process_move(&mut self, line: &str) -> Result<(), ImportError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut category_word: Option<&str> = None;
        let mut in_comment = false;

        for (i, &token) in tokens.iter().enumerate().skip(1) {
            let is_last = i == tokens.len() - 1;

            if in_comment {
                // Inside a trailing comment only the final word matters: the
                // multi-word labels resolve through their last word.
                category_word = Some(token);
                continue;
            }

            // A trailing category word wins over axis classification; the
            // vocabulary is closed, so membership decides ("Anchor" is a
            // category, "A0.5" is an actuator reading).
            if is_last && MoveCategory::from_word(token).is_some() {
                category_word = Some(token);
                continue;
            }

            match token.as_bytes().first() {
                Some(b'X') => self.state.x = self.axis_value(token)?,
                Some(b'Y') => self.state.y = self.axis_value(token)?,
                Some(b'Z') => self.state.z = self.axis_value(token)?,
                Some(b'A') => {
                    let reading = self.axis_value(token)?;
                    self.state.extrusion = match self.state.prev_actuator {
                        Some(prev) => reading - prev,
                        None => 0.0,
                    };
                    self.state.prev_actuator = Some(reading);
                }
                Some(b'F') => {
                    // Feed rates are reconstructed from category policy on
                    // export; the stream value is validated and dropped.
                    self.axis_value(token)?;
                }
                _ if is_last => category_word = Some(token),
                _ => {
                    return Err(ImportError::UnexpectedToken {
                        line_number: self.line_number,
                        token: token.to_string(),
                    });
                }
            }

            if token.contains(';') {
                in_comment = true;
            }
        }

        // Only annotated commands contribute a vertex; bare ones update the
        // modal state silently.
        let Some(word) = category_word else {
            return Ok(());
        };
        let category =
            MoveCategory::from_word(word).ok_or_else(|| ImportError::UnknownCategory {
                line_number: self.line_number,
                word: word.to_string(),
            })?;

        if category == MoveCategory::MoveToStart && self.graph.start_vertex().is_some() {
            return Err(ImportError::DuplicateStart {
                line_number: self.line_number,
            });
        }

        let vertex = self.graph.add_vertex(Vertex {
            position: Point3::new(self.state.x, self.state.y, self.state.z),
            extrusion: self.state.extrusion,
            category,
        });
        if let Some(prev) = self.state.prev_vertex {
            self.graph.add_edge(prev, vertex, category)?;
        }
        self.state.prev_vertex = Some(vertex);

        if category == MoveCategory::EndOfPrint {
            debug!(line = self.line_number, "end of print");
            self.state.done = true;
        }
        Ok(())
    }

    /// Parse the numeric body of an axis token, discarding any inline
    /// comment introduced by `;`
    fn axis_value(&self, token: &str) -> Result<f64, ImportError> {
        let body = &token[1..];
        let body = body.split_once(';').map_or(body, |(head, _)| head);
        body.parse::<f64>()
            .map_err(|e| ImportError::InvalidNumber {
                line_number: self.line_number,
                token: token.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Import a command stream from any buffered reader
///
/// Reading stops at the end-of-print command; later lines are never pulled
/// from the reader.
pub fn import_reader<R: BufRead>(mut reader: R) -> Result<PathGraph, ImportError> {
    let mut importer = GcodeImporter::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        importer.feed_line(&buf)?;
        if importer.is_finished() {
            break;
        }
    }
    Ok(importer.finish())
}

/// Import a command stream held in memory
pub fn import_str(input: &str) -> Result<PathGraph, ImportError> {
    import_reader(input.as_bytes())
}

/// Import a command stream from a file
pub fn import_file(path: impl AsRef<Path>) -> Result<PathGraph, ImportError> {
    let path = path.as_ref();
    info!(path = %path.display(), "importing G-code file");
    let file = File::open(path)?;
    import_reader(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_vertex_scenario() {
        let input = "; Slice 0\n\
                     G1 X0 Y0 Z0 A0.0 position\n\
                     G1 X1 Y0 Z0 A0.5 Outline\n\
                     G1 X1 Y0 Z0 A1.0 print\n\
                     G1 X9 Y9 Z9 A9.0 Outline\n";
        let graph = import_str(input).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let deltas: Vec<f64> = graph.vertices().map(|(_, v)| v.extrusion).collect();
        assert_eq!(deltas, vec![0.0, 0.5, 0.5]);

        let categories: Vec<MoveCategory> =
            graph.vertices().map(|(_, v)| v.category).collect();
        assert_eq!(
            categories,
            vec![
                MoveCategory::MoveToStart,
                MoveCategory::Outline,
                MoveCategory::EndOfPrint
            ]
        );
    }

    #[test]
    fn extrusion_delta_law() {
        let readings = [2.5, 3.0, 3.0, 4.25];
        let mut input = String::from("; Slice 0\n");
        for (i, a) in readings.iter().enumerate() {
            input.push_str(&format!("G1 X{i} Y0 Z0 A{a} Infill\n"));
        }
        let graph = import_str(&input).unwrap();
        let deltas: Vec<f64> = graph.vertices().map(|(_, v)| v.extrusion).collect();
        assert_eq!(deltas, vec![0.0, 0.5, 0.0, 1.25]);
    }

    #[test]
    fn everything_before_first_slice_marker_is_ignored() {
        let input = "G1 X5 Y5 Z5 A1.0 Outline\n\
                     M104 S230 T0\n\
                     ; Slice 0\n\
                     G1 X1 Y2 Z0 A0.0 Outline\n";
        let graph = import_str(input).unwrap();
        assert_eq!(graph.vertex_count(), 1);
        let (_, v) = graph.vertices().next().unwrap();
        assert_eq!(v.position, Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn omitted_axes_persist_across_commands() {
        let input = "; Slice 0\n\
                     G1 X1 Y2 Z0.2 A0.0 position\n\
                     G1 X3 Outline\n";
        let graph = import_str(input).unwrap();
        let positions: Vec<Point3> = graph.vertices().map(|(_, v)| v.position).collect();
        assert_eq!(positions[1], Point3::new(3.0, 2.0, 0.2));
    }

    #[test]
    fn unannotated_lines_track_state_without_vertices() {
        let input = "; Slice 0\n\
                     G1 X0 Y0 Z0 A0.0 position\n\
                     G1 X7 Y8\n\
                     G1 Z0.4 Outline\n";
        let graph = import_str(input).unwrap();
        assert_eq!(graph.vertex_count(), 2);
        let positions: Vec<Point3> = graph.vertices().map(|(_, v)| v.position).collect();
        assert_eq!(positions[1], Point3::new(7.0, 8.0, 0.4));
        // The skipped line contributes no edge either
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn extrusion_delta_persists_without_actuator_word() {
        let input = "; Slice 0\n\
                     G1 X0 Y0 Z0 A1.0 position\n\
                     G1 X1 A1.5 Outline\n\
                     G1 X2 Outline\n";
        let graph = import_str(input).unwrap();
        let deltas: Vec<f64> = graph.vertices().map(|(_, v)| v.extrusion).collect();
        assert_eq!(deltas, vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn inline_comment_is_stripped_from_actuator_token() {
        let input = "; Slice 0\n\
                     G1 X0 Y0 Z0 A2.125; Move to start position\n";
        let graph = import_str(input).unwrap();
        assert_eq!(graph.vertex_count(), 1);
        let (_, v) = graph.vertices().next().unwrap();
        assert_eq!(v.category, MoveCategory::MoveToStart);
    }

    #[test]
    fn malformed_number_is_fatal() {
        let input = "; Slice 0\nG1 Xnope Y0 Z0 Outline\n";
        let err = import_str(input).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidNumber { line_number: 2, .. }
        ));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let input = "; Slice 0\nG1 X0 Y0 Z0 Brim\n";
        let err = import_str(input).unwrap_err();
        assert!(matches!(err, ImportError::UnknownCategory { ref word, .. } if word == "Brim"));
    }

    #[test]
    fn stray_word_mid_line_is_rejected() {
        let input = "; Slice 0\nG1 X0 whoops Y0 Outline\n";
        let err = import_str(input).unwrap_err();
        assert!(matches!(err, ImportError::UnexpectedToken { .. }));
    }

    #[test]
    fn duplicate_start_is_rejected() {
        let input = "; Slice 0\n\
                     G1 X0 Y0 Z0 position\n\
                     G1 X1 Y0 Z0 position\n";
        let err = import_str(input).unwrap_err();
        assert!(matches!(
            err,
            ImportError::DuplicateStart { line_number: 3 }
        ));
    }

    #[test]
    fn malformed_slice_marker_is_fatal() {
        let input = "; Slice zero\nG1 X0 Y0 Z0 Outline\n";
        let err = import_str(input).unwrap_err();
        assert!(matches!(err, ImportError::InvalidSliceMarker { .. }));
    }

    #[test]
    fn empty_and_markerless_input_yield_empty_graphs() {
        assert!(import_str("").unwrap().is_empty());
        assert!(import_str("M73 P0\nG1 X1 Y1 Z1 Outline\n").unwrap().is_empty());
    }

    #[test]
    fn parsing_halts_at_end_of_print() {
        let mut importer = GcodeImporter::new();
        importer.feed_line("; Slice 0").unwrap();
        importer.feed_line("G1 X0 Y0 Z0 position").unwrap();
        importer.feed_line("G1 X1 Y0 Z0 print").unwrap();
        assert!(importer.is_finished());
        // Later lines are ignored, even malformed ones
        importer.feed_line("G1 Xgarbage Outline").unwrap();
        assert_eq!(importer.finish().vertex_count(), 2);
    }

    #[test]
    fn anchor_word_is_a_category_not_an_actuator_reading() {
        let input = "; Slice 0\nG1 X0 Y0 Z0 A0.0 position\nG1 X1 A0.2 Anchor\n";
        let graph = import_str(input).unwrap();
        let (_, v) = graph.vertices().nth(1).unwrap();
        assert_eq!(v.category, MoveCategory::Anchor);
        assert!((v.extrusion - 0.2).abs() < 1e-12);
    }
}
