//! Round-trip behavior of the codec pair
//!
//! Importing a well-formed stream and exporting it again must preserve the
//! coordinate and category sequences. Feed and actuator values legitimately
//! differ: export recomputes them from category policy instead of trusting
//! the deltas stored on import.

use gcodegraph_codec::{export_to_file, export_to_string, import_file, import_str};
use gcodegraph_core::{MoveCategory, Point3};
use proptest::prelude::*;

const LINEAR_PATH: &str = "\
; Slice 0
G1 X0 Y0 Z0 A0.0 position
G1 X10 Y0 Z0 A0.1 Anchor
G1 X10 Y10 Z0.2 A0.45 Outline
G1 X0 Y10 Z0.2 A0.8 Outline
G1 X0 Y10 Z0.4 A0.8 move
G1 X5 Y5 Z0.4 A1.2 Infill
G1 X5 Y5 Z0.4 A0.5 print
";

fn shape(
    graph: &gcodegraph_core::PathGraph,
) -> (Vec<Point3>, Vec<MoveCategory>) {
    let positions = graph.vertices().map(|(_, v)| v.position).collect();
    let categories = graph.vertices().map(|(_, v)| v.category).collect();
    (positions, categories)
}

#[test]
fn linear_path_round_trips() {
    let original = import_str(LINEAR_PATH).unwrap();
    let exported = export_to_string(&original).unwrap();
    let reimported = import_str(&exported).unwrap();

    assert_eq!(shape(&original), shape(&reimported));
    assert_eq!(original.edge_count(), reimported.edge_count());
}

#[test]
fn reexport_recomputes_extrusion_from_policy() {
    let original = import_str(LINEAR_PATH).unwrap();
    let reimported = import_str(&export_to_string(&original).unwrap()).unwrap();

    // The Outline deltas in the source (0.35 per side) do not match the
    // policy-derived 0.035/mm. The divergence is by design: geometry and
    // categories survive the trip, actuator bookkeeping does not.
    let original_deltas: Vec<f64> = original.vertices().map(|(_, v)| v.extrusion).collect();
    let reimported_deltas: Vec<f64> =
        reimported.vertices().map(|(_, v)| v.extrusion).collect();
    assert_ne!(original_deltas, reimported_deltas);

    // Re-importing an export of the reimported graph is stable, though:
    // policy-derived values reproduce themselves.
    let third = import_str(&export_to_string(&reimported).unwrap()).unwrap();
    let third_deltas: Vec<f64> = third.vertices().map(|(_, v)| v.extrusion).collect();
    for (a, b) in reimported_deltas.iter().zip(&third_deltas) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}

#[test]
fn exported_slice_headers_are_strictly_increasing() {
    let graph = import_str(LINEAR_PATH).unwrap();
    let exported = export_to_string(&graph).unwrap();

    let mut last_index = 0u32;
    let mut last_z = f64::NEG_INFINITY;
    let mut lines = exported.lines().peekable();
    while let Some(line) = lines.next() {
        if let Some(rest) = line.strip_prefix("; Slice ") {
            let index: u32 = rest.trim().parse().unwrap();
            if index == 0 {
                continue; // preamble block
            }
            assert_eq!(index, last_index + 1);
            last_index = index;
            let position = lines.peek().unwrap().strip_prefix("; Position ").unwrap();
            let z: f64 = position.trim().parse().unwrap();
            assert!(z > last_z);
            last_z = z;
        }
    }
    assert_eq!(last_index, 2);
}

#[test]
fn file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.gcode");
    let dst = dir.path().join("out.gcode");
    std::fs::write(&src, LINEAR_PATH).unwrap();

    let graph = import_file(&src).unwrap();
    export_to_file(&graph, &dst).unwrap();
    let reimported = import_file(&dst).unwrap();

    assert_eq!(shape(&graph), shape(&reimported));
}

proptest! {
    /// Imported extrusion deltas are exactly the successive differences of
    /// the absolute actuator readings, with the first pinned to zero.
    #[test]
    fn extrusion_delta_law(readings in prop::collection::vec(-100.0f64..100.0, 1..40)) {
        let mut input = String::from("; Slice 0\nG1 X0 Y0 Z0 position\n");
        for (i, a) in readings.iter().enumerate() {
            input.push_str(&format!("G1 X{} Y1 Z0 A{a} Infill\n", i + 1));
        }
        let graph = import_str(&input).unwrap();

        // Skip the start vertex: it carries no actuator word.
        let deltas: Vec<f64> = graph.vertices().skip(1).map(|(_, v)| v.extrusion).collect();
        prop_assert_eq!(deltas.len(), readings.len());
        prop_assert_eq!(deltas[0], 0.0);
        for i in 1..readings.len() {
            prop_assert!((deltas[i] - (readings[i] - readings[i - 1])).abs() < 1e-12);
        }
    }
}
