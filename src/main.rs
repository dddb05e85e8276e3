use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use gcodegraph::{export_to_file, import_file, init_logging, MoveCategory, VERSION};

fn usage() -> ! {
    eprintln!("gcodegraph {VERSION}");
    eprintln!("Usage: gcodegraph <input.gcode>              import and summarize");
    eprintln!("       gcodegraph <input.gcode> <output.gcode>  import and re-export");
    std::process::exit(2);
}

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let (input, output) = match args.as_slice() {
        [input] => (input, None),
        [input, output] => (input, Some(output)),
        _ => usage(),
    };

    let graph = import_file(input)
        .with_context(|| format!("failed to import {}", input.display()))?;
    if graph.is_empty() {
        bail!("{} contains no toolpath", input.display());
    }

    println!(
        "{}: {} vertices, {} edges, start vertex {}",
        input.display(),
        graph.vertex_count(),
        graph.edge_count(),
        graph
            .start_vertex()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "missing".to_string()),
    );
    for category in MoveCategory::ALL {
        let count = graph.vertices().filter(|(_, v)| v.category == category).count();
        if count > 0 {
            println!("  {:>24}: {count}", category.label());
        }
    }

    if let Some(output) = output {
        export_to_file(&graph, output)
            .with_context(|| format!("failed to export {}", output.display()))?;
        println!("wrote {}", output.display());
    }

    Ok(())
}
