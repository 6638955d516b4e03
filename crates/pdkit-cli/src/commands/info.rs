//! Display patch statistics.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use pdkit_core::{CanvasKind, Element, NodeKind, to_graph};
use pdkit_io::read_patch;
use serde::Serialize;

use super::common::walk_graphs;

/// Summarize a patch.
#[derive(Args)]
pub struct InfoArgs {
    /// Patch file
    pub file: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PatchInfo {
    file: PathBuf,
    canvas: (i32, i32),
    font_size: Option<i32>,
    boxes: usize,
    connections: usize,
    subpatches: usize,
    inlets: usize,
    outlets: usize,
    cycles: usize,
    arity_coverage: f64,
    classes: BTreeMap<String, usize>,
    declare_paths: Vec<String>,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let patch = read_patch(&args.file)?;
    let graph = to_graph(&patch)?;

    let mut classes = BTreeMap::new();
    for element in patch.find(|e| matches!(e, Element::Obj(_) | Element::Gui(_))) {
        if let Some(class) = element.class_name() {
            *classes.entry(class.to_string()).or_insert(0) += 1;
        }
    }

    let (mut boxes, mut connections, mut subpatches, mut cycles) = (0, 0, 0, 0);
    walk_graphs(&graph, "main", &mut |g, _| {
        boxes += g.len();
        connections += g.connections().len();
        subpatches += g
            .nodes()
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Subpatch(_)))
            .count();
        cycles += g.detect_cycles().len();
    });

    let (inlets, outlets) = patch.infer_arity();
    let canvas = &patch.canvas;
    let font_size = match canvas.kind {
        CanvasKind::Root { font_size } => Some(font_size),
        CanvasKind::Named { .. } => None,
    };
    let info = PatchInfo {
        file: args.file.clone(),
        canvas: (canvas.width, canvas.height),
        font_size,
        boxes,
        connections,
        subpatches,
        inlets,
        outlets,
        cycles,
        arity_coverage: graph.connection_stats().arity_coverage,
        classes,
        declare_paths: patch.declare_paths().into_iter().map(str::to_string).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File:         {}", info.file.display());
    match info.font_size {
        Some(size) => println!("Canvas:       {}x{} (font {size})", info.canvas.0, info.canvas.1),
        None => println!("Canvas:       {}x{}", info.canvas.0, info.canvas.1),
    }
    println!("Boxes:        {} ({} subpatches)", info.boxes, info.subpatches);
    println!("Connections:  {}", info.connections);
    println!("Ports:        {} in, {} out", info.inlets, info.outlets);
    println!("Cycles:       {}", info.cycles);
    println!("Arity known:  {:.1}%", info.arity_coverage);
    if !info.declare_paths.is_empty() {
        println!("Declared:     {}", info.declare_paths.join(", "));
    }
    println!();
    println!("Classes:");
    for (class, count) in &info.classes {
        println!("  {class:<20} {count}");
    }

    Ok(())
}
