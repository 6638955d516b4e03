//! Box repositioning.

use std::path::{Path, PathBuf};

use clap::Args;
use pdkit_core::{GridLayout, to_graph, to_tree};
use pdkit_io::read_patch;

use super::common::{emit, load_config, walk_graphs_mut};

/// Reposition every box by connection depth or on a grid.
#[derive(Args)]
pub struct LayoutArgs {
    /// Patch file
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Place boxes on a grid in file order instead of by connection depth
    #[arg(long)]
    pub grid: bool,

    /// Also lay out subpatch canvases
    #[arg(short, long)]
    pub recursive: bool,
}

/// Run the layout command.
pub fn run(args: LayoutArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let mut graph = to_graph(&read_patch(&args.file)?)?;

    let options = config.auto_layout_options();
    let grid = &config.layout;
    let mut back_edges = 0;
    let mut apply = |g: &mut pdkit_core::Graph| {
        if args.grid {
            let mut cells =
                GridLayout::new(grid.grid_columns, grid.cell_width, grid.cell_height, grid.margin);
            for id in g.ids().collect::<Vec<_>>() {
                let position = cells.place();
                if let Some(node) = g.node_mut(id) {
                    node.position = position;
                }
            }
        } else {
            back_edges += g.auto_layout(&options).back_edges.len();
        }
    };

    if args.recursive {
        walk_graphs_mut(&mut graph, &mut apply);
    } else {
        apply(&mut graph);
    }

    if back_edges > 0 {
        tracing::info!("{back_edges} feedback cord(s) ignored for layering");
    }
    emit(&to_tree(&graph), args.output.as_deref())
}
