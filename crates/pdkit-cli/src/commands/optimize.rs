//! Graph optimization.

use std::path::{Path, PathBuf};

use clap::Args;
use pdkit_core::{OptimizeStats, optimize::preview, to_graph_with, to_tree};
use pdkit_io::read_patch;

use super::common::{emit, externals_registry, load_config};

/// Remove duplicate cords, pass-through objects and unused objects.
#[derive(Args)]
pub struct OptimizeArgs {
    /// Patch file
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also optimize subpatches
    #[arg(short, long)]
    pub recursive: bool,

    /// Classes to collapse when they only pass a message along (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub collapse: Vec<String>,

    /// Resolve abstractions and externals found via config and declare paths
    #[arg(long)]
    pub externals: bool,

    /// Report what would change without writing anything
    #[arg(long, conflicts_with = "output")]
    pub dry_run: bool,
}

/// Run the optimize command.
pub fn run(args: OptimizeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let patch = read_patch(&args.file)?;
    let registry = if args.externals {
        externals_registry(&config, &patch, &args.file)
    } else {
        Default::default()
    };
    let mut graph = to_graph_with(&patch, &registry)?;

    let mut options = config.optimize_options();
    options.recursive |= args.recursive;
    options.collapsible.extend(args.collapse);

    if args.dry_run {
        let (stats, removed) = preview(&graph, &options);
        for id in &removed {
            if let Some(node) = graph.node(*id) {
                println!("remove: {id} {}", node.kind.text());
            }
        }
        print_stats(&stats);
        return Ok(());
    }

    let stats = graph.optimize(&options);
    print_stats(&stats);
    emit(&to_tree(&graph), args.output.as_deref())
}

fn print_stats(stats: &OptimizeStats) {
    if stats.is_noop() {
        eprintln!("Nothing to optimize");
        return;
    }
    eprintln!("Nodes removed:          {}", stats.nodes_removed);
    eprintln!("Connections removed:    {}", stats.connections_removed);
    eprintln!("Duplicates removed:     {}", stats.duplicates_removed);
    eprintln!("Pass-throughs removed:  {}", stats.pass_throughs_collapsed);
    if stats.subpatches_optimized > 0 {
        eprintln!("Subpatches optimized:   {}", stats.subpatches_optimized);
    }
}
