//! Connection validation.

use std::path::{Path, PathBuf};

use clap::Args;
use pdkit_core::{ObjectRegistry, to_graph_with};
use pdkit_io::read_patch;

use super::common::{externals_registry, load_config, walk_graphs};

/// Check connections against port counts and report cycles.
#[derive(Args)]
pub struct ValidateArgs {
    /// Patch file
    pub file: PathBuf,

    /// Skip the feedback cycle report
    #[arg(long)]
    pub no_cycles: bool,

    /// Resolve abstractions and externals found via config and declare paths
    #[arg(long)]
    pub externals: bool,
}

/// Run the validate command.
pub fn run(args: ValidateArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let patch = read_patch(&args.file)?;
    let registry = if args.externals {
        let config = load_config(config)?;
        externals_registry(&config, &patch, &args.file)
    } else {
        ObjectRegistry::default()
    };
    let graph = to_graph_with(&patch, &registry)?;

    let (mut errors, mut warnings) = (0, 0);
    walk_graphs(&graph, "main", &mut |g, label| {
        let report = g.validate(!args.no_cycles);
        for error in &report.errors {
            println!("error [{label}]: {error}");
        }
        for cycle in &report.cycles {
            println!("warning [{label}]: {cycle}");
        }
        errors += report.errors.len();
        warnings += report.cycles.len();
    });

    if errors > 0 {
        anyhow::bail!("{}: {errors} error(s), {warnings} warning(s)", args.file.display());
    }
    println!("{}: ok ({warnings} warning(s))", args.file.display());
    Ok(())
}
