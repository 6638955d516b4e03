//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pdkit_config::Config;
use pdkit_core::{Graph, NodeKind, ObjectRegistry, Patch, serialize};
use pdkit_io::{discover_externals, registry_with_externals, write_patch};

/// Load the configuration named on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(config)
}

/// Write `patch` to `output`, or to stdout when no output is given.
pub fn emit(patch: &Patch, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            write_patch(path, patch)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => print!("{}", serialize(patch)),
    }
    Ok(())
}

/// Registry with externals found in the configured directories and in the
/// `declare -path` directories of `patch`, resolved against `file`'s folder.
pub fn externals_registry(config: &Config, patch: &Patch, file: &Path) -> ObjectRegistry {
    let base = file.parent().unwrap_or_else(|| Path::new("."));
    let declared = patch.declare_paths().into_iter().map(|p| base.join(p));
    let search: Vec<PathBuf> = config
        .discovery
        .paths
        .iter()
        .cloned()
        .chain(declared)
        .collect();
    let externals = discover_externals(&search, config.discovery.include_defaults);
    tracing::debug!("{} external(s) available", externals.len());
    registry_with_externals(&externals)
}

/// Visit `graph` and every nested subpatch graph, depth-first, with a label
/// naming the canvas (`main`, `main/pd synth`, ...).
pub fn walk_graphs<F>(graph: &Graph, label: &str, visit: &mut F)
where
    F: FnMut(&Graph, &str),
{
    visit(graph, label);
    for node in graph.nodes() {
        if let NodeKind::Subpatch(sub) = &node.kind {
            let child = format!("{label}/{}", node.kind.text());
            walk_graphs(&sub.graph, &child, visit);
        }
    }
}

/// Mutable counterpart of [`walk_graphs`] without labels.
pub fn walk_graphs_mut<F>(graph: &mut Graph, visit: &mut F)
where
    F: FnMut(&mut Graph),
{
    visit(graph);
    for id in graph.ids().collect::<Vec<_>>() {
        if let Some(node) = graph.node_mut(id) {
            if let NodeKind::Subpatch(sub) = &mut node.kind {
                walk_graphs_mut(&mut sub.graph, visit);
            }
        }
    }
}
