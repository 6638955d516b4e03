//! File boundary for pdkit.
//!
//! This crate provides:
//!
//! - **Patch files**: [`read_patch`] / [`write_patch`] and the graph-level
//!   [`read_graph`] / [`write_graph`]
//! - **Temporary export**: [`export_temp`] for handing a patch to an
//!   external runtime or compiler
//! - **Externals discovery**: [`discover_externals`] scans abstraction and
//!   binary external directories into an [`ExternalsRegistry`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdkit_io::{discover_externals, read_graph_with, registry_with_externals, write_graph};
//!
//! let externals = discover_externals(["./abstractions"], true);
//! let registry = registry_with_externals(&externals);
//! let mut graph = read_graph_with("synth.pd", &registry)?;
//! graph.optimize(&Default::default());
//! write_graph("synth.pd", &graph)?;
//! # Ok::<(), pdkit_io::Error>(())
//! ```

mod discover;
mod files;

use std::path::PathBuf;

pub use discover::{
    ExternalsRegistry, abstraction_arity, binary_extensions, default_search_paths,
    discover_externals, registry_with_externals,
};
pub use files::{
    export_temp, read_class_list, read_graph, read_graph_with, read_patch, write_graph,
    write_patch,
};

/// Error types for patch I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be read, written or created.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File the operation was on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A patch file is not valid patch text.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser error with line number.
        #[source]
        source: pdkit_core::ParseError,
    },

    /// A parsed patch could not be turned into a graph.
    #[error("invalid patch graph: {0}")]
    Graph(#[from] pdkit_core::GraphError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for patch I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
