//! Error types for the codec and the graph model.

use core::fmt;
use thiserror::Error;

use crate::graph::NodeId;

/// A malformed, truncated or unrecognized statement in patch text.
///
/// Parsing stops at the first error; no statement is ever skipped silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line on which the offending statement starts.
    pub line: usize,
    /// Offending statement text, without its terminator.
    pub statement: String,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// Reason a statement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The input holds no statements at all.
    #[error("empty patch")]
    Empty,
    /// No `#N canvas` statement opened the root patch.
    #[error("no canvas found")]
    MissingCanvas,
    /// An `#X` or `#A` statement appeared before the root canvas.
    #[error("element before canvas")]
    ElementBeforeCanvas,
    /// The record tag is not `#N`, `#X` or `#A`.
    #[error("unknown record type `{0}`")]
    UnknownRecord(String),
    /// The statement is shorter than its command requires.
    #[error("`{command}` needs at least {expected} fields, found {found}")]
    TooFewFields {
        /// Command token, e.g. `connect`.
        command: String,
        /// Minimum field count including the record tag and command.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },
    /// A field that must be numeric could not be parsed.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    /// A canvas header with a field count other than 7 (root) or 8 (named).
    #[error("canvas header must have 7 or 8 fields, found {0}")]
    CanvasShape(usize),
    /// A `restore` with no open subpatch to close.
    #[error("restore without matching canvas")]
    UnmatchedRestore,
    /// End of input reached with subpatches still open.
    #[error("{0} subpatch canvas(es) never restored")]
    UnclosedSubpatch(usize),
}

/// Which side of a connection a port index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// Source side.
    Outlet,
    /// Sink side.
    Inlet,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outlet => f.write_str("outlet"),
            Self::Inlet => f.write_str("inlet"),
        }
    }
}

/// Errors raised by graph mutation and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A connection or lookup referenced an index not in the node list.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// A port index exceeds the node's statically known arity.
    #[error("{port} {index} out of range on node {node} ({arity} {port}s)")]
    InvalidConnection {
        /// Node whose arity was exceeded.
        node: NodeId,
        /// Side of the connection.
        port: Port,
        /// Requested port index.
        index: usize,
        /// Declared port count.
        arity: usize,
    },
}

/// A directed cycle in the connection graph.
///
/// Cycles are legal feedback topologies, so this is reported rather than
/// returned as an error. The path starts and ends on the same node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWarning {
    /// Nodes along the cycle, first node repeated at the end.
    pub nodes: Vec<NodeId>,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cycle detected: ")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
