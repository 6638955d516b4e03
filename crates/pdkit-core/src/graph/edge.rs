//! Port-indexed connections between graph nodes.

use core::fmt;

use super::node::NodeId;

/// A cord from one node's outlet to another node's inlet.
///
/// Ordering is by source, outlet, sink, inlet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    /// Sending node.
    pub source: NodeId,
    /// Outlet number on the source.
    pub outlet: usize,
    /// Receiving node.
    pub sink: NodeId,
    /// Inlet number on the sink.
    pub inlet: usize,
}

impl Connection {
    /// Creates a connection.
    pub const fn new(source: NodeId, outlet: usize, sink: NodeId, inlet: usize) -> Self {
        Self {
            source,
            outlet,
            sink,
            inlet,
        }
    }

    /// Returns `true` if either end is `node`.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.sink == node
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.source, self.outlet, self.sink, self.inlet
        )
    }
}
