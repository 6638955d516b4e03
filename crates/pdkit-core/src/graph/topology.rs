//! Adjacency lists and depth-first edge classification.
//!
//! Shared by cycle detection and automatic layout. The traversal keeps an
//! explicit stack, so graph depth never touches the call stack.

use super::edge::Connection;

/// Node-to-node adjacency with port numbers dropped.
///
/// Successor and predecessor lists are sorted and free of duplicates.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    pub(crate) outgoing: Vec<Vec<usize>>,
    pub(crate) incoming: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Builds adjacency for `node_count` nodes. Connections with an endpoint
    /// outside the node list are ignored.
    pub(crate) fn new(node_count: usize, connections: &[Connection]) -> Self {
        let mut outgoing = vec![Vec::new(); node_count];
        let mut incoming = vec![Vec::new(); node_count];
        for c in connections {
            let (source, sink) = (c.source.index(), c.sink.index());
            if source < node_count && sink < node_count {
                outgoing[source].push(sink);
                incoming[sink].push(source);
            }
        }
        for list in outgoing.iter_mut().chain(incoming.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        Self { outgoing, incoming }
    }

    pub(crate) fn len(&self) -> usize {
        self.outgoing.len()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Walks every node depth-first in index order and calls `back_edge` for
/// each edge that closes a cycle.
///
/// The callback receives the current DFS path from the edge's target down to
/// its source, then the source and the target. Self-loops are back edges.
pub(crate) fn classify_edges<F>(adjacency: &Adjacency, mut back_edge: F)
where
    F: FnMut(&[usize], usize, usize),
{
    let n = adjacency.len();
    let mut color = vec![Color::White; n];
    // position of each gray node on the path
    let mut depth = vec![0usize; n];
    let mut path: Vec<usize> = Vec::new();
    let mut cursor: Vec<usize> = Vec::new();

    for start in 0..n {
        if color[start] != Color::White {
            continue;
        }
        color[start] = Color::Gray;
        depth[start] = 0;
        path.push(start);
        cursor.push(0);

        while let (Some(&node), Some(next)) = (path.last(), cursor.last_mut()) {
            let Some(&succ) = adjacency.outgoing[node].get(*next) else {
                color[node] = Color::Black;
                path.pop();
                cursor.pop();
                continue;
            };
            *next += 1;
            match color[succ] {
                Color::White => {
                    color[succ] = Color::Gray;
                    depth[succ] = path.len();
                    path.push(succ);
                    cursor.push(0);
                }
                Color::Gray => back_edge(&path[depth[succ]..], node, succ),
                Color::Black => {}
            }
        }
    }
}

/// Every back edge as a `(source, sink)` pair.
pub(crate) fn back_edges(adjacency: &Adjacency) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    classify_edges(adjacency, |_, from, to| edges.push((from, to)));
    edges
}

/// One cycle per back edge, each starting and ending on the same node.
pub(crate) fn cycles(adjacency: &Adjacency) -> Vec<Vec<usize>> {
    let mut found = Vec::new();
    classify_edges(adjacency, |path, _, to| {
        let mut cycle = path.to_vec();
        cycle.push(to);
        found.push(cycle);
    });
    found
}
