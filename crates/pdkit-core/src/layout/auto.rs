//! Topology-driven layout.
//!
//! Sources go on the top row and each node sits one row below its deepest
//! predecessor. Feedback cords are found by an iterative depth-first walk and
//! ignored for layering, so cyclic patches lay out like their acyclic core.

use std::collections::VecDeque;

use crate::ast::Position;
use crate::graph::topology::{self, Adjacency};
use crate::graph::{Graph, NodeId};

/// Spacing for [`auto_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoLayoutOptions {
    /// Margin from the canvas edge.
    pub margin: i32,
    /// Vertical distance between rows.
    pub row_spacing: i32,
    /// Horizontal distance between nodes in a row.
    pub col_spacing: i32,
    /// Order each row by the mean column of its parents.
    pub align_columns: bool,
}

impl Default for AutoLayoutOptions {
    fn default() -> Self {
        Self {
            margin: 50,
            row_spacing: 40,
            col_spacing: 120,
            align_columns: true,
        }
    }
}

/// What [`auto_layout`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoLayoutReport {
    /// Node pairs whose cords were ignored to break cycles.
    pub back_edges: Vec<(NodeId, NodeId)>,
    /// Number of rows used.
    pub layers: usize,
}

/// Repositions every node of `graph` by connection depth.
///
/// Runs in linear time apart from sorting within rows, never recurses, and
/// gives every node exactly one position, including nodes on self-loops and
/// on cycles with no entry point.
pub fn auto_layout(graph: &mut Graph, options: &AutoLayoutOptions) -> AutoLayoutReport {
    let n = graph.len();
    if n == 0 {
        return AutoLayoutReport::default();
    }
    let adjacency = Adjacency::new(n, graph.connections());
    let back_edges = topology::back_edges(&adjacency);

    #[cfg(feature = "tracing")]
    if !back_edges.is_empty() {
        tracing::warn!(
            "auto_layout: ignoring {} feedback cord(s) for layering",
            back_edges.len()
        );
    }

    let rows = layer_rows(&adjacency, &back_edges, options.align_columns);
    for (depth, row) in rows.iter().enumerate() {
        let y = options.margin + depth as i32 * options.row_spacing;
        for (column, &node) in row.iter().enumerate() {
            let x = options.margin + column as i32 * options.col_spacing;
            graph.nodes[node].position = Position::new(x, y);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("auto_layout: {n} nodes in {} rows", rows.len());

    AutoLayoutReport {
        back_edges: back_edges
            .into_iter()
            .map(|(a, b)| (NodeId(a), NodeId(b)))
            .collect(),
        layers: rows.len(),
    }
}

/// Longest-path layering over the graph minus `back_edges`, one row per layer.
fn layer_rows(adjacency: &Adjacency, back_edges: &[(usize, usize)], align: bool) -> Vec<Vec<usize>> {
    let n = adjacency.len();

    // acyclic successor lists and in-degrees
    let mut dag: Vec<Vec<usize>> = adjacency.outgoing.clone();
    for &(from, to) in back_edges {
        dag[from].retain(|&s| s != to);
    }
    let mut in_degree = vec![0usize; n];
    for successors in &dag {
        for &s in successors {
            in_degree[s] += 1;
        }
    }

    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &s in &dag[node] {
            layer[s] = layer[s].max(layer[node] + 1);
            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    let depth = layer.iter().copied().max().unwrap_or(0);
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); depth + 1];
    for (node, &l) in layer.iter().enumerate() {
        rows[l].push(node);
    }

    if align {
        let mut column = vec![0usize; n];
        for (i, &node) in rows[0].iter().enumerate() {
            column[node] = i;
        }
        for d in 1..rows.len() {
            // mean column of parents on the row above, infinity when none
            let mut keyed: Vec<(f64, usize)> = rows[d]
                .iter()
                .map(|&node| {
                    let (sum, count) = adjacency.incoming[node]
                        .iter()
                        .filter(|&&p| layer[p] == d - 1)
                        .fold((0.0, 0usize), |(sum, count), &p| {
                            (sum + column[p] as f64, count + 1)
                        });
                    let key = if count == 0 {
                        f64::INFINITY
                    } else {
                        sum / count as f64
                    };
                    (key, node)
                })
                .collect();
            // stable: ties keep insertion order
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            rows[d] = keyed.into_iter().map(|(_, node)| node).collect();
            for (i, &node) in rows[d].iter().enumerate() {
                column[node] = i;
            }
        }
    }
    rows
}
