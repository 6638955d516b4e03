//! Graph clean-up passes.
//!
//! [`Graph::optimize`] runs three passes in order:
//!
//! 1. **Dedup** drops connections identical to an earlier one.
//! 2. **Pass-through collapse** removes opt-in objects that only forward one
//!    cord to another and wires their neighbours together directly.
//! 3. **Unused removal** drops generic objects with no cords at all.
//!
//! Each pass is idempotent and so is the whole run. Every node removal goes
//! through one remap, so surviving connections always point at the right
//! nodes.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::ops::AddAssign;

use crate::graph::{Connection, Graph, Node, NodeId, NodeKind};

/// Options for [`Graph::optimize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Optimize nested subpatch graphs first, bottom-up.
    pub recursive: bool,
    /// Object classes that may be collapsed when they just pass a message
    /// along. Empty disables the collapse pass.
    pub collapsible: BTreeSet<String>,
}

impl OptimizeOptions {
    /// Options that collapse the given classes.
    pub fn collapsing<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recursive: false,
            collapsible: classes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Counts from one [`Graph::optimize`] run.
///
/// With `recursive`, nested graphs' counts are included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Nodes removed by collapse or unused removal.
    pub nodes_removed: usize,
    /// Net drop in connection count.
    pub connections_removed: usize,
    /// Exact duplicate connections dropped.
    pub duplicates_removed: usize,
    /// Pass-through nodes collapsed.
    pub pass_throughs_collapsed: usize,
    /// Subpatch graphs optimized.
    pub subpatches_optimized: usize,
}

impl OptimizeStats {
    /// Returns `true` if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.nodes_removed == 0 && self.connections_removed == 0
    }
}

impl AddAssign for OptimizeStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes_removed += other.nodes_removed;
        self.connections_removed += other.connections_removed;
        self.duplicates_removed += other.duplicates_removed;
        self.pass_throughs_collapsed += other.pass_throughs_collapsed;
        self.subpatches_optimized += other.subpatches_optimized;
    }
}

impl Graph {
    /// Runs dedup, pass-through collapse and unused removal.
    ///
    /// Message boxes, comments, atoms, arrays, widgets, subpatches and
    /// abstractions are never removed. Neither are objects with a send or
    /// receive name, nor `inlet`/`outlet` objects, since those define a
    /// subpatch's ports.
    pub fn optimize(&mut self, options: &OptimizeOptions) -> OptimizeStats {
        self.optimize_tracked(options).0
    }

    /// [`Graph::optimize`] plus the pre-run ids of the top-level nodes it
    /// removed.
    fn optimize_tracked(&mut self, options: &OptimizeOptions) -> (OptimizeStats, Vec<NodeId>) {
        let mut stats = OptimizeStats::default();
        if options.recursive {
            for node in &mut self.nodes {
                if let NodeKind::Subpatch(sub) = &mut node.kind {
                    stats += sub.graph.optimize(options);
                    stats.subpatches_optimized += 1;
                }
            }
        }

        let initial = self.connections.len();
        let duplicates = self.dedup_connections();
        let mut removed = vec![false; self.nodes.len()];
        let collapsed = if options.collapsible.is_empty() {
            0
        } else {
            self.collapse_pass_throughs(&options.collapsible, &mut removed)
        };
        self.mark_unused(&mut removed);

        let keep: Vec<bool> = removed.iter().map(|r| !r).collect();
        let (gone, _) = self.retain_nodes(&keep);
        let dropped = removed
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r)
            .map(|(i, _)| NodeId::new(i))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "optimize: {duplicates} duplicate(s), {collapsed} collapsed, {} node(s) removed",
            gone.len()
        );

        stats += OptimizeStats {
            nodes_removed: gone.len(),
            connections_removed: initial.saturating_sub(self.connections.len()),
            duplicates_removed: duplicates,
            pass_throughs_collapsed: collapsed,
            subpatches_optimized: 0,
        };
        (stats, dropped)
    }

    /// Drops exact duplicate connections, keeping the first of each.
    fn dedup_connections(&mut self) -> usize {
        let before = self.connections.len();
        let mut seen = HashSet::with_capacity(before);
        self.connections.retain(|c| seen.insert(*c));
        before - self.connections.len()
    }

    /// Collapses eligible single-in, single-out nodes with a worklist.
    ///
    /// Rewiring never creates a duplicate: if the direct connection already
    /// exists the two cords are simply dropped. Neighbours are re-examined
    /// after every collapse since their degree may have changed.
    fn collapse_pass_throughs(&mut self, collapsible: &BTreeSet<String>, removed: &mut [bool]) -> usize {
        let n = self.nodes.len();
        let mut slots: Vec<Option<Connection>> = self.connections.iter().copied().map(Some).collect();
        let mut live: HashSet<Connection> = self.connections.iter().copied().collect();
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (slot, c) in self.connections.iter().enumerate() {
            outgoing[c.source.index()].push(slot);
            incoming[c.sink.index()].push(slot);
        }

        let eligible: Vec<bool> = self
            .nodes
            .iter()
            .map(|node| is_pass_through(node, collapsible))
            .collect();
        let mut queued = eligible.clone();
        let mut worklist: VecDeque<usize> = (0..n).filter(|&i| eligible[i]).collect();
        let mut collapsed = 0;

        while let Some(node) = worklist.pop_front() {
            queued[node] = false;
            if removed[node] {
                continue;
            }
            let (Some(in_slot), Some(out_slot)) = (
                single_live(&incoming[node], &slots),
                single_live(&outgoing[node], &slots),
            ) else {
                continue;
            };
            let (Some(upstream), Some(downstream)) = (slots[in_slot], slots[out_slot]) else {
                continue;
            };
            if upstream.source.index() == node || downstream.sink.index() == node {
                continue;
            }

            for slot in [in_slot, out_slot] {
                if let Some(c) = slots[slot].take() {
                    live.remove(&c);
                }
            }
            let bypass = Connection::new(
                upstream.source,
                upstream.outlet,
                downstream.sink,
                downstream.inlet,
            );
            if live.insert(bypass) {
                let slot = slots.len();
                slots.push(Some(bypass));
                outgoing[bypass.source.index()].push(slot);
                incoming[bypass.sink.index()].push(slot);
            }
            removed[node] = true;
            collapsed += 1;

            for neighbour in [upstream.source.index(), downstream.sink.index()] {
                if eligible[neighbour] && !removed[neighbour] && !queued[neighbour] {
                    queued[neighbour] = true;
                    worklist.push_back(neighbour);
                }
            }
        }

        self.connections = slots.into_iter().flatten().collect();
        collapsed
    }

    /// Marks removable nodes that have no connections.
    fn mark_unused(&self, removed: &mut [bool]) {
        let mut connected = vec![false; self.nodes.len()];
        for c in &self.connections {
            connected[c.source.index()] = true;
            connected[c.sink.index()] = true;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if !connected[i] && !removed[i] && is_removable(node) {
                removed[i] = true;
            }
        }
    }
}

/// A slot index if exactly one of `slots` is still live.
fn single_live(incident: &[usize], slots: &[Option<Connection>]) -> Option<usize> {
    let mut live = incident.iter().copied().filter(|&s| slots[s].is_some());
    let first = live.next()?;
    live.next().is_none().then_some(first)
}

fn is_pass_through(node: &Node, collapsible: &BTreeSet<String>) -> bool {
    matches!(
        &node.kind,
        NodeKind::Obj { class, args } if args.is_empty() && collapsible.contains(class)
    ) && node.inlets == Some(1)
        && node.outlets == Some(1)
}

fn is_removable(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Obj { .. })
        && !node.kind.has_active_names()
        && !node.kind.is_inlet()
        && !node.kind.is_outlet()
}

/// Runs [`Graph::optimize`] on a copy of `graph`.
///
/// Returns the stats together with the ids, as numbered in `graph`, of the
/// top-level nodes the run would delete. `graph` itself is left alone.
pub fn preview(graph: &Graph, options: &OptimizeOptions) -> (OptimizeStats, Vec<NodeId>) {
    graph.clone().optimize_tracked(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Atom;
    use crate::graph::AddOptions;

    #[test]
    fn dedup_keeps_first() {
        let mut graph = Graph::new();
        let a = graph.add("f");
        let b = graph.add("print");
        graph.link(a, b, 0).unwrap();
        graph.link(a, b, 0).unwrap();
        graph.link(a, b, 0).unwrap();
        let stats = graph.optimize(&OptimizeOptions::default());
        assert_eq!(stats.duplicates_removed, 2);
        assert_eq!(stats.connections_removed, 2);
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn unused_objects_go_but_protected_kinds_stay() {
        let mut graph = Graph::new();
        graph.add("osc~ 440");
        graph.add_msg("bang");
        graph.add_comment("note");
        graph.add_float(Atom::float());
        graph.add("r tempo");
        graph.add("inlet");
        graph.add_abstraction("my-synth", AddOptions::default());
        let stats = graph.optimize(&OptimizeOptions::default());
        assert_eq!(stats.nodes_removed, 1);
        assert_eq!(graph.len(), 6);
        assert!(graph.nodes().iter().all(|n| n.kind.class_name() != Some("osc~")));
    }

    #[test]
    fn collapse_rewires_through() {
        let mut graph = Graph::new();
        let src = graph.add("f");
        let pass = graph.add_with("wire", AddOptions::arity(1, 1));
        let dst = graph.add("print");
        graph.link(src, pass, 0).unwrap();
        graph.link(pass, dst, 0).unwrap();
        let stats = graph.optimize(&OptimizeOptions::collapsing(["wire"]));
        assert_eq!(stats.pass_throughs_collapsed, 1);
        assert_eq!(stats.nodes_removed, 1);
        assert_eq!(stats.connections_removed, 1);
        assert_eq!(
            graph.connections(),
            &[Connection::new(NodeId::new(0), 0, NodeId::new(1), 0)]
        );
    }

    #[test]
    fn collapse_handles_chains() {
        let mut graph = Graph::new();
        let src = graph.add("f");
        let mut prev = src;
        for _ in 0..5 {
            let pass = graph.add_with("wire", AddOptions::arity(1, 1));
            graph.link(prev, pass, 0).unwrap();
            prev = pass;
        }
        let dst = graph.add("print");
        graph.link(prev, dst, 0).unwrap();
        let stats = graph.optimize(&OptimizeOptions::collapsing(["wire"]));
        assert_eq!(stats.pass_throughs_collapsed, 5);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn collapse_never_duplicates() {
        let mut graph = Graph::new();
        let src = graph.add("f");
        let pass = graph.add_with("wire", AddOptions::arity(1, 1));
        let dst = graph.add("print");
        graph.link(src, pass, 0).unwrap();
        graph.link(pass, dst, 0).unwrap();
        graph.link(src, dst, 0).unwrap();
        graph.optimize(&OptimizeOptions::collapsing(["wire"]));
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn collapse_skips_args_fanout_and_self_loops() {
        let mut graph = Graph::new();
        let src = graph.add("f");
        let with_args = graph.add_with("wire 1", AddOptions::arity(1, 1));
        let fanout = graph.add_with("wire", AddOptions::arity(1, 1));
        let looped = graph.add_with("wire", AddOptions::arity(1, 1));
        let a = graph.add("print");
        let b = graph.add("print");
        graph.link(src, with_args, 0).unwrap();
        graph.link(with_args, fanout, 0).unwrap();
        graph.link(fanout, a, 0).unwrap();
        graph.link(fanout, b, 0).unwrap();
        graph.link(looped, looped, 0).unwrap();
        let stats = graph.optimize(&OptimizeOptions::collapsing(["wire"]));
        assert_eq!(stats.pass_throughs_collapsed, 0);
        assert_eq!(graph.len(), 6);
    }

    #[test]
    fn recursive_counts_nested_work() {
        let mut inner = Graph::new();
        let i = inner.add("inlet");
        let o = inner.add("outlet");
        inner.link(i, o, 0).unwrap();
        inner.link(i, o, 0).unwrap();
        inner.add("unused");
        let mut graph = Graph::new();
        graph.add_subpatch("sub", inner, Default::default());
        let stats = graph.optimize(&OptimizeOptions {
            recursive: true,
            ..OptimizeOptions::default()
        });
        assert_eq!(stats.subpatches_optimized, 1);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.nodes_removed, 1);
        let NodeKind::Subpatch(sub) = &graph.nodes()[0].kind else {
            panic!("expected subpatch");
        };
        assert_eq!(sub.graph.len(), 2);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut graph = Graph::new();
        let a = graph.add("f");
        let pass = graph.add_with("wire", AddOptions::arity(1, 1));
        let b = graph.add("print");
        graph.add("orphan");
        graph.link(a, pass, 0).unwrap();
        graph.link(pass, b, 0).unwrap();
        graph.link(pass, b, 0).unwrap();
        let options = OptimizeOptions::collapsing(["wire"]);
        let first = graph.optimize(&options);
        assert!(!first.is_noop());
        let snapshot = graph.clone();
        assert!(graph.optimize(&options).is_noop());
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn preview_lists_removed_nodes_without_touching_graph() {
        let mut graph = Graph::new();
        graph.add("f");
        graph.add_msg("1");
        let (stats, removed) = preview(&graph, &OptimizeOptions::default());
        assert_eq!(removed, vec![NodeId::new(0)]);
        assert_eq!(stats.nodes_removed, 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn preview_includes_collapsed_nodes() {
        let mut graph = Graph::new();
        let source = graph.add("f");
        let relay = graph.add("change");
        let sink = graph.add("print");
        graph.link(source, relay, 0).unwrap();
        graph.link(relay, sink, 0).unwrap();

        let options = OptimizeOptions::collapsing(["change"]);
        let (stats, removed) = preview(&graph, &options);
        assert_eq!(removed, vec![relay]);
        assert_eq!(stats.pass_throughs_collapsed, 1);
        assert_eq!(stats.nodes_removed, removed.len());
        assert_eq!(graph.len(), 3);
    }
}
