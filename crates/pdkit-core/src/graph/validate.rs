//! Connection checks, cycle reporting and connection statistics.

use crate::error::{CycleWarning, GraphError, Port};

use super::Graph;
use super::node::NodeId;
use super::topology::{self, Adjacency};

/// Result of [`Graph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Connections with a missing endpoint or an out-of-range port.
    pub errors: Vec<GraphError>,
    /// Feedback loops. Legal, so never counted as errors.
    pub cycles: Vec<CycleWarning>,
}

impl ValidationReport {
    /// Returns `true` when no connection is broken. Cycles do not count.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Summary numbers for a graph's connections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStats {
    /// Number of connections.
    pub total_connections: usize,
    /// Nodes with at least one connection.
    pub nodes_with_connections: usize,
    /// Highest inlet number in use.
    pub max_inlet_used: usize,
    /// Highest outlet number in use.
    pub max_outlet_used: usize,
    /// Percentage of nodes with a known inlet or outlet count, one decimal.
    pub arity_coverage: f64,
}

impl Graph {
    /// Checks every connection against the node list and known port counts.
    ///
    /// With `check_cycles`, also lists directed cycles as warnings; each one
    /// is logged at `warn` level when the `tracing` feature is on.
    pub fn validate(&self, check_cycles: bool) -> ValidationReport {
        let mut report = ValidationReport::default();
        for c in &self.connections {
            let (Some(source), Some(sink)) = (self.node(c.source), self.node(c.sink)) else {
                let missing = if self.node(c.source).is_none() {
                    c.source
                } else {
                    c.sink
                };
                report.errors.push(GraphError::NodeNotFound(missing));
                continue;
            };
            if let Some(arity) = source.outlets.filter(|&n| c.outlet >= n) {
                report.errors.push(GraphError::InvalidConnection {
                    node: c.source,
                    port: Port::Outlet,
                    index: c.outlet,
                    arity,
                });
            }
            if let Some(arity) = sink.inlets.filter(|&n| c.inlet >= n) {
                report.errors.push(GraphError::InvalidConnection {
                    node: c.sink,
                    port: Port::Inlet,
                    index: c.inlet,
                    arity,
                });
            }
        }

        if check_cycles {
            report.cycles = self
                .detect_cycles()
                .into_iter()
                .map(|cycle| CycleWarning {
                    nodes: cycle.into_iter().map(NodeId).collect(),
                })
                .collect();
            #[cfg(feature = "tracing")]
            for warning in &report.cycles {
                tracing::warn!("{warning}");
            }
        }
        report
    }

    /// Directed cycles as node index paths, first node repeated at the end.
    ///
    /// One cycle is reported per feedback cord found by a depth-first walk in
    /// node order, so overlapping loops may share nodes.
    pub fn detect_cycles(&self) -> Vec<Vec<usize>> {
        topology::cycles(&Adjacency::new(self.nodes.len(), &self.connections))
    }

    /// Connection totals and port usage.
    pub fn connection_stats(&self) -> ConnectionStats {
        if self.connections.is_empty() {
            return ConnectionStats::default();
        }
        let mut connected = vec![false; self.nodes.len()];
        let mut stats = ConnectionStats {
            total_connections: self.connections.len(),
            ..ConnectionStats::default()
        };
        for c in &self.connections {
            for end in [c.source, c.sink] {
                if let Some(flag) = connected.get_mut(end.index()) {
                    *flag = true;
                }
            }
            stats.max_inlet_used = stats.max_inlet_used.max(c.inlet);
            stats.max_outlet_used = stats.max_outlet_used.max(c.outlet);
        }
        stats.nodes_with_connections = connected.iter().filter(|&&c| c).count();
        if !self.nodes.is_empty() {
            let known = self
                .nodes
                .iter()
                .filter(|n| n.inlets.is_some() || n.outlets.is_some())
                .count();
            let percent = known as f64 / self.nodes.len() as f64 * 100.0;
            stats.arity_coverage = (percent * 10.0).round() / 10.0;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, Node, NodeKind};

    #[test]
    fn valid_graph_has_empty_report() {
        let mut graph = Graph::new();
        let osc = graph.add("osc~ 440");
        let dac = graph.add("dac~");
        graph.link(osc, dac, 0).unwrap();
        graph.link(osc, dac, 1).unwrap();
        let report = graph.validate(true);
        assert!(report.is_ok());
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn reports_out_of_range_ports() {
        let mut graph = Graph::new();
        let osc = graph.add("osc~");
        let dac = graph.add("dac~");
        // bypass link's checks the way a loaded file would
        graph.connections.push(Connection::new(osc, 3, dac, 2));
        let report = graph.validate(false);
        assert_eq!(
            report.errors,
            vec![
                GraphError::InvalidConnection {
                    node: osc,
                    port: Port::Outlet,
                    index: 3,
                    arity: 1,
                },
                GraphError::InvalidConnection {
                    node: dac,
                    port: Port::Inlet,
                    index: 2,
                    arity: 2,
                },
            ]
        );
    }

    #[test]
    fn reports_missing_nodes() {
        let mut graph = Graph::new();
        let a = graph.add("f");
        graph
            .connections
            .push(Connection::new(a, 0, NodeId::new(9), 0));
        let report = graph.validate(false);
        assert_eq!(report.errors, vec![GraphError::NodeNotFound(NodeId::new(9))]);
    }

    #[test]
    fn cycles_are_warnings() {
        let mut graph = Graph::new();
        let read = graph.add("delread~ fb");
        let mix = graph.add("+~");
        let write = graph.add("f");
        graph.link(read, mix, 0).unwrap();
        graph.link(mix, write, 0).unwrap();
        graph.link(write, read, 0).unwrap();
        let report = graph.validate(true);
        assert!(report.is_ok());
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].to_string(), "cycle detected: 0 -> 1 -> 2 -> 0");
        assert!(graph.validate(false).cycles.is_empty());
    }

    #[test]
    fn stats_cover_ports_and_arity() {
        let mut graph = Graph::new();
        let osc = graph.add("osc~ 440");
        let dac = graph.add("dac~");
        graph.add_node(Node::new(NodeKind::obj("mystery", Vec::new())));
        graph.link(osc, dac, 1).unwrap();
        let stats = graph.connection_stats();
        assert_eq!(stats.total_connections, 1);
        assert_eq!(stats.nodes_with_connections, 2);
        assert_eq!(stats.max_inlet_used, 1);
        assert_eq!(stats.max_outlet_used, 0);
        assert_eq!(stats.arity_coverage, 66.7);
    }

    #[test]
    fn stats_of_unconnected_graph_are_zero() {
        let mut graph = Graph::new();
        graph.add("f");
        assert_eq!(graph.connection_stats(), ConnectionStats::default());
    }
}
