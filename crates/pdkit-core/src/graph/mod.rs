//! Mutable patch graph.
//!
//! A [`Graph`] is an ordered node list plus port-indexed [`Connection`]s. A
//! node's [`NodeId`] is its position in the list, which is also the index a
//! `#X connect` statement uses, so building a graph and serializing it needs
//! no renumbering.
//!
//! # Building
//!
//! [`Graph::add`] creates a generic object and looks its port counts up in
//! the graph's [`ObjectRegistry`]. Typed entry points exist for every other
//! node kind. New nodes are positioned by the graph's [`Layout`] unless an
//! explicit position is given.
//!
//! # Structural edits
//!
//! [`Graph::remove`] and [`Graph::insert`] renumber the nodes that follow and
//! rewrite every connection through an old-to-new index table, so a
//! connection never points at the wrong node after an edit.
//!
//! # Example
//!
//! ```rust
//! use pdkit_core::{Graph, GraphError};
//!
//! let mut graph = Graph::new();
//! let osc = graph.add("osc~ 440");
//! let gain = graph.add("*~ 0.3");
//! let dac = graph.add("dac~");
//!
//! graph.link(osc, gain, 0)?;
//! graph.link(gain, dac, 0)?;
//! graph.link(gain.outlet(0), dac, 1)?;
//!
//! // osc~ has a single outlet
//! assert!(matches!(
//!     graph.link(osc.outlet(5), dac, 0),
//!     Err(GraphError::InvalidConnection { .. })
//! ));
//! # Ok::<(), GraphError>(())
//! ```

pub mod edge;
pub mod node;
pub(crate) mod topology;
mod validate;

pub use edge::Connection;
pub use node::{Node, NodeId, NodeKind, Outlet, SubpatchNode};
pub use validate::{ConnectionStats, ValidationReport};

use crate::ast::widget::Widget;
use crate::ast::{ArrayDecl, Atom, CanvasHeader, CanvasKind, Coords, Opaque, Position};
use crate::codec::escape_fields;
use crate::error::{GraphError, Port};
use crate::layout::{self, AutoLayoutOptions, AutoLayoutReport, Layout, Placement};
use crate::registry::ObjectRegistry;

/// Placement and port overrides for [`Graph::add_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AddOptions {
    /// Inlet count, replacing the registry's.
    pub inlets: Option<usize>,
    /// Outlet count, replacing the registry's.
    pub outlets: Option<usize>,
    /// Absolute position. Skips the layout strategy.
    pub position: Option<Position>,
    /// Relative placement, used when `position` is `None`.
    pub placement: Placement,
}

impl AddOptions {
    /// Options placing the node at `position`.
    pub fn at(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Options with explicit port counts.
    pub fn arity(inlets: usize, outlets: usize) -> Self {
        Self {
            inlets: Some(inlets),
            outlets: Some(outlets),
            ..Self::default()
        }
    }
}

/// Options for [`Graph::add_subpatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubpatchOptions {
    /// Inlet count used when the inner graph has no `inlet` objects.
    pub inlets: Option<usize>,
    /// Outlet count used when the inner graph has no `outlet` objects.
    pub outlets: Option<usize>,
    /// Graph-on-parent viewport size.
    pub graph_on_parent: Option<(i32, i32)>,
    /// Hide the name on a graph-on-parent box.
    pub hide_name: bool,
    /// Absolute position. Skips the layout strategy.
    pub position: Option<Position>,
    /// Relative placement, used when `position` is `None`.
    pub placement: Placement,
}

/// An editable patch canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Window header. Subpatch graphs carry a named header.
    pub canvas: CanvasHeader,
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Connection>,
    /// `#N` statements written before the root canvas, e.g. struct templates.
    pub templates: Vec<Opaque>,
    /// Unmodelled statements that come before the first node.
    pub leading: Vec<Opaque>,
    /// Viewport and graph-on-parent settings.
    pub coords: Option<Coords>,
    /// Placement strategy for new nodes.
    pub layout: Layout,
    registry: ObjectRegistry,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty root graph with flow layout.
    pub fn new() -> Self {
        Self::with_layout(Layout::default())
    }

    /// Creates an empty root graph with the given layout.
    pub fn with_layout(layout: impl Into<Layout>) -> Self {
        Self {
            canvas: CanvasHeader::default(),
            nodes: Vec::new(),
            connections: Vec::new(),
            templates: Vec::new(),
            leading: Vec::new(),
            coords: None,
            layout: layout.into(),
            registry: ObjectRegistry::default(),
        }
    }

    /// Replaces the registry used to look up port counts of new objects.
    pub fn set_registry(&mut self, registry: ObjectRegistry) {
        self.registry = registry;
    }

    /// Registry used to look up port counts of new objects.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    // --- Queries ---

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Looks up a node for editing.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Ids of all nodes, in order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Counts `inlet`/`inlet~` and `outlet`/`outlet~` objects.
    pub fn boundary_arity(&self) -> (usize, usize) {
        self.nodes.iter().fold((0, 0), |(i, o), node| {
            (
                i + usize::from(node.kind.is_inlet()),
                o + usize::from(node.kind.is_outlet()),
            )
        })
    }

    // --- Adding nodes ---

    /// Adds a generic object from its box text, e.g. `"osc~ 440"`.
    ///
    /// The text is escaped; port counts come from the registry.
    pub fn add(&mut self, text: &str) -> NodeId {
        self.add_with(text, AddOptions::default())
    }

    /// Adds a generic object with explicit placement or port counts.
    pub fn add_with(&mut self, text: &str, options: AddOptions) -> NodeId {
        let (class, args) = split_text(text);
        self.add_kind(NodeKind::Obj { class, args }, options)
    }

    /// Adds a box that loads an abstraction or external.
    ///
    /// Port counts come from `options`, falling back to the registry, which
    /// may hold discovered abstractions.
    pub fn add_abstraction(&mut self, text: &str, options: AddOptions) -> NodeId {
        let (class, args) = split_text(text);
        self.add_kind(NodeKind::Abstraction { class, args }, options)
    }

    /// Adds a message box.
    pub fn add_msg(&mut self, text: &str) -> NodeId {
        self.add_kind(
            NodeKind::Msg {
                content: escape_fields(text),
            },
            AddOptions::default(),
        )
    }

    /// Adds a comment.
    pub fn add_comment(&mut self, text: &str) -> NodeId {
        self.add_kind(
            NodeKind::Comment {
                content: escape_fields(text),
            },
            AddOptions::default(),
        )
    }

    /// Adds a number box. Label, send and receive are display text.
    pub fn add_float(&mut self, atom: Atom) -> NodeId {
        self.add_kind(NodeKind::FloatAtom(atom.escaped()), AddOptions::default())
    }

    /// Adds a symbol box. Label, send and receive are display text.
    pub fn add_symbol(&mut self, atom: Atom) -> NodeId {
        self.add_kind(NodeKind::SymbolAtom(atom.escaped()), AddOptions::default())
    }

    /// Adds an array definition under a display name.
    pub fn add_array(&mut self, array: ArrayDecl) -> NodeId {
        self.add_kind(NodeKind::Array(array.escaped()), AddOptions::default())
    }

    /// Adds an IEM widget with its full parameter set.
    ///
    /// Label, send and receive are display text and get escaped here, like
    /// the text given to [`Graph::add_msg`].
    pub fn add_gui(&mut self, widget: Widget) -> NodeId {
        self.add_kind(NodeKind::Gui(widget.escaped()), AddOptions::default())
    }

    /// Adds any node kind with the given options.
    ///
    /// Port counts not set in `options` are derived from the payload.
    pub fn add_kind(&mut self, kind: NodeKind, options: AddOptions) -> NodeId {
        let (inlets, outlets) = kind.arity(&self.registry);
        let node = Node {
            position: Position::default(),
            inlets: options.inlets.or(inlets),
            outlets: options.outlets.or(outlets),
            kind,
            trailer: Vec::new(),
        };
        self.push(node, options.position, options.placement)
    }

    /// Adds a subpatch that owns `graph`.
    ///
    /// If the inner graph contains `inlet`/`outlet` objects their counts set
    /// the box's port counts, overriding `options`. A root canvas header on
    /// the inner graph is replaced by a subpatch header named `name`.
    pub fn add_subpatch(&mut self, name: &str, mut graph: Graph, options: SubpatchOptions) -> NodeId {
        let args = escape_fields(name);
        if matches!(graph.canvas.kind, CanvasKind::Root { .. }) {
            let title = args.first().map_or("subpatch", String::as_str);
            graph.canvas = CanvasHeader::subpatch(title);
        }
        if let Some((width, height)) = options.graph_on_parent {
            graph.coords = Some(Coords::graph_on_parent(width, height, options.hide_name));
        }
        let (inner_in, inner_out) = graph.boundary_arity();
        let inlets = if inner_in > 0 {
            inner_in
        } else {
            options.inlets.unwrap_or(0)
        };
        let outlets = if inner_out > 0 {
            inner_out
        } else {
            options.outlets.unwrap_or(0)
        };
        let node = Node {
            position: Position::default(),
            inlets: Some(inlets),
            outlets: Some(outlets),
            kind: NodeKind::Subpatch(Box::new(SubpatchNode {
                class: "pd".to_string(),
                args,
                graph,
            })),
            trailer: Vec::new(),
        };
        self.push(node, options.position, options.placement)
    }

    /// Appends a fully built node at its own position.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let position = node.position;
        self.push(node, Some(position), Placement::default())
    }

    fn push(&mut self, mut node: Node, position: Option<Position>, placement: Placement) -> NodeId {
        let size = node.size();
        node.position = match position {
            Some(position) => {
                self.layout.observe(position, size);
                position
            }
            None => self.layout.place(placement, size),
        };
        let id = NodeId(self.nodes.len());
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_add: node {id} `{}` at {},{}",
            node.kind.text(),
            node.position.x,
            node.position.y
        );
        self.nodes.push(node);
        id
    }

    // --- Connections ---

    /// Connects `source` (a node, meaning outlet 0, or an [`Outlet`]) to
    /// inlet `inlet` of `sink`.
    pub fn link(
        &mut self,
        source: impl Into<Outlet>,
        sink: NodeId,
        inlet: usize,
    ) -> Result<Connection, GraphError> {
        let source = source.into();
        self.connect(source.node, source.index, sink, inlet)
    }

    /// Connects outlet `outlet` of `source` to inlet `inlet` of `sink`.
    ///
    /// Fails with [`GraphError::NodeNotFound`] if either node is missing and
    /// with [`GraphError::InvalidConnection`] if a port exceeds a known count.
    /// Unknown counts are not checked.
    pub fn connect(
        &mut self,
        source: NodeId,
        outlet: usize,
        sink: NodeId,
        inlet: usize,
    ) -> Result<Connection, GraphError> {
        let source_node = self.node(source).ok_or(GraphError::NodeNotFound(source))?;
        let sink_node = self.node(sink).ok_or(GraphError::NodeNotFound(sink))?;
        if let Some(arity) = source_node.outlets.filter(|&n| outlet >= n) {
            return Err(GraphError::InvalidConnection {
                node: source,
                port: Port::Outlet,
                index: outlet,
                arity,
            });
        }
        if let Some(arity) = sink_node.inlets.filter(|&n| inlet >= n) {
            return Err(GraphError::InvalidConnection {
                node: sink,
                port: Port::Inlet,
                index: inlet,
                arity,
            });
        }
        let connection = Connection::new(source, outlet, sink, inlet);
        self.connections.push(connection);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {connection}");
        Ok(connection)
    }

    /// Removes the first connection equal to `connection`.
    ///
    /// Returns `false` if there was none.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let Some(at) = self.connections.iter().position(|c| c == connection) else {
            return false;
        };
        self.connections.remove(at);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {connection}");
        true
    }

    // --- Structural edits ---

    /// Removes a node and its connections, renumbering the nodes after it.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if id.0 >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(id));
        }
        let mut keep = vec![true; self.nodes.len()];
        keep[id.0] = false;
        let (mut removed, _) = self.retain_nodes(&keep);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        removed.pop().ok_or(GraphError::NodeNotFound(id))
    }

    /// Inserts `node` so that it gets id `at`, shifting later nodes up by one.
    ///
    /// `at` may equal the node count to append.
    pub fn insert(&mut self, at: NodeId, node: Node) -> Result<NodeId, GraphError> {
        if at.0 > self.nodes.len() {
            return Err(GraphError::NodeNotFound(at));
        }
        self.nodes.insert(at.0, node);
        let shift = |id: NodeId| if id >= at { NodeId(id.0 + 1) } else { id };
        for c in &mut self.connections {
            c.source = shift(c.source);
            c.sink = shift(c.sink);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_insert: node {at}");
        Ok(at)
    }

    /// Drops every node whose `keep` flag is false, along with its
    /// connections, and remaps the survivors through an old-to-new table.
    ///
    /// Returns the removed nodes in order and the number of connections
    /// dropped. Layout anchors are reset since they may refer to removed
    /// nodes.
    pub(crate) fn retain_nodes(&mut self, keep: &[bool]) -> (Vec<Node>, usize) {
        debug_assert_eq!(keep.len(), self.nodes.len());
        let mut old_to_new: Vec<Option<NodeId>> = Vec::with_capacity(self.nodes.len());
        let mut next = 0;
        for &k in keep {
            old_to_new.push(k.then(|| {
                next += 1;
                NodeId(next - 1)
            }));
        }
        if next == self.nodes.len() {
            return (Vec::new(), 0);
        }

        let mut removed = Vec::with_capacity(self.nodes.len() - next);
        let mut kept = Vec::with_capacity(next);
        for (node, &k) in std::mem::take(&mut self.nodes).into_iter().zip(keep) {
            if k {
                kept.push(node);
            } else {
                removed.push(node);
            }
        }
        self.nodes = kept;

        let before = self.connections.len();
        self.connections = self
            .connections
            .iter()
            .filter_map(|c| {
                let source = old_to_new.get(c.source.0).copied().flatten()?;
                let sink = old_to_new.get(c.sink.0).copied().flatten()?;
                Some(Connection::new(source, c.outlet, sink, c.inlet))
            })
            .collect();
        self.layout.reset();
        (removed, before - self.connections.len())
    }

    // --- Layout ---

    /// Repositions every node by connection depth. See [`layout::auto_layout`].
    pub fn auto_layout(&mut self, options: &AutoLayoutOptions) -> AutoLayoutReport {
        layout::auto_layout(self, options)
    }
}

/// Splits box text into escaped class and arguments.
fn split_text(text: &str) -> (String, Vec<String>) {
    let mut fields = escape_fields(text).into_iter();
    let class = fields.next().unwrap_or_default();
    (class, fields.collect())
}
