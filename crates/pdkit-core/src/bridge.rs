//! Conversion between the immutable tree and the editable graph.
//!
//! The two models share node payloads, positions, connection indices,
//! subpatch nesting and canvas metadata, and convert without loss with one
//! exception: declare statements are dropped by [`to_graph`].
//!
//! Unmodelled statements ride along with the node they follow, so `#X f`
//! box widths and `#A` array data stay attached to their box.

use crate::ast::{
    self, AtomBox, Connect, Element, GuiBox, MsgBox, ObjBox, Patch, Restore, Subpatch,
};
use crate::error::GraphError;
use crate::graph::{Connection, Graph, Node, NodeId, NodeKind, SubpatchNode};
use crate::registry::ObjectRegistry;

/// Builds a patch tree from a graph.
///
/// Per canvas the order is: leading unmodelled statements, nodes with their
/// trailing statements, connections, then coords.
pub fn to_tree(graph: &Graph) -> Patch {
    Patch {
        preamble: graph.templates.clone(),
        canvas: graph.canvas.clone(),
        elements: canvas_elements(graph),
    }
}

fn canvas_elements(graph: &Graph) -> Vec<Element> {
    let trailing: usize = graph.nodes().iter().map(|n| n.trailer.len()).sum();
    let mut elements = Vec::with_capacity(
        graph.leading.len() + graph.len() + trailing + graph.connections().len() + 1,
    );
    elements.extend(graph.leading.iter().cloned().map(Element::Opaque));
    for node in graph.nodes() {
        elements.push(node_element(node));
        elements.extend(node.trailer.iter().cloned().map(Element::Opaque));
    }
    elements.extend(graph.connections().iter().map(|c| {
        Element::Connect(Connect {
            source: c.source.index(),
            outlet: c.outlet,
            sink: c.sink.index(),
            inlet: c.inlet,
        })
    }));
    if let Some(coords) = &graph.coords {
        elements.push(Element::Coords(coords.clone()));
    }
    elements
}

fn node_element(node: &Node) -> Element {
    let position = node.position;
    match &node.kind {
        NodeKind::Obj { class, args } | NodeKind::Abstraction { class, args } => {
            Element::Obj(ObjBox {
                position,
                class: class.clone(),
                args: args.clone(),
            })
        }
        NodeKind::Msg { content } => Element::Msg(MsgBox {
            position,
            content: content.clone(),
        }),
        NodeKind::Comment { content } => Element::Text(ast::Comment {
            position,
            content: content.clone(),
        }),
        NodeKind::FloatAtom(atom) => Element::FloatAtom(AtomBox {
            position,
            atom: atom.clone(),
        }),
        NodeKind::SymbolAtom(atom) => Element::SymbolAtom(AtomBox {
            position,
            atom: atom.clone(),
        }),
        NodeKind::Array(array) => Element::Array(array.clone()),
        NodeKind::Subpatch(sub) => Element::Subpatch(Subpatch {
            canvas: sub.graph.canvas.clone(),
            elements: canvas_elements(&sub.graph),
            restore: Restore {
                position,
                class: sub.class.clone(),
                args: sub.args.clone(),
            },
        }),
        NodeKind::Gui(widget) => Element::Gui(GuiBox {
            position,
            widget: widget.clone(),
        }),
    }
}

/// Builds a graph from a patch tree, using vanilla port counts.
///
/// Connection endpoints must exist; port numbers are taken as written and
/// can be checked afterwards with [`Graph::validate`].
pub fn to_graph(patch: &Patch) -> Result<Graph, GraphError> {
    to_graph_with(patch, &ObjectRegistry::default())
}

/// Like [`to_graph`], looking port counts up in `registry`.
///
/// Objects whose class was added to the registry become
/// [`NodeKind::Abstraction`] nodes.
pub fn to_graph_with(patch: &Patch, registry: &ObjectRegistry) -> Result<Graph, GraphError> {
    let mut graph = canvas_graph(&patch.canvas, &patch.elements, registry)?;
    graph.templates = patch.preamble.clone();
    Ok(graph)
}

fn canvas_graph(
    canvas: &ast::CanvasHeader,
    elements: &[Element],
    registry: &ObjectRegistry,
) -> Result<Graph, GraphError> {
    let mut graph = Graph::new();
    graph.canvas = canvas.clone();
    graph.set_registry(registry.clone());
    let mut connects = Vec::new();

    for element in elements {
        let kind = match element {
            Element::Obj(o) if registry.is_external(&o.class) => NodeKind::Abstraction {
                class: o.class.clone(),
                args: o.args.clone(),
            },
            Element::Obj(o) => NodeKind::Obj {
                class: o.class.clone(),
                args: o.args.clone(),
            },
            Element::Msg(m) => NodeKind::Msg {
                content: m.content.clone(),
            },
            Element::Text(t) => NodeKind::Comment {
                content: t.content.clone(),
            },
            Element::FloatAtom(a) => NodeKind::FloatAtom(a.atom.clone()),
            Element::SymbolAtom(a) => NodeKind::SymbolAtom(a.atom.clone()),
            Element::Array(a) => NodeKind::Array(a.clone()),
            Element::Gui(g) => NodeKind::Gui(g.widget.clone()),
            Element::Subpatch(s) => NodeKind::Subpatch(Box::new(SubpatchNode {
                class: s.restore.class.clone(),
                args: s.restore.args.clone(),
                graph: canvas_graph(&s.canvas, &s.elements, registry)?,
            })),
            Element::Declare(_) => continue,
            Element::Coords(c) => {
                graph.coords = Some(c.clone());
                continue;
            }
            Element::Connect(c) => {
                connects.push(*c);
                continue;
            }
            Element::Opaque(o) => {
                match graph.nodes.last_mut() {
                    Some(node) => node.trailer.push(o.clone()),
                    None => graph.leading.push(o.clone()),
                }
                continue;
            }
        };
        let (inlets, outlets) = kind.arity(registry);
        graph.nodes.push(Node {
            position: element.position().unwrap_or_default(),
            inlets,
            outlets,
            kind,
            trailer: Vec::new(),
        });
    }

    let count = graph.len();
    for c in connects {
        for end in [c.source, c.sink] {
            if end >= count {
                return Err(GraphError::NodeNotFound(NodeId::new(end)));
            }
        }
        graph.connections.push(Connection::new(
            NodeId::new(c.source),
            c.outlet,
            NodeId::new(c.sink),
            c.inlet,
        ));
    }

    // continue flow placement below the last loaded node
    if let Some(last) = graph.nodes.last() {
        let (position, size) = (last.position, last.size());
        graph.layout.observe(position, size);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "to_graph: {} nodes, {} connections",
        graph.len(),
        graph.connections().len()
    );
    Ok(graph)
}
