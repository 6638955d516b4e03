//! Graph node types.
//!
//! Each node in a [`Graph`](super::Graph) has a [`NodeKind`] payload, a canvas
//! position and optional port counts. Free-form text is stored escaped, exactly
//! as it appears in the patch file.

use core::fmt;

use crate::ast::widget::{self, Widget};
use crate::ast::{ArrayDecl, Atom, INLET_CLASSES, OUTLET_CLASSES, Opaque, Position};
use crate::codec::unescape;
use crate::registry::ObjectRegistry;

use super::Graph;

/// Columns after which box text wraps.
pub const TEXT_WRAP_WIDTH: usize = 60;
/// Pixels per character of box text.
pub const CHAR_WIDTH: i32 = 6;
/// Narrowest object box.
pub const MIN_BOX_WIDTH: i32 = 50;
/// Horizontal padding inside a box.
pub const BOX_PADDING: i32 = 20;
/// Pixels per line of box text.
pub const LINE_HEIGHT: i32 = 15;
/// Vertical padding inside a box.
pub const BOX_BASE_HEIGHT: i32 = 10;
/// Height of atom and subpatch boxes.
pub const ROW_HEIGHT: i32 = 25;
/// Width of a number box.
pub const FLOAT_ATOM_WIDTH: i32 = 50;

/// Position of a node in its graph's node list.
///
/// This is also the index `#X connect` statements use. Removing or inserting
/// nodes renumbers the ids that follow; the graph remaps its own connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates an id from a raw index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// Handle for outlet `index` of this node.
    #[inline]
    pub fn outlet(self, index: usize) -> Outlet {
        Outlet { node: self, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node and one of its outlets, used as a connection source.
///
/// Only a lookup pair: holding one does not borrow the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Outlet {
    /// Source node.
    pub node: NodeId,
    /// Outlet number on the source.
    pub index: usize,
}

impl From<NodeId> for Outlet {
    fn from(node: NodeId) -> Self {
        node.outlet(0)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Generic object box.
    Obj {
        /// Class name, escaped.
        class: String,
        /// Creation arguments, escaped.
        args: Vec<String>,
    },
    /// Object box that loads an abstraction or external.
    Abstraction {
        /// Abstraction name, escaped.
        class: String,
        /// Creation arguments, escaped.
        args: Vec<String>,
    },
    /// Message box.
    Msg {
        /// Message atoms, escaped.
        content: Vec<String>,
    },
    /// Comment.
    Comment {
        /// Comment words, escaped.
        content: Vec<String>,
    },
    /// Number box.
    FloatAtom(Atom),
    /// Symbol box.
    SymbolAtom(Atom),
    /// Array definition.
    Array(ArrayDecl),
    /// Nested canvas.
    Subpatch(Box<SubpatchNode>),
    /// IEM GUI object.
    Gui(Widget),
}

/// A subpatch box and the graph it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct SubpatchNode {
    /// Box class, `pd` or `graph`.
    pub class: String,
    /// Box arguments, normally the name.
    pub args: Vec<String>,
    /// Inner graph. Its canvas header carries the window geometry.
    pub graph: Graph,
}

impl NodeKind {
    /// Generic object from escaped class and arguments.
    pub fn obj(class: impl Into<String>, args: Vec<String>) -> Self {
        Self::Obj {
            class: class.into(),
            args,
        }
    }

    /// Object class, for generic objects, abstractions, widgets and subpatches.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Obj { class, .. } | Self::Abstraction { class, .. } => Some(class),
            Self::Subpatch(sub) => Some(&sub.class),
            Self::Gui(w) => Some(w.class_name()),
            _ => None,
        }
    }

    /// Creation arguments of generic objects and abstractions.
    pub fn args(&self) -> &[String] {
        match self {
            Self::Obj { args, .. } | Self::Abstraction { args, .. } => args,
            Self::Subpatch(sub) => &sub.args,
            _ => &[],
        }
    }

    /// Box text as stored, class and arguments or message/comment content.
    pub fn text(&self) -> String {
        let words: Vec<&str> = match self {
            Self::Obj { class, args } | Self::Abstraction { class, args } => {
                core::iter::once(class.as_str())
                    .chain(args.iter().map(String::as_str))
                    .collect()
            }
            Self::Subpatch(sub) => core::iter::once(sub.class.as_str())
                .chain(sub.args.iter().map(String::as_str))
                .collect(),
            Self::Msg { content } | Self::Comment { content } => {
                content.iter().map(String::as_str).collect()
            }
            Self::Gui(w) => vec![w.class_name()],
            Self::Array(a) => vec![a.name.as_str()],
            Self::FloatAtom(_) | Self::SymbolAtom(_) => Vec::new(),
        };
        words.join(" ")
    }

    /// Returns `true` for a generic `inlet` or `inlet~` object.
    pub fn is_inlet(&self) -> bool {
        matches!(self, Self::Obj { class, .. } if INLET_CLASSES.contains(&class.as_str()))
    }

    /// Returns `true` for a generic `outlet` or `outlet~` object.
    pub fn is_outlet(&self) -> bool {
        matches!(self, Self::Obj { class, .. } if OUTLET_CLASSES.contains(&class.as_str()))
    }

    /// Returns `true` if a send or receive symbol makes the node live even
    /// without cords.
    ///
    /// Covers atom boxes, IEM widgets, and send/receive-family objects given
    /// a name.
    pub fn has_active_names(&self) -> bool {
        match self {
            Self::FloatAtom(a) | Self::SymbolAtom(a) => a.has_active_names(),
            Self::Gui(w) => w.has_active_names(),
            Self::Obj { class, args } => {
                crate::ast::SEND_RECEIVE_CLASSES.contains(&class.as_str())
                    && args.first().is_some_and(|a| widget::is_active_name(a))
            }
            _ => false,
        }
    }

    /// Port counts implied by the payload alone.
    pub fn arity(&self, registry: &ObjectRegistry) -> (Option<usize>, Option<usize>) {
        match self {
            Self::Obj { class, args } | Self::Abstraction { class, args } => {
                registry.arity(class, args.len())
            }
            Self::Msg { .. } | Self::FloatAtom(_) | Self::SymbolAtom(_) => (Some(1), Some(1)),
            Self::Comment { .. } | Self::Array(_) => (Some(0), Some(0)),
            Self::Subpatch(sub) => {
                let (inlets, outlets) = sub.graph.boundary_arity();
                (Some(inlets), Some(outlets))
            }
            Self::Gui(w) => {
                let (inlets, outlets) = w.arity();
                (Some(inlets), Some(outlets))
            }
        }
    }
}

/// One placed element of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Canvas position.
    pub position: Position,
    /// Inlet count, `None` when unknown or variable.
    pub inlets: Option<usize>,
    /// Outlet count, `None` when unknown or variable.
    pub outlets: Option<usize>,
    /// Payload.
    pub kind: NodeKind,
    /// Unmodelled statements written right after this node, such as `#X f`
    /// box widths or `#A` array data.
    pub trailer: Vec<Opaque>,
}

impl Node {
    /// Node at the origin with port counts taken from the vanilla registry.
    pub fn new(kind: NodeKind) -> Self {
        let (inlets, outlets) = kind.arity(&ObjectRegistry::default());
        Self {
            position: Position::default(),
            inlets,
            outlets,
            kind,
            trailer: Vec::new(),
        }
    }

    /// Moves the node.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Overrides the port counts.
    #[must_use]
    pub fn with_arity(mut self, inlets: Option<usize>, outlets: Option<usize>) -> Self {
        self.inlets = inlets;
        self.outlets = outlets;
        self
    }

    /// On-canvas size in pixels, used by flow layout.
    pub fn size(&self) -> (i32, i32) {
        match &self.kind {
            NodeKind::Obj { .. }
            | NodeKind::Abstraction { .. }
            | NodeKind::Msg { .. }
            | NodeKind::Comment { .. } => text_box_size(&self.kind.text()),
            NodeKind::FloatAtom(_) => (FLOAT_ATOM_WIDTH, ROW_HEIGHT),
            NodeKind::SymbolAtom(a) => (a.width * CHAR_WIDTH, ROW_HEIGHT),
            NodeKind::Array(_) => (0, 0),
            NodeKind::Subpatch(sub) => match &sub.graph.coords {
                Some(c) if c.graph_on_parent != 0 => (c.width, c.height),
                _ => {
                    let label = self.kind.text();
                    let chars = i32::try_from(label.chars().count()).unwrap_or(i32::MAX);
                    (
                        MIN_BOX_WIDTH.max(BOX_PADDING.saturating_add(chars.saturating_mul(CHAR_WIDTH))),
                        ROW_HEIGHT,
                    )
                }
            },
            NodeKind::Gui(w) => w.size(),
        }
    }
}

/// Size of a text box showing `text` (escaped).
fn text_box_size(text: &str) -> (i32, i32) {
    let lines = display_lines(&unescape(text));
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let widest = i32::try_from(widest).unwrap_or(i32::MAX);
    let count = i32::try_from(lines.len()).unwrap_or(i32::MAX);
    (
        MIN_BOX_WIDTH.max(BOX_PADDING.saturating_add(widest.saturating_mul(CHAR_WIDTH))),
        BOX_BASE_HEIGHT.saturating_add(LINE_HEIGHT.saturating_mul(count)),
    )
}

/// Greedy word wrap at [`TEXT_WRAP_WIDTH`] columns.
///
/// Words longer than a line are split hard.
pub(crate) fn display_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for source in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in source.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > TEXT_WRAP_WIDTH {
                if len > 0 {
                    lines.push(core::mem::take(&mut line));
                    len = 0;
                }
                let rest = chars.split_off(TEXT_WRAP_WIDTH);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            let needed = if len == 0 { chars.len() } else { len + 1 + chars.len() };
            if needed > TEXT_WRAP_WIDTH {
                lines.push(core::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            len += chars.len();
            line.extend(chars);
        }
        if len > 0 {
            lines.push(line);
        }
    }
    lines
}
