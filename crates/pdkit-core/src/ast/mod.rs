//! Immutable tree representation of a patch.
//!
//! A [`Patch`] is a value: every rewrite produces a new tree, and subpatches own
//! their children outright, so no two trees ever share a mutable list.
//!
//! Free-form fields (object arguments, message content, labels) are stored in
//! their escaped on-disk form. Use [`crate::unescape`] for display text.
//!
//! # Indexing
//!
//! `#X connect` statements address the *indexed* elements of their canvas by
//! declaration order. Declare, coords, connect and opaque statements are not
//! indexed, so adding or removing them never shifts a connection.
//!
//! # Example
//!
//! ```rust
//! use pdkit_core::{parse, Element};
//!
//! let patch = parse("#N canvas 0 50 450 300 12;\n#X obj 10 10 osc~ 440;\n").unwrap();
//! let oscillators: Vec<_> = patch
//!     .find(|e| e.class_name() == Some("osc~"))
//!     .collect();
//! assert_eq!(oscillators.len(), 1);
//!
//! // Drop every object, keep the rest.
//! let empty = patch.transform(|e| match e {
//!     Element::Obj(_) => None,
//!     other => Some(other),
//! });
//! assert!(empty.elements.is_empty());
//! ```

mod query;
pub mod widget;

pub use query::{Find, SEND_RECEIVE_CLASSES, infer_arity};

use widget::Widget;

use crate::codec::escape_symbol;

/// Object classes that define a subpatch's inlets.
pub const INLET_CLASSES: [&str; 2] = ["inlet", "inlet~"];

/// Object classes that define a subpatch's outlets.
pub const OUTLET_CLASSES: [&str; 2] = ["outlet", "outlet~"];

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Placement on a canvas, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Position {
    /// Creates a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// `#N canvas` header: window geometry plus root font or subpatch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasHeader {
    /// Window x position.
    pub x: i32,
    /// Window y position.
    pub y: i32,
    /// Window width.
    pub width: i32,
    /// Window height.
    pub height: i32,
    /// Trailing fields, distinguished by field count.
    pub kind: CanvasKind,
}

/// The two canvas header shapes.
///
/// The shape is decided by field count alone: a numeric name such as `42` is
/// still a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasKind {
    /// `#N canvas x y w h font;`
    Root {
        /// Patch font size.
        font_size: i32,
    },
    /// `#N canvas x y w h name open;`
    Named {
        /// Subpatch name, escaped.
        name: String,
        /// Whether the window opens on load.
        open_on_load: i32,
    },
}

impl Default for CanvasHeader {
    fn default() -> Self {
        Self {
            x: 0,
            y: 50,
            width: 1000,
            height: 600,
            kind: CanvasKind::Root { font_size: 10 },
        }
    }
}

impl CanvasHeader {
    /// Default header for a subpatch window called `name`.
    pub fn subpatch(name: impl Into<String>) -> Self {
        Self {
            x: 0,
            y: 0,
            width: 300,
            height: 180,
            kind: CanvasKind::Named {
                name: name.into(),
                open_on_load: 0,
            },
        }
    }

    /// Subpatch name, if this is a named header.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            CanvasKind::Named { name, .. } => Some(name),
            CanvasKind::Root { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// `#X obj x y class args...;` that is not an IEM widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjBox {
    /// Box position.
    pub position: Position,
    /// Object class, empty for an empty box.
    pub class: String,
    /// Creation arguments, escaped.
    pub args: Vec<String>,
}

impl ObjBox {
    /// Class and arguments joined as they appear in the box.
    pub fn text(&self) -> String {
        let mut text = self.class.clone();
        for arg in &self.args {
            text.push(' ');
            text.push_str(arg);
        }
        text
    }
}

/// `#X msg x y content...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgBox {
    /// Box position.
    pub position: Position,
    /// Message atoms, escaped.
    pub content: Vec<String>,
}

/// `#X text x y content...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment position.
    pub position: Position,
    /// Comment words, escaped.
    pub content: Vec<String>,
}

/// Parameters shared by `floatatom` and `symbolatom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Box width in characters.
    pub width: i32,
    /// Lower clip bound, `0` with `upper` for none.
    pub lower: f64,
    /// Upper clip bound.
    pub upper: f64,
    /// Label side: 0 left, 1 right, 2 top, 3 bottom.
    pub label_pos: i32,
    /// Label symbol, `-` for none.
    pub label: String,
    /// Receive symbol, `-` for none.
    pub receive: String,
    /// Send symbol, `-` for none.
    pub send: String,
    /// Fields written by newer Pd versions (font size, ...), kept verbatim.
    pub extra: Vec<String>,
}

impl Atom {
    fn with_width(width: i32) -> Self {
        Self {
            width,
            lower: 0.0,
            upper: 0.0,
            label_pos: 0,
            label: "-".to_string(),
            receive: "-".to_string(),
            send: "-".to_string(),
            extra: Vec::new(),
        }
    }

    /// Default number box parameters.
    pub fn float() -> Self {
        Self::with_width(5)
    }

    /// Default symbol box parameters.
    pub fn symbol() -> Self {
        Self::with_width(10)
    }

    /// Returns `true` if a send or receive symbol is set.
    pub fn has_active_names(&self) -> bool {
        widget::is_active_name(&self.send) || widget::is_active_name(&self.receive)
    }

    /// Treats label, receive and send as display text and escapes each into
    /// a single field. Empty strings become `-`.
    pub fn escaped(mut self) -> Self {
        for field in [&mut self.label, &mut self.receive, &mut self.send] {
            *field = escape_symbol(field, "-");
        }
        self
    }
}

/// `#X floatatom` / `#X symbolatom` with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomBox {
    /// Box position.
    pub position: Position,
    /// Atom parameters.
    pub atom: Atom,
}

/// `#X array name size type flags;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecl {
    /// Array name, escaped.
    pub name: String,
    /// Element count.
    pub size: usize,
    /// Element type, normally `float`.
    pub element_type: String,
    /// Save and draw flags.
    pub flags: i32,
    /// Trailing fields, kept verbatim.
    pub extra: Vec<String>,
}

impl ArrayDecl {
    /// A saved float array of `size` elements.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            element_type: "float".to_string(),
            flags: 3,
            extra: Vec::new(),
        }
    }

    /// Escapes a display name into a single field.
    pub fn escaped(mut self) -> Self {
        self.name = escape_symbol(&self.name, "array1");
        self
    }
}

/// `#X declare args...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declare {
    /// Flag/value pairs such as `-path abs`.
    pub args: Vec<String>,
}

impl Declare {
    /// Values following each `-path` flag.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.args
            .windows(2)
            .filter(|pair| pair[0] == "-path")
            .map(|pair| pair[1].as_str())
    }
}

/// `#X coords` viewport and graph-on-parent settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Coords {
    /// Left edge of the value range.
    pub x_from: f64,
    /// Top edge of the value range.
    pub y_from: f64,
    /// Right edge of the value range.
    pub x_to: f64,
    /// Bottom edge of the value range.
    pub y_to: f64,
    /// Viewport width in pixels.
    pub width: i32,
    /// Viewport height in pixels.
    pub height: i32,
    /// 0 off, 1 graph on parent, 2 graph on parent with hidden name.
    pub graph_on_parent: i32,
    /// Viewport margin, written by Pd 0.38 and later.
    pub margin: Option<(i32, i32)>,
    /// Trailing fields, kept verbatim.
    pub extra: Vec<String>,
}

impl Coords {
    /// Graph-on-parent viewport of the given size.
    pub fn graph_on_parent(width: i32, height: i32, hide_name: bool) -> Self {
        Self {
            x_from: 0.0,
            y_from: -1.0,
            x_to: 1.0,
            y_to: 1.0,
            width,
            height,
            graph_on_parent: if hide_name { 2 } else { 1 },
            margin: Some((0, 0)),
            extra: Vec::new(),
        }
    }
}

/// `#X restore x y class args...;` closing a subpatch canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restore {
    /// Position of the subpatch box in its parent.
    pub position: Position,
    /// Box class, `pd` or `graph`.
    pub class: String,
    /// Box arguments, normally the subpatch name.
    pub args: Vec<String>,
}

/// A nested canvas and the box that shows it in the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpatch {
    /// Inner window header.
    pub canvas: CanvasHeader,
    /// Inner statements.
    pub elements: Vec<Element>,
    /// Closing statement, carries the parent-side position.
    pub restore: Restore,
}

impl Subpatch {
    /// Name shown on the box.
    pub fn name(&self) -> Option<&str> {
        self.restore
            .args
            .first()
            .map(String::as_str)
            .or_else(|| self.canvas.name())
    }

    /// Returns `true` if a coords statement enables graph-on-parent.
    pub fn graph_on_parent(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Coords(c) if c.graph_on_parent != 0))
    }
}

/// An IEM widget with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiBox {
    /// Widget position.
    pub position: Position,
    /// Widget parameters.
    pub widget: Widget,
}

/// `#X connect source outlet sink inlet;`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connect {
    /// Indexed element that sends.
    pub source: usize,
    /// Outlet on the source.
    pub outlet: usize,
    /// Indexed element that receives.
    pub sink: usize,
    /// Inlet on the sink.
    pub inlet: usize,
}

/// A statement the codec does not model, kept field for field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    /// All fields, including the record tag.
    pub fields: Vec<String>,
}

impl Opaque {
    /// Record tag, e.g. `#A`.
    pub fn record(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }
}

/// One statement in a canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Generic object box.
    Obj(ObjBox),
    /// Message box.
    Msg(MsgBox),
    /// Number box.
    FloatAtom(AtomBox),
    /// Symbol box.
    SymbolAtom(AtomBox),
    /// Comment.
    Text(Comment),
    /// Array definition.
    Array(ArrayDecl),
    /// Search-path declaration, never indexed.
    Declare(Declare),
    /// Viewport settings, never indexed.
    Coords(Coords),
    /// Nested canvas.
    Subpatch(Subpatch),
    /// IEM GUI object.
    Gui(GuiBox),
    /// Connection, never indexed.
    Connect(Connect),
    /// Unmodelled statement, never indexed.
    Opaque(Opaque),
}

impl Element {
    /// Returns `true` if the element takes a slot in connection indexing.
    pub fn is_indexed(&self) -> bool {
        !matches!(
            self,
            Self::Declare(_) | Self::Coords(_) | Self::Connect(_) | Self::Opaque(_)
        )
    }

    /// Canvas position, for placed elements.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Obj(o) => Some(o.position),
            Self::Msg(m) => Some(m.position),
            Self::FloatAtom(a) | Self::SymbolAtom(a) => Some(a.position),
            Self::Text(t) => Some(t.position),
            Self::Subpatch(s) => Some(s.restore.position),
            Self::Gui(g) => Some(g.position),
            Self::Array(_) | Self::Declare(_) | Self::Coords(_) | Self::Connect(_) => None,
            Self::Opaque(_) => None,
        }
    }

    /// Object class for boxes that have one: generic objects, widgets and
    /// subpatches (`pd` / `graph`).
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Obj(o) => Some(&o.class),
            Self::Gui(g) => Some(g.widget.class_name()),
            Self::Subpatch(s) => Some(&s.restore.class),
            _ => None,
        }
    }

    /// Nested elements of a subpatch, empty otherwise.
    pub fn children(&self) -> &[Element] {
        match self {
            Self::Subpatch(s) => &s.elements,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A parsed patch: root canvas plus its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// `#N` statements before the root canvas, e.g. `#N struct` templates.
    pub preamble: Vec<Opaque>,
    /// Root canvas header.
    pub canvas: CanvasHeader,
    /// Top-level statements in file order.
    pub elements: Vec<Element>,
}

impl Default for Patch {
    fn default() -> Self {
        Self::new(CanvasHeader::default(), Vec::new())
    }
}

impl Patch {
    /// Creates a patch with no preamble.
    pub fn new(canvas: CanvasHeader, elements: Vec<Element>) -> Self {
        Self {
            preamble: Vec::new(),
            canvas,
            elements,
        }
    }

    /// Rewrites the tree depth-first, children before their parent.
    ///
    /// `rewrite` receives each element with its children already rewritten and
    /// returns the replacement, or `None` to drop it. The original tree is left
    /// untouched. Dropping indexed elements shifts the indices used by sibling
    /// connections; that is the caller's concern.
    pub fn transform<F>(&self, mut rewrite: F) -> Patch
    where
        F: FnMut(Element) -> Option<Element>,
    {
        Patch {
            preamble: self.preamble.clone(),
            canvas: self.canvas.clone(),
            elements: transform_elements(&self.elements, &mut rewrite),
        }
    }

    /// Lazily yields every element matching `predicate`, in pre-order.
    ///
    /// The iterator descends into subpatches and can be cloned to restart from
    /// its current point; call `find` again to restart from the top.
    pub fn find<P>(&self, predicate: P) -> Find<'_, P>
    where
        P: Fn(&Element) -> bool,
    {
        Find::new(&self.elements, predicate)
    }

    /// Generic objects at every depth.
    pub fn objects(&self) -> impl Iterator<Item = &ObjBox> {
        self.find(|e| matches!(e, Element::Obj(_)))
            .filter_map(|e| match e {
                Element::Obj(o) => Some(o),
                _ => None,
            })
    }

    /// Top-level connections.
    pub fn connections(&self) -> impl Iterator<Item = &Connect> {
        self.elements.iter().filter_map(|e| match e {
            Element::Connect(c) => Some(c),
            _ => None,
        })
    }

    /// Top-level indexed elements, in connection-index order.
    pub fn indexed(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_indexed())
    }

    /// Inlet and outlet counts this patch shows when used as an abstraction.
    pub fn infer_arity(&self) -> (usize, usize) {
        infer_arity(&self.elements)
    }
}

fn transform_elements<F>(elements: &[Element], rewrite: &mut F) -> Vec<Element>
where
    F: FnMut(Element) -> Option<Element>,
{
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        let rebuilt = match element {
            Element::Subpatch(sub) => Element::Subpatch(Subpatch {
                canvas: sub.canvas.clone(),
                elements: transform_elements(&sub.elements, rewrite),
                restore: sub.restore.clone(),
            }),
            other => other.clone(),
        };
        if let Some(replacement) = rewrite(rebuilt) {
            out.push(replacement);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(x: i32, class: &str) -> Element {
        Element::Obj(ObjBox {
            position: Position::new(x, 0),
            class: class.to_string(),
            args: Vec::new(),
        })
    }

    fn sample() -> Patch {
        let inner = Subpatch {
            canvas: CanvasHeader::subpatch("inner"),
            elements: vec![obj(0, "inlet"), obj(1, "outlet")],
            restore: Restore {
                position: Position::new(5, 5),
                class: "pd".to_string(),
                args: vec!["inner".to_string()],
            },
        };
        Patch::new(
            CanvasHeader::default(),
            vec![
                obj(10, "osc~"),
                Element::Declare(Declare {
                    args: vec!["-path".into(), "abs".into()],
                }),
                Element::Subpatch(inner),
                Element::Connect(Connect {
                    source: 0,
                    outlet: 0,
                    sink: 1,
                    inlet: 0,
                }),
            ],
        )
    }

    #[test]
    fn indexing_skips_inert_elements() {
        let patch = sample();
        let indexed: Vec<_> = patch.indexed().collect();
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed[1].class_name(), Some("pd"));
    }

    #[test]
    fn transform_rewrites_children_first() {
        let patch = sample();
        let mut seen = Vec::new();
        let renamed = patch.transform(|e| {
            seen.push(e.class_name().map(str::to_string));
            Some(match e {
                Element::Obj(mut o) => {
                    o.class.push('!');
                    Element::Obj(o)
                }
                other => other,
            })
        });
        // inlet and outlet are visited before their subpatch
        assert_eq!(
            seen,
            vec![
                Some("osc~".to_string()),
                None,
                Some("inlet".to_string()),
                Some("outlet".to_string()),
                Some("pd".to_string()),
                None,
            ]
        );
        let classes: Vec<_> = renamed.objects().map(|o| o.class.as_str()).collect();
        assert_eq!(classes, vec!["osc~!", "inlet!", "outlet!"]);
        // original untouched
        assert_eq!(patch.objects().next().map(|o| o.class.as_str()), Some("osc~"));
    }

    #[test]
    fn transform_can_drop() {
        let patch = sample();
        let stripped = patch.transform(|e| match e {
            Element::Declare(_) => None,
            other => Some(other),
        });
        assert_eq!(stripped.elements.len(), 3);
        assert_eq!(stripped.indexed().count(), 2);
    }

    #[test]
    fn find_is_preorder_and_restartable() {
        let patch = sample();
        let found = patch.find(|e| e.position().is_some());
        let first: Vec<_> = found.clone().filter_map(Element::class_name).collect();
        let second: Vec<_> = found.filter_map(Element::class_name).collect();
        assert_eq!(first, vec!["osc~", "pd", "inlet", "outlet"]);
        assert_eq!(first, second);
    }

    #[test]
    fn subpatch_name_and_arity() {
        let patch = sample();
        let Element::Subpatch(sub) = &patch.elements[2] else {
            panic!("expected subpatch");
        };
        assert_eq!(sub.name(), Some("inner"));
        assert!(!sub.graph_on_parent());
        assert_eq!(infer_arity(&sub.elements), (1, 1));
    }
}
