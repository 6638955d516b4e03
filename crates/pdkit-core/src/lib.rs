//! pdkit Core - Pure Data patch model, codec and graph algorithms
//!
//! This crate turns `.pd` patch text into a typed, immutable tree, converts that
//! tree into an editable graph, and runs layout and optimization passes over the
//! graph before writing it back out as text.
//!
//! # Core Abstractions
//!
//! ## Text Codec
//!
//! - [`parse`] - Patch text to [`Patch`], with line-numbered [`ParseError`]s
//! - [`serialize`] - [`Patch`] back to text, byte-exact for our own output
//! - [`escape`] / [`unescape`] - Exact inverses over free-form text
//!
//! ## Immutable Tree
//!
//! - [`Patch`] / [`Element`] - Closed set of statement variants
//! - [`Patch::transform`] - Depth-first structural rewrite
//! - [`Patch::find`] - Lazy pre-order search
//!
//! ## Mutable Graph
//!
//! - [`Graph`] - Ordered nodes plus port-indexed [`Connection`]s
//! - [`Graph::link`] - Arity-checked connections via [`NodeId`] or [`Outlet`]
//! - [`Graph::validate`] - Connection report with non-fatal [`CycleWarning`]s
//!
//! ## Algorithms
//!
//! - [`bridge`] - [`to_graph`] / [`to_tree`] conversion
//! - [`layout`] - Flow, grid and cycle-safe automatic layout
//! - [`optimize`] - Dedup, pass-through collapse and unused removal
//!
//! # Example
//!
//! ```rust
//! use pdkit_core::{Graph, serialize, to_tree};
//!
//! let mut graph = Graph::new();
//! let osc = graph.add("osc~ 440");
//! let dac = graph.add("dac~");
//! graph.link(osc, dac, 0).unwrap();
//! graph.link(osc, dac, 1).unwrap();
//!
//! let text = serialize(&to_tree(&graph));
//! assert!(text.contains("#X connect 0 0 1 1;"));
//! ```
//!
//! # Tracing
//!
//! Enable the `tracing` feature to get `debug!` events for graph mutations,
//! optimizer passes and layout, plus `warn!` events for detected cycles.

pub mod ast;
pub mod bridge;
pub mod codec;
pub mod error;
pub mod graph;
pub mod layout;
pub mod optimize;
pub mod registry;

pub use ast::{
    ArrayDecl, Atom, AtomBox, CanvasHeader, CanvasKind, Comment, Connect, Coords, Declare,
    Element, GuiBox, MsgBox, ObjBox, Opaque, Patch, Position, Restore, Subpatch,
};
pub use ast::widget::Widget;
pub use bridge::{to_graph, to_graph_with, to_tree};
pub use codec::{escape, escape_symbol, parse, serialize, unescape};
pub use error::{CycleWarning, GraphError, ParseError, ParseErrorKind, Port};
pub use graph::{
    AddOptions, Connection, ConnectionStats, Graph, Node, NodeId, NodeKind, Outlet,
    SubpatchNode, SubpatchOptions, ValidationReport,
};
pub use layout::{AutoLayoutOptions, AutoLayoutReport, FlowLayout, GridLayout, Layout, Placement};
pub use optimize::{OptimizeOptions, OptimizeStats};
pub use registry::{ObjectRegistry, Ports};
