//! Integration tests for pdkit-core.
//!
//! Exercises the codec, tree, graph, layout and optimizer together on the
//! reference scenarios: optimizer counts, numeric subpatch names, escaped
//! terminators, boundary arity inference and arity-checked linking.

use pdkit_core::ast::widget::Toggle;
use pdkit_core::{
    AddOptions, ArrayDecl, Atom, AutoLayoutOptions, Element, Graph, GraphError, NodeId, NodeKind,
    OptimizeOptions, Patch, Port, SubpatchOptions, Widget, escape, parse, serialize, to_graph,
    to_tree, unescape,
};

// ============================================================================
// Scenario A: optimizer counts
// ============================================================================

#[test]
fn optimize_drops_duplicate_and_orphan() {
    let mut graph = Graph::new();
    let osc = graph.add("osc~ 440");
    let gain = graph.add("*~ 0.3");
    let dac = graph.add("dac~");
    graph.add("+");
    graph.link(osc, gain, 0).unwrap();
    graph.link(gain, dac, 0).unwrap();
    graph.link(gain, dac, 0).unwrap();

    let stats = graph.optimize(&OptimizeOptions::default());
    assert_eq!(stats.nodes_removed, 1);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.pass_throughs_collapsed, 0);
    // connections_removed is a net count: three cords before, two after.
    // The orphan `+` had no cords to lose. See DESIGN.md.
    assert_eq!(stats.connections_removed, 1);
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.connections().len(), 2);
    assert!(graph.validate(true).is_ok());
}

// ============================================================================
// Scenario B: numeric subpatch name
// ============================================================================

#[test]
fn numeric_canvas_name_opens_subpatch() {
    let text = "#N canvas 0 50 450 300 12;
#N canvas 10 10 200 100 42 0;
#X obj 10 10 inlet;
#X restore 20 20 pd 42;
";
    let patch = parse(text).unwrap();
    let Element::Subpatch(sub) = &patch.elements[0] else {
        panic!("expected subpatch, got {:?}", patch.elements[0]);
    };
    assert_eq!(sub.canvas.name(), Some("42"));
    assert_eq!(serialize(&patch), text);
}

// ============================================================================
// Scenario C: escaped terminator in free text
// ============================================================================

#[test]
fn escaped_semicolon_in_comment_round_trips() {
    for raw in ["a; b", "x;y;z", "\\;", "price: $1, tax; total", ";;;", ""] {
        assert_eq!(unescape(&escape(raw)), raw);
    }

    let mut graph = Graph::new();
    graph.add_comment("step one; step two, done");
    let text = serialize(&to_tree(&graph));
    assert!(text.contains("step one\\; step two\\, done;"), "{text}");
    let patch = parse(&text).unwrap();
    let Element::Text(comment) = &patch.elements[0] else {
        panic!("expected comment");
    };
    assert_eq!(
        unescape(&comment.content.join(" ")),
        "step one; step two, done"
    );
}

#[test]
fn typed_box_text_stays_in_its_field() {
    let mut toggle = Toggle::default();
    toggle.label.text = "Vol; L".to_string();
    toggle.send = "mix, $0 bus".to_string();
    let mut atom = Atom::float();
    atom.label = "master gain".to_string();

    let mut graph = Graph::new();
    graph.add_gui(Widget::Tgl(toggle));
    graph.add_float(atom);
    graph.add_array(ArrayDecl::new("wave table", 64));

    let text = serialize(&to_tree(&graph));
    assert!(text.contains(" mix\\,\\ \\$0\\ bus empty Vol\\;\\ L "), "{text}");
    let rebuilt = to_graph(&parse(&text).unwrap()).unwrap();
    assert_eq!(rebuilt.len(), 3);

    let NodeKind::Gui(Widget::Tgl(toggle)) = &rebuilt.nodes()[0].kind else {
        panic!("expected toggle");
    };
    assert_eq!(unescape(&toggle.label.text), "Vol; L");
    assert_eq!(unescape(&toggle.send), "mix, $0 bus");
    assert_eq!(toggle.receive, "empty");

    let NodeKind::FloatAtom(atom) = &rebuilt.nodes()[1].kind else {
        panic!("expected number box");
    };
    assert_eq!(unescape(&atom.label), "master gain");
    assert_eq!(atom.receive, "-");
    assert_eq!(atom.send, "-");
    assert!(atom.extra.is_empty());
    assert!(!rebuilt.nodes()[1].kind.has_active_names());

    let NodeKind::Array(array) = &rebuilt.nodes()[2].kind else {
        panic!("expected array");
    };
    assert_eq!(unescape(&array.name), "wave table");
    assert_eq!(serialize(&to_tree(&rebuilt)), text);
}

#[test]
fn oversized_widget_loads() {
    let text = "#N canvas 0 50 450 300 12;\n\
        #X obj 0 0 vradio 15 1 0 200000000 empty empty empty 0 -8 0 10 -262144 -1 -1 0;\n\
        #X obj 0 40 nbx 2147483647 14 -1e37 1e37 0 0 empty empty empty 0 -8 0 10 -262144 -1 -1 0 256;\n";
    let patch = parse(text).unwrap();
    let mut graph = to_graph(&patch).unwrap();
    let NodeKind::Gui(radio) = &graph.nodes()[0].kind else {
        panic!("expected radio");
    };
    assert_eq!(radio.size(), (15, i32::MAX));
    assert_eq!(serialize(&to_tree(&graph)), text);

    // flow placement continues below the loaded boxes without wrapping
    let next = graph.add("f");
    assert!(graph.node(next).unwrap().position.y > 0);
}

// ============================================================================
// Scenario D: boundary arity inference
// ============================================================================

#[test]
fn subpatch_arity_from_boundary_objects() {
    let mut inner = Graph::new();
    let left = inner.add("inlet~");
    let right = inner.add("inlet~");
    let sum = inner.add("+~");
    let out = inner.add("outlet~");
    inner.link(left, sum, 0).unwrap();
    inner.link(right, sum, 1).unwrap();
    inner.link(sum, out, 0).unwrap();

    let mut graph = Graph::new();
    let sub = graph.add_subpatch("mix", inner, SubpatchOptions::default());
    let node = graph.node(sub).unwrap();
    assert_eq!((node.inlets, node.outlets), (Some(2), Some(1)));

    // the parsed form agrees
    let patch = to_tree(&graph);
    let Element::Subpatch(parsed) = &parse(&serialize(&patch)).unwrap().elements[0] else {
        panic!("expected subpatch");
    };
    assert_eq!(pdkit_core::ast::infer_arity(&parsed.elements), (2, 1));
}

// ============================================================================
// Scenario E: arity-checked links
// ============================================================================

#[test]
fn link_outlet_beyond_known_arity_fails() {
    let mut graph = Graph::new();
    let two = graph.add_with("splitter", AddOptions::arity(1, 2));
    let open = graph.add("splitter");
    let sink = graph.add("print");

    assert_eq!(
        graph.connect(two, 5, sink, 0),
        Err(GraphError::InvalidConnection {
            node: two,
            port: Port::Outlet,
            index: 5,
            arity: 2,
        })
    );
    assert!(graph.connect(open, 5, sink, 0).is_ok());
    assert_eq!(
        graph.connect(NodeId::new(10), 0, sink, 0),
        Err(GraphError::NodeNotFound(NodeId::new(10)))
    );
}

// ============================================================================
// Cross-module flows
// ============================================================================

#[test]
fn build_serialize_parse_rebuild() {
    let mut graph = Graph::new();
    let metro = graph.add("metro 500");
    let toggle = graph.add_gui(Widget::Tgl(Default::default()));
    let counter = graph.add("f");
    let step = graph.add("+ 1");
    let display = graph.add_float(Atom::float());
    graph.link(toggle, metro, 0).unwrap();
    graph.link(metro, counter, 0).unwrap();
    graph.link(counter, step, 0).unwrap();
    graph.link(step, counter, 1).unwrap();
    graph.link(counter, display, 0).unwrap();

    let text = serialize(&to_tree(&graph));
    let rebuilt = to_graph(&parse(&text).unwrap()).unwrap();
    assert_eq!(rebuilt.len(), graph.len());
    assert_eq!(rebuilt.connections(), graph.connections());
    assert!(matches!(rebuilt.nodes()[1].kind, NodeKind::Gui(Widget::Tgl(_))));
    assert_eq!(serialize(&to_tree(&rebuilt)), text);
}

#[test]
fn feedback_patch_validates_and_lays_out() {
    let mut graph = Graph::new();
    let counter = graph.add("f");
    let step = graph.add("+ 1");
    graph.link(counter, step, 0).unwrap();
    graph.link(step, counter, 1).unwrap();

    let report = graph.validate(true);
    assert!(report.is_ok());
    assert_eq!(report.cycles.len(), 1);

    let layout = graph.auto_layout(&AutoLayoutOptions::default());
    assert_eq!(layout.back_edges.len(), 1);
    assert_ne!(
        graph.nodes()[0].position,
        graph.nodes()[1].position
    );
}

#[test]
fn find_and_transform_on_parsed_tree() {
    let text = "#N canvas 0 50 450 300 12;
#X obj 10 10 osc~ 440;
#N canvas 0 0 300 180 inner 0;
#X obj 10 10 osc~ 220;
#X obj 10 40 outlet~;
#X connect 0 0 1 0;
#X restore 10 40 pd inner;
#X obj 10 70 dac~;
#X connect 0 0 2 0;
#X connect 1 0 2 1;
";
    let patch = parse(text).unwrap();
    let oscillators = patch.find(|e| e.class_name() == Some("osc~")).count();
    assert_eq!(oscillators, 2);

    let detuned: Patch = patch.transform(|e| match e {
        Element::Obj(mut o) if o.class == "osc~" => {
            o.args = vec!["100".to_string()];
            Some(Element::Obj(o))
        }
        other => Some(other),
    });
    assert_eq!(serialize(&detuned).matches("osc~ 100").count(), 2);
    assert_eq!(serialize(&patch), text);
}

#[test]
fn recursive_optimize_reaches_nested_graphs() {
    let text = "#N canvas 0 50 450 300 12;
#N canvas 0 0 300 180 inner 0;
#X obj 10 10 inlet;
#X obj 10 40 outlet;
#X obj 10 70 print unused;
#X connect 0 0 1 0;
#X connect 0 0 1 0;
#X restore 10 10 pd inner;
#X msg 10 40 bang;
#X connect 1 0 0 0;
";
    let mut graph = to_graph(&parse(text).unwrap()).unwrap();
    let stats = graph.optimize(&OptimizeOptions {
        recursive: true,
        ..OptimizeOptions::default()
    });
    assert_eq!(stats.subpatches_optimized, 1);
    assert_eq!(stats.nodes_removed, 1);
    assert_eq!(stats.duplicates_removed, 1);
    let out = serialize(&to_tree(&graph));
    assert!(!out.contains("print unused"));
    assert_eq!(out.matches("#X connect 0 0 1 0;").count(), 1);
}
