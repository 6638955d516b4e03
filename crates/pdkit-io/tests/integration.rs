//! Integration tests for pdkit-io file handling and externals discovery.

use pdkit_core::{NodeKind, OptimizeOptions, parse, serialize};
use pdkit_io::{
    Error, discover_externals, export_temp, read_graph, read_graph_with, read_patch,
    registry_with_externals, write_graph,
};
use tempfile::TempDir;

const VOICE: &str = "#N canvas 0 50 450 300 12;
#X obj 10 10 inlet;
#X obj 10 40 osc~;
#X obj 10 70 outlet~;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
";

const SYNTH: &str = "#N canvas 0 50 450 300 12;
#X obj 10 10 r note;
#X obj 10 40 voice;
#X obj 10 70 dac~;
#X obj 100 100 print;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
#X connect 1 0 2 0;
#X connect 1 0 2 1;
";

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn graph_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("synth.pd");
    std::fs::write(&path, SYNTH).unwrap();

    let graph = read_graph(&path).unwrap();
    assert_eq!(graph.len(), 4);
    write_graph(&path, &graph).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SYNTH);
}

#[test]
fn dangling_connection_surfaces_as_graph_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.pd");
    std::fs::write(&path, "#N canvas 0 50 450 300 12;\n#X connect 0 0 1 0;\n").unwrap();
    assert!(matches!(read_graph(&path), Err(Error::Graph(_))));
}

#[test]
fn missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.pd");
    let err = read_patch(&path).unwrap_err();
    assert!(matches!(err, Error::Io { path: ref p, .. } if *p == path));
    assert!(err.to_string().contains("absent.pd"));
}

#[test]
fn exported_patch_parses_back() {
    let patch = parse(VOICE).unwrap();
    let file = export_temp(&patch).unwrap();
    assert_eq!(read_patch(file.path()).unwrap(), patch);
}

// ---------------------------------------------------------------------------
// Discovery feeding the graph
// ---------------------------------------------------------------------------

#[test]
fn discovered_abstraction_gets_ports_and_survives_optimize() {
    let library = TempDir::new().unwrap();
    std::fs::write(library.path().join("voice.pd"), VOICE).unwrap();
    let externals = discover_externals([library.path()], false);
    assert_eq!(externals.get("voice"), Some(&(Some(1), Some(1))));

    let work = TempDir::new().unwrap();
    let path = work.path().join("synth.pd");
    std::fs::write(&path, SYNTH).unwrap();

    let registry = registry_with_externals(&externals);
    let mut graph = read_graph_with(&path, &registry).unwrap();
    let voice = &graph.nodes()[1];
    assert!(matches!(voice.kind, NodeKind::Abstraction { .. }));
    assert_eq!((voice.inlets, voice.outlets), (Some(1), Some(1)));
    assert!(graph.validate(false).is_ok());

    let stats = graph.optimize(&OptimizeOptions::default());
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.nodes_removed, 1);
    write_graph(&path, &graph).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("#X obj 10 40 voice;"));
    assert!(!text.contains("print"));
    assert_eq!(serialize(&read_patch(&path).unwrap()), text);
}
