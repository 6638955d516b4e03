//! Integration tests for pdkit-config.
//!
//! Exercises file save/load, validation on load and conversion into the
//! option types consumed by pdkit-core.

use pdkit_config::{Config, ConfigError, IoAction, LayoutKind};
use pdkit_core::{Graph, Layout, Position};
use tempfile::TempDir;

#[test]
fn save_creates_directories_and_loads_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/dir/pdkit.toml");

    let mut config = Config::default();
    config.layout.kind = LayoutKind::Grid;
    config.layout.grid_columns = 3;
    config.optimize.recursive = true;
    config.optimize.collapse = vec!["t".to_string(), "float".to_string()];
    config.save(&path).unwrap();

    assert!(path.is_file());
    assert_eq!(Config::load(&path).unwrap(), config);
}

#[test]
fn load_missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");
    match Config::load(&path) {
        Err(ConfigError::Io {
            action: IoAction::Read,
            path: reported,
            ..
        }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pdkit.toml");
    std::fs::write(&path, "[auto_layout]\nrow_spacing = 0\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("auto_layout.row_spacing"), "got: {err}");
}

#[test]
fn grid_config_drives_graph_placement() {
    let config = Config::from_toml(
        "[layout]\nkind = \"grid\"\ngrid_columns = 2\ncell_width = 100\ncell_height = 40\nmargin = 10\n",
    )
    .unwrap();
    let mut graph = Graph::with_layout(config.layout());
    assert!(matches!(graph.layout, Layout::Grid(_)));

    let ids: Vec<_> = (0..3).map(|_| graph.add("f")).collect();
    let positions: Vec<Position> = ids
        .iter()
        .map(|&id| graph.node(id).unwrap().position)
        .collect();
    assert_eq!(
        positions,
        vec![
            Position::new(10, 10),
            Position::new(110, 10),
            Position::new(10, 50),
        ]
    );
}

#[test]
fn optimize_section_feeds_the_optimizer() {
    let config = Config::from_toml("[optimize]\ncollapse = [\"change\"]\n").unwrap();
    let mut graph = Graph::new();
    let source = graph.add("r in");
    let pass = graph.add("change");
    let sink = graph.add("print");
    graph.link(source, pass, 0).unwrap();
    graph.link(pass, sink, 0).unwrap();

    let stats = graph.optimize(&config.optimize_options());
    assert_eq!(stats.pass_throughs_collapsed, 1);
    assert_eq!(graph.len(), 2);
}
