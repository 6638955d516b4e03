//! Configuration for pdkit tools.
//!
//! A single TOML file tunes the placement used when adding nodes, the
//! automatic layout, the optimizer and the externals search. Every section
//! and key is optional and falls back to the library defaults.
//!
//! # Features
//!
//! - **Config file**: Load and save `pdkit.toml`
//! - **Validation**: Reject degenerate sizes and unusable class names
//! - **Paths**: Working-directory and per-user config locations
//! - **Conversions**: Build `pdkit-core` option types from a config
//!
//! # TOML Format
//!
//! ```toml
//! [layout]
//! kind = "grid"
//! grid_columns = 6
//!
//! [auto_layout]
//! row_spacing = 60
//!
//! [optimize]
//! recursive = true
//! collapse = ["t", "float"]
//!
//! [discovery]
//! paths = ["~/pd/abstractions"]
//! include_defaults = false
//! ```
//!
//! # Example
//!
//! ```rust
//! use pdkit_config::{Config, LayoutKind};
//!
//! let config = Config::from_toml("[layout]\nkind = \"grid\"\n").unwrap();
//! assert_eq!(config.layout.kind, LayoutKind::Grid);
//! assert!(!config.optimize_options().recursive);
//! ```

mod error;

/// Platform-specific paths for configuration files.
pub mod paths;

/// Configuration validation.
pub mod validation;

use std::path::{Path, PathBuf};

use pdkit_core::{AutoLayoutOptions, FlowLayout, GridLayout, Layout, OptimizeOptions};
use serde::{Deserialize, Serialize};

pub use error::{ConfigError, IoAction};
pub use paths::{default_config_path, ensure_user_config_dir, find_config, user_config_dir};
pub use validation::{ValidationError, ValidationResult, validate_config};

/// Complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Placement of nodes added without a position.
    pub layout: LayoutConfig,
    /// Automatic layout spacing.
    pub auto_layout: AutoLayoutConfig,
    /// Optimizer passes.
    pub optimize: OptimizeConfig,
    /// Externals and abstraction search.
    pub discovery: DiscoveryConfig,
}

/// Which placement strategy new nodes use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Rows below the previous node.
    #[default]
    Flow,
    /// Fixed-width grid.
    Grid,
}

/// `[layout]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Strategy.
    pub kind: LayoutKind,
    /// Margin from the canvas edge, both strategies.
    pub margin: i32,
    /// Flow: vertical step per row.
    pub row_height: i32,
    /// Flow: horizontal step per column.
    pub column_width: i32,
    /// Grid: cells per row.
    pub grid_columns: usize,
    /// Grid: cell width.
    pub cell_width: i32,
    /// Grid: cell height.
    pub cell_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let flow = FlowLayout::default();
        let grid = GridLayout::default();
        Self {
            kind: LayoutKind::Flow,
            margin: flow.margin,
            row_height: flow.row_height,
            column_width: flow.column_width,
            grid_columns: grid.columns,
            cell_width: grid.cell_width,
            cell_height: grid.cell_height,
        }
    }
}

impl LayoutConfig {
    /// Builds the configured placement strategy.
    pub fn to_layout(&self) -> Layout {
        match self.kind {
            LayoutKind::Flow => {
                FlowLayout::new(self.margin, self.row_height, self.column_width).into()
            }
            LayoutKind::Grid => GridLayout::new(
                self.grid_columns,
                self.cell_width,
                self.cell_height,
                self.margin,
            )
            .into(),
        }
    }
}

/// `[auto_layout]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoLayoutConfig {
    /// Margin from the canvas edge.
    pub margin: i32,
    /// Vertical distance between rows.
    pub row_spacing: i32,
    /// Horizontal distance between nodes in a row.
    pub col_spacing: i32,
    /// Order rows by parent column.
    pub align_columns: bool,
}

impl Default for AutoLayoutConfig {
    fn default() -> Self {
        AutoLayoutOptions::default().into()
    }
}

impl From<AutoLayoutOptions> for AutoLayoutConfig {
    fn from(options: AutoLayoutOptions) -> Self {
        Self {
            margin: options.margin,
            row_spacing: options.row_spacing,
            col_spacing: options.col_spacing,
            align_columns: options.align_columns,
        }
    }
}

impl From<&AutoLayoutConfig> for AutoLayoutOptions {
    fn from(config: &AutoLayoutConfig) -> Self {
        Self {
            margin: config.margin,
            row_spacing: config.row_spacing,
            col_spacing: config.col_spacing,
            align_columns: config.align_columns,
        }
    }
}

/// `[optimize]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Descend into subpatches.
    pub recursive: bool,
    /// Classes that may be collapsed as pass-throughs.
    pub collapse: Vec<String>,
}

impl From<&OptimizeConfig> for OptimizeOptions {
    fn from(config: &OptimizeConfig) -> Self {
        Self {
            recursive: config.recursive,
            ..OptimizeOptions::collapsing(config.collapse.iter().cloned())
        }
    }
}

/// `[discovery]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Extra directories searched before the platform defaults.
    pub paths: Vec<PathBuf>,
    /// Also search the platform's standard externals directories.
    pub include_defaults: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            include_defaults: true,
        }
    }
}

impl Config {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content).map_err(|e| e.in_file(path))
    }

    /// Load the file found by [`find_config`], or defaults when there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        match find_config() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::create_dir(parent, e))?;
            }
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Placement strategy for new nodes.
    pub fn layout(&self) -> Layout {
        self.layout.to_layout()
    }

    /// Options for [`pdkit_core::Graph::auto_layout`].
    pub fn auto_layout_options(&self) -> AutoLayoutOptions {
        (&self.auto_layout).into()
    }

    /// Options for [`pdkit_core::Graph::optimize`].
    pub fn optimize_options(&self) -> OptimizeOptions {
        (&self.optimize).into()
    }
}
