//! Configuration validation.
//!
//! Catches values that would make layout degenerate or that can never match
//! an object class.
//!
//! # Example
//!
//! ```rust
//! use pdkit_config::{Config, validate_config};
//!
//! let mut config = Config::default();
//! validate_config(&config).expect("defaults are valid");
//!
//! config.layout.grid_columns = 0;
//! assert!(validate_config(&config).is_err());
//! ```

use thiserror::Error;

use crate::Config;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A count or size that must be positive is zero or negative.
    #[error("{field} must be greater than zero")]
    ZeroValue {
        /// Dotted path of the offending key.
        field: String,
    },

    /// A collapsible class name that can never match an object.
    #[error("invalid class name {name:?} in optimize.collapse")]
    InvalidClass {
        /// The rejected entry.
        name: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks every section of `config`, reporting all problems at once.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let positive = [
        ("layout.row_height", i64::from(config.layout.row_height)),
        ("layout.column_width", i64::from(config.layout.column_width)),
        ("layout.grid_columns", config.layout.grid_columns as i64),
        ("layout.cell_width", i64::from(config.layout.cell_width)),
        ("layout.cell_height", i64::from(config.layout.cell_height)),
        ("auto_layout.row_spacing", i64::from(config.auto_layout.row_spacing)),
        ("auto_layout.col_spacing", i64::from(config.auto_layout.col_spacing)),
    ];
    for (field, value) in positive {
        if value <= 0 {
            errors.push(ValidationError::ZeroValue {
                field: field.to_string(),
            });
        }
    }

    for name in &config.optimize.collapse {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ';' || c == ',') {
            errors.push(ValidationError::InvalidClass { name: name.clone() });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
