//! CLI command implementations.

pub mod check;
pub mod common;
pub mod discover;
pub mod fmt;
pub mod info;
pub mod layout;
pub mod optimize;
pub mod rename;
pub mod validate;
