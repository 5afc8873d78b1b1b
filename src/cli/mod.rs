//! Command-line front end: argument parsing, version, and text rendering.
//!
//! `main.rs` parses arguments with [`parse_args`] and prints through the
//! [`render`] helpers.

pub mod args;
pub mod render;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, UsageError, USAGE};
pub use version::{version_string, VERSION};
