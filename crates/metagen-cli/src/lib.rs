//! Metagen CLI library.
//!
//! Configuration, PDF loading, command execution and output formatting
//! for the `metagen` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pdf;

pub use cli::{Cli, Command};
pub use config::{Config, Overrides};
pub use error::{CliError, Result};
pub use output::Formatter;
pub use pdf::PdfDocument;
