//! Kinfolk CLI library.
//!
//! Command parsing, configuration, output formatting and the command
//! implementations behind the `kinfolk` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use context::Context;
pub use error::{CliError, Result};
pub use output::Formatter;
