//! CLI module for gridquery
//!
//! Provides command-line interface for:
//! - query: one-shot query against a records file or a remote server
//! - serve: HTTP query endpoint over a records file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, QueryArgs};
pub use commands::{query, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_records, write_response};
