//! CLI argument definitions using clap
//!
//! Commands:
//! - gridquery query --config <path> (--data <path> | --remote <url>) [query flags]
//! - gridquery serve --config <path> --data <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// gridquery - filter, search, sort and page record sets
#[derive(Parser, Debug)]
#[command(name = "gridquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one query and print the result page as JSON
    Query(QueryArgs),

    /// Serve records over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./gridquery.json")]
        config: PathBuf,

        /// JSON file holding an array of records
        #[arg(long)]
        data: PathBuf,

        /// Port to listen on, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Path to configuration file
    #[arg(long, default_value = "./gridquery.json")]
    pub config: PathBuf,

    /// JSON file holding an array of records
    #[arg(long, conflicts_with = "remote", required_unless_present = "remote")]
    pub data: Option<PathBuf>,

    /// Base URL of a gridquery server to forward the query to
    #[arg(long)]
    pub remote: Option<String>,

    /// Zero-based page index
    #[arg(long)]
    pub page: Option<usize>,

    /// Records per page
    #[arg(long)]
    pub size: Option<usize>,

    /// Sort keys, e.g. `name.asc,price.desc`
    #[arg(long)]
    pub sort: Option<String>,

    /// Free-text search across searchable fields
    #[arg(long)]
    pub search: Option<String>,

    /// Case-insensitive text matching
    #[arg(long)]
    pub ignore_case: bool,

    /// Filter as `field=op.value`; repeatable
    #[arg(long = "filter", value_name = "FIELD=OP.VALUE")]
    pub filters: Vec<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "gridquery",
            "query",
            "--data",
            "records.json",
            "--sort",
            "name.asc",
            "--filter",
            "price=gt.10",
            "--filter",
            "stock=range.1..5",
            "--ignore-case",
        ])
        .unwrap();

        match cli.command {
            Command::Query(args) => {
                assert_eq!(args.config, PathBuf::from("./gridquery.json"));
                assert_eq!(args.data, Some(PathBuf::from("records.json")));
                assert_eq!(args.sort.as_deref(), Some("name.asc"));
                assert_eq!(args.filters.len(), 2);
                assert!(args.ignore_case);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_query_needs_a_source() {
        assert!(Cli::try_parse_from(["gridquery", "query"]).is_err());
        assert!(Cli::try_parse_from([
            "gridquery",
            "query",
            "--data",
            "a.json",
            "--remote",
            "http://localhost:8480"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["gridquery", "query", "--remote", "http://localhost:8480"]).is_ok());
    }
}
