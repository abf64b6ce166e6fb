//! CLI command implementations
//!
//! `query` runs one query against a records file (synchronously) or a
//! remote gridquery server and prints the page. `serve` exposes a records
//! file over HTTP.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::PipelineConfig;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::pipeline::{LocalSource, QueryPipeline};
use crate::query::{parse_params, QueryOptions};
use crate::remote::{CancelSignal, HttpRemoteAdapter};
use crate::server::QueryServer;

use super::args::{Command, QueryArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_records, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query(args) => query(&args),
        Command::Serve { config, data, port } => serve(&config, &data, port),
    }
}

/// Execute a single query and print the result page
pub fn query(args: &QueryArgs) -> CliResult<()> {
    let config = load_config(&args.config)?;
    let options = query_options(args, &config)?;

    let page = match (&args.data, &args.remote) {
        (Some(data), _) => {
            let records = read_records(data)?;
            let source = LocalSource::new(records, config.registry(), config.searchable_fields());
            QueryPipeline::local(source).execute_local(&options)?
        }
        (None, Some(url)) => {
            let adapter = HttpRemoteAdapter::<Value>::new(url, config.remote_timeout())?;
            let pipeline = QueryPipeline::<Value>::remote(Arc::new(adapter));

            let rt = runtime()?;
            rt.block_on(pipeline.query(&options, &CancelSignal::never()))?
        }
        (None, None) => return Err(CliError::invalid_args("either --data or --remote is required")),
    };

    write_response(&page)
}

/// Serve a records file over HTTP until the process is stopped
pub fn serve(config_path: &Path, data: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }

    let records = read_records(data)?;
    let server = QueryServer::new(&config, records);

    let rt = runtime()?;
    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::server_failed(format!("HTTP server failed: {}", e)))
    })
}

fn load_config(path: &Path) -> CliResult<PipelineConfig> {
    let config = PipelineConfig::load(path)?;
    Logger::set_min_severity(config.log_severity());
    log_event_with_fields(Event::ConfigLoaded, &[("path", &path.display().to_string())]);
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::server_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Builds options from the flags, using the same syntax as URL parameters
fn query_options(args: &QueryArgs, config: &PipelineConfig) -> CliResult<QueryOptions> {
    let mut params: Vec<(String, String)> = Vec::new();

    if let Some(page) = args.page {
        params.push(("page".into(), page.to_string()));
    }
    if let Some(size) = args.size {
        params.push(("size".into(), size.to_string()));
    }
    if let Some(sort) = &args.sort {
        params.push(("sort".into(), sort.clone()));
    }
    if let Some(search) = &args.search {
        params.push(("search".into(), search.clone()));
    }
    params.push((
        "ignore_case".into(),
        (args.ignore_case || config.ignore_case).to_string(),
    ));

    for filter in &args.filters {
        let (field, value) = filter.split_once('=').ok_or_else(|| {
            CliError::invalid_args(format!("filter '{}' must be FIELD=OP.VALUE", filter))
        })?;
        if is_reserved(field) {
            return Err(CliError::invalid_args(format!(
                "'{}' is a reserved parameter, not a field",
                field
            )));
        }
        params.push((field.to_string(), value.to_string()));
    }

    Ok(parse_params(&params, &config.parse_limits())?)
}

fn is_reserved(name: &str) -> bool {
    matches!(name, "page" | "size" | "sort" | "search" | "ignore_case")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDecl, FieldKind};
    use crate::query::{FilterOperator, SortSpec};
    use std::path::PathBuf;

    fn args() -> QueryArgs {
        QueryArgs {
            config: PathBuf::from("unused.json"),
            data: Some(PathBuf::from("unused.json")),
            remote: None,
            page: Some(1),
            size: Some(5),
            sort: Some("name.desc".into()),
            search: Some("an".into()),
            ignore_case: false,
            filters: vec!["price=range.1..9".into()],
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::with_fields(vec![
            FieldDecl::new("name", FieldKind::Text).searchable(),
            FieldDecl::new("price", FieldKind::Float),
        ])
    }

    #[test]
    fn test_query_options_from_flags() {
        let options = query_options(&args(), &config()).unwrap();

        assert_eq!(options.page_index, 1);
        assert_eq!(options.page_size, 5);
        assert_eq!(options.sort_specs, vec![SortSpec::desc("name")]);
        assert_eq!(options.search_text, "an");
        assert_eq!(options.filters[0].operator, FilterOperator::Range);
        assert!(!options.ignore_case);
    }

    #[test]
    fn test_config_ignore_case_default() {
        let mut config = config();
        config.ignore_case = true;

        assert!(query_options(&args(), &config).unwrap().ignore_case);
    }

    #[test]
    fn test_bad_filter_flags() {
        let mut bad = args();
        bad.filters = vec!["price".into()];
        assert!(query_options(&bad, &config()).is_err());

        bad.filters = vec!["page=3".into()];
        assert!(query_options(&bad, &config()).is_err());
    }
}
