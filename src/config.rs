//! Pipeline configuration
//!
//! A JSON file describing the record fields, paging limits, the HTTP
//! listener and logging. Every key except `fields` has a default.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::{FieldDecl, FieldRegistry};
use crate::observability::Severity;
use crate::query::{ParseLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "GRID_CONFIG_READ",
            ConfigError::Parse(_) => "GRID_CONFIG_PARSE",
            ConfigError::Invalid(_) => "GRID_CONFIG_INVALID",
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Record fields, in declaration order
    pub fields: Vec<FieldDecl>,

    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Default for `ignore_case` when a query does not set it
    #[serde(default)]
    pub ignore_case: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty disables CORS headers
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Timeout for remote adapter requests
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// Lowest logged severity (trace, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8480
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl PipelineConfig {
    /// Configuration with the given fields and defaults for everything else
    pub fn with_fields(fields: Vec<FieldDecl>) -> Self {
        Self {
            fields,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            ignore_case: false,
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            remote_timeout_ms: default_remote_timeout_ms(),
            log_level: default_log_level(),
        }
    }

    /// Loads and validates a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parses and validates configuration JSON
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::Invalid("at least one field must be declared".into()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Invalid("field names must not be empty".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "field '{}' is declared twice",
                    field.name
                )));
            }
        }

        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid("default_page_size must be > 0".into()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Field registry over JSON records
    pub fn registry(&self) -> FieldRegistry<serde_json::Value> {
        FieldRegistry::from_declarations(&self.fields)
    }

    /// Names of the fields free-text search looks at
    pub fn searchable_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.searchable)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Configured log level; validation guarantees it parses
    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"{"fields": [{"name": "name", "kind": "text", "searchable": true}]}"#;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_json_str(MINIMAL).unwrap();

        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 1000);
        assert!(!config.ignore_case);
        assert_eq!(config.socket_addr(), "127.0.0.1:8480");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.remote_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_severity(), Severity::Warn);
        assert_eq!(config.searchable_fields(), vec!["name".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "fields": [
                    {{"name": "title", "kind": "text", "searchable": true}},
                    {{"name": "price", "kind": "float"}},
                    {{"name": "address.city", "kind": "text"}}
                ],
                "port": 9000,
                "log_level": "info"
            }}"#
        )
        .unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_severity(), Severity::Info);

        let registry = config.registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("price").unwrap().kind(), FieldKind::Float);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/gridquery.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.code(), "GRID_CONFIG_READ");
    }

    #[test]
    fn test_invalid_configs() {
        let cases = [
            r#"{"fields": []}"#,
            r#"{"fields": [{"name": "a", "kind": "int"}, {"name": "a", "kind": "text"}]}"#,
            r#"{"fields": [{"name": "a", "kind": "int"}], "default_page_size": 0}"#,
            r#"{"fields": [{"name": "a", "kind": "int"}], "default_page_size": 50, "max_page_size": 10}"#,
            r#"{"fields": [{"name": "a", "kind": "int"}], "log_level": "loud"}"#,
        ];

        for case in cases {
            let err = PipelineConfig::from_json_str(case).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{case} should be invalid");
        }
    }

    #[test]
    fn test_bad_json() {
        let err = PipelineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // unknown kind is a parse error too
        let err = PipelineConfig::from_json_str(r#"{"fields": [{"name": "a", "kind": "blob"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_with_fields_is_valid() {
        let config = PipelineConfig::with_fields(vec![FieldDecl::new("id", FieldKind::Int)]);
        assert!(config.validate().is_ok());
        assert_eq!(config.parse_limits(), ParseLimits::default());
    }
}
