//! JSON I/O handling for CLI
//!
//! - Input: a file holding one JSON array of record objects
//! - Output: one JSON object on stdout, `{"status": "ok", "data": ...}`

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read records from a JSON array file
pub fn read_records(path: &Path) -> CliResult<Vec<Value>> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;

    match serde_json::from_str(&content)? {
        Value::Array(records) => Ok(records),
        _ => Err(CliError::io_error(format!(
            "{} must contain a JSON array of records",
            path.display()
        ))),
    }
}

/// Write a success response to stdout
pub fn write_response<T: Serialize>(data: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    write_response_to(data, &mut stdout)
}

fn write_response_to<T: Serialize, W: Write>(data: &T, writer: &mut W) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data,
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_records() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "Apple"}}, {{"name": "Banana"}}]"#).unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], "Banana");
    }

    #[test]
    fn test_read_records_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Apple"}}"#).unwrap();

        let err = read_records(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "GRID_CLI_IO_ERROR");
    }

    #[test]
    fn test_response_envelope() {
        let mut out = Vec::new();
        write_response_to(&vec![1, 2], &mut out).unwrap();

        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"], serde_json::json!([1, 2]));
    }
}
