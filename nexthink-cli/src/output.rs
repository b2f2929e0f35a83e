//! Output formatting for CLI.

use std::path::Path;

use anyhow::{Context, Result};
use nexthink_services::nql::{ExecuteV1Response, ExportStatusResponse};
use serde::Serialize;

/// Serializes values as compact or indented JSON.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }
}

/// Tab-separated table of a V1 result, header row first.
pub fn format_rows(response: &ExecuteV1Response) -> String {
    let mut lines = Vec::with_capacity(response.data.len() + 1);
    lines.push(response.headers.join("\t"));
    for row in &response.data {
        let cells: Vec<String> = row.iter().map(cell).collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line summary of an export status.
pub fn format_status(export_id: &str, status: &ExportStatusResponse) -> String {
    let mut line = format!("{export_id}: {}", status.status);
    if let Some(url) = &status.results_file_url {
        line.push_str(&format!("\n  results: {url}"));
    }
    if let Some(reason) = &status.error_description {
        line.push_str(&format!("\n  error: {reason}"));
    }
    line
}

/// Writes bytes to `path`, or to stdout when no path is given.
pub async fn write_bytes(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexthink_core::ExportStatus;
    use serde_json::json;

    #[test]
    fn test_json_formatter() {
        let value = json!({"a": 1});
        assert_eq!(JsonFormatter::new(false).format(&value).unwrap(), r#"{"a":1}"#);
        assert!(JsonFormatter::new(true).format(&value).unwrap().contains('\n'));
    }

    #[test]
    fn test_format_rows() {
        let response = ExecuteV1Response {
            headers: vec!["name".into(), "cpu".into(), "os".into()],
            data: vec![vec![json!("laptop-1"), json!(42), serde_json::Value::Null]],
            ..ExecuteV1Response::default()
        };
        assert_eq!(format_rows(&response), "name\tcpu\tos\nlaptop-1\t42\t");
    }

    #[test]
    fn test_format_status() {
        let status = ExportStatusResponse {
            export_id: None,
            status: ExportStatus::Error,
            results_file_url: None,
            error_description: Some("query failed".into()),
        };
        assert_eq!(format_status("e1", &status), "e1: ERROR\n  error: query failed");
    }

    #[tokio::test]
    async fn test_write_bytes_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_bytes(Some(&path), b"a,b\n").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }
}
