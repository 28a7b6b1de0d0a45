//! JSONL file writer for failure reports.
//!
//! Each report is serialized as a single JSON line with a `type` field and
//! `timestamp`, appended to the file via a buffered writer. Every report is
//! also emitted as a `tracing` error.

use govbot_application::ErrorReporter;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, warn};

/// Error reporter that appends one JSON object per report.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every report.
pub struct JsonlErrorReporter {
    writer: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
}

impl JsonlErrorReporter {
    /// Create a reporter appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create report directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open report file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Some(Mutex::new(BufWriter::new(file))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Reporter that only logs
    pub fn log_only() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    /// Get the path to the report file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ErrorReporter for JsonlErrorReporter {
    fn report(&self, subject: &str, body: &str) {
        error!("{}", subject);

        let Some(writer) = &self.writer else {
            return;
        };

        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = serde_json::json!({
            "type": "evaluation_failure",
            "timestamp": timestamp,
            "subject": subject,
            "body": body,
        });
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlErrorReporter {
    fn drop(&mut self) {
        if let Some(writer) = &self.writer
            && let Ok(mut writer) = writer.lock()
        {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read(path: &Path) -> String {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_reporter_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("errors.jsonl");
        let reporter = JsonlErrorReporter::new(&path).unwrap();

        reporter.report(
            "Vote evaluation failed for org/repo#1",
            "Error: Platform error: Request failed: HTTP 502",
        );
        reporter.report("Vote evaluation failed for org/repo#2", "second");
        drop(reporter);

        let content = read(&path);
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "evaluation_failure");
        assert_eq!(first["subject"], "Vote evaluation failed for org/repo#1");
        assert!(first["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_reporter_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");

        JsonlErrorReporter::new(&path).unwrap().report("first", "");
        JsonlErrorReporter::new(&path).unwrap().report("second", "");

        assert_eq!(read(&path).lines().count(), 2);
    }

    #[test]
    fn test_log_only_reporter_has_no_file() {
        let reporter = JsonlErrorReporter::log_only();
        reporter.report("subject", "body");
        assert!(reporter.path().is_none());
    }
}
