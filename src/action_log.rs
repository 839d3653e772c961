use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One recorded action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub action: String,
    pub status: String,
    #[serde(default)]
    pub info: Value,
}

/// Append-only journal of pipeline actions, persisted as one JSON array.
///
/// The handle is injected wherever actions are recorded, so tests can point
/// it at a scratch path. The whole file is rewritten on every append
/// (read-modify-write); an unreadable or corrupt file starts a fresh log
/// instead of failing the run.
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries; missing or corrupt content reads as empty.
    pub fn entries(&self) -> Vec<LogEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "action log unreadable; starting empty"
                );
                Vec::new()
            }
        }
    }

    pub fn append(&self, action: &str, status: &str, info: Value) -> Result<()> {
        let mut entries = self.entries();
        entries.push(LogEntry {
            time: Local::now().to_rfc3339(),
            action: action.to_string(),
            status: status.to_string(),
            info,
        });
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log dir {}", parent.display()))?;
            }
        }
        let body = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, body)
            .with_context(|| format!("write action log {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_log(tag: &str) -> ActionLog {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("kaspi-parser-log-{tag}-{nanos}/log.json"));
        ActionLog::new(path)
    }

    fn cleanup(log: &ActionLog) {
        if let Some(parent) = log.path().parent() {
            fs::remove_dir_all(parent).ok();
        }
    }

    #[test]
    fn appends_accumulate_in_order() {
        let log = scratch_log("order");
        log.append("fetch_offers", "ok", json!({"offers": 2})).unwrap();
        log.append("export", "ok", Value::Null).unwrap();
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "fetch_offers");
        assert_eq!(entries[0].status, "ok");
        assert_eq!(entries[0].info["offers"], 2);
        assert_eq!(entries[1].action, "export");
        cleanup(&log);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let log = scratch_log("missing");
        assert!(log.entries().is_empty());
    }

    #[test]
    fn corrupted_log_restarts_empty() {
        let log = scratch_log("corrupt");
        fs::create_dir_all(log.path().parent().unwrap()).unwrap();
        fs::write(log.path(), "not json {{{").unwrap();
        assert!(log.entries().is_empty());

        log.append("aggregate", "ok", Value::Null).unwrap();
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "aggregate");
        cleanup(&log);
    }

    #[test]
    fn entries_round_trip_through_disk() {
        let log = scratch_log("roundtrip");
        log.append("save_product", "ok", json!({"row_id": 7})).unwrap();
        let reread = ActionLog::new(log.path().to_path_buf());
        let entries = reread.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].info["row_id"], 7);
        assert!(!entries[0].time.is_empty());
        cleanup(&log);
    }
}
