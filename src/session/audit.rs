use crate::session::paths::ParleyPaths;
use crate::session::util::now_epoch_secs;
use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use serde::Serialize;
use std::fs;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub at_local: String,
    pub session_id: String,
    pub event: String,
    pub status: String,
    pub detail: String,
}

/// Append one session event to the JSONL audit log. This is
/// observability, not session state; nothing is ever read back.
pub fn append_event(
    paths: &ParleyPaths,
    session_id: &str,
    event: &str,
    status: &str,
    detail: &str,
) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let now = Local::now();
    let record = AuditEvent {
        at_epoch_secs: now_epoch_secs()?,
        at_local: format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second()
        ),
        session_id: session_id.to_string(),
        event: event.to_string(),
        status: status.to_string(),
        detail: detail.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&record)?);
    use std::io::Write;
    let path = paths.logs_dir.join("audit.log");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::append_event;
    use crate::session::paths::ParleyPaths;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn append_event_writes_one_json_line() {
        let tmp = tempdir().expect("tempdir");
        let paths = ParleyPaths {
            parley_home: tmp.path().to_path_buf(),
            logs_dir: tmp.path().join("logs"),
            directive_file: tmp.path().join("PRIME_DIRECTIVE.md"),
        };

        append_event(&paths, "session-1", "turn", "ok", "reply sent").expect("append");
        append_event(&paths, "session-1", "condense", "ok", "token_count=4200").expect("append");

        let raw = fs::read_to_string(paths.logs_dir.join("audit.log")).expect("read log");
        let lines = raw.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(first["session_id"], "session-1");
        assert_eq!(first["event"], "turn");
        assert_eq!(first["status"], "ok");
    }
}
