//! Append-only plaintext record of executed bans and unbans.

use std::fmt;
use std::path::PathBuf;

use chrono::Local;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::platform::UserRef;

pub const NO_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Ban,
    Unban,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditAction::Ban => "BAN",
            AuditAction::Unban => "UNBAN",
        })
    }
}

#[derive(Debug, Error)]
#[error("could not write audit log: {0}")]
pub struct LogWriteFailed(#[from] std::io::Error);

/// The audit sink. Appends one line per action, never truncates.
pub struct AuditLog {
    path: PathBuf,
    // appends are serialized so concurrent completions never interleave
    write: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write: Mutex::new(()),
        }
    }

    /// Appends one record, creating the file on first use.
    ///
    /// The moderation action has already happened by the time this is
    /// called; a write failure is reported but rolls nothing back.
    pub async fn record(
        &self,
        action: AuditAction,
        target: &UserRef,
        performed_by: &UserRef,
        reason: Option<&str>,
    ) -> Result<(), LogWriteFailed> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let line = format_line(&now, action, target, performed_by, reason);

        let _guard = self.write.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn format_line(
    now: &str,
    action: AuditAction,
    target: &UserRef,
    performed_by: &UserRef,
    reason: Option<&str>,
) -> String {
    format!(
        "[{now}] {action}: {} by {} | Reason: {}\n",
        target.tag(),
        performed_by.tag(),
        reason.unwrap_or(NO_REASON)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> UserRef {
        UserRef {
            id: 123,
            name: "targetX".to_string(),
        }
    }

    fn moderator() -> UserRef {
        UserRef {
            id: 7,
            name: "moderator".to_string(),
        }
    }

    #[test]
    fn line_format_matches_the_log_contract() {
        let line = format_line(
            "2026-08-07 12:00:00",
            AuditAction::Ban,
            &target(),
            &moderator(),
            Some("spam"),
        );
        assert_eq!(
            line,
            "[2026-08-07 12:00:00] BAN: targetX (ID: 123) by moderator (ID: 7) | Reason: spam\n"
        );
    }

    #[test]
    fn missing_reason_gets_the_default() {
        let line = format_line(
            "2026-08-07 12:00:00",
            AuditAction::Unban,
            &target(),
            &moderator(),
            None,
        );
        assert!(line.ends_with("| Reason: No reason provided\n"));
        assert!(line.contains("UNBAN: targetX (ID: 123)"));
    }

    #[tokio::test]
    async fn record_appends_without_losing_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));

        log.record(AuditAction::Ban, &target(), &moderator(), Some("spam"))
            .await
            .unwrap();
        log.record(AuditAction::Unban, &target(), &moderator(), None)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("BAN: targetX"));
        assert!(lines[1].contains("UNBAN: targetX"));
    }

    #[tokio::test]
    async fn unreachable_sink_surfaces_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in place of the file makes the open fail
        let log = AuditLog::new(dir.path().to_path_buf());
        let result = log
            .record(AuditAction::Ban, &target(), &moderator(), None)
            .await;
        assert!(result.is_err());
    }
}
