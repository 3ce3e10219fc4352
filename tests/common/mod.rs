//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use assert_cmd::Command;

use codescope::HistoryEntry;
use tempfile::TempDir;

/// A report exercising every keyword weight and a fenced fix
pub const VULNERABLE_REPORT: &str = "SUMMARY:
1. SQL Injection
2. Missing input validation

IMPACT:
1. A critical vulnerability: attackers can exploit the query to dump the users table.
2. Consider this a warning sign for other handlers.

SOLUTION:
1. Use parameterized queries:
```python
cursor.execute(\"SELECT * FROM users WHERE id = %s\", (user_id,))
```
2. Minor: validate ids as integers.";

/// A report without any scoring keyword
pub const CLEAN_REPORT: &str = "SUMMARY:\nNo issues found.\n\nIMPACT:\nNone.\n\nSOLUTION:\nNothing to change.";

/// Code long enough to pass the minimum length check
pub const SAMPLE_CODE: &str = "def get_user(user_id):\n    return db.execute(\"SELECT * FROM users WHERE id = \" + user_id)";

/// Success body of the Messages API carrying `text`
pub fn api_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 80}
    })
}

/// Error body of the Messages API
pub fn api_error(kind: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"type": "error", "error": {"type": kind, "message": message}})
}

pub fn history_entry(report: &str, timestamp_millis: i64) -> HistoryEntry {
    HistoryEntry::new(SAMPLE_CODE, report, "Claude Sonnet 4", timestamp_millis)
}

/// Isolated home directory with a config file pointing history and exports inside it
pub struct TestEnv {
    home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        let env = Self { home };
        env.write_config("");
        env
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("config.toml")
    }

    pub fn history_path(&self) -> PathBuf {
        self.home.path().join("data").join("codescope_history.json")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.home.path().join("reports")
    }

    /// Write the config file: storage paths plus any extra TOML lines
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            "history_path = {:?}\nexport_dir = {:?}\n{}\n",
            self.history_path().display().to_string(),
            self.export_dir().display().to_string(),
            extra
        );
        fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// The binary with a clean environment rooted at this home
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_codescope"));
        cmd.env("HOME", self.home.path())
            .env("XDG_CACHE_HOME", self.home.path().join("cache"))
            .env("XDG_DATA_HOME", self.home.path().join("share"))
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env_remove("ANTHROPIC_API_KEY")
            .env_remove("CODESCOPE_API_KEY")
            .env_remove("CODESCOPE_API_URL")
            .env_remove("CODESCOPE_LOG")
            .env_remove("CODESCOPE_CONFIG")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }
}

/// Native-messaging frame: native-endian u32 length, then the payload
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_ne_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// Split a byte stream into frame payloads
pub fn read_frames(mut bytes: &[u8]) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while bytes.len() >= 4 {
        let length = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let payload = &bytes[4..4 + length];
        frames.push(serde_json::from_slice(payload).expect("frame is JSON"));
        bytes = &bytes[4 + length..];
    }
    frames
}
