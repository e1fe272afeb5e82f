//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > defaults.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Quiz sessions are dropped after this many hours without activity
pub const SESSION_EXPIRY_HOURS: i64 = 2;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Lifetime of the visitor cookie that scopes stored progress
pub const VISITOR_COOKIE_DAYS: i64 = 365;

// ==================== Access Gate ====================

/// Timeout for the remote email verification call
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 15;

// ==================== Config file ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    content: Option<ContentSection>,
    gate: Option<GateSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentSection {
    lessons_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GateSection {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved settings used at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub lessons_dir: PathBuf,
    /// Email verification endpoint; the gate cannot open without one
    pub verify_endpoint: Option<String>,
    pub verify_timeout: Duration,
}

impl Settings {
    /// Load settings from `config.toml`, `.env` and the process environment.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Using config.toml");
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring unparseable config.toml: {}", e);
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        };

        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge a parsed config file with environment lookups.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server;
        let addr = server
            .as_ref()
            .and_then(|s| s.addr.clone())
            .or_else(|| env("ECG_ADDR"))
            .unwrap_or_else(|| SERVER_ADDR.to_string());
        let port = server
            .as_ref()
            .and_then(|s| s.port)
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .unwrap_or_else(paths::db_path);

        let lessons_dir = file
            .content
            .and_then(|c| c.lessons_dir)
            .or_else(|| env("LESSONS_DIR"))
            .unwrap_or_else(|| paths::LESSONS_DIR.to_string());

        let gate = file.gate;
        let verify_endpoint = gate
            .as_ref()
            .and_then(|g| g.endpoint.clone())
            .or_else(|| env("ECG_VERIFY_URL"))
            .filter(|url| !url.trim().is_empty());
        let timeout_secs = gate
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .or_else(|| env("ECG_VERIFY_TIMEOUT_SECS").and_then(|s| s.parse().ok()))
            .unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS);

        Self {
            addr,
            port,
            database_path: PathBuf::from(database_path),
            lessons_dir: PathBuf::from(lessons_dir),
            verify_endpoint,
            verify_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(FileConfig::default(), env_from(&[]));
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
        assert!(settings.database_path.ends_with("ecg.db"));
        assert_eq!(settings.lessons_dir, PathBuf::from("content/lessons"));
        assert_eq!(settings.verify_endpoint, None);
        assert_eq!(settings.verify_timeout, Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let settings = Settings::resolve(
            FileConfig::default(),
            env_from(&[
                ("PORT", "3100"),
                ("DATABASE_PATH", "/tmp/x.db"),
                ("ECG_VERIFY_URL", "https://verify.example/exec"),
                ("ECG_VERIFY_TIMEOUT_SECS", "3"),
            ]),
        );
        assert_eq!(settings.port, 3100);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(settings.verify_endpoint.as_deref(), Some("https://verify.example/exec"));
        assert_eq!(settings.verify_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_config_file_wins_over_env() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [content]
            lessons_dir = "lessons"

            [gate]
            endpoint = "https://file.example/exec"
            "#,
        )
        .unwrap();
        let settings = Settings::resolve(
            file,
            env_from(&[("PORT", "3100"), ("ECG_VERIFY_URL", "https://env.example/exec")]),
        );
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.lessons_dir, PathBuf::from("lessons"));
        assert_eq!(settings.verify_endpoint.as_deref(), Some("https://file.example/exec"));
    }

    #[test]
    fn test_blank_endpoint_is_unset() {
        let settings = Settings::resolve(FileConfig::default(), env_from(&[("ECG_VERIFY_URL", "  ")]));
        assert_eq!(settings.verify_endpoint, None);
    }
}
