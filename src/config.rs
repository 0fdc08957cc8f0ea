use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::correlation::{ConfidenceThresholds, DEFAULT_MAX_RESULTS, DEFAULT_WINDOW_SECS};

pub const ENV_FEED_URL: &str = "ALTWATCH_FEED_URL";
pub const ENV_DB_PATH: &str = "ALTWATCH_DB_PATH";
pub const ENV_POLL_INTERVAL_SECS: &str = "ALTWATCH_POLL_INTERVAL_SECS";
pub const ENV_FEED_TIMEOUT_SECS: &str = "ALTWATCH_FEED_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings from {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("feed URL must not be empty")]
    EmptyFeedUrl,
    #[error(
        "confidence thresholds must be ascending and above zero \
         (got low={low}, medium={medium}, high={high}, very_high={very_high})"
    )]
    Thresholds {
        low: usize,
        medium: usize,
        high: usize,
        very_high: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub feed_url: String,
    pub db_path: PathBuf,
    pub poll_interval_secs: u64,
    pub feed_timeout_secs: u64,
    pub scan_window_secs: u64,
    pub max_results: usize,
    pub thresholds: ConfidenceThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: "https://api.tibiadata.com/v4".into(),
            db_path: PathBuf::from("altwatch.sqlite3"),
            poll_interval_secs: 10,
            feed_timeout_secs: 10,
            scan_window_secs: DEFAULT_WINDOW_SECS,
            max_results: DEFAULT_MAX_RESULTS,
            thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl Settings {
    /// Reads `path` if given and present, applies `ALTWATCH_*` overrides from the
    /// process environment, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        settings.apply_overrides(lookup)?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = url;
        }
        if let Some(db_path) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_SECS) {
            self.poll_interval_secs = parse_secs(ENV_POLL_INTERVAL_SECS, value)?;
        }
        if let Some(value) = lookup(ENV_FEED_TIMEOUT_SECS) {
            self.feed_timeout_secs = parse_secs(ENV_FEED_TIMEOUT_SECS, value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::EmptyFeedUrl);
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll interval"));
        }
        if self.feed_timeout_secs == 0 {
            return Err(ConfigError::Zero("feed timeout"));
        }
        if self.scan_window_secs == 0 {
            return Err(ConfigError::Zero("scan window"));
        }
        self.thresholds.validate()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

fn parse_secs(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_the_tracker_cadence() {
        let settings = Settings::load_with(None, no_env).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_interval(), Duration::from_secs(10));
        assert_eq!(settings.scan_window_secs, 60);
        assert_eq!(settings.max_results, 20);
        assert_eq!(settings.thresholds.low, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"pollIntervalSecs": 30, "thresholds": {"low": 2, "medium": 4, "high": 8, "veryHigh": 12}}"#,
        )
        .unwrap();

        let settings = Settings::load_with(Some(path.as_path()), no_env).unwrap();
        assert_eq!(settings.poll_interval_secs, 30);
        assert_eq!(settings.thresholds.very_high, 12);
        assert_eq!(settings.feed_url, "https://api.tibiadata.com/v4");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::load_with(Some(dir.path().join("absent.json").as_path()), no_env).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_with(Some(path.as_path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_FEED_URL, "http://localhost:8080"),
            (ENV_DB_PATH, "/tmp/alt.sqlite3"),
            (ENV_POLL_INTERVAL_SECS, " 5 "),
        ]);
        let settings =
            Settings::load_with(None, |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(settings.feed_url, "http://localhost:8080");
        assert_eq!(settings.db_path, PathBuf::from("/tmp/alt.sqlite3"));
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.feed_timeout_secs, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Settings::load_with(None, |key| {
            (key == ENV_FEED_TIMEOUT_SECS).then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: ENV_FEED_TIMEOUT_SECS, .. }));

        let err = Settings::load_with(None, |key| {
            (key == ENV_POLL_INTERVAL_SECS).then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Zero(_)));

        let settings = Settings {
            thresholds: ConfidenceThresholds {
                low: 5,
                medium: 5,
                high: 10,
                very_high: 15,
            },
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Thresholds { .. })
        ));
    }
}
