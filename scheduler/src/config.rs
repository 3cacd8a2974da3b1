use marketeer_core::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_FILE: &str = "scheduler-config.json";

/// Scheduler settings, persisted as `scheduler-config.json`.
///
/// Missing fields fall back to the defaults, so a hand-edited partial file
/// keeps working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Upper bound on posts per day; extra scheduled times are ignored.
    pub tweets_per_day: usize,
    /// Wall-clock posting times as `[hour, minute]` pairs, local time.
    pub scheduled_times: Vec<(u32, u32)>,
    /// ISO-8601 timestamp of the last successful scheduled post.
    pub last_run: Option<String>,
    pub logging: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tweets_per_day: 2,
            scheduled_times: vec![(16, 30), (20, 0)],
            last_run: None,
            logging: true,
        }
    }
}

impl SchedulerConfig {
    /// The times that will actually fire: valid wall-clock pairs, capped
    /// at `tweets_per_day`.
    pub fn effective_times(&self) -> Vec<(u32, u32)> {
        self.scheduled_times
            .iter()
            .copied()
            .filter(|&(hour, minute)| {
                let valid = hour < 24 && minute < 60;
                if !valid {
                    warn!("Ignoring invalid scheduled time {}:{:02}", hour, minute);
                }
                valid
            })
            .take(self.tweets_per_day)
            .collect()
    }
}

/// Loads and saves the scheduler config file.
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the config, creating the file with defaults when it does not
    /// exist. A malformed file yields the defaults without being rewritten.
    pub fn load_or_create(&self) -> Result<SchedulerConfig, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => {
                    info!("Scheduler config loaded from {}", self.path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!(
                        "Scheduler config {} is malformed, using defaults: {}",
                        self.path.display(),
                        e
                    );
                    Ok(SchedulerConfig::default())
                }
            },
            Err(_) => {
                let config = SchedulerConfig::default();
                self.save(&config)?;
                info!("Created scheduler config at {}", self.path.display());
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &SchedulerConfig) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_serialize_with_camel_case_pairs() {
        let json = serde_json::to_string(&SchedulerConfig::default()).unwrap();
        assert!(json.contains("\"tweetsPerDay\":2"));
        assert!(json.contains("\"scheduledTimes\":[[16,30],[20,0]]"));
        assert!(json.contains("\"lastRun\":null"));
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.tweets_per_day, 2);
        assert_eq!(config.scheduled_times, vec![(16, 30), (20, 0)]);
        assert!(config.logging);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("scheduler-config.json"));

        let config = store.load_or_create().unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert!(store.path().exists());

        // Second load reads the file just written.
        assert_eq!(store.load_or_create().unwrap(), config);
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("scheduler-config.json"));
        std::fs::write(store.path(), "{broken").unwrap();

        assert_eq!(store.load_or_create().unwrap(), SchedulerConfig::default());
    }

    #[test]
    fn test_effective_times_caps_and_filters() {
        let config = SchedulerConfig {
            tweets_per_day: 2,
            scheduled_times: vec![(25, 0), (9, 15), (12, 0), (18, 30)],
            ..SchedulerConfig::default()
        };
        assert_eq!(config.effective_times(), vec![(9, 15), (12, 0)]);
    }
}
