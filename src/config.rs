use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;

/// Session parameters, fixed for the lifetime of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// number of mole holes on the board
    pub option_slots: usize,
    pub session_duration_secs: u32,
    /// pause between preparing a round and its moles popping up
    pub round_reveal_delay_ms: u64,
    pub base_points_per_correct: u32,
    pub bonus_per_second: f64,
    /// a hit this many seconds (or more) after the reveal earns no bonus
    pub max_bonus_window_secs: f64,
    /// permute the question list once when a session starts
    pub shuffle_questions: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            option_slots: 5,
            session_duration_secs: 60,
            round_reveal_delay_ms: 500,
            base_points_per_correct: 100,
            bonus_per_second: 10.0,
            max_bonus_window_secs: 10.0,
            shuffle_questions: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.option_slots == 0 {
            return Err(ConfigError::ZeroOptionSlots);
        }
        if self.session_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        for (field, value) in [
            ("bonus_per_second", self.bonus_per_second),
            ("max_bonus_window_secs", self.max_bonus_window_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidNumber { field, value });
            }
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("molequiz_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<GameConfig>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = ?self.path, %err, "ignoring unreadable config file");
                }
            }
        }
        GameConfig::default()
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        tracing::info!(path = ?self.path, "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_slots_rejected() {
        let cfg = GameConfig {
            option_slots: 0,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroOptionSlots));
    }

    #[test]
    fn zero_duration_rejected() {
        let cfg = GameConfig {
            session_duration_secs: 0,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn negative_and_nan_numbers_rejected() {
        let cfg = GameConfig {
            bonus_per_second: -0.5,
            ..GameConfig::default()
        };
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::InvalidNumber {
                field: "bonus_per_second",
                ..
            })
        );

        let cfg = GameConfig {
            max_bonus_window_secs: f64::NAN,
            ..GameConfig::default()
        };
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::InvalidNumber {
                field: "max_bonus_window_secs",
                ..
            })
        );
    }

    #[test]
    fn zero_reveal_delay_and_zero_points_are_allowed() {
        let cfg = GameConfig {
            round_reveal_delay_ms: 0,
            base_points_per_correct: 0,
            bonus_per_second: 0.0,
            max_bonus_window_secs: 0.0,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = GameConfig::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = GameConfig {
            option_slots: 4,
            session_duration_secs: 30,
            round_reveal_delay_ms: 800,
            base_points_per_correct: 100,
            bonus_per_second: 20.0,
            max_bonus_window_secs: 5.0,
            shuffle_questions: true,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), GameConfig::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), GameConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "option_slots": 3 }"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.option_slots, 3);
        assert_eq!(loaded.session_duration_secs, 60);
    }
}
