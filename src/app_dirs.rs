use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "molequiz").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Directory for the log file; the terminal belongs to the TUI.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("molequiz"),
            )
        } else {
            ProjectDirs::from("", "", "molequiz").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}
