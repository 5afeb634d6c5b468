use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("aimhq"),
            )
        } else {
            ProjectDirs::from("", "", "aimhq").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Key-value store backing every persisted panel value
    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("store.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("aimhq.log"))
    }

    /// CSV history of finished trainer sessions
    pub fn trainer_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("trainer_log.csv"))
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "aimhq") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("aimhq_config.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_files_share_a_directory() {
        let db = AppDirs::db_path();
        let log = AppDirs::log_path();
        if let (Some(db), Some(log)) = (db, log) {
            assert_eq!(db.parent(), log.parent());
            assert!(db.ends_with("store.db"));
        }
    }
}
