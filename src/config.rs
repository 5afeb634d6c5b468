use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Generative API key; falls back to `GEMINI_API_KEY` / `API_KEY`
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub trainer_duration_secs: u32,
    pub default_cps: u8,
    /// Ring the terminal bell for haptic feedback
    pub haptics: bool,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
    pub reclamp_on_resize: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            trainer_duration_secs: 30,
            default_cps: 20,
            haptics: false,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            reclamp_on_resize: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Fill the API key from the environment when the file does not carry one
    pub fn with_env(mut self) -> Self {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Clamp out-of-range values a hand-edited file may carry
    pub fn sanitized(mut self) -> Self {
        self.trainer_duration_secs = self.trainer_duration_secs.clamp(5, 300);
        self.default_cps = self.default_cps.clamp(1, 50);
        if !(self.cell_width_px.is_finite() && self.cell_width_px > 0.0) {
            self.cell_width_px = 8.0;
        }
        if !(self.cell_height_px.is_finite() && self.cell_height_px > 0.0) {
            self.cell_height_px = 16.0;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
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
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg.sanitized(),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
