//! Host settings stored as settings.json in the app data directory

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Plugins
    pub enabled_plugins: Vec<String>,
    pub plugin_config: BTreeMap<String, serde_json::Value>,
    pub plugin_dir: Option<String>,

    // Rendering
    pub software_rendering: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            enabled_plugins: Vec::new(),
            plugin_config: BTreeMap::new(),
            plugin_dir: None,
            software_rendering: false,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn plugin_dir_or_default(&self) -> PathBuf {
        self.plugin_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::utils::get_exe_dir)
    }

    pub fn is_enabled(&self, plugin: &str) -> bool {
        self.enabled_plugins.iter().any(|p| p == plugin)
    }
}
