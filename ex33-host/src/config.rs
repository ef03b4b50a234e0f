//! Host configuration: optional YAML file, then environment overrides.

use ex33_core::{DeviceId, Ex33Error, Ex33Result, GridOverlay, Viewport, Zoom, GRIDS};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Where the key-value store and screenshots live.
    pub data_dir: PathBuf,
    /// Sandbox document rewritten on every reload.
    pub preview_path: PathBuf,
    pub device: DeviceId,
    pub zoom: Zoom,
    pub viewport: Viewport,
    pub grid: GridOverlay,
    pub analysis: AnalysisConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ex33"),
            preview_path: PathBuf::from(".ex33/preview.html"),
            device: DeviceId::default(),
            zoom: Zoom::default(),
            viewport: Viewport::default(),
            grid: GridOverlay::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl HostConfig {
    /// Reads `EX33_CONFIG` (if set) and applies environment overrides.
    pub fn load() -> Ex33Result<Self> {
        let mut config = match std::env::var("EX33_CONFIG") {
            Ok(path) => Self::from_yaml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Ex33Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Ex33Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Ex33Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: HostConfig =
            serde_yaml::from_str(content).map_err(|e| Ex33Error::Config(e.to_string()))?;
        // Deserialize bypasses the constructor clamp.
        config.zoom = Zoom::new(config.zoom.percent());
        if !GridOverlay::is_known_size(config.grid.size) {
            return Err(Ex33Error::Config(format!(
                "grid size {} is not one of {:?}",
                config.grid.size, GRIDS
            )));
        }
        Ok(config)
    }

    /// Environment wins over the file. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("EX33_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("EX33_PREVIEW_PATH") {
            self.preview_path = PathBuf::from(path);
        }
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            self.analysis.api_key = Some(key);
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.data_dir.join("shots")
    }
}
