//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last opened library path
    pub last_library: Option<PathBuf>,
    /// UI settings
    pub ui: UiConfig,
    /// Viewer settings
    pub viewer: ViewerConfig,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Sidebar width in points
    pub sidebar_width: f32,
}

/// Viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Viewer chrome toggles
    pub chrome: ChromeConfig,
    /// Legacy fallback: force the viewer visible when a load times out
    /// instead of reporting an error
    pub force_show_on_timeout: bool,
}

/// Which viewer chrome elements are presented
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromeConfig {
    /// Toolbar row above the rendered document
    pub toolbar: bool,
    /// Document outline pane
    pub nav_pane: bool,
    /// Scroll bar on the rendered view
    pub scrollbar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar_width: 260.0,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            chrome: ChromeConfig::default(),
            force_show_on_timeout: false,
        }
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            toolbar: true,
            nav_pane: true,
            scrollbar: true,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "docshelf", "Docshelf")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.last_library.is_none());
        assert!(config.viewer.chrome.toolbar);
        assert!(config.viewer.chrome.nav_pane);
        assert!(config.viewer.chrome.scrollbar);
        assert!(!config.viewer.force_show_on_timeout);
    }

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::default();
        config.last_library = Some(PathBuf::from("/tmp/library"));
        config.viewer.force_show_on_timeout = true;

        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last_library, Some(PathBuf::from("/tmp/library")));
        assert!(back.viewer.force_show_on_timeout);
    }
}
