//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/dashgrd/config.json` (override with `--config <path>`).
//! Every section is optional; a missing file means compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "layout": { "path": "/home/me/.local/share/dashgrd/layout.json", "autosave": true },
//!   "pipeline": { "provider_timeout_ms": 5000 },
//!   "viewport": { "width": 1280.0, "height": 800.0 },
//!   "widgets": [
//!     { "id": "mail", "type": "app", "name": "Mail", "target": "https://mail.example" },
//!     { "type": "custom", "colSpan": 3, "contentHTML": "<input type=search>" }
//!   ]
//! }
//! ```

use crate::widget::WidgetDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and when the layout is saved.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Provider pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Page size used by the headless surface for pointer mapping.
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Widgets handed to the board by the built-in static provider.
    #[serde(default)]
    pub widgets: Vec<WidgetDescriptor>,
}

/// Layout persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Layout file.  Defaults to `$XDG_DATA_HOME/dashgrd/layout.json`.
    pub path: Option<PathBuf>,
    /// Save after every move, swap and removal.
    pub autosave: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            path: None,
            autosave: true,
        }
    }
}

impl LayoutConfig {
    /// The configured path, or the default under the XDG data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_layout_path)
    }
}

fn default_layout_path() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.local/share", home)
    });
    PathBuf::from(base).join("dashgrd").join("layout.json")
}

/// Provider pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How long to wait for one provider before moving on (ms).
    pub provider_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 5000,
        }
    }
}

impl PipelineConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

/// Size of one page, in pointer coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "layout": { "path": "/var/lib/dashgrd/layout.json", "autosave": false },
            "pipeline": { "provider_timeout_ms": 250 },
            "viewport": { "width": 800.0, "height": 600.0 },
            "widgets": [
                { "id": "mail", "type": "app", "name": "Mail", "target": "https://mail.example" },
                { "type": "custom", "colSpan": 3, "contentHTML": "<b>hi</b>" }
            ]
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(
            cfg.layout.resolved_path(),
            PathBuf::from("/var/lib/dashgrd/layout.json")
        );
        assert!(!cfg.layout.autosave);
        assert_eq!(cfg.pipeline.provider_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.viewport.width, 800.0);
        assert_eq!(cfg.widgets.len(), 2);
        assert_eq!(cfg.widgets[1].col_span, Some(3));
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert!(cfg.layout.autosave);
        assert!(cfg.layout.path.is_none());
        assert_eq!(cfg.pipeline.provider_timeout_ms, 5000);
        assert_eq!(cfg.viewport.height, ViewportConfig::default().height);
        assert!(cfg.widgets.is_empty());
    }

    #[test]
    fn deserialize_partial_sections() {
        let json = r#"{ "layout": { "autosave": false }, "viewport": { "width": 640.0 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(!cfg.layout.autosave);
        assert_eq!(cfg.viewport.width, 640.0);
        assert_eq!(cfg.viewport.height, 1000.0);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "pipeline": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(Config::load(&missing)
            .unwrap_err()
            .to_string()
            .contains("failed to read"));

        let bad = dir.path().join("bad.json");
        std::fs::File::create(&bad)
            .unwrap()
            .write_all(b"{ \"widgets\": 3 }")
            .unwrap();
        assert!(Config::load(&bad)
            .unwrap_err()
            .to_string()
            .contains("failed to parse"));
    }
}
