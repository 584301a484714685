use diagram_layout::{DEFAULT_CONTAINER_WIDTH, DEFAULT_GAP, DEFAULT_NODE_HEIGHT, LayoutOptions};
use diagram_storage::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub storage_key: String,
    pub fit_view_padding: f64,
    pub fit_view_delay_ms: u64,
    /// Longer than `fit_view_delay_ms` so a freshly added node is measured
    /// before the viewport refits.
    pub add_node_fit_view_delay_ms: u64,
    pub resize_settle_ms: u64,
    pub count_settle_ms: u64,
    /// Used until the view reports a real container width.
    pub default_container_width: f64,
    pub node_height: f64,
    pub gap: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            fit_view_padding: 0.12,
            fit_view_delay_ms: 120,
            add_node_fit_view_delay_ms: 150,
            resize_settle_ms: 160,
            count_settle_ms: 380,
            default_container_width: DEFAULT_CONTAINER_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            gap: DEFAULT_GAP,
        }
    }
}

impl SyncSettings {
    /// Reads settings from a JSON file. Missing fields take their defaults;
    /// a missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::debug!("Settings loaded: {:?}", settings);
                    settings
                }
                Err(e) => {
                    tracing::error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, content)
    }

    pub fn fit_view_delay(&self) -> Duration {
        Duration::from_millis(self.fit_view_delay_ms)
    }

    pub fn add_node_fit_view_delay(&self) -> Duration {
        Duration::from_millis(self.add_node_fit_view_delay_ms)
    }

    pub fn resize_settle(&self) -> Duration {
        Duration::from_millis(self.resize_settle_ms)
    }

    pub fn count_settle(&self) -> Duration {
        Duration::from_millis(self.count_settle_ms)
    }

    pub fn layout_options(&self, container_width: f64) -> LayoutOptions {
        LayoutOptions::for_viewport(container_width, self.node_height, self.gap)
    }
}
