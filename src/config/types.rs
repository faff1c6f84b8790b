//! Configuration types for kitchen.
//!
//! Provides structured configuration for the repository backend, the
//! dashboard views, the HTTP server and the link plugins.

use super::defaults::{
    DEFAULT_ENV, DEFAULT_EXCLUDE_ROLE_PREFIX, DEFAULT_HOST, DEFAULT_MONITORING_URL, DEFAULT_PORT,
    DEFAULT_SYNC_PERIOD_MINUTES, DEFAULT_VIRT,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Kitchen repository location and filter defaults
    pub repo: RepoConfig,
    /// Dashboard presentation options
    pub dashboard: DashboardConfig,
    /// HTTP server options
    pub server: ServerConfig,
    /// Link plugins
    pub plugins: PluginConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the directory holding the repository checkout.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.repo.base_path = path.into();
        self
    }

    /// Set the repository directory name.
    pub fn repo_name(mut self, name: impl Into<String>) -> Self {
        self.config.repo.name = name.into();
        self
    }

    /// Set the git URL used by sync.
    pub fn repo_url(mut self, url: Option<String>) -> Self {
        self.config.repo.url = url;
        self
    }

    /// Set the kitchen subdirectory inside the repository.
    pub fn kitchen_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.config.repo.kitchen_subdir = subdir.into();
        self
    }

    /// Set the environment shown when the URL has no `env` parameter.
    pub fn default_env(mut self, env: impl Into<String>) -> Self {
        self.config.repo.default_env = env.into();
        self
    }

    /// Set the virtualization role shown when the URL has no `virt` parameter.
    pub fn default_virt(mut self, virt: impl Into<String>) -> Self {
        self.config.repo.default_virt = virt.into();
        self
    }

    /// Enable or disable the `/virt/` view.
    pub const fn show_virt_view(mut self, show: bool) -> Self {
        self.config.dashboard.show_virt_view = show;
        self
    }

    /// Set the server port.
    pub const fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the enabled plugins.
    pub fn plugins(mut self, names: Vec<String>) -> Self {
        self.config.plugins.enabled = names;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Repository Configuration
// ============================================================================

/// Where the kitchen lives and how its nodes are filtered by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RepoConfig {
    /// Directory that contains the repository checkout
    pub base_path: PathBuf,
    /// Repository directory name under `base_path`
    pub name: String,
    /// Git URL to clone/pull from (sync is disabled when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Kitchen location inside the repository
    pub kitchen_subdir: String,
    /// Roles starting with this prefix are hidden from role lists
    pub exclude_role_prefix: String,
    /// Environment filter applied when the URL has no `env` parameter
    pub default_env: String,
    /// Virtualization filter applied when the URL has no `virt` parameter
    pub default_virt: String,
    /// Minutes between automatic syncs while serving
    pub sync_period_minutes: u64,
    /// File whose modification time records the last sync
    pub syncdate_file: PathBuf,
}

impl RepoConfig {
    /// Repository checkout root.
    #[must_use]
    pub fn repo_root(&self) -> PathBuf {
        self.base_path.join(&self.name)
    }

    /// Kitchen directory (`base_path/name/kitchen_subdir`).
    #[must_use]
    pub fn kitchen_dir(&self) -> PathBuf {
        if self.kitchen_subdir.is_empty() {
            self.repo_root()
        } else {
            self.repo_root().join(&self.kitchen_subdir)
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            name: "kitchen".to_string(),
            url: None,
            kitchen_subdir: String::new(),
            exclude_role_prefix: DEFAULT_EXCLUDE_ROLE_PREFIX.to_string(),
            default_env: DEFAULT_ENV.to_string(),
            default_virt: DEFAULT_VIRT.to_string(),
            sync_period_minutes: DEFAULT_SYNC_PERIOD_MINUTES,
            syncdate_file: std::env::temp_dir().join("kitchen-syncdate"),
        }
    }
}

// ============================================================================
// Dashboard Configuration
// ============================================================================

/// Presentation options for the dashboard views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    /// Expose the guests-by-host view
    pub show_virt_view: bool,
    /// CSS class per tag name; unlisted tags get no extra class
    pub tag_classes: BTreeMap<String, String>,
    /// Page title
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let mut tag_classes = BTreeMap::new();
        tag_classes.insert("WIP".to_string(), "btn-danger".to_string());
        tag_classes.insert("dummy".to_string(), "btn-danger".to_string());
        Self {
            show_virt_view: true,
            tag_classes,
            title: "Kitchen".to_string(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

// ============================================================================
// Plugin Configuration
// ============================================================================

/// Link plugins injected into node records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PluginConfig {
    /// Plugin names, applied in order
    pub enabled: Vec<String>,
    /// Base URL of the monitoring site used by the monitoring plugins
    pub monitoring_url: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            monitoring_url: DEFAULT_MONITORING_URL.to_string(),
        }
    }
}
