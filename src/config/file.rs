//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{AppConfig, DashboardConfig, PluginConfig, RepoConfig, ServerConfig};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".kitchen.yaml",
    ".kitchen.yml",
    "kitchen.yaml",
    "kitchen.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/kitchen/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) = dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("kitchen")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence
    /// wherever it differs from the defaults.
    ///
    /// This is how CLI args are layered over file config.
    pub fn merge(&mut self, other: &Self) {
        let repo_defaults = RepoConfig::default();
        if other.repo.base_path != repo_defaults.base_path {
            self.repo.base_path.clone_from(&other.repo.base_path);
        }
        if other.repo.name != repo_defaults.name {
            self.repo.name.clone_from(&other.repo.name);
        }
        if other.repo.url.is_some() {
            self.repo.url.clone_from(&other.repo.url);
        }
        if other.repo.kitchen_subdir != repo_defaults.kitchen_subdir {
            self.repo.kitchen_subdir.clone_from(&other.repo.kitchen_subdir);
        }
        if other.repo.default_env != repo_defaults.default_env {
            self.repo.default_env.clone_from(&other.repo.default_env);
        }
        if other.repo.default_virt != repo_defaults.default_virt {
            self.repo.default_virt.clone_from(&other.repo.default_virt);
        }

        if other.dashboard.show_virt_view != DashboardConfig::default().show_virt_view {
            self.dashboard.show_virt_view = other.dashboard.show_virt_view;
        }

        let server_defaults = ServerConfig::default();
        if other.server.host != server_defaults.host {
            self.server.host.clone_from(&other.server.host);
        }
        if other.server.port != server_defaults.port {
            self.server.port = other.server.port;
        }

        if other.plugins.enabled != PluginConfig::default().enabled {
            self.plugins.enabled.clone_from(&other.plugins.enabled);
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# Kitchen Configuration File
# ===========================
#
# Place it at:
#   - .kitchen.yaml in the current directory or git root
#   - ~/.config/kitchen/kitchen.yaml for global config

repo:
  # Directory containing the repository checkout
  base_path: .
  # Repository directory name under base_path
  name: kitchen
  # Git URL; when set, `kitchen sync` and the server keep the checkout fresh
  # url: git@example.com:ops/chef.git
  # Kitchen location inside the repository
  kitchen_subdir: ''
  # Roles starting with this prefix are hidden from role lists
  exclude_role_prefix: env
  # Filters applied when the URL does not carry env/virt
  default_env: production
  default_virt: guest
  sync_period_minutes: 2

dashboard:
  show_virt_view: true
  title: Kitchen
  tag_classes:
    WIP: btn-danger
    dummy: btn-danger

server:
  host: 127.0.0.1
  port: 8000

plugins:
  # Available: monitoring, monitoring-virt, haproxy
  enabled: []
  monitoring_url: http://monitoring.mydomain.com
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert_eq!(config.repo.default_env, "production");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.dashboard.tag_classes["WIP"], "btn-danger");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/.kitchen.yaml")).unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(_)));
    }

    #[test]
    fn test_load_config_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".kitchen.yaml");
        std::fs::write(&path, "repo:\n  name: testrepo\nserver:\n  port: 9000\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.repo.name, "testrepo");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.repo.default_env, "production");
    }

    #[test]
    fn test_merge_prefers_non_default_overrides() {
        let mut base = AppConfig::builder().repo_name("from-file").port(9000).build();
        let overrides = AppConfig::builder().base_path("/srv").build();
        base.merge(&overrides);

        assert_eq!(base.repo.name, "from-file");
        assert_eq!(base.repo.base_path, PathBuf::from("/srv"));
        assert_eq!(base.server.port, 9000);
    }

    #[test]
    fn test_discover_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(discover_config_file(Some(&path)), Some(path));
    }
}
