//! Configuration validation for kitchen.

use super::types::{AppConfig, DashboardConfig, PluginConfig, RepoConfig, ServerConfig};
use crate::plugins::BUILTIN_PLUGINS;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.repo.validate());
        errors.extend(self.dashboard.validate());
        errors.extend(self.server.validate());
        errors.extend(self.plugins.validate());
        errors
    }
}

impl Validatable for RepoConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ConfigError {
                field: "repo.name".to_string(),
                message: "Repository name must not be empty".to_string(),
            });
        }

        if self.url.is_some() && self.sync_period_minutes == 0 {
            errors.push(ConfigError {
                field: "repo.sync_period_minutes".to_string(),
                message: "Sync period must be at least 1 minute when a URL is set".to_string(),
            });
        }

        if self.default_virt.split(',').any(|v| !v.is_empty() && v != "host" && v != "guest") {
            errors.push(ConfigError {
                field: "repo.default_virt".to_string(),
                message: format!(
                    "Invalid virtualization role '{}'. Valid options: host, guest",
                    self.default_virt
                ),
            });
        }

        errors
    }
}

impl Validatable for DashboardConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.tag_classes
            .iter()
            .filter(|(_, class)| class.chars().any(char::is_whitespace))
            .map(|(tag, class)| ConfigError {
                field: format!("dashboard.tag_classes.{tag}"),
                message: format!("CSS class '{class}' must be a single class name"),
            })
            .collect()
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.host.is_empty() {
            errors.push(ConfigError {
                field: "server.host".to_string(),
                message: "Host must not be empty".to_string(),
            });
        }
        errors
    }
}

impl Validatable for PluginConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.enabled
            .iter()
            .filter(|name| !BUILTIN_PLUGINS.contains(&name.as_str()))
            .map(|name| ConfigError {
                field: "plugins.enabled".to_string(),
                message: format!(
                    "Unknown plugin '{}'. Valid options: {}",
                    name,
                    BUILTIN_PLUGINS.join(", ")
                ),
            })
            .collect()
    }
}
