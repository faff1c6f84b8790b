//! Configuration module for kitchen.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Configuration File
//!
//! Place a `.kitchen.yaml` file in your working directory or `~/.config/kitchen/`:
//!
//! ```yaml
//! repo:
//!   base_path: /srv
//!   name: chef-repo
//!   default_env: staging
//! plugins:
//!   enabled: [monitoring]
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_ENV, DEFAULT_EXCLUDE_ROLE_PREFIX, DEFAULT_PORT, DEFAULT_SYNC_PERIOD_MINUTES,
    DEFAULT_VIRT, VIRT_ROLES,
};
pub use types::{
    AppConfig, AppConfigBuilder, DashboardConfig, PluginConfig, RepoConfig, ServerConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_full_example_config, load_config_file, load_or_default,
    ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
