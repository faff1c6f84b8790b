//! Link plugins.
//!
//! A plugin adds entries to `kitchen.data.links` of a node (and sometimes of
//! the guests nested in it). Links are JSON objects with `url`, `title` and
//! an optional `img`; the dashboard renders them next to the node name.

mod haproxy;
mod monitoring;

pub use haproxy::HaproxyPlugin;
pub use monitoring::{MonitoringPlugin, MonitoringVirtPlugin};

use crate::error::Result;
use crate::model::Node;

/// Names accepted in `plugins.enabled`.
pub const BUILTIN_PLUGINS: &[&str] = &["monitoring", "monitoring-virt", "haproxy"];

/// Icon shown next to monitoring links.
pub const MONITORING_ICON: &str = "http://munin-monitoring.org/static/munin.png";

/// Something that injects links into node records.
pub trait Plugin: Send + Sync {
    /// Name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Add this plugin's links to a node.
    fn inject(&self, node: &mut Node) -> Result<()>;
}

/// Ordered set of enabled plugins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

impl PluginRegistry {
    /// Registry with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate plugins by name. Unknown names are logged and skipped.
    #[must_use]
    pub fn from_names(names: &[String], monitoring_url: &str) -> Self {
        let mut registry = Self::new();
        for name in names {
            match create_plugin(name, monitoring_url) {
                Some(plugin) => registry.register(plugin),
                None => tracing::error!("Could not load plugin '{}'. Reason: unknown plugin", name),
            }
        }
        registry
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!("Registered plugin '{}'", plugin.name());
        self.plugins.push(plugin);
    }

    /// Enabled plugin names, in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every plugin on every node. A failing plugin is logged and the
    /// remaining plugins still run.
    pub fn inject_all(&self, nodes: &mut [Node]) {
        for node in nodes.iter_mut() {
            for plugin in &self.plugins {
                if let Err(e) = plugin.inject(node) {
                    tracing::error!(
                        "Plugin '{}' failed on node '{}': {}",
                        plugin.name(),
                        node.name(),
                        e
                    );
                }
            }
        }
    }
}

fn create_plugin(name: &str, monitoring_url: &str) -> Option<Box<dyn Plugin>> {
    match name {
        "monitoring" => Some(Box::new(MonitoringPlugin::new(monitoring_url))),
        "monitoring-virt" => Some(Box::new(MonitoringVirtPlugin::new(monitoring_url))),
        "haproxy" => Some(Box::new(HaproxyPlugin)),
        _ => None,
    }
}

/// The node's `fqdn`, or a plugin error naming the node.
fn require_fqdn<'a>(plugin: &str, node: &'a Node) -> Result<&'a str> {
    node.fqdn().ok_or_else(|| {
        crate::error::KitchenError::plugin(plugin, format!("node '{}' has no fqdn", node.name()))
    })
}
