//! Inventory command handlers: `nodes`, `roles` and `graph`.

use super::output::{text_table, write_output, OutputFormat, OutputTarget};
use crate::config::AppConfig;
use crate::graph::generate_node_map;
use crate::model::{Node, Role};
use crate::plugins::PluginRegistry;
use crate::repo::{filter_nodes, role_list, split_list, FilterCriteria, KitchenRepo};
use anyhow::{bail, Context, Result};

// ============================================================================
// Node Query
// ============================================================================

/// Node filters given on the command line. Unset options do not filter.
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub env: Option<String>,
    pub roles: Option<String>,
    pub virt: Option<String>,
    pub tags: Option<String>,
    /// Read data bag records instead of node files
    pub extended: bool,
}

impl NodeQuery {
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        let list = |value: &Option<String>| split_list(value.as_deref().unwrap_or(""));
        FilterCriteria {
            env: self.env.clone().unwrap_or_default(),
            roles: list(&self.roles),
            virt: list(&self.virt),
            tags: list(&self.tags),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List nodes matching the query.
pub fn run_nodes(
    config: &AppConfig,
    query: &NodeQuery,
    format: OutputFormat,
    target: &OutputTarget,
    quiet: bool,
) -> Result<()> {
    let repo = KitchenRepo::new(&config.repo);
    let nodes = if query.extended {
        repo.nodes_extended()?
    } else {
        repo.check_kitchen()?;
        repo.load_nodes()?
    };

    let mut nodes = filter_nodes(&nodes, &query.criteria());
    if query.extended {
        PluginRegistry::from_names(&config.plugins.enabled, &config.plugins.monitoring_url)
            .inject_all(&mut nodes);
    }
    tracing::debug!("{} nodes match", nodes.len());

    let content = render_nodes(&nodes, format, &config.repo.exclude_role_prefix)?;
    write_output(&content, target, quiet)
}

/// Nodes as JSON or as a name/environment/roles table.
pub fn render_nodes(nodes: &[Node], format: OutputFormat, exclude_prefix: &str) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(nodes).context("failed to serialize nodes")
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = nodes
                .iter()
                .map(|node| {
                    vec![
                        node.name().to_string(),
                        node.chef_environment().to_string(),
                        role_list(&node.run_list(), exclude_prefix).join(","),
                        node.virtualization_role().unwrap_or("-").to_string(),
                    ]
                })
                .collect();
            Ok(text_table(&["NAME", "ENVIRONMENT", "ROLES", "VIRT"], &rows))
        }
    }
}

/// List the kitchen's roles.
pub fn run_roles(
    config: &AppConfig,
    format: OutputFormat,
    target: &OutputTarget,
    quiet: bool,
) -> Result<()> {
    let repo = KitchenRepo::new(&config.repo);
    repo.check_kitchen()?;
    let roles = repo.load_roles()?;
    write_output(&render_roles(&roles, format)?, target, quiet)
}

/// Roles as JSON or as a name/description table.
pub fn render_roles(roles: &[Role], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(roles).context("failed to serialize roles")
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = roles
                .iter()
                .map(|role| {
                    vec![
                        role.name.clone(),
                        role.group().to_string(),
                        role.description.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            Ok(text_table(&["NAME", "GROUP", "DESCRIPTION"], &rows))
        }
    }
}

/// Print the DOT node map of one environment's guests.
pub fn run_graph(
    config: &AppConfig,
    env: &str,
    roles: Option<&str>,
    target: &OutputTarget,
    quiet: bool,
) -> Result<()> {
    if env.is_empty() {
        bail!("Please select an environment");
    }
    let repo = KitchenRepo::new(&config.repo);
    let nodes = repo.nodes_extended()?;
    let criteria = FilterCriteria::new(env, roles.unwrap_or(""), "guest");
    let nodes = filter_nodes(&nodes, &criteria);
    tracing::debug!("Graphing {} nodes of environment {}", nodes.len(), env);

    let dot = generate_node_map(&nodes, &config.repo.exclude_role_prefix);
    write_output(&dot, target, quiet)
}
