//! Node filtering by environment, role group, virtualization role and tag.

use crate::config::RepoConfig;
use crate::model::{role_prefix, EnvironmentCount, Node, Role};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Typed view of the dashboard's URL query.
///
/// An absent parameter takes the configured default, an empty parameter
/// means "no selection".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact environment, empty for all
    pub env: String,
    /// Role groups, any of which must match
    pub roles: Vec<String>,
    /// Virtualization roles (`host`, `guest`)
    pub virt: Vec<String>,
    /// Tags, any of which must match
    pub tags: Vec<String>,
}

impl FilterCriteria {
    /// Build criteria from decoded query parameters.
    #[must_use]
    pub fn from_query(params: &HashMap<String, String>, defaults: &RepoConfig) -> Self {
        let env = params
            .get("env")
            .cloned()
            .unwrap_or_else(|| defaults.default_env.clone());
        let virt = params
            .get("virt")
            .map_or(defaults.default_virt.as_str(), String::as_str);

        Self {
            env,
            roles: split_list(params.get("roles").map_or("", String::as_str)),
            virt: split_list(virt),
            tags: split_list(params.get("tags").map_or("", String::as_str)),
        }
    }

    /// Criteria from explicit values.
    #[must_use]
    pub fn new(env: &str, roles: &str, virt: &str) -> Self {
        Self {
            env: env.to_string(),
            roles: split_list(roles),
            virt: split_list(virt),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = split_list(tags);
        self
    }

    /// No filter is set: every node passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.env.is_empty() && self.roles.is_empty() && self.virt.is_empty() && self.tags.is_empty()
    }

    /// Whether a node passes every set filter.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        if !self.env.is_empty() && node.chef_environment() != self.env {
            return false;
        }

        if !self.roles.is_empty() {
            let has_role = node
                .roles()
                .iter()
                .any(|role| self.roles.iter().any(|wanted| wanted == role_prefix(role)));
            if !has_role {
                return false;
            }
        }

        if !self.virt.is_empty() {
            // A node without a virtualization role counts as a guest
            let listed = match node.virtualization_role() {
                Some(role) => self.virt.iter().any(|v| v == role),
                None => self.virt.iter().any(|v| v == "guest"),
            };
            if !listed {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let tags = node.tags();
            if !self.tags.iter().any(|wanted| tags.contains(&wanted.as_str())) {
                return false;
            }
        }

        true
    }
}

/// Split a comma-separated parameter, dropping empty items.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Nodes that fulfill the criteria, in input order.
#[must_use]
pub fn filter_nodes(nodes: &[Node], criteria: &FilterCriteria) -> Vec<Node> {
    nodes
        .iter()
        .filter(|node| criteria.matches(node))
        .cloned()
        .collect()
}

/// Environments found on the nodes with their node counts, sorted by name.
#[must_use]
pub fn environments(nodes: &[Node]) -> Vec<EnvironmentCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in nodes {
        *counts.entry(node.chef_environment()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, counts)| EnvironmentCount {
            name: name.to_string(),
            counts,
        })
        .collect()
}

/// Sorted role groups, without the excluded prefix.
#[must_use]
pub fn role_groups(roles: &[Role], exclude_prefix: &str) -> Vec<String> {
    roles
        .iter()
        .map(Role::group)
        .filter(|group| *group != exclude_prefix)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted distinct tags carried by the nodes.
#[must_use]
pub fn node_tags(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .flat_map(Node::tags)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
