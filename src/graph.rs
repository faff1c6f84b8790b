//! Node relation graph.
//!
//! A node attribute object may declare `client_roles` (roles whose nodes
//! are clients of this node) and `needs_roles` (roles this node depends
//! on). The graph links nodes through those declarations and renders the
//! result as Graphviz DOT text.

use crate::model::Node;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write;

/// Edges of one node, each as `(other node, attribute name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeLinks {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub client_nodes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs_nodes: Vec<(String, String)>,
}

impl NodeLinks {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.client_nodes.is_empty() && self.needs_nodes.is_empty()
    }
}

/// Links per node name, in node order. Nodes without links are left out.
#[must_use]
pub fn build_links(nodes: &[Node]) -> IndexMap<String, NodeLinks> {
    let node_roles: Vec<HashSet<&str>> = nodes
        .iter()
        .map(|node| node.roles().into_iter().collect())
        .collect();

    let mut linked = IndexMap::new();
    for node in nodes {
        let mut links = NodeLinks::default();
        for (attr, value) in node.attributes() {
            let client_roles = role_names(value, "client_roles");
            let needs_roles = role_names(value, "needs_roles");

            for (other, roles) in nodes.iter().zip(&node_roles) {
                if client_roles.iter().any(|r| roles.contains(r)) {
                    links
                        .client_nodes
                        .push((other.name().to_string(), attr.clone()));
                }
            }
            for (other, roles) in nodes.iter().zip(&node_roles) {
                if needs_roles.iter().any(|r| roles.contains(r)) {
                    links
                        .needs_nodes
                        .push((other.name().to_string(), attr.clone()));
                }
            }
        }
        if !links.is_empty() {
            linked.insert(node.name().to_string(), links);
        }
    }
    linked
}

fn role_names<'a>(value: &'a Value, key: &str) -> Vec<&'a str> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Render the node map as a DOT digraph.
///
/// Boxes carry the node name and its roles minus `exclude_prefix`. Client
/// edges point from the client to the node, need edges are dashed and
/// point from the node to what it needs.
#[must_use]
pub fn generate_node_map(nodes: &[Node], exclude_prefix: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_node_map(&mut out, nodes, exclude_prefix);
    out
}

fn write_node_map(out: &mut String, nodes: &[Node], exclude_prefix: &str) -> std::fmt::Result {
    writeln!(out, "digraph G {{")?;
    for node in nodes {
        let mut label = escape_dot(node.name());
        for role in node.roles() {
            if exclude_prefix.is_empty() || !role.starts_with(exclude_prefix) {
                write!(label, "\\n{}", escape_dot(role))?;
            }
        }
        writeln!(
            out,
            "    \"{}\" [label=\"{}\", shape=box, style=filled, fillcolor=lightyellow, fontsize=8];",
            escape_dot(node.name()),
            label
        )?;
    }

    for (name, links) in build_links(nodes) {
        for (client, attr) in &links.client_nodes {
            writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\", fontsize=7];",
                escape_dot(client),
                escape_dot(&name),
                escape_dot(attr)
            )?;
        }
        for (needed, attr) in &links.needs_nodes {
            writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\", fontsize=7, style=dashed];",
                escape_dot(&name),
                escape_dot(needed),
                escape_dot(attr)
            )?;
        }
    }
    writeln!(out, "}}")
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes() -> Vec<Node> {
        [
            json!({"name": "db1", "roles": ["dbserver", "env_production"],
                "mysql": {"client_roles": ["webserver"]}}),
            json!({"name": "web1", "roles": ["webserver"],
                "apache": {"needs_roles": ["dbserver"]}}),
            json!({"name": "lonely", "roles": ["monitoring"], "answer": 42}),
        ]
        .into_iter()
        .filter_map(Node::from_value)
        .collect()
    }

    #[test]
    fn test_build_links() {
        let links = build_links(&nodes());
        assert_eq!(links.len(), 2);
        assert_eq!(
            links["db1"].client_nodes,
            vec![("web1".to_string(), "mysql".to_string())]
        );
        assert!(links["db1"].needs_nodes.is_empty());
        assert_eq!(
            links["web1"].needs_nodes,
            vec![("db1".to_string(), "apache".to_string())]
        );
        assert!(!links.contains_key("lonely"));
    }

    #[test]
    fn test_dot_output() {
        let dot = generate_node_map(&nodes(), "env");
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("\"db1\" [label=\"db1\\ndbserver\""));
        assert!(!dot.contains("env_production"));
        assert!(dot.contains("\"web1\" -> \"db1\" [label=\"mysql\", fontsize=7];"));
        assert!(dot.contains("\"web1\" -> \"db1\" [label=\"apache\", fontsize=7, style=dashed];"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
