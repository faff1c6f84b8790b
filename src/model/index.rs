//! Key → node lookup for the dashboard.
//!
//! Table rows only carry a display key (the node name, sometimes shortened),
//! so expanding a row needs a deterministic way back to the full record.
//! `NodeIndex` is built once per page from the node list:
//!
//! 1. an exact name match wins;
//! 2. otherwise the single node whose name starts with the key;
//! 3. several candidates are rejected as ambiguous, never resolved by
//!    list order.

use super::Node;
use std::collections::HashMap;
use thiserror::Error;

/// Why a key did not resolve to exactly one node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("No node matches '{0}'")]
    NotFound(String),

    #[error("'{key}' matches several nodes: {}", candidates.join(", "))]
    Ambiguous { key: String, candidates: Vec<String> },
}

/// Read-only node collection with a name index.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct NodeIndex {
    nodes: Vec<Node>,
    /// Positions by exact name; more than one entry means a duplicate name
    by_name: HashMap<String, Vec<usize>>,
}

impl NodeIndex {
    /// Build the index. O(n).
    pub fn build(nodes: Vec<Node>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            by_name.entry(node.name().to_string()).or_default().push(idx);
        }
        Self { nodes, by_name }
    }

    /// Resolve a row key to its node.
    pub fn lookup(&self, key: &str) -> Result<&Node, LookupError> {
        if key.is_empty() {
            return Err(LookupError::NotFound(String::new()));
        }

        if let Some(positions) = self.by_name.get(key) {
            return match positions.as_slice() {
                [idx] => Ok(&self.nodes[*idx]),
                _ => Err(LookupError::Ambiguous {
                    key: key.to_string(),
                    candidates: positions
                        .iter()
                        .map(|&i| self.nodes[i].name().to_string())
                        .collect(),
                }),
            };
        }

        let mut candidates = self.nodes.iter().filter(|n| n.name().starts_with(key));
        match (candidates.next(), candidates.next()) {
            (Some(node), None) => Ok(node),
            (None, _) => Err(LookupError::NotFound(key.to_string())),
            (Some(first), Some(second)) => {
                let mut names = vec![first.name().to_string(), second.name().to_string()];
                names.extend(candidates.map(|n| n.name().to_string()));
                Err(LookupError::Ambiguous {
                    key: key.to_string(),
                    candidates: names,
                })
            }
        }
    }

    /// Nodes in their original order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for NodeIndex {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> NodeIndex {
        names.iter().map(|n| Node::new(*n)).collect()
    }

    #[test]
    fn test_exact_match_wins_over_prefix() {
        let idx = index(&["testnode1", "testnode10", "testnode11"]);
        assert_eq!(idx.lookup("testnode1").unwrap().name(), "testnode1");
    }

    #[test]
    fn test_unique_prefix_resolves() {
        let idx = index(&["testnode3.mydomain.com", "testnode4"]);
        assert_eq!(
            idx.lookup("testnode3").unwrap().name(),
            "testnode3.mydomain.com"
        );
    }

    #[test]
    fn test_ambiguous_prefix_is_rejected() {
        let idx = index(&["web1.a.com", "web1.b.com"]);
        match idx.lookup("web1") {
            Err(LookupError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates, vec!["web1.a.com", "web1.b.com"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_exact_names_are_ambiguous() {
        let idx = index(&["dup", "dup"]);
        assert!(matches!(idx.lookup("dup"), Err(LookupError::Ambiguous { .. })));
    }

    #[test]
    fn test_not_found() {
        let idx = index(&["a"]);
        assert_eq!(
            idx.lookup("b").unwrap_err(),
            LookupError::NotFound("b".into())
        );
        assert!(idx.lookup("").is_err());
        assert_eq!(
            idx.lookup("zzz").unwrap_err().to_string(),
            "No node matches 'zzz'"
        );
    }
}
