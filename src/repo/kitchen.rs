//! Reading a LittleChef kitchen from disk.

use super::data_bag::{build_item, item_file_name};
use crate::config::RepoConfig;
use crate::error::{ErrorContext, KitchenError, RepoErrorKind, Result};
use crate::model::{Node, Role};
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directories a kitchen must contain.
pub const APPLIANCES: &[&str] = &["nodes", "roles", "cookbooks"];

/// A kitchen directory and the operations that read it.
#[derive(Debug, Clone)]
pub struct KitchenRepo {
    kitchen_dir: PathBuf,
    exclude_role_prefix: String,
}

impl KitchenRepo {
    /// Repository described by the configuration.
    #[must_use]
    pub fn new(config: &RepoConfig) -> Self {
        Self {
            kitchen_dir: config.kitchen_dir(),
            exclude_role_prefix: config.exclude_role_prefix.clone(),
        }
    }

    /// Repository rooted directly at `kitchen_dir`.
    #[must_use]
    pub fn at(kitchen_dir: impl Into<PathBuf>) -> Self {
        Self {
            kitchen_dir: kitchen_dir.into(),
            exclude_role_prefix: crate::config::DEFAULT_EXCLUDE_ROLE_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn kitchen_dir(&self) -> &Path {
        &self.kitchen_dir
    }

    #[must_use]
    pub fn exclude_role_prefix(&self) -> &str {
        &self.exclude_role_prefix
    }

    /// `data_bags/node` inside the kitchen.
    #[must_use]
    pub fn data_bag_dir(&self) -> PathBuf {
        self.kitchen_dir.join("data_bags").join("node")
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that the kitchen exists, is complete and has a built data bag.
    pub fn check_kitchen(&self) -> Result<()> {
        self.check_appliances()?;
        if !self.data_bag_dir().is_dir() {
            return Err(KitchenError::repo_kind(RepoErrorKind::DataBagNotBuilt));
        }
        Ok(())
    }

    /// Check the directory and its appliances, not the data bag.
    pub fn check_appliances(&self) -> Result<()> {
        if !self.kitchen_dir.is_dir() {
            return Err(KitchenError::repo_kind(RepoErrorKind::MissingDir(
                self.kitchen_dir.display().to_string(),
            )));
        }

        let missing: Vec<&str> = APPLIANCES
            .iter()
            .copied()
            .filter(|name| !self.kitchen_dir.join(name).exists())
            .collect();
        if !missing.is_empty() {
            return Err(KitchenError::repo_kind(RepoErrorKind::MissingAppliances(
                join_names(&missing),
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// All nodes from `nodes/*.json`, sorted by file name.
    pub fn load_nodes(&self) -> Result<Vec<Node>> {
        let nodes: Vec<Node> = read_json_dir(&self.kitchen_dir.join("nodes"))?
            .into_iter()
            .filter_map(|(stem, value)| {
                let mut node = Node::from_value(value)?;
                if node.get("name").and_then(Value::as_str).is_none() {
                    node.insert("name", Value::String(stem));
                }
                Some(node)
            })
            .collect();
        tracing::debug!("Loaded {} nodes from {}", nodes.len(), self.kitchen_dir.display());
        Ok(nodes)
    }

    /// A single node by file name, `None` when it does not exist.
    ///
    /// Names that are not a plain file name never resolve.
    pub fn load_node(&self, name: &str) -> Result<Option<Node>> {
        if !is_plain_file_name(name) {
            tracing::debug!("Rejected node name {:?}", name);
            return Ok(None);
        }
        let path = self.kitchen_dir.join("nodes").join(format!("{name}.json"));
        if !path.is_file() {
            return Ok(None);
        }
        let mut node = Node::from_value(read_json(&path)?).ok_or_else(|| {
            KitchenError::repo_kind(RepoErrorKind::InvalidJson {
                path: path.display().to_string(),
                message: "expected a JSON object".to_string(),
            })
        })?;
        if node.get("name").and_then(Value::as_str).is_none() {
            node.insert("name", Value::String(name.to_string()));
        }
        Ok(Some(node))
    }

    /// All roles from `roles/*.json`, sorted by file name.
    pub fn load_roles(&self) -> Result<Vec<Role>> {
        read_json_dir(&self.kitchen_dir.join("roles"))?
            .into_iter()
            .map(|(stem, value)| {
                let mut role: Role = serde_json::from_value(value).map_err(|e| {
                    KitchenError::repo_kind(RepoErrorKind::InvalidJson {
                        path: format!("roles/{stem}.json"),
                        message: e.to_string(),
                    })
                })?;
                if role.name.is_empty() {
                    role.name = stem;
                }
                Ok(role)
            })
            .collect()
    }

    /// Replace each node by its record in the `node` data bag.
    pub fn load_extended_nodes(&self, nodes: &[Node]) -> Result<Vec<Node>> {
        let dir = self.data_bag_dir();
        nodes
            .iter()
            .map(|node| {
                let file_name = item_file_name(node.name());
                let path = dir.join(&file_name);
                if !path.is_file() {
                    return Err(KitchenError::repo_kind(RepoErrorKind::MissingDataBagItem(
                        file_name,
                    )));
                }
                Node::from_value(read_json(&path)?).ok_or_else(|| {
                    KitchenError::repo_kind(RepoErrorKind::InvalidJson {
                        path: path.display().to_string(),
                        message: "expected a JSON object".to_string(),
                    })
                })
            })
            .collect()
    }

    /// Nodes as stored in the data bag. Checks the kitchen first.
    pub fn nodes_extended(&self) -> Result<Vec<Node>> {
        self.check_kitchen()?;
        let nodes = self.load_nodes()?;
        self.load_extended_nodes(&nodes)
    }

    /// Role groups of the kitchen, without the excluded prefix.
    pub fn role_groups(&self) -> Result<Vec<String>> {
        let roles = self.load_roles()?;
        Ok(super::filter::role_groups(&roles, &self.exclude_role_prefix))
    }

    // ========================================================================
    // Data bag
    // ========================================================================

    /// Rebuild `data_bags/node` from nodes and roles. Returns the item count.
    pub fn build_node_data_bag(&self) -> Result<usize> {
        self.check_appliances()?;
        let nodes = self.load_nodes()?;
        let roles = self.load_roles()?;
        let roles_by_name: HashMap<&str, &Role> =
            roles.iter().map(|role| (role.name.as_str(), role)).collect();

        let dir = self.data_bag_dir();
        std::fs::create_dir_all(&dir).map_err(|e| KitchenError::io(&dir, e))?;

        for node in &nodes {
            let item = build_item(node, &roles_by_name);
            let path = dir.join(item_file_name(node.name()));
            let content = serde_json::to_string_pretty(&item)
                .with_context(|| format!("data bag item for node '{}'", node.name()))?;
            std::fs::write(&path, content).map_err(|e| KitchenError::io(&path, e))?;
        }

        tracing::info!("Built 'node' data bag with {} items", nodes.len());
        Ok(nodes.len())
    }
}

/// "a", "a and b", "a, b and c".
fn join_names(names: &[&str]) -> String {
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// A single path component without separators or parent references.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && Path::new(name).file_name() == Some(OsStr::new(name))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| KitchenError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        KitchenError::repo_kind(RepoErrorKind::InvalidJson {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })
}

/// `(file stem, parsed JSON)` for every `*.json` file, sorted by file name.
fn read_json_dir(dir: &Path) -> Result<Vec<(String, Value)>> {
    if !dir.is_dir() {
        tracing::debug!("{} does not exist, nothing to load", dir.display());
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| KitchenError::io(dir, e))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((stem, read_json(&path)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scaffold() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sub in APPLIANCES {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        dir
    }

    fn write(dir: &Path, rel: &str, value: &Value) {
        std::fs::write(dir.join(rel), serde_json::to_string(value).unwrap()).unwrap();
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&["nodes"]), "nodes");
        assert_eq!(join_names(&["nodes", "roles"]), "nodes and roles");
        assert_eq!(join_names(&["nodes", "roles", "cookbooks"]), "nodes, roles and cookbooks");
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("testnode1"));
        assert!(is_plain_file_name("web1.example.com"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../../secret"));
        assert!(!is_plain_file_name("nodes/web1"));
        assert!(!is_plain_file_name("..\\secret"));
    }

    #[test]
    fn test_load_node_stays_inside_nodes_dir() {
        let dir = scaffold();
        let kitchen = dir.path().join("kitchen");
        for sub in APPLIANCES {
            std::fs::create_dir_all(kitchen.join(sub)).unwrap();
        }
        write(dir.path(), "secret.json", &json!({"password": "hunter2"}));

        let repo = KitchenRepo::at(&kitchen);
        assert!(repo.load_node("../../secret").unwrap().is_none());
        assert!(repo.load_node("../secret").unwrap().is_none());
    }

    #[test]
    fn test_missing_dir() {
        let repo = KitchenRepo::at("/badrepopath/");
        let err = repo.check_kitchen().unwrap_err();
        assert_eq!(err.to_string(), "Repo dir doesn't exist at '/badrepopath/'");
    }

    #[test]
    fn test_missing_appliances() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nodes")).unwrap();
        let err = KitchenRepo::at(dir.path()).check_kitchen().unwrap_err();
        assert_eq!(err.to_string(), "Couldn't find roles and cookbooks. ");
    }

    #[test]
    fn test_data_bag_not_built() {
        let dir = scaffold();
        let err = KitchenRepo::at(dir.path()).check_kitchen().unwrap_err();
        assert!(matches!(
            err,
            KitchenError::Repo {
                source: RepoErrorKind::DataBagNotBuilt,
                ..
            }
        ));
    }

    #[test]
    fn test_load_nodes_sorted_with_default_name() {
        let dir = scaffold();
        write(dir.path(), "nodes/b.json", &json!({"name": "b"}));
        write(dir.path(), "nodes/a.json", &json!({"chef_environment": "staging"}));
        std::fs::write(dir.path().join("nodes/readme.txt"), "ignored").unwrap();

        let nodes = KitchenRepo::at(dir.path()).load_nodes().unwrap();
        let names: Vec<&str> = nodes.iter().map(Node::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_json_names_file() {
        let dir = scaffold();
        std::fs::write(dir.path().join("nodes/broken.json"), "{\"name\": ").unwrap();
        let err = KitchenRepo::at(dir.path()).load_nodes().unwrap_err();
        assert!(err.to_string().starts_with("Found the following error in \""));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_node_absent() {
        let dir = scaffold();
        write(dir.path(), "nodes/web1.json", &json!({"name": "web1"}));
        let repo = KitchenRepo::at(dir.path());
        assert_eq!(repo.load_node("web1").unwrap().unwrap().name(), "web1");
        assert!(repo.load_node("nope").unwrap().is_none());
    }

    #[test]
    fn test_build_and_load_extended() {
        let dir = scaffold();
        write(
            dir.path(),
            "roles/base.json",
            &json!({"name": "base", "run_list": ["recipe[ntp]"],
                "default_attributes": {"ntp": {"server": "pool.ntp.org"}}}),
        );
        write(
            dir.path(),
            "nodes/web1.example.com.json",
            &json!({"name": "web1.example.com", "run_list": ["role[base]"]}),
        );

        let repo = KitchenRepo::at(dir.path());
        assert_eq!(repo.build_node_data_bag().unwrap(), 1);
        assert!(repo.data_bag_dir().join("web1_example_com.json").is_file());

        let nodes = repo.nodes_extended().unwrap();
        assert_eq!(nodes[0].roles(), vec!["base"]);
        assert_eq!(nodes[0].recipes(), vec!["ntp"]);
        assert_eq!(nodes[0].get("ntp").unwrap()["server"], "pool.ntp.org");
    }

    #[test]
    fn test_missing_data_bag_item() {
        let dir = scaffold();
        std::fs::create_dir_all(dir.path().join("data_bags/node")).unwrap();
        let repo = KitchenRepo::at(dir.path());
        let err = repo.load_extended_nodes(&[Node::new("ghost.example.com")]).unwrap_err();
        assert!(err.to_string().contains("ghost_example_com.json"));
    }
}
