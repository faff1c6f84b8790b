//! Node and role records.
//!
//! Both records are kept as JSON objects: the dashboard shows the full
//! attribute tree, so only the handful of attributes the views need get
//! typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environment reported for nodes without a `chef_environment` attribute.
pub const NO_ENVIRONMENT: &str = "none";

/// One inventory record (host or guest).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node {
    attributes: Map<String, Value>,
}

impl Node {
    /// Create a node with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::String(name.into()));
        Self { attributes }
    }

    /// Wrap a JSON value; returns `None` when it is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(attributes) => Some(Self { attributes }),
            _ => None,
        }
    }

    /// Wrap an attribute map.
    #[must_use]
    pub const fn from_map(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// The node name, empty when absent.
    #[must_use]
    pub fn name(&self) -> &str {
        self.str_attr("name").unwrap_or("")
    }

    /// The Chef environment, `"none"` when unset.
    #[must_use]
    pub fn chef_environment(&self) -> &str {
        self.str_attr("chef_environment").unwrap_or(NO_ENVIRONMENT)
    }

    #[must_use]
    pub fn fqdn(&self) -> Option<&str> {
        self.str_attr("fqdn")
    }

    /// Expanded role names (set in the `node` data bag).
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.str_list("roles")
    }

    /// Expanded recipe names (set in the `node` data bag).
    #[must_use]
    pub fn recipes(&self) -> Vec<&str> {
        self.str_list("recipes")
    }

    #[must_use]
    pub fn run_list(&self) -> Vec<&str> {
        self.str_list("run_list")
    }

    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.str_list("tags")
    }

    /// Platform and version, e.g. `debian 11.2`.
    #[must_use]
    pub fn platform(&self) -> Option<String> {
        let platform = self.str_attr("platform")?;
        Some(match self.str_attr("platform_version") {
            Some(version) => format!("{platform} {version}"),
            None => platform.to_string(),
        })
    }

    /// `virtualization.role`, usually `host` or `guest`.
    #[must_use]
    pub fn virtualization_role(&self) -> Option<&str> {
        self.attributes
            .get("virtualization")
            .and_then(|v| v.get("role"))
            .and_then(Value::as_str)
    }

    /// Guests listed under `virtualization.guests`.
    #[must_use]
    pub fn guests(&self) -> &[Value] {
        self.attributes
            .get("virtualization")
            .and_then(|v| v.get("guests"))
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Replace `virtualization.guests`, creating the object when needed.
    pub fn set_guests(&mut self, guests: Vec<Value>) {
        let virt = self
            .attributes
            .entry("virtualization")
            .or_insert_with(|| Value::Object(Map::new()));
        if !virt.is_object() {
            *virt = Value::Object(Map::new());
        }
        if let Value::Object(map) = virt {
            map.insert("guests".to_string(), Value::Array(guests));
        }
    }

    /// Links injected by plugins under `kitchen.data.links`.
    #[must_use]
    pub fn links(&self) -> &[Value] {
        self.attributes
            .get("kitchen")
            .and_then(|v| v.get("data"))
            .and_then(|v| v.get("links"))
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Append a link under `kitchen.data.links`.
    pub fn push_link(&mut self, link: Value) {
        push_link(&mut self.attributes, link);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(key.into(), value)
    }

    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.attributes)
    }

    fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    fn str_list(&self, key: &str) -> Vec<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Append a link under `kitchen.data.links` of any JSON object.
///
/// Guests inside `virtualization.guests` are plain JSON objects, so the
/// plugins share this with [`Node::push_link`].
pub fn push_link(object: &mut Map<String, Value>, link: Value) {
    let kitchen = object
        .entry("kitchen")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(kitchen) = kitchen.as_object_mut() else {
        return;
    };
    let data = kitchen
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(data) = data.as_object_mut() else {
        return;
    };
    let links = data
        .entry("links")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(links) = links {
        links.push(link);
    }
}

/// A Chef role.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub run_list: Vec<String>,
    #[serde(default)]
    pub default_attributes: Map<String, Value>,
    #[serde(default)]
    pub override_attributes: Map<String, Value>,
    /// Anything else found in the role file
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The role group: the name up to the first `_`.
    #[must_use]
    pub fn group(&self) -> &str {
        role_prefix(&self.name)
    }
}

/// Prefix of a role name before the first `_`.
#[must_use]
pub fn role_prefix(role: &str) -> &str {
    role.split('_').next().unwrap_or(role)
}

/// Number of nodes per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentCount {
    pub name: String,
    pub counts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        Node::from_value(json!({
            "name": "testnode2",
            "fqdn": "testnode2.mydomain.com",
            "chef_environment": "production",
            "roles": ["webserver", "env_production"],
            "recipes": ["apache2", "haproxy::app_lb"],
            "tags": ["WIP"],
            "platform": "debian",
            "platform_version": "6.0",
            "virtualization": {"role": "guest"}
        }))
        .unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let node = sample();
        assert_eq!(node.name(), "testnode2");
        assert_eq!(node.fqdn(), Some("testnode2.mydomain.com"));
        assert_eq!(node.chef_environment(), "production");
        assert_eq!(node.roles(), vec!["webserver", "env_production"]);
        assert_eq!(node.recipes(), vec!["apache2", "haproxy::app_lb"]);
        assert_eq!(node.tags(), vec!["WIP"]);
        assert_eq!(node.platform().as_deref(), Some("debian 6.0"));
        assert_eq!(node.virtualization_role(), Some("guest"));
        assert!(node.guests().is_empty());
    }

    #[test]
    fn test_defaults_for_missing_attributes() {
        let node = Node::new("bare");
        assert_eq!(node.chef_environment(), NO_ENVIRONMENT);
        assert!(node.roles().is_empty());
        assert_eq!(node.virtualization_role(), None);
        assert!(node.links().is_empty());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Node::from_value(json!(["a"])).is_none());
        assert!(Node::from_value(json!("a")).is_none());
    }

    #[test]
    fn test_push_link_creates_path() {
        let mut node = Node::new("n");
        node.push_link(json!({"title": "a"}));
        node.push_link(json!({"title": "b"}));
        assert_eq!(node.links().len(), 2);
        assert_eq!(node.links()[1]["title"], "b");
    }

    #[test]
    fn test_set_guests_replaces_list() {
        let mut node = Node::new("host");
        node.set_guests(vec![json!({"fqdn": "g1"})]);
        assert_eq!(node.guests().len(), 1);
        node.set_guests(Vec::new());
        assert!(node.guests().is_empty());
    }

    #[test]
    fn test_role_group() {
        assert_eq!(Role::new("webserver_apache").group(), "webserver");
        assert_eq!(Role::new("dbserver").group(), "dbserver");
        assert_eq!(role_prefix("env_production"), "env");
    }

    #[test]
    fn test_role_deserializes_with_extra_fields() {
        let role: Role = serde_json::from_value(json!({
            "name": "dbserver",
            "json_class": "Chef::Role",
            "run_list": ["recipe[mysql]"]
        }))
        .unwrap();
        assert_eq!(role.run_list, vec!["recipe[mysql]"]);
        assert_eq!(role.extra["json_class"], "Chef::Role");
    }
}
