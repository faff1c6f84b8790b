//! The `node` data bag: one fully merged record per node.

use super::run_list::{expand_run_list, role_list};
use crate::model::{Node, Role};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// File name of a node's data bag item: dots become underscores.
#[must_use]
pub fn item_file_name(node_name: &str) -> String {
    format!("{}.json", item_id(node_name))
}

/// Data bag item id for a node name.
#[must_use]
pub fn item_id(node_name: &str) -> String {
    node_name.replace('.', "_")
}

/// Recursively merge `overlay` into `base`. Objects merge key by key,
/// anything else is replaced.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Build the data bag record for one node.
///
/// Attribute precedence, lowest first: role defaults, node attributes,
/// role overrides. Roles apply in run list expansion order. `role` lists
/// the roles named directly in the run list, `roles` every expanded role.
#[must_use]
pub fn build_item(node: &Node, roles: &HashMap<&str, &Role>) -> Value {
    let run_list = node.run_list();
    let expanded = expand_run_list(&run_list, roles);

    let mut merged = Map::new();
    for role in expanded.roles.iter().filter_map(|name| roles.get(name.as_str())) {
        deep_merge(&mut merged, &role.default_attributes);
    }
    deep_merge(&mut merged, node.attributes());
    for role in expanded.roles.iter().filter_map(|name| roles.get(name.as_str())) {
        deep_merge(&mut merged, &role.override_attributes);
    }

    merged.insert("id".to_string(), Value::String(item_id(node.name())));
    merged.insert("name".to_string(), Value::String(node.name().to_string()));
    merged.insert(
        "chef_environment".to_string(),
        Value::String(node.chef_environment().to_string()),
    );
    merged.insert(
        "role".to_string(),
        Value::Array(role_list(&run_list, "").into_iter().map(Value::String).collect()),
    );
    merged.insert(
        "roles".to_string(),
        Value::Array(expanded.roles.into_iter().map(Value::String).collect()),
    );
    merged.insert(
        "recipes".to_string(),
        Value::Array(expanded.recipes.into_iter().map(Value::String).collect()),
    );
    Value::Object(merged)
}
