//! Guests grouped under their virtualization hosts.

use super::filter::{filter_nodes, FilterCriteria};
use crate::model::Node;
use serde_json::Value;

/// Hosts with `virtualization.guests` replaced by the matching guest nodes.
///
/// A guest entry is matched to a guest node by `fqdn` and becomes that
/// node's attributes layered over the original entry. Guests that do not
/// pass the role filter are dropped. With a role filter, hosts left with
/// no guests are dropped as well.
#[must_use]
pub fn group_nodes_by_host(nodes: &[Node], roles: &[String]) -> Vec<Node> {
    let host_filter = FilterCriteria {
        virt: vec!["host".to_string()],
        ..FilterCriteria::default()
    };
    let guest_filter = FilterCriteria {
        roles: roles.to_vec(),
        virt: vec!["guest".to_string()],
        ..FilterCriteria::default()
    };

    let hosts = filter_nodes(nodes, &host_filter);
    let guests = filter_nodes(nodes, &guest_filter);

    hosts
        .into_iter()
        .filter_map(|mut host| {
            let matched: Vec<Value> = host
                .guests()
                .iter()
                .filter_map(|vm| {
                    let fqdn = vm.get("fqdn").and_then(Value::as_str)?;
                    let guest = guests.iter().find(|g| g.fqdn() == Some(fqdn))?;
                    let mut merged = vm.as_object().cloned().unwrap_or_default();
                    for (key, value) in guest.attributes() {
                        merged.insert(key.clone(), value.clone());
                    }
                    Some(Value::Object(merged))
                })
                .collect();

            if !roles.is_empty() && matched.is_empty() {
                return None;
            }
            host.set_guests(matched);
            Some(host)
        })
        .collect()
}
