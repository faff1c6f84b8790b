use super::Plugin;
use crate::error::Result;
use crate::model::{push_link, Node};
use serde_json::{json, Map, Value};

/// Recipe that marks a haproxy load balancer.
const HAPROXY_RECIPE: &str = "haproxy::app_lb";

/// Port of the haproxy stats page.
const STATS_PORT: u16 = 22002;

/// Stats page link for load balancers, on hosts and on guests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaproxyPlugin;

impl Plugin for HaproxyPlugin {
    fn name(&self) -> &'static str {
        "haproxy"
    }

    fn inject(&self, node: &mut Node) -> Result<()> {
        add_stats_link(node.attributes_mut());

        let mut guests = node.guests().to_vec();
        let mut changed = false;
        for guest in &mut guests {
            if let Some(object) = guest.as_object_mut() {
                changed |= add_stats_link(object);
            }
        }
        if changed {
            node.set_guests(guests);
        }
        Ok(())
    }
}

/// Returns whether a link was added.
fn add_stats_link(data: &mut Map<String, Value>) -> bool {
    let is_balancer = data
        .get("recipes")
        .and_then(Value::as_array)
        .is_some_and(|recipes| recipes.iter().any(|r| r.as_str() == Some(HAPROXY_RECIPE)));
    if !is_balancer {
        return false;
    }
    let Some(fqdn) = data.get("fqdn").and_then(Value::as_str).map(str::to_string) else {
        tracing::warn!("haproxy: balancer without fqdn, no link added");
        return false;
    };
    push_link(
        data,
        json!({
            "url": format!("http://{fqdn}:{STATS_PORT}"),
            "title": "haproxy",
        }),
    );
    true
}
