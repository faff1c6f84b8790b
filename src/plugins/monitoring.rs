use super::{require_fqdn, Plugin, MONITORING_ICON};
use crate::error::Result;
use crate::model::{push_link, Node};
use serde_json::{json, Value};

/// Hierarchical monitoring links: `<base>/<host>/<host>` on the node and
/// `<base>/<host>/<guest>` on each guest.
#[derive(Debug, Clone)]
pub struct MonitoringPlugin {
    base_url: String,
}

impl MonitoringPlugin {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
        }
    }
}

impl Plugin for MonitoringPlugin {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn inject(&self, node: &mut Node) -> Result<()> {
        let fqdn = require_fqdn(self.name(), node)?.to_string();
        node.push_link(monitoring_link(format!("{}/{fqdn}/{fqdn}", self.base_url)));

        let mut guests = node.guests().to_vec();
        for guest in &mut guests {
            let Some(guest_fqdn) = guest.get("fqdn").and_then(Value::as_str).map(str::to_string)
            else {
                continue;
            };
            if let Some(object) = guest.as_object_mut() {
                push_link(
                    object,
                    monitoring_link(format!("{}/{fqdn}/{guest_fqdn}", self.base_url)),
                );
            }
        }
        if !guests.is_empty() {
            node.set_guests(guests);
        }
        Ok(())
    }
}

/// Flat monitoring link `<base>/<fqdn>` on the node only.
#[derive(Debug, Clone)]
pub struct MonitoringVirtPlugin {
    base_url: String,
}

impl MonitoringVirtPlugin {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
        }
    }
}

impl Plugin for MonitoringVirtPlugin {
    fn name(&self) -> &'static str {
        "monitoring-virt"
    }

    fn inject(&self, node: &mut Node) -> Result<()> {
        let fqdn = require_fqdn(self.name(), node)?;
        let link = monitoring_link(format!("{}/{fqdn}", self.base_url));
        node.push_link(link);
        Ok(())
    }
}

fn monitoring_link(url: String) -> Value {
    json!({
        "url": url,
        "img": MONITORING_ICON,
        "title": "monitoring",
    })
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
