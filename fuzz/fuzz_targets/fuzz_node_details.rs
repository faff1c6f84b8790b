#![no_main]
use libfuzzer_sys::fuzz_target;
use kitchen::dashboard::format_node_details;
use kitchen::{Node, NodeIndex};

/// Fuzz node lookup and detail rendering.
///
/// The first line is the lookup key, the rest is a JSON array of nodes.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let (key, body) = s.split_once('\n').unwrap_or((s, "[]"));
    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(body) else {
        return;
    };
    let index: NodeIndex = values.into_iter().filter_map(Node::from_value).collect();
    let html = format_node_details(&index, key);
    assert!(html.starts_with("<pre"));
});
