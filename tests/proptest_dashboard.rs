//! Property-based tests for table drawing, detail toggling, escaping and
//! sidebar link computation.

use kitchen::dashboard::escape::escape_html;
use kitchen::dashboard::highlight::syntax_highlight;
use kitchen::dashboard::sidebar::{compute_filter_params, SidebarLink};
use kitchen::dashboard::{Cell, DetailExpander, DrawnRow, Table, TableConfig, TableRow};
use kitchen::{Node, NodeIndex};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn headers() -> Vec<String> {
    ["", "Key", "Host", "Name"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn rows(entries: &[(String, String)]) -> Vec<TableRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (host, name))| {
            let id = format!("{name}-{i}");
            TableRow {
                id: id.clone(),
                cells: vec![
                    Cell::default(),
                    Cell::text(id),
                    Cell::text(host.clone()),
                    Cell::text(name.clone()),
                ],
            }
        })
        .collect()
}

fn host_and_name() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("host[a-d]", "vm[0-9]{1,2}"), 0..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ungrouped_table_has_no_group_rows(entries in host_and_name()) {
        let table = Table::new(TableConfig::node_list(""), headers(), rows(&entries), DetailExpander::default());
        let (drawn, info) = table.draw();
        let has_group_rows = drawn.iter().any(|r| matches!(r, DrawnRow::GroupHeader { .. }));
        prop_assert!(!has_group_rows);
        prop_assert_eq!(info.shown, entries.len());
    }

    #[test]
    fn one_group_header_per_distinct_value(entries in host_and_name()) {
        let table = Table::new(TableConfig::grouped("", 2, 3), headers(), rows(&entries), DetailExpander::default());
        let (drawn, _) = table.draw();

        let expected: Vec<String> = entries
            .iter()
            .map(|(host, _)| host.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let labels: Vec<String> = drawn
            .iter()
            .filter_map(|r| match r {
                DrawnRow::GroupHeader { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(&labels, &expected);

        // Each header is followed by a data row of its own group
        let by_id: std::collections::HashMap<String, String> = rows(&entries)
            .into_iter()
            .map(|r| (r.id.clone(), r.cells[2].text.clone()))
            .collect();
        for pair in drawn.windows(2) {
            if let DrawnRow::GroupHeader { label, .. } = &pair[0] {
                match &pair[1] {
                    DrawnRow::Data { row_id, .. } => prop_assert_eq!(&by_id[row_id], label),
                    other => prop_assert!(false, "header followed by {:?}", other),
                }
            }
        }
    }

    #[test]
    fn toggle_twice_restores_rows(entries in host_and_name(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!entries.is_empty());
        let table_rows = rows(&entries);
        let target = table_rows[pick.index(table_rows.len())].id.clone();
        let index: NodeIndex = table_rows.iter().map(|r| Node::new(r.id.clone())).collect();
        let mut table = Table::new(TableConfig::grouped("", 2, 3), headers(), table_rows, DetailExpander::new(index));

        let before = table.draw().0;
        let chevron = table.details().chevron(&target);
        prop_assert!(table.toggle(&target));
        prop_assert_eq!(table.draw().0.len(), before.len() + 1);
        prop_assert!(!table.toggle(&target));
        prop_assert_eq!(table.draw().0, before);
        prop_assert_eq!(table.details().chevron(&target), chevron);
    }

    #[test]
    fn highlighting_escapes_exactly_once(value in "[a-z <>]{0,40}") {
        let node = serde_json::json!({ "name": value });
        let html = syntax_highlight(&node).unwrap();
        // No ampersand in the input, so any "&amp;" means double escaping
        prop_assert!(!html.contains("&amp;"));
        prop_assert_eq!(html.matches("&lt;").count(), value.matches('<').count());
        prop_assert_eq!(html.matches("&gt;").count(), value.matches('>').count());
    }

    #[test]
    fn escaped_text_has_no_markup(s in "\\PC{0,100}") {
        let escaped = escape_html(&s);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    #[test]
    fn exclusive_click_yields_one_value(
        envs in prop::collection::btree_set("[a-z]{1,8}", 2..6),
        active in any::<prop::sample::Index>(),
        clicked in any::<prop::sample::Index>(),
    ) {
        let envs: Vec<String> = envs.into_iter().collect();
        let active = active.index(envs.len());
        let clicked = clicked.index(envs.len());
        prop_assume!(active != clicked);

        let links: Vec<SidebarLink> = envs
            .iter()
            .enumerate()
            .map(|(i, env)| SidebarLink::new("env", env.clone(), i == active))
            .collect();
        let params = compute_filter_params(&links, clicked);
        prop_assert_eq!(params.iter().filter(|(k, _)| *k == "env").count(), 1);
        prop_assert_eq!(params.get("env"), Some(envs[clicked].as_str()));
    }

    #[test]
    fn multi_select_never_leaves_stray_commas(
        states in prop::collection::vec(any::<bool>(), 1..8),
        clicked in any::<prop::sample::Index>(),
    ) {
        let clicked = clicked.index(states.len());
        let links: Vec<SidebarLink> = states
            .iter()
            .enumerate()
            .map(|(i, active)| SidebarLink::new("roles", format!("role{i}"), *active))
            .collect();
        let params = compute_filter_params(&links, clicked);
        if let Some(roles) = params.get("roles") {
            prop_assert!(!roles.is_empty());
            prop_assert!(!roles.starts_with(','));
            prop_assert!(!roles.ends_with(','));
            prop_assert!(!roles.contains(",,"));
        }
    }
}

#[test]
fn tag_click_extends_multi_select() {
    let links = vec![
        SidebarLink::new("env", "prod", true),
        SidebarLink::new("tag", "web", true),
        SidebarLink::new("tag", "db", false),
    ];
    assert_eq!(
        compute_filter_params(&links, 2).to_query_string(),
        "?env=prod&tag=web,db&virt="
    );
}
