#![no_main]
use libfuzzer_sys::fuzz_target;
use kitchen::config::RepoConfig;
use kitchen::dashboard::{click_url, SidebarLink};
use kitchen::FilterCriteria;
use std::collections::HashMap;

/// Fuzz query parsing into filter criteria and the sidebar click logic.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let params: HashMap<String, String> = s
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let criteria = FilterCriteria::from_query(&params, &RepoConfig::default());
    assert!(criteria.roles.iter().all(|r| !r.is_empty()));

    let links: Vec<SidebarLink> = s
        .split('&')
        .enumerate()
        .filter_map(|(i, pair)| {
            let (k, v) = pair.split_once('=')?;
            Some(SidebarLink::new(k, v, i % 2 == 0))
        })
        .collect();
    for clicked in 0..=links.len() {
        let url = click_url(&links, clicked);
        assert!(url.is_empty() || url.starts_with('?'));
    }
});
