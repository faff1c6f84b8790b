//! Sidebar filter links.
//!
//! Each link carries a category (`env`, `virt`, `roles`, `tags`) and a
//! value. A click recomputes the whole query string from the links' active
//! flags:
//!
//! - the clicked link flips, all other active links stay active;
//! - `env` and `virt` are exclusive: the clicked link wins, otherwise the
//!   first active link of the category does;
//! - other categories collect every active value, comma-joined;
//! - an exclusive category with nothing active is sent empty so the server
//!   does not fall back to its default.

use indexmap::IndexMap;

/// Categories that hold a single value.
pub const EXCLUSIVE_CATEGORIES: &[&str] = &["env", "virt"];

/// One sidebar entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarLink {
    /// `data-type`; links without one take no part in filtering
    pub category: Option<String>,
    /// `data-name`; links without one take no part in filtering
    pub name: Option<String>,
    pub active: bool,
}

impl SidebarLink {
    pub fn new(category: impl Into<String>, name: impl Into<String>, active: bool) -> Self {
        Self {
            category: Some(category.into()),
            name: Some(name.into()),
            active,
        }
    }
}

/// Ordered category → value mapping, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams(IndexMap<String, String>);

impl FilterParams {
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `?cat1=val1&cat2=val2`, empty string when there are no parameters.
    ///
    /// ```
    /// use kitchen::dashboard::sidebar::{compute_filter_params, SidebarLink};
    ///
    /// let links = vec![
    ///     SidebarLink::new("env", "production", true),
    ///     SidebarLink::new("roles", "web server", false),
    /// ];
    /// let params = compute_filter_params(&links, 1);
    /// assert_eq!(params.to_query_string(), "?env=production&roles=web%20server&virt=");
    /// ```
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", encode_query_component(k), encode_query_component(v)))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}

/// Parameters produced by clicking `links[clicked]`.
///
/// An out-of-range `clicked` behaves like a click on nothing.
#[must_use]
pub fn compute_filter_params(links: &[SidebarLink], clicked: usize) -> FilterParams {
    let mut params: IndexMap<String, String> = IndexMap::new();
    let mut clicked_exclusive: Vec<&str> = Vec::new();

    for (i, link) in links.iter().enumerate() {
        let is_clicked = i == clicked;
        let active = if is_clicked { !link.active } else { link.active };
        if !active {
            continue;
        }
        let (Some(category), Some(name)) = (link.category.as_deref(), link.name.as_deref()) else {
            continue;
        };

        if EXCLUSIVE_CATEGORIES.contains(&category) {
            if is_clicked {
                params.insert(category.to_string(), name.to_string());
                clicked_exclusive.push(category);
            } else if !clicked_exclusive.contains(&category) && !params.contains_key(category) {
                params.insert(category.to_string(), name.to_string());
            }
        } else if let Some(value) = params.get_mut(category) {
            value.push(',');
            value.push_str(name);
        } else {
            params.insert(category.to_string(), name.to_string());
        }
    }

    for category in EXCLUSIVE_CATEGORIES {
        params.entry((*category).to_string()).or_default();
    }

    FilterParams(params)
}

/// Query string the click on `links[clicked]` navigates to.
#[must_use]
pub fn click_url(links: &[SidebarLink], clicked: usize) -> String {
    compute_filter_params(links, clicked).to_query_string()
}

/// Percent-encode a query key or value. Commas stay readable.
#[must_use]
pub fn encode_query_component(s: &str) -> String {
    urlencoding::encode(s).replace("%2C", ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_multi_select_value() {
        let links = vec![
            SidebarLink::new("env", "prod", true),
            SidebarLink::new("tag", "web", true),
            SidebarLink::new("tag", "db", false),
        ];
        assert_eq!(click_url(&links, 2), "?env=prod&tag=web,db&virt=");
    }

    #[test]
    fn test_exclusive_click_replaces_active_value() {
        let links = vec![
            SidebarLink::new("env", "production", true),
            SidebarLink::new("env", "staging", false),
            SidebarLink::new("virt", "guest", true),
        ];
        let params = compute_filter_params(&links, 1);
        assert_eq!(params.get("env"), Some("staging"));
        assert_eq!(params.iter().filter(|(k, _)| *k == "env").count(), 1);
        assert_eq!(params.get("virt"), Some("guest"));
    }

    #[test]
    fn test_exclusive_click_before_active_in_order() {
        let links = vec![
            SidebarLink::new("env", "staging", false),
            SidebarLink::new("env", "production", true),
        ];
        assert_eq!(compute_filter_params(&links, 0).get("env"), Some("staging"));
    }

    #[test]
    fn test_deselect_exclusive_sends_empty() {
        let links = vec![
            SidebarLink::new("env", "production", true),
            SidebarLink::new("virt", "guest", true),
        ];
        assert_eq!(click_url(&links, 0), "?virt=guest&env=");
    }

    #[test]
    fn test_deselect_only_multi_value_leaves_no_comma() {
        let links = vec![SidebarLink::new("roles", "webserver", true)];
        let params = compute_filter_params(&links, 0);
        assert_eq!(params.get("roles"), None);
        assert_eq!(params.to_query_string(), "?env=&virt=");
    }

    #[test]
    fn test_deselect_one_of_many() {
        let links = vec![
            SidebarLink::new("roles", "a", true),
            SidebarLink::new("roles", "b", true),
            SidebarLink::new("roles", "c", true),
        ];
        assert_eq!(compute_filter_params(&links, 1).get("roles"), Some("a,c"));
    }

    #[test]
    fn test_links_missing_attributes_are_dropped() {
        let links = vec![
            SidebarLink {
                category: None,
                name: Some("x".into()),
                active: true,
            },
            SidebarLink {
                category: Some("roles".into()),
                name: None,
                active: false,
            },
        ];
        assert_eq!(click_url(&links, 1), "?env=&virt=");
    }

    #[test]
    fn test_encoding_keeps_commas() {
        assert_eq!(encode_query_component("a,b"), "a,b");
        assert_eq!(encode_query_component("a&b=c#d%e+f g"), "a%26b%3Dc%23d%25e%2Bf%20g");
        assert_eq!(encode_query_component("a\nb"), "a%0Ab");
        assert_eq!(encode_query_component("db,web server"), "db,web%20server");
    }
}
