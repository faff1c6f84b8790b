//! Per-row detail expansion.
//!
//! Every table row can be opened to show the full node record as
//! highlighted JSON. The open/closed state lives in an explicit map keyed
//! by row id; rows never share state.

use super::escape::escape_json_text;
use super::highlight::syntax_highlight;
use crate::model::NodeIndex;
use std::collections::HashMap;

/// Chevron of a closed row.
pub const CHEVRON_CLOSED: &str = "icon-chevron-right";
/// Chevron of an open row.
pub const CHEVRON_OPEN: &str = "icon-chevron-down";

/// Expanded state per row and the node index used to fill detail rows.
#[derive(Debug, Clone, Default)]
pub struct DetailExpander {
    expanded: HashMap<String, bool>,
    index: NodeIndex,
}

impl DetailExpander {
    /// All rows closed.
    pub fn new(index: NodeIndex) -> Self {
        Self {
            expanded: HashMap::new(),
            index,
        }
    }

    /// Start with the given rows open.
    pub fn with_open<I, S>(index: NodeIndex, open: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expanded = open.into_iter().map(|id| (id.into(), true)).collect();
        Self { expanded, index }
    }

    #[must_use]
    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.expanded.get(row_id).copied().unwrap_or(false)
    }

    /// Flip a row and return its new state.
    pub fn toggle(&mut self, row_id: &str) -> bool {
        let state = self.expanded.entry(row_id.to_string()).or_insert(false);
        *state = !*state;
        *state
    }

    /// Chevron class for the row's current state.
    #[must_use]
    pub fn chevron(&self, row_id: &str) -> &'static str {
        if self.is_expanded(row_id) {
            CHEVRON_OPEN
        } else {
            CHEVRON_CLOSED
        }
    }

    /// Open row ids, sorted.
    #[must_use]
    pub fn open_rows(&self) -> Vec<&str> {
        let mut open: Vec<&str> = self
            .expanded
            .iter()
            .filter(|(_, open)| **open)
            .map(|(id, _)| id.as_str())
            .collect();
        open.sort_unstable();
        open
    }

    /// Open rows as they would be after toggling `row_id`, sorted.
    ///
    /// Used to build the link behind each chevron without touching state.
    #[must_use]
    pub fn open_rows_after_toggle<'a>(&'a self, row_id: &'a str) -> Vec<&'a str> {
        let mut open: Vec<&str> = self
            .open_rows()
            .into_iter()
            .filter(|id| *id != row_id)
            .collect();
        if !self.is_expanded(row_id) {
            open.push(row_id);
            open.sort_unstable();
        }
        open
    }

    /// Detail fragment for a row.
    #[must_use]
    pub fn render_details(&self, row_id: &str) -> String {
        format_node_details(&self.index, row_id)
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }
}

/// Highlighted JSON of the node behind `key`, or a visible placeholder
/// when the key does not resolve to exactly one node.
#[must_use]
pub fn format_node_details(index: &NodeIndex, key: &str) -> String {
    let node = match index.lookup(key) {
        Ok(node) => node,
        Err(e) => {
            tracing::debug!("Detail lookup failed: {}", e);
            return not_found(&e.to_string());
        }
    };
    match syntax_highlight(node) {
        Ok(html) => format!("<pre>{html}</pre>"),
        Err(e) => not_found(&format!("Could not serialize '{key}': {e}")),
    }
}

fn not_found(message: &str) -> String {
    format!("<pre class=\"not-found\">{}</pre>", escape_json_text(message))
}
