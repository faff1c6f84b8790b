//! Node table: configuration, search, sort and draw.
//!
//! Drawing yields rows in display order. With a grouping column set, a
//! full-width header row is inserted before the first row of every new
//! group value, comparing each row with the one drawn before it. Opened
//! rows are followed by their detail row.

use super::details::DetailExpander;
use std::cmp::Ordering;

// ============================================================================
// Configuration
// ============================================================================

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// User-facing table strings. `_TOTAL_` is replaced by the number of rows
/// shown, `_MAX_` by the number of rows before searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Info line when rows are shown
    pub info: String,
    /// Info line when no row is shown
    pub info_empty: String,
    /// Appended to the info line while a search is active
    pub info_filtered: String,
    /// Table body when no row is shown
    pub zero_records: String,
}

impl Default for Language {
    fn default() -> Self {
        Self {
            info: "Showing _TOTAL_ nodes".to_string(),
            info_empty: "No nodes found".to_string(),
            info_filtered: " (filtering from _MAX_ total)".to_string(),
            zero_records: "No nodes to display".to_string(),
        }
    }
}

/// Per-column options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub targets: Vec<usize>,
    pub sortable: bool,
    pub visible: bool,
}

impl ColumnDef {
    #[must_use]
    pub fn not_sortable(targets: Vec<usize>) -> Self {
        Self {
            targets,
            sortable: false,
            visible: true,
        }
    }

    #[must_use]
    pub fn hidden(targets: Vec<usize>) -> Self {
        Self {
            targets,
            sortable: true,
            visible: false,
        }
    }
}

/// Table behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub paginate: bool,
    pub language: Language,
    pub column_defs: Vec<ColumnDef>,
    /// Initial user sort
    pub sorting: Vec<(usize, SortDirection)>,
    /// Sort applied before any user sort
    pub sorting_fixed: Vec<(usize, SortDirection)>,
    /// Initial search text
    pub search: String,
    /// Hidden column whose value changes start a new group
    pub group_column: Option<usize>,
}

impl TableConfig {
    /// Plain node list: no pagination, column 0 is the expander and column
    /// 1 holds the hidden node name.
    #[must_use]
    pub fn node_list(search: impl Into<String>) -> Self {
        Self {
            paginate: false,
            language: Language::default(),
            column_defs: vec![ColumnDef::not_sortable(vec![0]), ColumnDef::hidden(vec![1])],
            sorting: Vec::new(),
            sorting_fixed: Vec::new(),
            search: search.into(),
            group_column: None,
        }
    }

    /// Node list grouped by a hidden column, pre-sorted on it.
    #[must_use]
    pub fn grouped(search: impl Into<String>, group_column: usize, sort_column: usize) -> Self {
        let mut config = Self::node_list(search);
        config.column_defs.push(ColumnDef::hidden(vec![group_column]));
        config.sorting_fixed = vec![(group_column, SortDirection::Asc)];
        config.sorting = vec![(sort_column, SortDirection::Asc)];
        config.group_column = Some(group_column);
        config
    }

    #[must_use]
    pub fn is_visible(&self, column: usize) -> bool {
        !self
            .column_defs
            .iter()
            .any(|def| !def.visible && def.targets.contains(&column))
    }

    #[must_use]
    pub fn is_sortable(&self, column: usize) -> bool {
        !self
            .column_defs
            .iter()
            .any(|def| !def.sortable && def.targets.contains(&column))
    }
}

/// Search text carried in a URL fragment, percent-decoded.
///
/// ```
/// use kitchen::dashboard::table::search_text_from_url;
///
/// assert_eq!(search_text_from_url("/?env=production#web%20db"), "web db");
/// assert_eq!(search_text_from_url("/?env=production"), "");
/// ```
#[must_use]
pub fn search_text_from_url(url: &str) -> String {
    let Some((_, fragment)) = url.split_once('#') else {
        return String::new();
    };
    urlencoding::decode(fragment).map_or_else(|_| fragment.to_string(), |s| s.into_owned())
}

// ============================================================================
// Rows
// ============================================================================

/// One table cell: HTML for display and plain text for search and sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub html: String,
    pub text: String,
}

impl Cell {
    /// Cell whose HTML is the escaped text.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            html: super::escape::escape_html(&text),
            text,
        }
    }

    /// Cell with separate HTML and search text.
    pub fn html(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }
}

/// A data row. `id` is the join key used for detail lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<Cell>,
}

impl TableRow {
    fn text(&self, column: usize) -> &str {
        self.cells.get(column).map_or("", |c| c.text.as_str())
    }

    /// Every word must occur in some cell, hidden cells included.
    fn matches(&self, words: &[String]) -> bool {
        words.iter().all(|word| {
            self.cells
                .iter()
                .any(|cell| cell.text.to_lowercase().contains(word.as_str()))
        })
    }
}

/// Output of a draw, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawnRow {
    /// Full-width row announcing a new group value
    GroupHeader { label: String, colspan: usize },
    /// A data row: visible cells after the expander column
    Data {
        row_id: String,
        expanded: bool,
        cells: Vec<String>,
    },
    /// Inserted after an expanded data row
    Details {
        row_id: String,
        colspan: usize,
        html: String,
    },
}

/// Row counts of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    pub shown: usize,
    pub total: usize,
    pub filtered: bool,
}

impl TableInfo {
    /// Info line rendered with the table's language strings.
    #[must_use]
    pub fn text(&self, language: &Language) -> String {
        let mut info = if self.shown == 0 {
            language.info_empty.clone()
        } else {
            language.info.replace("_TOTAL_", &self.shown.to_string())
        };
        if self.filtered {
            info.push_str(
                &language
                    .info_filtered
                    .replace("_MAX_", &self.total.to_string()),
            );
        }
        info
    }
}

// ============================================================================
// Table
// ============================================================================

/// A node table with its configuration, rows and expanded-row state.
#[derive(Debug, Clone)]
pub struct Table {
    config: TableConfig,
    headers: Vec<String>,
    rows: Vec<TableRow>,
    details: DetailExpander,
    sorting: Vec<(usize, SortDirection)>,
    search: String,
}

impl Table {
    pub fn new(
        config: TableConfig,
        headers: Vec<String>,
        rows: Vec<TableRow>,
        details: DetailExpander,
    ) -> Self {
        let sorting = config.sorting.clone();
        let search = config.search.clone();
        Self {
            config,
            headers,
            rows,
            details,
            sorting,
            search,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn details(&self) -> &DetailExpander {
        &self.details
    }

    /// Replace the user sort. Non-sortable columns are ignored.
    pub fn sort_by(&mut self, column: usize, direction: SortDirection) {
        if self.config.is_sortable(column) {
            self.sorting = vec![(column, direction)];
        } else {
            tracing::debug!("Column {} is not sortable", column);
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Flip a row's details; returns the new state.
    pub fn toggle(&mut self, row_id: &str) -> bool {
        self.details.toggle(row_id)
    }

    /// Headers of the visible columns after the expander column.
    #[must_use]
    pub fn visible_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, _)| self.config.is_visible(*i))
            .map(|(_, h)| h.as_str())
            .collect()
    }

    /// Number of visible columns, expander included.
    #[must_use]
    pub fn visible_columns(&self) -> usize {
        (0..self.headers.len())
            .filter(|i| self.config.is_visible(*i))
            .count()
    }

    /// Search, sort and lay out the rows.
    #[must_use]
    pub fn draw(&self) -> (Vec<DrawnRow>, TableInfo) {
        let words: Vec<String> = self
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut shown: Vec<&TableRow> = self.rows.iter().filter(|r| r.matches(&words)).collect();
        let order: Vec<(usize, SortDirection)> = self
            .config
            .sorting_fixed
            .iter()
            .chain(&self.sorting)
            .copied()
            .collect();
        shown.sort_by(|a, b| compare_rows(a, b, &order));

        let colspan = self.visible_columns();
        let mut drawn = Vec::with_capacity(shown.len());
        let mut last_group: Option<&str> = None;

        for row in &shown {
            if let Some(group_column) = self.config.group_column {
                let group = row.text(group_column);
                if last_group != Some(group) {
                    drawn.push(DrawnRow::GroupHeader {
                        label: group.to_string(),
                        colspan,
                    });
                    last_group = Some(group);
                }
            }

            let expanded = self.details.is_expanded(&row.id);
            drawn.push(DrawnRow::Data {
                row_id: row.id.clone(),
                expanded,
                cells: row
                    .cells
                    .iter()
                    .enumerate()
                    .skip(1)
                    .filter(|(i, _)| self.config.is_visible(*i))
                    .map(|(_, c)| c.html.clone())
                    .collect(),
            });
            if expanded {
                drawn.push(DrawnRow::Details {
                    row_id: row.id.clone(),
                    colspan,
                    html: self.details.render_details(&row.id),
                });
            }
        }

        let info = TableInfo {
            shown: shown.len(),
            total: self.rows.len(),
            filtered: !words.is_empty(),
        };
        (drawn, info)
    }
}

fn compare_rows(a: &TableRow, b: &TableRow, order: &[(usize, SortDirection)]) -> Ordering {
    for (column, direction) in order {
        let ord = compare_text(a.text(*column), b.text(*column));
        let ord = match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Numbers sort before text. Numbers compare numerically, text
/// case-insensitively.
fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeIndex;

    fn row(id: &str, host: &str, env: &str) -> TableRow {
        TableRow {
            id: id.to_string(),
            cells: vec![
                Cell::default(),
                Cell::text(id),
                Cell::text(host),
                Cell::text(id),
                Cell::text(env),
            ],
        }
    }

    fn headers() -> Vec<String> {
        ["", "Key", "Host", "Name", "Environment"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    fn grouped_table() -> Table {
        Table::new(
            TableConfig::grouped("", 2, 3),
            headers(),
            vec![
                row("vm3", "hostB", "production"),
                row("vm1", "hostA", "production"),
                row("vm4", "hostB", "staging"),
                row("vm2", "hostA", "staging"),
            ],
            DetailExpander::default(),
        )
    }

    fn labels(drawn: &[DrawnRow]) -> Vec<String> {
        drawn
            .iter()
            .map(|r| match r {
                DrawnRow::GroupHeader { label, .. } => format!("#{label}"),
                DrawnRow::Data { row_id, .. } => row_id.clone(),
                DrawnRow::Details { row_id, .. } => format!("+{row_id}"),
            })
            .collect()
    }

    #[test]
    fn test_node_list_config() {
        let config = TableConfig::node_list("web");
        assert!(!config.paginate);
        assert!(!config.is_sortable(0));
        assert!(!config.is_visible(1));
        assert!(config.is_visible(2));
        assert_eq!(config.search, "web");
        assert_eq!(config.language.info, "Showing _TOTAL_ nodes");
        assert!(config.group_column.is_none());
    }

    #[test]
    fn test_grouped_config() {
        let config = TableConfig::grouped("", 2, 3);
        assert!(!config.is_visible(2));
        assert_eq!(config.sorting_fixed, vec![(2, SortDirection::Asc)]);
        assert_eq!(config.sorting, vec![(3, SortDirection::Asc)]);
    }

    #[test]
    fn test_group_headers_before_each_group() {
        let (drawn, info) = grouped_table().draw();
        assert_eq!(
            labels(&drawn),
            vec!["#hostA", "vm1", "vm2", "#hostB", "vm3", "vm4"]
        );
        assert_eq!(info.shown, 4);
        match &drawn[0] {
            DrawnRow::GroupHeader { colspan, .. } => assert_eq!(*colspan, 3),
            other => panic!("expected group header, got {other:?}"),
        }
    }

    #[test]
    fn test_user_sort_within_fixed_groups() {
        let mut table = grouped_table();
        table.sort_by(3, SortDirection::Desc);
        assert_eq!(
            labels(&table.draw().0),
            vec!["#hostA", "vm2", "vm1", "#hostB", "vm4", "vm3"]
        );
    }

    #[test]
    fn test_search_words_all_match() {
        let mut table = grouped_table();
        table.set_search("STAGING hostb");
        let (drawn, info) = table.draw();
        assert_eq!(labels(&drawn), vec!["#hostB", "vm4"]);
        assert_eq!(
            info.text(&table.config().language),
            "Showing 1 nodes (filtering from 4 total)"
        );
    }

    #[test]
    fn test_empty_result_has_no_group_rows() {
        let mut table = grouped_table();
        table.set_search("nothing-matches");
        let (drawn, info) = table.draw();
        assert!(drawn.is_empty());
        assert_eq!(
            info.text(&table.config().language),
            "No nodes found (filtering from 4 total)"
        );
    }

    #[test]
    fn test_ungrouped_never_emits_headers() {
        let table = Table::new(
            TableConfig::node_list(""),
            headers(),
            vec![row("b", "h", "e"), row("a", "h", "e")],
            DetailExpander::default(),
        );
        let (drawn, _) = table.draw();
        assert!(drawn
            .iter()
            .all(|r| !matches!(r, DrawnRow::GroupHeader { .. })));
        if let DrawnRow::Data { cells, .. } = &drawn[0] {
            assert_eq!(cells.len(), 3);
        }
    }

    #[test]
    fn test_expander_column_not_sortable() {
        let mut table = grouped_table();
        table.sort_by(0, SortDirection::Desc);
        assert_eq!(labels(&table.draw().0)[1], "vm1");
    }

    #[test]
    fn test_toggle_inserts_and_removes_details() {
        let index: NodeIndex = ["vm1", "vm2"].into_iter().map(crate::model::Node::new).collect();
        let mut table = Table::new(
            TableConfig::node_list(""),
            headers(),
            vec![row("vm1", "h", "e"), row("vm2", "h", "e")],
            DetailExpander::new(index),
        );
        let before = table.draw().0.len();

        assert!(table.toggle("vm1"));
        let (drawn, _) = table.draw();
        assert_eq!(drawn.len(), before + 1);
        assert!(matches!(&drawn[1], DrawnRow::Details { row_id, .. } if row_id == "vm1"));

        assert!(!table.toggle("vm1"));
        assert_eq!(table.draw().0.len(), before);
        assert_eq!(table.details().chevron("vm1"), crate::dashboard::details::CHEVRON_CLOSED);
    }

    #[test]
    fn test_empty_table_info() {
        let table = Table::new(
            TableConfig::node_list(""),
            headers(),
            Vec::new(),
            DetailExpander::default(),
        );
        let (drawn, info) = table.draw();
        assert!(drawn.is_empty());
        assert_eq!(info.text(&table.config().language), "No nodes found");
    }

    #[test]
    fn test_mixed_values_sort_numbers_first() {
        let mut values = vec!["1a", "10", "b", "9", "A", "2.5", "NaN", "-3"];
        values.sort_by(|a, b| compare_text(a, b));
        assert_eq!(values, vec!["-3", "2.5", "9", "10", "NaN", "1a", "A", "b"]);

        // Transitive across the number/text boundary
        assert_eq!(compare_text("9", "10"), Ordering::Less);
        assert_eq!(compare_text("10", "1a"), Ordering::Less);
        assert_eq!(compare_text("9", "1a"), Ordering::Less);
    }

    #[test]
    fn test_search_text_from_url() {
        assert_eq!(search_text_from_url("http://x/#"), "");
        assert_eq!(search_text_from_url("http://x/?a=b#web1"), "web1");
    }
}
