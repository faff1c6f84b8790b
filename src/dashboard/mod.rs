//! Dashboard rendering.
//!
//! Builds the HTML pages served by the web server from filtered node
//! records:
//!
//! - [`table`]: search, sort, host grouping and row drawing
//! - [`details`]: per-row expansion into highlighted JSON
//! - [`sidebar`]: filter links and the query strings they lead to
//! - [`page`]: complete pages for the node list, virtualization and graph views
//! - [`highlight`] and [`escape`]: JSON highlighting and HTML escaping

pub mod details;
pub mod escape;
pub mod highlight;
pub mod page;
pub mod sidebar;
pub mod table;

pub use details::{format_node_details, DetailExpander, CHEVRON_CLOSED, CHEVRON_OPEN};
pub use highlight::{syntax_highlight, TokenClass};
pub use page::{
    build_sidebar, node_list_table, virt_table, Message, MessageLevel, PageContext, PageRenderer,
    RowBuilder, View,
};
pub use sidebar::{click_url, compute_filter_params, FilterParams, SidebarLink};
pub use table::{search_text_from_url, Cell, DrawnRow, Table, TableConfig, TableInfo, TableRow};
