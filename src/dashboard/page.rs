//! HTML pages for the node list, virtualization and graph views.
//!
//! Pages are plain server-rendered HTML. Interactivity is expressed through
//! links: every sidebar entry points at the query string its click
//! produces, every chevron points at the current URL with that row's
//! details toggled, and the search box is a GET form.

use super::details::DetailExpander;
use super::escape::{escape_html, escape_html_attr};
use super::sidebar::{click_url, encode_query_component, SidebarLink};
use super::table::{Cell, DrawnRow, Table, TableConfig, TableRow};
use crate::config::{DashboardConfig, VIRT_ROLES};
use crate::error::Result;
use crate::model::{EnvironmentCount, Node, NodeIndex};
use crate::repo::{recipe_list, role_list, FilterCriteria};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Query parameter holding the comma-separated open rows.
pub const OPEN_PARAM: &str = "open";
/// Query parameter holding the search text.
pub const SEARCH_PARAM: &str = "search";

// ============================================================================
// Page context
// ============================================================================

/// Which page is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    NodeList,
    Virt,
    Graph,
}

impl View {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::NodeList => "/",
            Self::Virt => "/virt/",
            Self::Graph => "/graph/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// A flash-style message shown above the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// Everything a page shows besides its main content.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub view: View,
    /// Raw query parameters, in request order
    pub query: Vec<(String, String)>,
    pub criteria: FilterCriteria,
    pub environments: Vec<EnvironmentCount>,
    pub role_groups: Vec<String>,
    pub tags: Vec<String>,
    pub messages: Vec<Message>,
    pub last_sync: Option<DateTime<Local>>,
}

impl PageContext {
    pub fn new(view: View, query: Vec<(String, String)>, criteria: FilterCriteria) -> Self {
        Self {
            view,
            query,
            criteria,
            environments: Vec::new(),
            role_groups: Vec::new(),
            tags: Vec::new(),
            messages: Vec::new(),
            last_sync: None,
        }
    }

    /// Value of a raw query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Search text from the query.
    #[must_use]
    pub fn search(&self) -> &str {
        self.param(SEARCH_PARAM).unwrap_or("")
    }

    /// Row ids listed in the `open` parameter.
    #[must_use]
    pub fn open_rows(&self) -> Vec<String> {
        crate::repo::split_list(self.param(OPEN_PARAM).unwrap_or(""))
    }

    /// Current URL with `key` set to `value`, or removed when `None`.
    #[must_use]
    pub fn url_with(&self, key: &str, value: Option<&str>) -> String {
        let mut pairs: Vec<String> = self
            .query
            .iter()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| format!("{}={}", encode_query_component(k), encode_query_component(v)))
            .collect();
        if let Some(value) = value {
            pairs.push(format!(
                "{}={}",
                encode_query_component(key),
                encode_query_component(value)
            ));
        }
        if pairs.is_empty() {
            self.view.path().to_string()
        } else {
            format!("{}?{}", self.view.path(), pairs.join("&"))
        }
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// A labelled sidebar entry.
#[derive(Debug, Clone)]
pub struct SidebarEntry {
    pub link: SidebarLink,
    pub label: String,
    pub count: Option<usize>,
}

/// A titled group of sidebar entries.
#[derive(Debug, Clone)]
pub struct SidebarSection {
    pub title: &'static str,
    pub entries: Vec<SidebarEntry>,
}

/// Sidebar sections for a view, with active flags taken from the criteria.
#[must_use]
pub fn build_sidebar(ctx: &PageContext) -> Vec<SidebarSection> {
    let criteria = &ctx.criteria;
    let mut sections = vec![SidebarSection {
        title: "Environment",
        entries: ctx
            .environments
            .iter()
            .map(|env| SidebarEntry {
                link: SidebarLink::new("env", &env.name, criteria.env == env.name),
                label: env.name.clone(),
                count: Some(env.counts),
            })
            .collect(),
    }];

    sections.push(SidebarSection {
        title: "Roles",
        entries: ctx
            .role_groups
            .iter()
            .map(|group| SidebarEntry {
                link: SidebarLink::new("roles", group, criteria.roles.contains(group)),
                label: group.clone(),
                count: None,
            })
            .collect(),
    });

    if ctx.view == View::NodeList {
        sections.push(SidebarSection {
            title: "Virtualization",
            entries: VIRT_ROLES
                .iter()
                .map(|role| SidebarEntry {
                    link: SidebarLink::new(
                        "virt",
                        *role,
                        criteria.virt.iter().any(|v| v == role),
                    ),
                    label: (*role).to_string(),
                    count: None,
                })
                .collect(),
        });
        if !ctx.tags.is_empty() {
            sections.push(SidebarSection {
                title: "Tags",
                entries: ctx
                    .tags
                    .iter()
                    .map(|tag| SidebarEntry {
                        link: SidebarLink::new("tags", tag, criteria.tags.contains(tag)),
                        label: tag.clone(),
                        count: None,
                    })
                    .collect(),
            });
        }
    }
    sections
}

// ============================================================================
// Table rows
// ============================================================================

/// Headers of the node list table.
pub const NODE_LIST_HEADERS: &[&str] = &[
    "", "Key", "Name", "Environment", "Roles", "Recipes", "Platform", "Tags", "Links",
];

/// Headers of the virtualization table.
pub const VIRT_HEADERS: &[&str] = &[
    "", "Key", "Host", "Name", "Environment", "Roles", "Recipes", "Platform", "Tags", "Links",
];

/// Column of the host name in the virtualization table.
pub const VIRT_GROUP_COLUMN: usize = 2;
/// Column the virtualization table sorts on inside a host group.
pub const VIRT_SORT_COLUMN: usize = 3;

/// Builds table rows from node records.
#[derive(Debug, Clone)]
pub struct RowBuilder<'a> {
    tag_classes: &'a BTreeMap<String, String>,
    exclude_role_prefix: &'a str,
}

impl<'a> RowBuilder<'a> {
    pub const fn new(tag_classes: &'a BTreeMap<String, String>, exclude_role_prefix: &'a str) -> Self {
        Self {
            tag_classes,
            exclude_role_prefix,
        }
    }

    /// Cells shared by both tables, from the name column on.
    fn node_cells(&self, node: &Node) -> Vec<Cell> {
        let run_list = node.run_list();
        let roles = role_list(&run_list, self.exclude_role_prefix).join(", ");
        let recipes = recipe_list(&run_list).join(", ");
        let tags = node.tags();

        vec![
            Cell::text(node.name()),
            Cell::text(node.chef_environment()),
            Cell::text(roles),
            Cell::text(recipes),
            Cell::text(node.platform().unwrap_or_default()),
            Cell::html(self.tag_buttons(&tags), tags.join(" ")),
            Cell::html(link_icons(node.links()), String::new()),
        ]
    }

    fn tag_buttons(&self, tags: &[&str]) -> String {
        tags.iter()
            .map(|tag| {
                let class = self.tag_classes.get(*tag).map_or("", String::as_str);
                format!(
                    "<a class=\"btn btn-custom {} disabled\">{}</a>",
                    escape_html_attr(class),
                    escape_html(tag)
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One row per node, keyed by node name.
    #[must_use]
    pub fn node_list_rows(&self, nodes: &[Node]) -> Vec<TableRow> {
        nodes
            .iter()
            .map(|node| {
                let mut cells = vec![Cell::default(), Cell::text(node.name())];
                cells.extend(self.node_cells(node));
                TableRow {
                    id: node.name().to_string(),
                    cells,
                }
            })
            .collect()
    }

    /// One row per guest, with its host in the grouping column.
    #[must_use]
    pub fn virt_rows(&self, hosts: &[Node]) -> Vec<TableRow> {
        hosts
            .iter()
            .flat_map(|host| {
                virt_guests(host).into_iter().map(move |guest| {
                    let mut cells = vec![
                        Cell::default(),
                        Cell::text(guest.name()),
                        Cell::text(host.name()),
                    ];
                    cells.extend(self.node_cells(&guest));
                    TableRow {
                        id: guest.name().to_string(),
                        cells,
                    }
                })
            })
            .collect()
    }
}

/// Guests of a host as nodes.
#[must_use]
pub fn virt_guests(host: &Node) -> Vec<Node> {
    host.guests()
        .iter()
        .cloned()
        .filter_map(Node::from_value)
        .collect()
}

fn link_icons(links: &[Value]) -> String {
    links
        .iter()
        .filter_map(|link| {
            let url = link.get("url").and_then(Value::as_str)?;
            let title = link.get("title").and_then(Value::as_str).unwrap_or(url);
            let inner = match link.get("img").and_then(Value::as_str) {
                Some(img) => format!(
                    "<img src=\"{}\" alt=\"{}\" width=\"16\">",
                    escape_html_attr(img),
                    escape_html_attr(title)
                ),
                None => escape_html(title),
            };
            Some(format!(
                "<a href=\"{}\" title=\"{}\" target=\"_blank\">{}</a>",
                escape_html_attr(url),
                escape_html_attr(title),
                inner
            ))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The node list table for a page.
pub fn node_list_table(ctx: &PageContext, nodes: Vec<Node>, rows: &RowBuilder<'_>) -> Table {
    let headers = NODE_LIST_HEADERS.iter().map(|h| (*h).to_string()).collect();
    let table_rows = rows.node_list_rows(&nodes);
    let details = DetailExpander::with_open(NodeIndex::build(nodes), ctx.open_rows());
    Table::new(TableConfig::node_list(ctx.search()), headers, table_rows, details)
}

/// The guests-by-host table for a page.
pub fn virt_table(ctx: &PageContext, hosts: &[Node], rows: &RowBuilder<'_>) -> Table {
    let headers = VIRT_HEADERS.iter().map(|h| (*h).to_string()).collect();
    let table_rows = rows.virt_rows(hosts);
    let guests: Vec<Node> = hosts.iter().flat_map(virt_guests).collect();
    let details = DetailExpander::with_open(NodeIndex::build(guests), ctx.open_rows());
    Table::new(
        TableConfig::grouped(ctx.search(), VIRT_GROUP_COLUMN, VIRT_SORT_COLUMN),
        headers,
        table_rows,
        details,
    )
}

// ============================================================================
// Page renderer
// ============================================================================

/// Renders complete dashboard pages.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    title: String,
    show_virt: bool,
}

impl PageRenderer {
    #[must_use]
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            show_virt: config.show_virt_view,
        }
    }

    fn get_styles(&self) -> &'static str {
        r"<style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #333; }
        .navbar { background: #2c3e50; color: #fff; padding: 10px 20px; }
        .navbar a { color: #ecf0f1; margin-right: 16px; text-decoration: none; }
        .navbar a.current { font-weight: bold; }
        .layout { display: flex; }
        .sidebar { width: 220px; padding: 16px; border-right: 1px solid #ddd; }
        .sidebar h4 { margin: 12px 0 4px; }
        .sidebar ul { list-style: none; padding: 0; margin: 0; }
        .sidebar li a { display: block; padding: 2px 6px; color: #2c3e50; text-decoration: none; }
        .sidebar li.active a { background: #3498db; color: #fff; border-radius: 3px; }
        .badge { float: right; font-size: 0.8em; }
        .content { flex: 1; padding: 16px; }
        .alert { padding: 8px 12px; margin-bottom: 10px; border-radius: 3px; }
        .alert-info { background: #d9edf7; }
        .alert-error { background: #f2dede; }
        table#nodes { border-collapse: collapse; width: 100%; }
        #nodes th, #nodes td { border-bottom: 1px solid #eee; padding: 4px 8px; text-align: left; }
        #nodes td.control a { text-decoration: none; }
        #host_grouper { background: #ecf0f1; font-weight: bold; }
        .icon-chevron-right::before { content: '\25B8'; }
        .icon-chevron-down::before { content: '\25BE'; }
        .btn-custom { padding: 1px 5px; border: 1px solid #ccc; border-radius: 3px; font-size: 0.8em; }
        .btn-danger { background: #da4f49; color: #fff; }
        .btn-warning { background: #faa732; color: #fff; }
        pre { background: #f8f8f8; padding: 8px; overflow: auto; }
        pre .key { color: #a52a2a; }
        pre .string { color: #008000; }
        pre .number { color: #0000ff; }
        pre .boolean { color: #b22222; }
        pre .null { color: #808080; }
        pre.not-found { color: #a94442; }
        .footer { color: #999; font-size: 0.8em; margin-top: 20px; }
    </style>"
    }

    fn write_header(&self, html: &mut String, ctx: &PageContext) -> Result<()> {
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "    <meta charset=\"UTF-8\">")?;
        writeln!(html, "    <title>{}</title>", escape_html(&self.title))?;
        writeln!(html, "{}", self.get_styles())?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;

        writeln!(html, "<div class=\"navbar\">")?;
        let mut views = vec![(View::NodeList, "Nodes")];
        if self.show_virt {
            views.push((View::Virt, "Virtualization"));
        }
        views.push((View::Graph, "Graph"));
        for (view, label) in views {
            let class = if view == ctx.view { " class=\"current\"" } else { "" };
            writeln!(html, "    <a href=\"{}\"{}>{}</a>", view.path(), class, label)?;
        }
        writeln!(html, "</div>")?;
        Ok(())
    }

    fn write_sidebar(&self, html: &mut String, ctx: &PageContext) -> Result<()> {
        let sections = build_sidebar(ctx);
        let links: Vec<SidebarLink> = sections
            .iter()
            .flat_map(|s| s.entries.iter().map(|e| e.link.clone()))
            .collect();

        writeln!(html, "<div class=\"sidebar\">")?;
        let mut index = 0;
        for section in &sections {
            writeln!(html, "    <h4>{}</h4>", section.title)?;
            writeln!(html, "    <ul>")?;
            for entry in &section.entries {
                let href = format!("{}{}", ctx.view.path(), click_url(&links, index));
                let li_class = if entry.link.active { " class=\"active\"" } else { "" };
                let badge = entry
                    .count
                    .map(|c| format!(" <span class=\"badge\">{c}</span>"))
                    .unwrap_or_default();
                writeln!(
                    html,
                    "        <li{}><a class=\"sidebar_link\" data-type=\"{}\" data-name=\"{}\" href=\"{}\">{}{}</a></li>",
                    li_class,
                    escape_html_attr(entry.link.category.as_deref().unwrap_or("")),
                    escape_html_attr(entry.link.name.as_deref().unwrap_or("")),
                    escape_html_attr(&href),
                    escape_html(&entry.label),
                    badge
                )?;
                index += 1;
            }
            writeln!(html, "    </ul>")?;
        }
        writeln!(html, "</div>")?;
        Ok(())
    }

    fn write_messages(&self, html: &mut String, messages: &[Message]) -> Result<()> {
        for message in messages {
            let class = match message.level {
                MessageLevel::Info => "alert-info",
                MessageLevel::Error => "alert-error",
            };
            writeln!(
                html,
                "<div class=\"alert {}\">{}</div>",
                class,
                escape_html(&message.text)
            )?;
        }
        Ok(())
    }

    fn write_search_box(&self, html: &mut String, ctx: &PageContext) -> Result<()> {
        writeln!(
            html,
            "<form id=\"nodes_filter\" method=\"get\" action=\"{}\">",
            ctx.view.path()
        )?;
        for (key, value) in &ctx.query {
            if key == SEARCH_PARAM {
                continue;
            }
            writeln!(
                html,
                "    <input type=\"hidden\" name=\"{}\" value=\"{}\">",
                escape_html_attr(key),
                escape_html_attr(value)
            )?;
        }
        writeln!(
            html,
            "    <input type=\"text\" name=\"{}\" placeholder=\"Search\" value=\"{}\" autofocus>",
            SEARCH_PARAM,
            escape_html_attr(ctx.search())
        )?;
        writeln!(html, "</form>")?;
        // A search given as URL fragment fills an empty box
        writeln!(
            html,
            "<script>(function () {{ var box = document.querySelector('#nodes_filter input[name=search]'); \
             if (box && !box.value && window.location.hash.length > 1) {{ \
             box.value = decodeURIComponent(window.location.hash.substring(1)); box.form.submit(); }} }})();</script>"
        )?;
        Ok(())
    }

    fn write_table(&self, html: &mut String, ctx: &PageContext, table: &Table) -> Result<()> {
        let (rows, info) = table.draw();
        let language = &table.config().language;

        writeln!(
            html,
            "<div class=\"dataTables_info\">{}</div>",
            escape_html(&info.text(language))
        )?;
        writeln!(html, "<table id=\"nodes\">")?;
        writeln!(html, "    <thead>")?;
        writeln!(html, "        <tr>")?;
        writeln!(html, "            <th></th>")?;
        for header in table.visible_headers() {
            writeln!(html, "            <th>{}</th>", escape_html(header))?;
        }
        writeln!(html, "        </tr>")?;
        writeln!(html, "    </thead>")?;
        writeln!(html, "    <tbody>")?;

        if rows.is_empty() {
            writeln!(
                html,
                "        <tr><td class=\"dataTables_empty\" colspan=\"{}\">{}</td></tr>",
                table.visible_columns(),
                escape_html(&language.zero_records)
            )?;
        }

        for row in &rows {
            match row {
                DrawnRow::GroupHeader { label, colspan } => {
                    writeln!(
                        html,
                        "        <tr class=\"group\"><td colspan=\"{}\" id=\"host_grouper\">{}</td></tr>",
                        colspan,
                        escape_html(label)
                    )?;
                }
                DrawnRow::Data {
                    row_id,
                    expanded,
                    cells,
                } => {
                    let open = table.details().open_rows_after_toggle(row_id).join(",");
                    let href = ctx.url_with(OPEN_PARAM, (!open.is_empty()).then_some(open.as_str()));
                    let chevron = table.details().chevron(row_id);
                    let row_class = if *expanded { " class=\"shown\"" } else { "" };
                    write!(
                        html,
                        "        <tr{}><td class=\"control\"><a href=\"{}\"><i class=\"{}\"></i></a></td>",
                        row_class,
                        escape_html_attr(&href),
                        chevron
                    )?;
                    for cell in cells {
                        write!(html, "<td>{cell}</td>")?;
                    }
                    writeln!(html, "</tr>")?;
                }
                DrawnRow::Details {
                    colspan,
                    html: details,
                    ..
                } => {
                    writeln!(
                        html,
                        "        <tr><td class=\"details\" colspan=\"{colspan}\">{details}</td></tr>"
                    )?;
                }
            }
        }

        writeln!(html, "    </tbody>")?;
        writeln!(html, "</table>")?;
        Ok(())
    }

    fn write_footer(&self, html: &mut String, ctx: &PageContext) -> Result<()> {
        if let Some(last_sync) = ctx.last_sync {
            writeln!(
                html,
                "<div class=\"footer\">Last repository sync: {}</div>",
                last_sync.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        writeln!(html, "</div>")?;
        writeln!(html, "</div>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(())
    }

    fn open_page(&self, ctx: &PageContext) -> Result<String> {
        let mut html = String::new();
        self.write_header(&mut html, ctx)?;
        writeln!(html, "<div class=\"layout\">")?;
        self.write_sidebar(&mut html, ctx)?;
        writeln!(html, "<div class=\"content\">")?;
        self.write_messages(&mut html, &ctx.messages)?;
        Ok(html)
    }

    /// Node list or virtualization page around a table.
    pub fn render_table_page(&self, ctx: &PageContext, table: Option<&Table>) -> Result<String> {
        let mut html = self.open_page(ctx)?;
        if let Some(table) = table {
            self.write_search_box(&mut html, ctx)?;
            self.write_table(&mut html, ctx, table)?;
        }
        self.write_footer(&mut html, ctx)?;
        Ok(html)
    }

    /// Graph page with the DOT source of the node map.
    pub fn render_graph_page(&self, ctx: &PageContext, dot: Option<&str>) -> Result<String> {
        let mut html = self.open_page(ctx)?;
        if let Some(dot) = dot {
            writeln!(html, "<h3>Node map</h3>")?;
            writeln!(html, "<pre id=\"node_map\">{}</pre>", escape_html(dot))?;
        }
        self.write_footer(&mut html, ctx)?;
        Ok(html)
    }
}
