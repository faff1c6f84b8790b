//! **Inventory dashboard for Chef repositories managed with LittleChef.**
//!
//! `kitchen` reads the nodes and roles of a LittleChef kitchen, merges them
//! into the `node` data bag, and serves a web dashboard where nodes can be
//! filtered by environment, role group, virtualization role and tag, searched,
//! grouped under their virtualization hosts and expanded into their full
//! attribute tree.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`Node`] and [`Role`] records, plus the [`NodeIndex`]
//!   used to look up a node for a table row.
//! - **[`repo`]**: the [`KitchenRepo`] backend, node filters and host
//!   grouping.
//! - **[`dashboard`]**: table drawing, detail expansion, sidebar links and
//!   page rendering.
//! - **[`plugins`]**: link plugins that decorate node records.
//! - **[`graph`]**: DOT node map of client and dependency relations.
//! - **[`sync`]**: keeping the checkout in sync with its git remote.
//! - **[`server`]**: the HTTP dashboard and JSON API.
//!
//! ## Getting Started: Filtering Nodes
//!
//! ```no_run
//! use kitchen::{filter_nodes, FilterCriteria, KitchenRepo};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = KitchenRepo::at("/srv/chef-repo/kitchen");
//!     let nodes = repo.nodes_extended()?;
//!
//!     let criteria = FilterCriteria::new("production", "webserver", "guest");
//!     for node in filter_nodes(&nodes, &criteria) {
//!         println!("{} ({})", node.name(), node.chef_environment());
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unused_self,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod graph;
pub mod model;
pub mod plugins;
pub mod repo;
pub mod server;
pub mod sync;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use dashboard::{DetailExpander, PageRenderer, SidebarLink, Table, TableConfig};
pub use error::{ErrorContext, KitchenError, RepoErrorKind, Result};
pub use model::{EnvironmentCount, LookupError, Node, NodeIndex, Role};
pub use plugins::{Plugin, PluginRegistry};
pub use repo::{filter_nodes, group_nodes_by_host, FilterCriteria, KitchenRepo};
pub use sync::{RepoSync, SyncOutcome};
