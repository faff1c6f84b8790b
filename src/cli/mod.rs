//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod inventory;
mod maintenance;
mod output;

pub use inventory::{render_nodes, render_roles, run_graph, run_nodes, run_roles, NodeQuery};
pub use maintenance::{run_build_data_bag, run_sync};
pub use output::{text_table, write_output, OutputFormat, OutputTarget};
