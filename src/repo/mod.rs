//! Kitchen repository backend.
//!
//! Loads nodes, roles and the `node` data bag from a LittleChef kitchen and
//! provides the node queries behind the dashboard views:
//!
//! - [`KitchenRepo`]: validation, loading and data bag generation
//! - [`filter_nodes`] with [`FilterCriteria`]: environment, role group,
//!   virtualization and tag filters
//! - [`group_nodes_by_host`]: guests nested under their hosts
//! - run list helpers: [`role_list`], [`recipe_list`], [`expand_run_list`]

mod data_bag;
mod filter;
mod group;
mod kitchen;
mod run_list;

pub use data_bag::{build_item, deep_merge, item_file_name, item_id};
pub use filter::{
    environments, filter_nodes, node_tags, role_groups, split_list, FilterCriteria,
};
pub use group::group_nodes_by_host;
pub use kitchen::{KitchenRepo, APPLIANCES};
pub use run_list::{expand_run_list, recipe_list, role_list, ExpandedRunList, RunListItem};
