//! Inventory records.
//!
//! Nodes and roles are read from the kitchen as JSON and stay JSON: the
//! detail view prints every attribute, so the model only adds accessors for
//! the attributes the dashboard filters and groups on.
//!
//! # Index Support
//!
//! Expanding a table row needs the full record for the row's key. Build a
//! [`NodeIndex`] once per page:
//!
//! ```ignore
//! let index = NodeIndex::build(nodes);
//! let node = index.lookup("testnode2")?;
//! ```

mod index;
mod node;

pub use index::*;
pub use node::*;
