//! Repository maintenance commands: `sync` and `build-data-bag`.

use crate::config::AppConfig;
use crate::repo::KitchenRepo;
use crate::sync::{RepoSync, SyncOutcome};
use anyhow::Result;

/// Clone or pull the repository once and rebuild the data bag.
pub fn run_sync(config: &AppConfig, quiet: bool) -> Result<()> {
    let outcome = RepoSync::new(config.repo.clone()).run()?;
    if !quiet {
        match outcome {
            SyncOutcome::Cloned { items } => {
                eprintln!("Cloned repository, built {items} data bag items");
            }
            SyncOutcome::Updated { items } => {
                eprintln!("Updated repository, built {items} data bag items");
            }
        }
    }
    Ok(())
}

/// Rebuild `data_bags/node` of the local kitchen.
pub fn run_build_data_bag(config: &AppConfig, quiet: bool) -> Result<()> {
    let repo = KitchenRepo::new(&config.repo);
    let items = repo.build_node_data_bag()?;
    if !quiet {
        eprintln!(
            "Wrote {} items to {}",
            items,
            repo.data_bag_dir().display()
        );
    }
    Ok(())
}
