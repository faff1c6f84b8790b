//! Keeping the kitchen checkout in sync with its git remote.
//!
//! A sync clones the repository when the checkout is missing and pulls
//! otherwise. A successful git step rebuilds the `node` data bag. The
//! sync-date file is touched after every attempt; its modification time is
//! what the dashboard shows as the last sync.

use crate::config::RepoConfig;
use crate::error::{KitchenError, Result};
use crate::repo::KitchenRepo;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, SystemTime};

/// What a successful sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh `git clone --depth 1`
    Cloned { items: usize },
    /// `git pull` on an existing checkout
    Updated { items: usize },
}

/// Sync task for one repository.
#[derive(Debug, Clone)]
pub struct RepoSync {
    config: RepoConfig,
}

impl RepoSync {
    #[must_use]
    pub const fn new(config: RepoConfig) -> Self {
        Self { config }
    }

    /// Clone or pull, rebuild the data bag, then stamp the sync date.
    pub fn run(&self) -> Result<SyncOutcome> {
        tracing::debug!("Synching repo");
        let result = if self.config.repo_root().exists() {
            self.update()
        } else {
            self.clone_repo()
        };
        if let Err(e) = &result {
            tracing::error!("{}", e);
        }

        if let Err(e) = touch(&self.config.syncdate_file) {
            tracing::warn!(
                "Could not set sync date on {}: {}",
                self.config.syncdate_file.display(),
                e
            );
        }
        result
    }

    /// Modification time of the sync-date file.
    #[must_use]
    pub fn last_sync(&self) -> Option<DateTime<Local>> {
        last_sync(&self.config.syncdate_file)
    }

    fn update(&self) -> Result<SyncOutcome> {
        tracing::info!("Updating repo");
        let root = self.config.repo_root();
        run_git(&["pull"], &root)?;
        let items = self.rebuild()?;
        Ok(SyncOutcome::Updated { items })
    }

    fn clone_repo(&self) -> Result<SyncOutcome> {
        let url = self
            .config
            .url
            .as_deref()
            .ok_or_else(|| KitchenError::sync("no repository URL configured"))?;
        let base = &self.config.base_path;
        std::fs::create_dir_all(base).map_err(|e| KitchenError::io(base, e))?;

        tracing::info!("Cloning Git repo {}", url);
        run_git(&["clone", "--depth", "1", url, &self.config.name], base)?;
        let items = self.rebuild()?;
        Ok(SyncOutcome::Cloned { items })
    }

    fn rebuild(&self) -> Result<usize> {
        KitchenRepo::new(&self.config).build_node_data_bag()
    }
}

fn run_git(args: &[&str], cwd: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| KitchenError::sync(format!("could not run git: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(KitchenError::sync(format!(
            "git {} returned {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Create the file if needed and set its modification time to now.
fn touch(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.set_modified(SystemTime::now())
}

/// Modification time of a sync-date file, `None` when it does not exist.
#[must_use]
pub fn last_sync(path: &Path) -> Option<DateTime<Local>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

/// Run syncs forever, one every `period`. Each sync runs on the blocking
/// pool so git never stalls the server.
pub async fn run_periodic(config: RepoConfig, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let sync = RepoSync::new(config.clone());
        match tokio::task::spawn_blocking(move || sync.run()).await {
            Ok(Ok(outcome)) => tracing::info!("Repo sync finished: {:?}", outcome),
            Ok(Err(_)) => {}
            Err(e) => tracing::error!("Repo sync task panicked: {}", e),
        }
    }
}
