//! Unified error types for kitchen.
//!
//! This module provides the error hierarchy for the library, with enough
//! context for the dashboard to show a user-facing message when the
//! repository is unusable.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kitchen operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KitchenError {
    /// The kitchen repository is missing, incomplete or contains bad data
    #[error("{context}")]
    Repo {
        context: String,
        #[source]
        source: RepoErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON errors outside of repository loading
    #[error("JSON error: {0}")]
    Json(String),

    /// A plugin failed to inject its data
    #[error("Plugin '{name}' had an error: {message}")]
    Plugin { name: String, message: String },

    /// Page or fragment rendering failed
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Repository synchronisation failed
    #[error("Sync failed: {0}")]
    Sync(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A background task did not complete
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Specific repository error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RepoErrorKind {
    #[error("Repo dir doesn't exist at '{0}'")]
    MissingDir(String),

    #[error("Couldn't find {0}. ")]
    MissingAppliances(String),

    #[error("The 'node' data bag has not yet been built")]
    DataBagNotBuilt,

    #[error("'node' data bag was not generated correctly: item 'data_bag/node/{0}' is missing")]
    MissingDataBagItem(String),

    #[error("Found the following error in \"{path}\":\n {message}")]
    InvalidJson { path: String, message: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for kitchen operations
pub type Result<T> = std::result::Result<T, KitchenError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl KitchenError {
    /// Create a repository error with context
    pub fn repo(context: impl Into<String>, source: RepoErrorKind) -> Self {
        Self::Repo {
            context: context.into(),
            source,
        }
    }

    /// Create a repository error whose message is the kind itself
    pub fn repo_kind(source: RepoErrorKind) -> Self {
        Self::repo(source.to_string(), source)
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a plugin error
    pub fn plugin(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a sync error
    pub fn sync(message: impl Into<String>) -> Self {
        Self::Sync(message.into())
    }

    /// Create a background task error
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error describes an unusable repository.
    #[must_use]
    pub const fn is_repo_error(&self) -> bool {
        matches!(self, Self::Repo { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for KitchenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for KitchenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::fmt::Error> for KitchenError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Render(err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
///
/// ```ignore
/// use kitchen::error::ErrorContext;
///
/// let nodes = repo.load_nodes().context("loading node list")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<KitchenError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: KitchenError, new_ctx: &str) -> KitchenError {
    match err {
        KitchenError::Repo {
            context: existing,
            source,
        } => KitchenError::Repo {
            context: chain_context(new_ctx, &existing),
            source,
        },
        KitchenError::Io {
            path,
            message,
            source,
        } => KitchenError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        KitchenError::Json(msg) => KitchenError::Json(chain_context(new_ctx, &msg)),
        KitchenError::Plugin { name, message } => KitchenError::Plugin {
            name,
            message: chain_context(new_ctx, &message),
        },
        KitchenError::Render(msg) => KitchenError::Render(chain_context(new_ctx, &msg)),
        KitchenError::Sync(msg) => KitchenError::Sync(chain_context(new_ctx, &msg)),
        KitchenError::Config(msg) => KitchenError::Config(chain_context(new_ctx, &msg)),
        KitchenError::Validation(msg) => KitchenError::Validation(chain_context(new_ctx, &msg)),
        KitchenError::Task(msg) => KitchenError::Task(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_display_matches_kind() {
        let err = KitchenError::repo_kind(RepoErrorKind::MissingDir("/badrepopath/".into()));
        assert_eq!(err.to_string(), "Repo dir doesn't exist at '/badrepopath/'");
        assert!(err.is_repo_error());

        let err = KitchenError::repo_kind(RepoErrorKind::DataBagNotBuilt);
        assert_eq!(err.to_string(), "The 'node' data bag has not yet been built");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = KitchenError::io("/kitchen/nodes/a.json", io_err);
        assert!(err.to_string().contains("/kitchen/nodes/a.json"));
        assert!(!err.is_repo_error());
    }

    #[test]
    fn test_context_chaining() {
        fn inner() -> Result<()> {
            Err(KitchenError::repo("base", RepoErrorKind::DataBagNotBuilt))
        }

        let result = inner().context("middle").context("outer");
        match result {
            Err(KitchenError::Repo { context, .. }) => {
                assert_eq!(context, "outer: middle: base");
            }
            _ => panic!("Expected Repo error"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;
        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called);

        let err_result: Result<i32> = Err(KitchenError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called);
    }
}
