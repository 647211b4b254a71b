//! CLI error types.

use std::path::PathBuf;

use cdoc_config::ConfigError;
use cdoc_rewriter::RewriteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} files failed")]
    Failed { failed: usize, total: usize },

    #[error("{0}")]
    Validation(String),
}
