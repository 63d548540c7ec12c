use std::io;
use std::path::PathBuf;

/// Every way a run can fail.
///
/// All variants are fatal: the run stops at the first one and the process
/// exits non-zero. The `Display` text is the single line shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Config(String),

    #[error("cannot decode fields value: {0}")]
    Fields(String),

    #[error("`git` not found in PATH: {0}")]
    GitUnavailable(String),

    #[error("cannot create working directory: {0}")]
    Workspace(#[source] io::Error),

    #[error("cannot get repository {owner}/{repo}: {reason}")]
    RepositoryLookup {
        owner: String,
        repo: String,
        reason: String,
    },

    #[error("cannot clone repository: {0}")]
    Clone(String),

    #[error("cannot {action} {}: {source}", .path.display())]
    FormulaFile {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot checkout new branch: {0}")]
    Checkout(String),

    #[error("cannot commit: {0}")]
    Commit(String),

    #[error("cannot push: {0}")]
    Push(String),

    #[error("cannot create pull request: {0}")]
    PullRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
