//! The update-and-propose sequence.
//!
//! [`publish`] resolves the repository, clones it into a per-run temporary
//! directory, rewrites the formula on a fresh `pr-<version>` branch, commits,
//! pushes and opens a pull request. The first failing step aborts the run;
//! earlier steps are not rolled back.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{Credentials, Signature, VersionControl};
use crate::github::{Hosting, NewPullRequest, PullRequest, Repository};
use crate::rewrite::Rewriter;

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub branch: String,
    pub changed_lines: usize,
    /// `None` for a dry run.
    pub pull_request: Option<PullRequest>,
}

pub fn branch_name(version: &str) -> String {
    format!("pr-{}", version)
}

pub fn commit_message(version: &str) -> String {
    format!("Update to {}", version)
}

pub fn pull_request_title(file: &Path, version: &str) -> String {
    format!("Update {} to {}", file.display(), version)
}

pub fn pull_request_body(file: &Path) -> String {
    format!("Update {} formula version and sha256", file.display())
}

/// Runs the whole sequence against the given collaborators.
///
/// The clone lives in a [`tempfile::TempDir`] that is removed when this
/// function returns, on success and on every error path.
pub fn publish<H, V>(config: &Config, hosting: &H, vcs: &V) -> Result<Outcome>
where
    H: Hosting,
    V: VersionControl,
{
    info!("looking up {}/{}", config.owner, config.repo);
    let repository = hosting.repository(&config.owner, &config.repo)?;
    if let Some(default) = other_default_branch(&repository, &config.base) {
        warn!(
            "pull request will target {} but {}/{} defaults to {}",
            config.base, config.owner, config.repo, default
        );
    }

    let workspace = tempfile::Builder::new()
        .prefix("formula-bump-")
        .tempdir()
        .map_err(Error::Workspace)?;
    let checkout = workspace.path().join(&config.repo);

    info!("cloning {}", repository.clone_url);
    vcs.clone_repository(&repository.clone_url, &checkout)?;

    let formula = checkout.join(&config.file);
    ensure_formula_exists(&formula)?;

    let branch = branch_name(&config.version);
    info!("checking out {}", branch);
    vcs.checkout_new_branch(&checkout, &branch)?;

    let rewriter = Rewriter::new(config.version.as_str(), config.fields.clone());
    let changed_lines = rewriter.rewrite_file(&formula)?;
    if changed_lines == 0 {
        warn!("{} already matches version {}", config.file.display(), config.version);
    } else {
        info!("rewrote {} line(s) in {}", changed_lines, config.file.display());
    }

    if config.dry_run {
        info!("dry run: skipping commit, push and pull request");
        return Ok(Outcome {
            branch,
            changed_lines,
            pull_request: None,
        });
    }

    vcs.stage_all(&checkout)?;
    vcs.commit(&checkout, &commit_message(&config.version), &Signature::action())?;

    info!("pushing {}", branch);
    let credentials = Credentials {
        username: config.owner.clone(),
        password: config.token.clone(),
    };
    vcs.push(&checkout, &repository.clone_url, &branch, &credentials)?;

    let request = NewPullRequest {
        title: pull_request_title(&config.file, &config.version),
        head: branch.clone(),
        base: config.base.clone(),
        body: pull_request_body(&config.file),
        maintainer_can_modify: true,
    };
    let pull_request = hosting.create_pull_request(&config.owner, &config.repo, &request)?;
    info!("opened pull request #{}", pull_request.number);

    Ok(Outcome {
        branch,
        changed_lines,
        pull_request: Some(pull_request),
    })
}

/// The repository's default branch, when it is known and differs from `base`.
fn other_default_branch<'a>(repository: &'a Repository, base: &str) -> Option<&'a str> {
    repository
        .default_branch
        .as_deref()
        .filter(|default| *default != base)
}

/// Opens the formula once to confirm it exists; the handle is closed on
/// return.
fn ensure_formula_exists(path: &Path) -> Result<()> {
    let _file = File::open(path).map_err(|source| Error::FormulaFile {
        action: "open",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
