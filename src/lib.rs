//! # formula-bump
//!
//! A CI bot that bumps a package formula and proposes the change.
//!
//! Given a version and one or more field/hash pairs, it:
//! - Looks up the formula repository on GitHub and clones it
//! - Checks out a `pr-<version>` branch
//! - Rewrites version lines and hash fields in the formula file
//! - Commits, pushes the branch and opens a pull request against `main`
//!
//! ## Usage
//!
//! ```bash
//! # Single field
//! formula-bump --file Formula/tool.rb --owner me --repo homebrew-tools \
//!     --release 1.3.0 --field sha256 --sha256 cafef00d --token "$TOKEN"
//!
//! # Several fields, as a GitHub Action passes them
//! INPUT_FIELDS='{"intel":"x86_64-aaa","arm":"arm64-bbb"}' formula-bump ...
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line entry point
//! - [`config`] - Inputs and their validation
//! - [`fields`] - Field-to-hash mapping
//! - [`rewrite`] - Formula line rewriting
//! - [`git`] - Git command wrappers
//! - [`github`] - GitHub REST client
//! - [`publisher`] - Clone, rewrite, commit, push, pull request
//! - [`banner`] - Run summary box
//! - [`error`] - Error type

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod fields;
pub mod git;
pub mod github;
pub mod publisher;
pub mod rewrite;

pub use error::{Error, Result};
