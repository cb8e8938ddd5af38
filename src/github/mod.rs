//! GitHub API client and effect interpreter.
//!
//! This module provides the implementation for executing GitHub effects via the octocrab
//! library. It implements the `GitHubInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - Distinguishes transient vs permanent errors
//! - GraphQL for the merged-PRs-by-label query

mod client;
mod error;
mod interpreter;

pub use client::{MergeMethod, OctocrabClient, UnknownMergeMethod};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
