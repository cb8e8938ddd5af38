//! Review Bot - a GitHub bot that keeps pull requests in line with a
//! project's contribution policy.
//!
//! Each run reconciles every open PR (issue tag, CI status, ready-to-merge)
//! and every merged PR waiting in the post-merge ticketing workflow, using
//! labels as the only state.

pub mod config;
pub mod effects;
pub mod github;
pub mod reconcile;
pub mod rules;
pub mod server;
pub mod types;
pub mod webhooks;
pub mod worker;

#[cfg(test)]
pub mod test_utils;
