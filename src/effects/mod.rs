//! Effects-as-data for GitHub operations.
//!
//! The reconcilers never call GitHub directly. They describe each operation
//! as a [`GitHubEffect`] and hand it to a [`GitHubInterpreter`]. This enables:
//! - Testability via an in-memory interpreter
//! - Logging/tracing of intended operations
//! - A single place for error categorisation

pub mod github;
pub mod interpreter;

pub use github::{CommentData, GitHubEffect, GitHubResponse, MergedPrData, PrData};
pub use interpreter::GitHubInterpreter;
