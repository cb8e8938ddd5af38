//! Core domain types for the review bot.
//!
//! Identifiers, the label vocabulary and commit statuses. Request and response
//! payloads for GitHub live alongside the effects that produce them.

pub mod ids;
pub mod label;
pub mod status;

pub use ids::{DeliveryId, InvalidRepoId, PrNumber, RepoId, Sha};
pub use label::{Label, LabelNames, LabelSet};
pub use status::{CiState, StatusCheck};
