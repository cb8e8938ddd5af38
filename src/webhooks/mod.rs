//! GitHub webhook deliveries.
//!
//! - [`signature`]: HMAC-SHA256 verification of `X-Hub-Signature-256`
//! - [`events`]: parsing deliveries and deciding whether they warrant a run

pub mod events;
pub mod signature;

pub use events::{ParseError, ParsedWebhook, WebhookEvent, parse_webhook};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
