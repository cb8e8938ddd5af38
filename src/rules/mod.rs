//! Pure classifiers over PR text and status data.
//!
//! Nothing in this module talks to GitHub. The reconcilers feed it the data
//! they fetched and act on the answers.

pub mod application_code;
pub mod ci_status;
pub mod issue_tag;

pub use application_code::{ApplicationCode, application_text, find_application_code};
pub use ci_status::resolve_ci_status;
pub use issue_tag::contains_issue_tag;
