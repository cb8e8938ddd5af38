//! Selection of the one status check the CI rule cares about.

use crate::types::StatusCheck;

/// Returns the status reported under `context`.
///
/// GitHub lists statuses newest first, so the first match is the latest
/// report. When the context has not reported at all the result is a
/// synthetic `pending` check, which makes the CI rule a no-op.
pub fn resolve_ci_status(statuses: &[StatusCheck], context: &str) -> StatusCheck {
    statuses
        .iter()
        .find(|s| s.context == context)
        .cloned()
        .unwrap_or_else(|| StatusCheck::pending(context))
}
