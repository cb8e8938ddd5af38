//! Polling schedule.
//!
//! Webhooks give quick reactions, but some changes never produce one the bot
//! subscribes to (a contributor registering for the event and editing the PR
//! description days after the merge, a missed delivery during downtime). The
//! worker therefore also reconciles on a timer.
//!
//! - **Poll interval**: 10 minutes by default (`REVIEW_BOT_POLL_INTERVAL_MINS`)
//! - **Jitter**: up to 20% added, derived from the repository so it is stable
//!   across restarts

use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::types::RepoId;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

const DEFAULT_JITTER_PERCENT: u8 = 20;

/// Configuration for the reconciliation timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between the end of one run and the next timed run.
    pub poll_interval: Duration,

    /// Jitter percentage added to the poll interval (0-100).
    pub jitter_percent: u8,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    pub fn new() -> Self {
        PollConfig {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            jitter_percent: DEFAULT_JITTER_PERCENT,
        }
    }

    /// Returns the poll interval with jitter added for `repo`.
    ///
    /// `interval * (1 + (hash(repo) % jitter_percent) / 100)`
    pub fn poll_interval_with_jitter(&self, repo: &RepoId) -> Duration {
        if self.jitter_percent == 0 {
            return self.poll_interval;
        }
        let mut hasher = std::hash::DefaultHasher::new();
        repo.hash(&mut hasher);
        let jitter = (hasher.finish() % self.jitter_percent as u64) as f64 / 100.0;
        self.poll_interval.mul_f64(1.0 + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PollConfig::new();
        assert_eq!(config.poll_interval, Duration::from_secs(600));
        assert_eq!(config.jitter_percent, 20);
    }

    #[test]
    fn jitter_is_deterministic_and_bounded() {
        let config = PollConfig::new();
        let repo = RepoId::new("reactbkk", "2.0.0");

        let first = config.poll_interval_with_jitter(&repo);
        assert_eq!(first, config.poll_interval_with_jitter(&repo));
        assert!(first >= config.poll_interval);
        assert!(first <= config.poll_interval.mul_f64(1.2));
    }

    #[test]
    fn zero_jitter_returns_exact_interval() {
        let config = PollConfig {
            jitter_percent: 0,
            ..PollConfig::new()
        };
        let repo = RepoId::new("reactbkk", "2.0.0");
        assert_eq!(config.poll_interval_with_jitter(&repo), config.poll_interval);
    }
}
