//! Retry policy for the send-until-acknowledged handshakes

use std::time::{Duration, Instant};

/// Bounds on a Ready/Activate handshake
///
/// Both limits `None` retries forever. A deadline is checked between
/// attempts, so a blocking read can overrun it by up to one read timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakePolicy {
    /// Maximum send+read attempts
    pub max_attempts: Option<u32>,
    /// Wall-clock limit for the whole handshake
    pub deadline: Option<Duration>,
}

impl HandshakePolicy {
    /// Default attempt cap
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
    /// Default wall-clock cap
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

    /// Retry until the device answers or a write fails
    pub const fn unbounded() -> Self {
        Self {
            max_attempts: None,
            deadline: None,
        }
    }

    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            deadline: None,
        }
    }

    pub const fn deadline(deadline: Duration) -> Self {
        Self {
            max_attempts: None,
            deadline: Some(deadline),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.deadline.is_none()
    }

    pub(crate) fn start(&self) -> HandshakeBudget {
        HandshakeBudget {
            policy: *self,
            attempts: 0,
            started: Instant::now(),
        }
    }
}

impl Default for HandshakePolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(Self::DEFAULT_MAX_ATTEMPTS),
            deadline: Some(Self::DEFAULT_DEADLINE),
        }
    }
}

/// Attempt counter for one running handshake
#[derive(Debug)]
pub(crate) struct HandshakeBudget {
    policy: HandshakePolicy,
    attempts: u32,
    started: Instant,
}

impl HandshakeBudget {
    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether another attempt is allowed. The first attempt always is.
    pub(crate) fn exhausted(&self) -> bool {
        if self.attempts == 0 {
            return false;
        }
        if let Some(max) = self.policy.max_attempts {
            if self.attempts >= max {
                return true;
            }
        }
        if let Some(deadline) = self.policy.deadline {
            if self.elapsed() >= deadline {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_cap() {
        let mut budget = HandshakePolicy::attempts(3).start();
        assert!(!budget.exhausted());
        budget.record_attempt();
        budget.record_attempt();
        assert!(!budget.exhausted());
        budget.record_attempt();
        assert!(budget.exhausted());
        assert_eq!(budget.attempts(), 3);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let mut budget = HandshakePolicy::attempts(0).start();
        assert!(!budget.exhausted());
        budget.record_attempt();
        assert!(budget.exhausted());
    }

    #[test]
    fn test_deadline() {
        let mut budget = HandshakePolicy::deadline(Duration::ZERO).start();
        assert!(!budget.exhausted());
        budget.record_attempt();
        assert!(budget.exhausted());
    }

    #[test]
    fn test_unbounded_never_exhausts() {
        let policy = HandshakePolicy::unbounded();
        assert!(policy.is_unbounded());
        let mut budget = policy.start();
        for _ in 0..10_000 {
            budget.record_attempt();
        }
        assert!(!budget.exhausted());
    }

    #[test]
    fn test_default_is_bounded() {
        let policy = HandshakePolicy::default();
        assert_eq!(policy.max_attempts, Some(50));
        assert_eq!(policy.deadline, Some(Duration::from_secs(5)));
        assert!(!policy.is_unbounded());
    }
}
