//! Collaborator call statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Thread-safe counters shared by every collaborator call of a season
#[derive(Debug, Default)]
pub struct ProviderStats {
    generations: AtomicU64,
    generation_failures: AtomicU64,
    timeouts: AtomicU64,
    tokens_used: AtomicU64,
    judgments: AtomicU64,
    judge_fallbacks: AtomicU64,
    persist_failures: AtomicU64,
}

impl ProviderStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation call
    pub fn record_generation(&self, succeeded: bool, tokens: u32) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.tokens_used.fetch_add(u64::from(tokens), Ordering::Relaxed);
        } else {
            self.generation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a call that hit the per-call timeout
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a judging call; `fallback` when stable order had to be used
    pub fn record_judgment(&self, fallback: bool) {
        self.judgments.fetch_add(1, Ordering::Relaxed);
        if fallback {
            self.judge_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a persistence failure
    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            generations: self.generations.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            tokens_used: self.tokens_used.load(Ordering::Relaxed),
            judgments: self.judgments.load(Ordering::Relaxed),
            judge_fallbacks: self.judge_fallbacks.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`ProviderStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Generation calls made
    pub generations: u64,
    /// Generation calls that failed (timeouts included)
    pub generation_failures: u64,
    /// Calls that hit the timeout
    pub timeouts: u64,
    /// Tokens reported by successful generations
    pub tokens_used: u64,
    /// Judging calls made
    pub judgments: u64,
    /// Judgments resolved by stable-order fallback
    pub judge_fallbacks: u64,
    /// Records that could not be persisted
    pub persist_failures: u64,
}

impl StatsSnapshot {
    /// Share of generations that failed
    pub fn failure_rate(&self) -> f64 {
        if self.generations == 0 {
            return 0.0;
        }
        self.generation_failures as f64 / self.generations as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ProviderStats::new();
        stats.record_generation(true, 120);
        stats.record_generation(false, 0);
        stats.record_timeout();
        stats.record_judgment(true);
        stats.record_judgment(false);

        let snap = stats.snapshot();
        assert_eq!(snap.generations, 2);
        assert_eq!(snap.generation_failures, 1);
        assert_eq!(snap.tokens_used, 120);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.judgments, 2);
        assert_eq!(snap.judge_fallbacks, 1);
        assert!((snap.failure_rate() - 0.5).abs() < f64::EPSILON);
    }
}
