//! # Growth Policy
//!
//! Decides, from an entry's occupancy at `acquire` time, whether the pool
//! grows and by how much.
//!
//! Growth is a doubling: when occupancy is at or below the low-water
//! threshold and no fill is running, as many new instances are scheduled as
//! have ever been created. The total is doubled when the batch is scheduled,
//! not when it completes.

use crate::config::{FillMode, PoolConfig};

/// Occupancy at or below which `acquire` builds an instance in the
/// foreground before dequeuing.
pub const FOREGROUND_TOP_UP_LEVEL: usize = 1;

/// Snapshot of the entry fields the policy reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    /// Instances waiting in the queue.
    pub available: usize,
    /// Low-water threshold.
    pub threshold: usize,
    /// Instances ever created or scheduled.
    pub total_created: usize,
    /// Whether a background fill is still running.
    pub filling: bool,
}

/// What the policy wants done before the dequeue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthPlan {
    /// Size of a new doubling batch, 0 for none.
    pub batch: usize,
    /// Total after scheduling the batch.
    pub new_total: usize,
    /// Whether occupancy is at or below the threshold at all.
    pub triggered: bool,
}

/// Registry-wide growth settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Where batches are built.
    pub fill_mode: FillMode,
    /// Warn on foreground top-ups.
    pub warn_on_top_up: bool,
}

impl GrowthPolicy {
    /// Policy described by a registry config.
    #[must_use]
    pub fn from_config(config: &PoolConfig) -> Self {
        Self {
            fill_mode: config.fill_mode,
            warn_on_top_up: config.display_warnings,
        }
    }

    /// Plans growth for one `acquire`.
    ///
    /// A running fill is never doubled again; it just keeps going.
    #[must_use]
    pub fn plan(&self, occupancy: Occupancy) -> GrowthPlan {
        if occupancy.available > occupancy.threshold {
            return GrowthPlan {
                new_total: occupancy.total_created,
                ..GrowthPlan::default()
            };
        }

        if occupancy.filling {
            return GrowthPlan {
                new_total: occupancy.total_created,
                triggered: true,
                ..GrowthPlan::default()
            };
        }

        let new_total = occupancy.total_created.saturating_mul(2);
        GrowthPlan {
            batch: new_total - occupancy.total_created,
            new_total,
            triggered: true,
        }
    }

    /// Whether the caller would be left without an instance unless one is
    /// built right now.
    #[inline]
    #[must_use]
    pub const fn needs_top_up(available: usize) -> bool {
        available <= FOREGROUND_TOP_UP_LEVEL
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::from_config(&PoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(available: usize, threshold: usize, total_created: usize) -> Occupancy {
        Occupancy {
            available,
            threshold,
            total_created,
            filling: false,
        }
    }

    #[test]
    fn test_above_threshold_holds() {
        let plan = GrowthPolicy::default().plan(occupancy(3, 2, 8));
        assert!(!plan.triggered);
        assert_eq!(plan.batch, 0);
        assert_eq!(plan.new_total, 8);
    }

    #[test]
    fn test_at_threshold_doubles_total() {
        let plan = GrowthPolicy::default().plan(occupancy(2, 2, 8));
        assert!(plan.triggered);
        assert_eq!(plan.batch, 8);
        assert_eq!(plan.new_total, 16);
    }

    #[test]
    fn test_running_fill_is_not_doubled_again() {
        let plan = GrowthPolicy::default().plan(Occupancy {
            filling: true,
            ..occupancy(1, 1, 4)
        });
        assert!(plan.triggered);
        assert_eq!(plan.batch, 0);
        assert_eq!(plan.new_total, 4);
    }

    #[test]
    fn test_doubling_saturates() {
        let plan = GrowthPolicy::default().plan(occupancy(1, 1, usize::MAX - 1));
        assert_eq!(plan.new_total, usize::MAX);
        assert_eq!(plan.batch, 1);
    }

    #[test]
    fn test_top_up_level() {
        assert!(GrowthPolicy::needs_top_up(0));
        assert!(GrowthPolicy::needs_top_up(1));
        assert!(!GrowthPolicy::needs_top_up(2));
    }

    #[test]
    fn test_policy_from_config() {
        let config = PoolConfig::default().with_fill_mode(FillMode::Immediate);
        let policy = GrowthPolicy::from_config(&config);
        assert_eq!(policy.fill_mode, FillMode::Immediate);
        assert!(policy.warn_on_top_up);
    }
}
