//! # Pool Entries
//!
//! Per-type state: the queue of ready instances, the low-water threshold,
//! the running total of instances ever created, and fill progress.
//!
//! ## Accounting
//!
//! `available + checked_out + pending == total_created` holds after every
//! operation. The checked-out count is never stored; it falls out of the
//! other three.

use std::any::Any;
use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::FillMode;

use super::factory::{Poolable, Producer};
use super::filler::{BackgroundFiller, FillStep};
use super::growth::{GrowthPolicy, Occupancy};
use super::key::TypeKey;

/// Read-only snapshot of one entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryStats {
    /// Instances waiting in the queue.
    pub available: usize,
    /// Instances ever created, including scheduled ones not yet built.
    pub total_created: usize,
    /// Low-water threshold.
    pub threshold: usize,
    /// Scheduled instances not yet built.
    pub pending: usize,
    /// Whether a background fill is running.
    pub filling: bool,
}

impl EntryStats {
    /// Instances currently held by callers.
    #[inline]
    #[must_use]
    pub const fn checked_out(&self) -> usize {
        self.total_created
            .saturating_sub(self.available)
            .saturating_sub(self.pending)
    }
}

/// Pool state for a single type.
pub(crate) struct PoolEntry<T> {
    key: TypeKey,
    available: VecDeque<T>,
    total_created: usize,
    threshold: usize,
    filler: BackgroundFiller,
    producer: Producer<T>,
}

impl<T: Poolable> PoolEntry<T> {
    /// Creates an entry seeded with exactly one instance.
    pub(crate) fn seeded(key: TypeKey, producer: Producer<T>, threshold: usize) -> Self {
        let mut available = VecDeque::new();
        available.push_back(producer.produce());

        Self {
            key,
            available,
            total_created: 1,
            threshold,
            filler: BackgroundFiller::default(),
            producer,
        }
    }

    /// Hands out one instance, growing first if occupancy is low.
    pub(crate) fn acquire(&mut self, policy: &GrowthPolicy) -> T {
        let plan = policy.plan(self.occupancy());

        if plan.batch > 0 {
            self.total_created = plan.new_total;
            debug!(
                pool = self.key.name(),
                batch = plan.batch,
                total = plan.new_total,
                "scheduling pool growth"
            );
            match policy.fill_mode {
                FillMode::Amortized => {
                    self.filler.start(plan.batch);
                    self.advance_fill();
                }
                FillMode::Immediate => {
                    for _ in 0..plan.batch {
                        self.build_one();
                    }
                }
            }
        }

        if plan.triggered && GrowthPolicy::needs_top_up(self.available.len()) {
            if policy.warn_on_top_up {
                warn!(
                    pool = self.key.name(),
                    available = self.available.len(),
                    "pool nearly exhausted, building instance in foreground"
                );
            }
            self.top_up();
        }

        match self.available.pop_front() {
            Some(instance) => instance,
            None => {
                self.total_created = self.total_created.saturating_add(1);
                self.producer.produce()
            }
        }
    }

    /// Puts an instance back at the end of the queue.
    pub(crate) fn release(&mut self, instance: T) {
        self.available.push_back(instance);
    }

    pub(crate) fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    pub(crate) fn prototype(&self) -> Option<&T> {
        self.producer.prototype()
    }

    /// Builds one instance outside the fill schedule.
    ///
    /// Takes a pending unit when the fill has one left, otherwise the
    /// instance is new and counts toward the total.
    fn top_up(&mut self) {
        if !self.filler.claim() {
            self.total_created = self.total_created.saturating_add(1);
        }
        self.build_one();
    }

    fn build_one(&mut self) {
        self.available.push_back(self.producer.produce());
    }

    fn occupancy(&self) -> Occupancy {
        Occupancy {
            available: self.available.len(),
            threshold: self.threshold,
            total_created: self.total_created,
            filling: self.filler.is_filling(),
        }
    }
}

/// Type-erased view of an entry, so the registry can store every type in
/// one map and drive fills without knowing `T`.
pub(crate) trait ErasedEntry {
    fn advance_fill(&mut self) -> FillStep;
    fn stats(&self) -> EntryStats;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Poolable> ErasedEntry for PoolEntry<T> {
    fn advance_fill(&mut self) -> FillStep {
        let available = &mut self.available;
        let producer = &self.producer;
        let step = self.filler.step(|| available.push_back(producer.produce()));

        if step == FillStep::Finished {
            debug!(
                pool = self.key.name(),
                total = self.total_created,
                "pool fill complete"
            );
        }
        step
    }

    fn stats(&self) -> EntryStats {
        EntryStats {
            available: self.available.len(),
            total_created: self.total_created,
            threshold: self.threshold,
            pending: self.filler.pending(),
            filling: self.filler.is_filling(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::factory::Factory;
    use crate::template::NoTemplates;

    #[derive(Debug, Default, PartialEq)]
    struct Shell {
        id: u32,
    }

    impl Poolable for Shell {
        fn factory() -> Factory<Self> {
            Factory::default_construct()
        }
    }

    fn entry(threshold: usize) -> PoolEntry<Shell> {
        let key = TypeKey::of::<Shell>();
        let producer = Producer::resolve(&key, &NoTemplates).unwrap();
        PoolEntry::seeded(key, producer, threshold)
    }

    fn assert_balanced(entry: &PoolEntry<Shell>, checked_out: usize) {
        let stats = entry.stats();
        assert_eq!(
            stats.available + checked_out + stats.pending,
            stats.total_created,
            "{stats:?}"
        );
        assert_eq!(stats.checked_out(), checked_out);
    }

    #[test]
    fn test_seeded_with_one_instance() {
        let entry = entry(1);
        let stats = entry.stats();
        assert_eq!(stats.available, 1);
        assert_eq!(stats.total_created, 1);
        assert_eq!(stats.threshold, 1);
        assert!(!stats.filling);
    }

    #[test]
    fn test_first_acquire_starts_fill_and_builds_once() {
        let mut entry = entry(1);
        let shell = entry.acquire(&GrowthPolicy::default());
        assert_eq!(shell, Shell::default());
        assert_eq!(shell.id, 0);

        let stats = entry.stats();
        assert_eq!(stats.total_created, 2);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.pending, 0);
        assert!(stats.filling);
        assert_balanced(&entry, 1);

        assert_eq!(entry.advance_fill(), FillStep::Finished);
        assert!(!entry.stats().filling);
    }

    #[test]
    fn test_amortized_fill_one_per_step() {
        let policy = GrowthPolicy::default();
        let mut entry = entry(1);
        let mut held = vec![entry.acquire(&policy)];
        entry.advance_fill();

        // Second acquire doubles 2 -> 4; one built now, one pending.
        held.push(entry.acquire(&policy));
        assert_eq!(entry.stats().total_created, 4);
        assert_eq!(entry.stats().pending, 1);
        assert_balanced(&entry, held.len());

        assert_eq!(entry.advance_fill(), FillStep::Built);
        assert_eq!(entry.stats().available, 2);
        assert_eq!(entry.advance_fill(), FillStep::Finished);
        assert_eq!(entry.advance_fill(), FillStep::Idle);
        assert_balanced(&entry, held.len());
    }

    #[test]
    fn test_immediate_mode_builds_whole_batch() {
        let policy = GrowthPolicy {
            fill_mode: FillMode::Immediate,
            warn_on_top_up: false,
        };
        let mut entry = entry(1);
        let mut held = Vec::new();
        for _ in 0..4 {
            held.push(entry.acquire(&policy));
            assert!(!entry.stats().filling);
            assert_balanced(&entry, held.len());
        }
        assert_eq!(entry.stats().total_created, 8);
        assert_eq!(entry.stats().available, 4);
    }

    #[test]
    fn test_top_up_without_steps_counts_every_build() {
        let policy = GrowthPolicy::default();
        let mut entry = entry(1);
        let mut held = Vec::new();
        for _ in 0..20 {
            held.push(entry.acquire(&policy));
            assert_balanced(&entry, held.len());
        }
        assert_eq!(entry.stats().total_created, 21);
        assert_eq!(entry.stats().available, 1);
    }

    #[test]
    fn test_release_reuses_instance() {
        let policy = GrowthPolicy::default();
        let mut entry = entry(1);
        let shell = entry.acquire(&policy);
        entry.advance_fill();

        entry.release(shell);
        let _again = entry.acquire(&policy);
        assert_eq!(entry.stats().total_created, 2);
        assert!(!entry.stats().filling);
        assert_balanced(&entry, 1);
    }
}
