//! # Frame Clock
//!
//! Fixed-rate driver for background fills.
//!
//! The registry never schedules itself. A host that already has a frame
//! loop calls [`PoolRegistry::tick`] once per frame; a host without one can
//! call [`FrameClock::pump`] from wherever it polls.
//!
//! `pump` runs at most one registry tick per call. Frames missed during a
//! host stall are dropped, not replayed: replaying them would build one
//! instance per missed frame inside a single call.

use std::time::{Duration, Instant};

use crate::pool::{PoolRegistry, TickReport};

/// Default frame rate for [`FrameClock::default`].
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Paces registry ticks at a fixed rate.
#[derive(Debug)]
pub struct FrameClock {
    frame_duration: Duration,
    last_poll: Instant,
    /// Time towards the next frame.
    accumulator: Duration,
    progress: FillProgress,
}

/// Fill work done through one clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillProgress {
    /// Registry ticks run.
    pub ticks: u64,
    /// Instances built by those ticks.
    pub built: u64,
    /// Fills completed by those ticks.
    pub finished: u64,
    /// Frames that came due during a stall and were skipped.
    pub dropped_frames: u64,
}

impl FrameClock {
    /// Creates a clock running at `rate_hz` frames per second.
    ///
    /// A rate of 0 is treated as 1.
    #[must_use]
    pub fn new(rate_hz: u32) -> Self {
        Self {
            frame_duration: Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1))),
            last_poll: Instant::now(),
            accumulator: Duration::ZERO,
            progress: FillProgress::default(),
        }
    }

    /// Consumes a due frame, if any. Time beyond one whole frame is
    /// discarded.
    fn take_frame(&mut self) -> bool {
        let now = Instant::now();
        self.accumulator += now.duration_since(self.last_poll);
        self.last_poll = now;

        if self.accumulator < self.frame_duration {
            return false;
        }

        let due = self.accumulator.as_nanos() / self.frame_duration.as_nanos().max(1);
        let dropped = u64::try_from(due.saturating_sub(1)).unwrap_or(u64::MAX);
        self.progress.dropped_frames = self.progress.dropped_frames.saturating_add(dropped);
        self.accumulator = Duration::ZERO;
        true
    }

    /// Runs one registry tick if a frame is due.
    ///
    /// Returns what the tick did, or `None` if no frame was due.
    pub fn pump(&mut self, registry: &mut PoolRegistry) -> Option<TickReport> {
        if !self.take_frame() {
            return None;
        }

        let report = registry.tick();
        self.progress.ticks += 1;
        self.progress.built += u64::try_from(report.built).unwrap_or(u64::MAX);
        self.progress.finished += u64::try_from(report.finished).unwrap_or(u64::MAX);
        Some(report)
    }

    /// Fill work done so far.
    #[must_use]
    pub const fn progress(&self) -> &FillProgress {
        &self.progress
    }

    /// Target frame duration.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorPolicy, PoolConfig};
    use crate::pool::{Factory, Poolable};

    #[derive(Default)]
    struct Mote;

    impl Poolable for Mote {
        fn factory() -> Factory<Self> {
            Factory::default_construct()
        }
    }

    fn registry() -> PoolRegistry {
        PoolRegistry::new(PoolConfig::default().with_error_policy(ErrorPolicy::FailFast))
    }

    #[test]
    fn test_clock_creation() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.progress(), &FillProgress::default());
        assert_eq!(clock.frame_duration(), Duration::from_micros(16666));
        assert_eq!(FrameClock::new(0).frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_no_tick_before_frame_due() {
        let mut pool = registry();
        let mut clock = FrameClock::new(1);
        assert_eq!(clock.pump(&mut pool), None);
        assert_eq!(clock.progress().ticks, 0);
    }

    #[test]
    fn test_pump_drives_fills() {
        let mut pool = registry();
        let mut held = Vec::new();
        held.push(pool.acquire::<Mote>().unwrap().unwrap());
        pool.drain_fills();

        // Doubles 2 -> 4: one built on the spot, one left for the clock.
        held.push(pool.acquire::<Mote>().unwrap().unwrap());
        assert_eq!(pool.stats::<Mote>().unwrap().pending, 1);

        let mut clock = FrameClock::new(1000);
        while pool.is_filling() {
            std::thread::sleep(Duration::from_millis(2));
            let _ = clock.pump(&mut pool);
        }

        let progress = clock.progress();
        assert_eq!(progress.ticks, 2);
        assert_eq!(progress.built, 1);
        assert_eq!(progress.finished, 1);
        assert_eq!(pool.stats::<Mote>().unwrap().pending, 0);
    }

    #[test]
    fn test_stall_runs_one_tick() {
        let mut pool = registry();
        let mut held = Vec::new();
        held.push(pool.acquire::<Mote>().unwrap().unwrap());
        pool.drain_fills();
        held.push(pool.acquire::<Mote>().unwrap().unwrap());
        pool.drain_fills();
        held.push(pool.acquire::<Mote>().unwrap().unwrap());

        // Doubles 4 -> 8: one built on the spot, three pending.
        held.push(pool.acquire::<Mote>().unwrap().unwrap());
        assert_eq!(pool.stats::<Mote>().unwrap().pending, 3);

        let mut clock = FrameClock::new(60);
        std::thread::sleep(Duration::from_millis(100));

        let report = clock.pump(&mut pool).unwrap();
        assert_eq!(report.built, 1);
        assert_eq!(clock.progress().ticks, 1);
        assert!(clock.progress().dropped_frames >= 4);
        assert_eq!(pool.stats::<Mote>().unwrap().pending, 2);

        // The missed frames are gone; the next tick waits for a new frame.
        assert_eq!(clock.pump(&mut pool), None);
        assert_eq!(pool.stats::<Mote>().unwrap().pending, 2);
    }
}
