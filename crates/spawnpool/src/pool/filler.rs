//! # Background Filler
//!
//! Builds a scheduled growth batch one instance per scheduler step.
//!
//! The filler is an explicit state object instead of a thread or future:
//! the host calls [`crate::PoolRegistry::tick`] once per frame and each
//! filling entry advances by exactly one [`BackgroundFiller::step`]. A step
//! after the last build observes completion and returns the entry to idle,
//! so a fill stays visible for one step past its final instance.
//!
//! ```text
//!   start(n) ──► Filling{n} ──step──► Filling{n-1} ─ ... ─► Filling{0} ──step──► Idle
//!                    │                                          ▲
//!                    └──────── claim() (foreground top-up) ─────┘
//! ```

/// Fill progress of one entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillState {
    /// No fill running.
    #[default]
    Idle,
    /// A fill is running with `remaining` instances still to build.
    Filling {
        /// Instances not yet built.
        remaining: usize,
    },
}

/// Outcome of one filler step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillStep {
    /// One instance was built.
    Built,
    /// Nothing was left; the entry is idle again.
    Finished,
    /// No fill was running.
    Idle,
}

/// Resumable fill task for a single entry.
///
/// There is no cancellation: a started fill always runs to completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackgroundFiller {
    state: FillState,
}

impl BackgroundFiller {
    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> FillState {
        self.state
    }

    /// Whether a fill is running.
    #[inline]
    #[must_use]
    pub const fn is_filling(&self) -> bool {
        matches!(self.state, FillState::Filling { .. })
    }

    /// Instances scheduled but not yet built.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> usize {
        match self.state {
            FillState::Idle => 0,
            FillState::Filling { remaining } => remaining,
        }
    }

    /// Starts a fill of `batch` instances.
    ///
    /// At most one fill runs per entry; starting while filling adds nothing.
    pub fn start(&mut self, batch: usize) {
        debug_assert!(!self.is_filling(), "fill already running");
        if !self.is_filling() {
            self.state = FillState::Filling { remaining: batch };
        }
    }

    /// Takes one pending unit for a foreground build.
    ///
    /// Returns `false` when nothing is pending.
    pub fn claim(&mut self) -> bool {
        match &mut self.state {
            FillState::Filling { remaining } if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Advances the fill by one step, calling `build` if an instance is due.
    pub fn step(&mut self, build: impl FnOnce()) -> FillStep {
        match self.state {
            FillState::Idle => FillStep::Idle,
            FillState::Filling { remaining: 0 } => {
                self.state = FillState::Idle;
                FillStep::Finished
            }
            FillState::Filling { remaining } => {
                build();
                self.state = FillState::Filling {
                    remaining: remaining - 1,
                };
                FillStep::Built
            }
        }
    }
}
