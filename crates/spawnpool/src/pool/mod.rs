//! # Object Pool
//!
//! Type-keyed recycling of pre-built instances.
//!
//! ## Design Philosophy
//!
//! Instances are built ahead of demand and recycled forever. During play:
//! - `acquire` pops from a queue and never fails for want of an instance
//! - growth doubles the supply, spread over scheduler ticks
//! - nothing is ever destroyed by the pool

mod entry;
mod factory;
mod filler;
mod growth;
mod key;
mod registry;

pub use entry::EntryStats;
pub use factory::{Factory, Poolable};
pub use filler::{BackgroundFiller, FillState, FillStep};
pub use growth::{GrowthPlan, GrowthPolicy, Occupancy, FOREGROUND_TOP_UP_LEVEL};
pub use key::TypeKey;
pub use registry::{PoolRegistry, TickReport};
