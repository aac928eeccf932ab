//! # SPAWNPOOL
//!
//! Type-keyed object pool for frame-driven hosts.
//!
//! - One queue of ready instances per pooled type
//! - Doubling growth when occupancy reaches a low-water threshold
//! - Growth spread over frames, one instance per tick, so spawning
//!   never stalls on a bulk construction
//! - Default-constructed or prototype-cloned instances
//!
//! ## Architecture Rules
//!
//! 1. **Never run dry** - `acquire` builds in the foreground rather than fail
//! 2. **Never destroy** - released instances are recycled, not dropped
//! 3. **No globals** - the registry is a value the host owns
//!
//! ## Example
//!
//! ```rust,ignore
//! use spawnpool::{FrameClock, PoolConfig, PoolRegistry};
//!
//! let mut pool = PoolRegistry::new(PoolConfig::from_toml_file("pool.toml")?);
//! let mut clock = FrameClock::new(60);
//!
//! loop {
//!     let bullet = pool.acquire::<Bullet>()?;
//!     // ...
//!     let _ = clock.pump(&mut pool);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod error;
pub mod pool;
pub mod template;

pub use clock::{FillProgress, FrameClock};
pub use config::{ErrorPolicy, FillMode, PoolConfig, DEFAULT_THRESHOLD};
pub use error::{PoolError, PoolResult};
pub use pool::{
    EntryStats, Factory, FillState, FillStep, GrowthPolicy, PoolRegistry, Poolable, TickReport,
    TypeKey,
};
pub use template::{NoTemplates, TemplateCatalog, TemplateHandle, TemplateResolver};
