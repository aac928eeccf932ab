//! # Pool Registry
//!
//! Owns one entry per pooled type and routes every call to it.
//!
//! The registry is an ordinary value: create one at startup, hand it (or a
//! reference to it) to the systems that spawn objects, and call
//! [`PoolRegistry::tick`] once per frame so background fills make progress.
//! Nothing here is global.
//!
//! ## Ownership contract
//!
//! `release` does not check where an instance came from. Releasing an
//! instance twice, or one that was never acquired, puts it in the queue
//! anyway and breaks the accounting in [`EntryStats`]. Callers must return
//! exactly what they were given.

use std::collections::HashMap;

use tracing::{debug, error};

use crate::config::{ErrorPolicy, PoolConfig};
use crate::error::{PoolError, PoolResult};
use crate::template::{NoTemplates, TemplateResolver};

use super::entry::{EntryStats, ErasedEntry, PoolEntry};
use super::factory::{Poolable, Producer};
use super::filler::FillStep;
use super::growth::GrowthPolicy;
use super::key::TypeKey;

/// What one scheduler step did across all entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Instances built this step.
    pub built: usize,
    /// Fills that completed this step.
    pub finished: usize,
}

/// The object pool.
///
/// # Example
///
/// ```rust
/// use spawnpool::{Factory, PoolConfig, PoolRegistry, Poolable};
///
/// #[derive(Default)]
/// struct Bullet {
///     damage: u32,
/// }
///
/// impl Poolable for Bullet {
///     fn factory() -> Factory<Self> {
///         Factory::default_construct()
///     }
/// }
///
/// let mut pool = PoolRegistry::new(PoolConfig::default());
/// let bullet = pool.acquire::<Bullet>().unwrap().unwrap();
/// pool.tick();
/// pool.release(bullet).unwrap();
/// assert_eq!(pool.instance_count::<Bullet>().unwrap(), Some(2));
/// ```
pub struct PoolRegistry {
    config: PoolConfig,
    policy: GrowthPolicy,
    resolver: Box<dyn TemplateResolver>,
    entries: HashMap<TypeKey, Box<dyn ErasedEntry>>,
}

impl PoolRegistry {
    /// Creates a registry that can only pool default-constructed types.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self::with_resolver(config, NoTemplates)
    }

    /// Creates a registry that resolves prototype templates through `resolver`.
    #[must_use]
    pub fn with_resolver(config: PoolConfig, resolver: impl TemplateResolver + 'static) -> Self {
        Self {
            policy: GrowthPolicy::from_config(&config),
            config,
            resolver: Box::new(resolver),
            entries: HashMap::new(),
        }
    }

    /// The configuration this registry was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of pooled types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type has been acquired yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes one instance of `T` out of the pool.
    ///
    /// The first call for a type creates its entry, seeded with one instance.
    /// When occupancy is at or below the threshold the pool grows first, and
    /// if the queue is nearly empty one instance is built on the spot, so the
    /// call never runs dry.
    ///
    /// # Errors
    ///
    /// [`PoolError::TemplateNotFound`] or [`PoolError::AmbiguousTemplate`]
    /// for a prototype type whose template cannot be resolved. Under
    /// [`ErrorPolicy::LogAndDegrade`] these are logged and `Ok(None)` is
    /// returned instead.
    pub fn acquire<T: Poolable>(&mut self) -> PoolResult<Option<T>> {
        let result = self.acquire_instance::<T>();
        self.apply_policy(result)
    }

    /// Returns an instance to its type's queue.
    ///
    /// # Errors
    ///
    /// [`PoolError::UnknownType`] if `T` was never acquired. Under
    /// [`ErrorPolicy::LogAndDegrade`] the error is logged and the instance
    /// dropped.
    pub fn release<T: Poolable>(&mut self, instance: T) -> PoolResult<()> {
        let result = self.entry_mut::<T>().map(|entry| entry.release(instance));
        self.apply_policy(result).map(drop)
    }

    /// Sets the low-water threshold for `T`.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidThreshold`] if `threshold < 1`, checked first;
    /// [`PoolError::UnknownType`] if `T` was never acquired. The previous
    /// threshold is left in place on failure.
    pub fn configure_threshold<T: Poolable>(&mut self, threshold: i64) -> PoolResult<()> {
        let result = Self::validate_threshold::<T>(threshold)
            .and_then(|threshold| self.entry_mut::<T>().map(|e| e.set_threshold(threshold)));
        self.apply_policy(result).map(drop)
    }

    /// Current low-water threshold for `T`.
    ///
    /// # Errors
    ///
    /// [`PoolError::UnknownType`] if `T` was never acquired (`Ok(None)` when
    /// degrading).
    pub fn threshold_of<T: Poolable>(&self) -> PoolResult<Option<usize>> {
        let result = self.erased::<T>().map(|entry| entry.stats().threshold);
        self.apply_policy(result)
    }

    /// Instances of `T` ever created, including scheduled ones not yet built.
    ///
    /// # Errors
    ///
    /// [`PoolError::UnknownType`] if `T` was never acquired (`Ok(None)` when
    /// degrading).
    pub fn instance_count<T: Poolable>(&self) -> PoolResult<Option<usize>> {
        let result = self.erased::<T>().map(|entry| entry.stats().total_created);
        self.apply_policy(result)
    }

    /// Snapshot of `T`'s entry, or `None` if `T` was never acquired.
    #[must_use]
    pub fn stats<T: Poolable>(&self) -> Option<EntryStats> {
        self.entries.get(&TypeKey::of::<T>()).map(|entry| entry.stats())
    }

    /// The template `T`'s instances are cloned from, for prototype types.
    #[must_use]
    pub fn prototype<T: Poolable>(&self) -> Option<&T> {
        self.entries
            .get(&TypeKey::of::<T>())?
            .as_any()
            .downcast_ref::<PoolEntry<T>>()?
            .prototype()
    }

    /// Whether any background fill is still running.
    #[must_use]
    pub fn is_filling(&self) -> bool {
        self.entries.values().any(|entry| entry.stats().filling)
    }

    /// Runs one scheduler step: every filling entry advances by one instance.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        for entry in self.entries.values_mut() {
            match entry.advance_fill() {
                FillStep::Built => report.built += 1,
                FillStep::Finished => report.finished += 1,
                FillStep::Idle => {}
            }
        }
        report
    }

    /// Ticks until no fill is running. Returns the number of ticks taken.
    pub fn drain_fills(&mut self) -> usize {
        let mut ticks = 0;
        while self.is_filling() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn acquire_instance<T: Poolable>(&mut self) -> PoolResult<T> {
        let key = TypeKey::of::<T>();
        if !self.entries.contains_key(&key) {
            let producer = Producer::<T>::resolve(&key, self.resolver.as_ref())?;
            let threshold = self.config.threshold_for(key.name());
            debug!(pool = key.name(), threshold, "creating pool entry");
            self.entries
                .insert(key, Box::new(PoolEntry::seeded(key, producer, threshold)));
        }

        let policy = self.policy;
        Ok(self.entry_mut::<T>()?.acquire(&policy))
    }

    fn validate_threshold<T: Poolable>(threshold: i64) -> PoolResult<usize> {
        usize::try_from(threshold)
            .ok()
            .filter(|&t| t >= 1)
            .ok_or(PoolError::InvalidThreshold {
                type_name: T::pool_name(),
                requested: threshold,
            })
    }

    fn erased<T: Poolable>(&self) -> PoolResult<&dyn ErasedEntry> {
        self.entries
            .get(&TypeKey::of::<T>())
            .map(|entry| &**entry)
            .ok_or(PoolError::UnknownType {
                type_name: T::pool_name(),
            })
    }

    fn entry_mut<T: Poolable>(&mut self) -> PoolResult<&mut PoolEntry<T>> {
        self.entries
            .get_mut(&TypeKey::of::<T>())
            .and_then(|entry| entry.as_any_mut().downcast_mut::<PoolEntry<T>>())
            .ok_or(PoolError::UnknownType {
                type_name: T::pool_name(),
            })
    }

    fn apply_policy<R>(&self, result: PoolResult<R>) -> PoolResult<Option<R>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.config.error_policy {
                ErrorPolicy::FailFast => Err(err),
                ErrorPolicy::LogAndDegrade => {
                    error!(error = %err, "object pool error");
                    Ok(None)
                }
            },
        }
    }
}
