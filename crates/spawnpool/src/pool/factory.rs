//! # Factories
//!
//! How a pooled type produces new instances.
//!
//! A type picks its strategy once, through [`Poolable::factory`]. Plain value
//! types are default-constructed. Prototype types are cloned from a single
//! template found by the registry's [`TemplateResolver`]; the template itself
//! is never handed out.

use std::fmt;

use crate::error::{PoolError, PoolResult};
use crate::template::TemplateResolver;

use super::key::TypeKey;

/// A type the registry can pool.
///
/// # Example
///
/// ```rust
/// use spawnpool::{Factory, Poolable};
///
/// #[derive(Default)]
/// struct Particle {
///     life: f32,
/// }
///
/// impl Poolable for Particle {
///     fn factory() -> Factory<Self> {
///         Factory::default_construct()
///     }
/// }
/// ```
pub trait Poolable: Sized + 'static {
    /// Construction strategy. Read once, when the type's entry is created.
    fn factory() -> Factory<Self>;

    /// Name used in logs, errors and per-type config overrides.
    #[must_use]
    fn pool_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Construction strategy for a pooled type.
pub enum Factory<T> {
    /// Build each instance with a zero-argument constructor.
    DefaultConstruct(fn() -> T),
    /// Clone each instance from the resolved template.
    PrototypeClone(fn(&T) -> T),
}

impl<T> Factory<T> {
    /// Whether this strategy needs a template before it can produce anything.
    #[inline]
    #[must_use]
    pub const fn needs_template(&self) -> bool {
        matches!(self, Self::PrototypeClone(_))
    }
}

impl<T: Default> Factory<T> {
    /// Default-construct via [`Default::default`].
    #[must_use]
    pub fn default_construct() -> Self {
        Self::DefaultConstruct(T::default)
    }
}

impl<T: Clone> Factory<T> {
    /// Clone from the template via [`Clone::clone`].
    #[must_use]
    pub fn prototype_clone() -> Self {
        Self::PrototypeClone(T::clone)
    }
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Factory<T> {}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultConstruct(_) => f.write_str("DefaultConstruct"),
            Self::PrototypeClone(_) => f.write_str("PrototypeClone"),
        }
    }
}

/// A factory with its template, if any, already resolved.
///
/// Producing an instance from a `Producer` cannot fail.
pub(crate) enum Producer<T> {
    Construct(fn() -> T),
    Cloned { prototype: T, cloner: fn(&T) -> T },
}

impl<T: Poolable> Producer<T> {
    /// Resolves `T`'s factory.
    ///
    /// Prototype types require exactly one template of type `T`; handles of
    /// any other type are ignored. The prototype is a clone of that template,
    /// owned by the producer.
    pub(crate) fn resolve(key: &TypeKey, resolver: &dyn TemplateResolver) -> PoolResult<Self> {
        match T::factory() {
            Factory::DefaultConstruct(construct) => Ok(Self::Construct(construct)),
            Factory::PrototypeClone(cloner) => {
                let handles = resolver.lookup(key);
                let mut matches = handles
                    .iter()
                    .filter_map(|handle| (**handle).downcast_ref::<T>());

                let Some(template) = matches.next() else {
                    return Err(PoolError::TemplateNotFound {
                        type_name: key.name(),
                    });
                };

                let extra = matches.count();
                if extra > 0 {
                    return Err(PoolError::AmbiguousTemplate {
                        type_name: key.name(),
                        found: extra + 1,
                    });
                }

                Ok(Self::Cloned {
                    prototype: cloner(template),
                    cloner,
                })
            }
        }
    }
}

impl<T> Producer<T> {
    /// Builds one instance.
    #[inline]
    pub(crate) fn produce(&self) -> T {
        match self {
            Self::Construct(construct) => construct(),
            Self::Cloned { prototype, cloner } => cloner(prototype),
        }
    }

    /// The template instances are cloned from.
    pub(crate) fn prototype(&self) -> Option<&T> {
        match self {
            Self::Construct(_) => None,
            Self::Cloned { prototype, .. } => Some(prototype),
        }
    }
}
