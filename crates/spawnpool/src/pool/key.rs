//! # Type Keys
//!
//! Stable identity for each pooled type.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::factory::Poolable;

/// Identifier selecting exactly one pool entry.
///
/// Equality and hashing use the [`TypeId`] only. The name travels along
/// for logs, errors and config lookups.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for a pooled type.
    #[inline]
    #[must_use]
    pub fn of<T: Poolable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::pool_name(),
        }
    }

    /// The underlying type id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Display name, as given by [`Poolable::pool_name`].
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
