//! # Template Resolution
//!
//! Prototype-cloned types need a canonical template before their first
//! instance can be built. The registry asks a [`TemplateResolver`] for every
//! template registered under a type key and requires exactly one match.
//!
//! [`TemplateCatalog`] is the in-memory resolver. Asset loaders may register
//! templates from another thread while the pool's thread reads from it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::pool::TypeKey;

/// Shared, type-erased reference to a template.
pub type TemplateHandle = Arc<dyn Any + Send + Sync>;

/// Looks up templates for a type key.
pub trait TemplateResolver {
    /// Every template registered for `key`. Zero or several results are
    /// errors for the caller to report, not for the resolver.
    fn lookup(&self, key: &TypeKey) -> Vec<TemplateHandle>;
}

/// Resolver with no templates at all.
///
/// The default for registries that only pool default-constructed types.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTemplates;

impl TemplateResolver for NoTemplates {
    fn lookup(&self, _key: &TypeKey) -> Vec<TemplateHandle> {
        Vec::new()
    }
}

/// In-memory template store keyed by type.
#[derive(Default)]
pub struct TemplateCatalog {
    templates: RwLock<HashMap<TypeId, Vec<TemplateHandle>>>,
}

impl TemplateCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template for `T`.
    ///
    /// Registering a second template for the same type makes later
    /// resolutions of that type ambiguous.
    pub fn register<T: Any + Send + Sync>(&self, template: T) {
        self.templates
            .write()
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Arc::new(template));
    }

    /// Number of templates registered for `T`.
    #[must_use]
    pub fn template_count<T: Any>(&self) -> usize {
        self.templates
            .read()
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Removes every template registered for `T`.
    pub fn clear<T: Any>(&self) {
        self.templates.write().remove(&TypeId::of::<T>());
    }
}

impl TemplateResolver for TemplateCatalog {
    fn lookup(&self, key: &TypeKey) -> Vec<TemplateHandle> {
        self.templates
            .read()
            .get(&key.id())
            .cloned()
            .unwrap_or_default()
    }
}

impl<R: TemplateResolver + ?Sized> TemplateResolver for Arc<R> {
    fn lookup(&self, key: &TypeKey) -> Vec<TemplateHandle> {
        (**self).lookup(key)
    }
}
