use crate::{error::OrmError, resource::Resources};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

///
/// Identity
///
/// Supplies the caller's tenant identifier for multi-account entities.
///

pub trait Identity: Send + Sync {
    fn account_id(&self) -> Result<String, OrmError>;
}

impl<F> Identity for F
where
    F: Fn() -> Result<String, OrmError> + Send + Sync,
{
    fn account_id(&self) -> Result<String, OrmError> {
        self()
    }
}

///
/// Hooks
///
/// Registry of optional hook implementations, keyed by the hook trait.
/// Each entry holds an `Arc<dyn Trait>`; generated code probes with
/// [`Context::hook`] and skips the hook point when nothing is registered.
///

#[derive(Default)]
pub struct Hooks {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for the hook trait `T`, replacing any previous one.
    ///
    /// `T` is the trait object type, e.g.
    /// `hooks.register::<dyn WidgetWithBeforeToORM>(Arc::new(Stamp))`.
    pub fn register<T>(&mut self, hook: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.insert(TypeId::of::<T>(), Box::new(hook));
        self
    }

    /// Remove the hook registered for `T`.
    pub fn unregister<T: ?Sized + 'static>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    #[must_use]
    pub fn get<T: ?Sized + 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Arc<T>>()
            .map(|hook| &**hook)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("registered", &self.entries.len())
            .finish()
    }
}

///
/// Context
///
/// Request-scoped state handed to every generated conversion and
/// operation. Nothing here outlives the request.
///

#[derive(Default)]
pub struct Context {
    hooks: Hooks,
    resources: Resources,
    identity: Option<Arc<dyn Identity>>,
    created: AtomicBool,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: impl Identity + 'static) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub const fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    pub const fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// Hook registered for the trait object type `T`, if any.
    #[must_use]
    pub fn hook<T: ?Sized + 'static>(&self) -> Option<&T> {
        self.hooks.get::<T>()
    }

    /// Tenant identifier of the caller.
    pub fn account_id(&self) -> Result<String, OrmError> {
        self.identity
            .as_ref()
            .ok_or_else(|| OrmError::Identity("no identity in context".to_string()))?
            .account_id()
    }

    /// Mark the request as having created (not updated) its row.
    pub fn set_created(&self) {
        self.created.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        self.created.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("hooks", &self.hooks)
            .field("identity", &self.identity.is_some())
            .field("created", &self.is_created())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
