use crate::di::{Constructor, Dispatch, Instance, OverrideRegistry, TypeKey};
use crate::error::{Result, TinyDiError};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Resolves object graphs from a generated dispatch table.
///
/// Lookups check the override registry first and otherwise construct the
/// requested type from scratch, recursing through its parameters in declared
/// order. Nothing constructed here is ever cached: sharing an instance between
/// several dependents requires binding it up front.
///
/// Cyclic dispatch tables are not detected and recurse until the stack is
/// exhausted.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tinydi::{Dispatch, Entry, Instance, Resolver, Result, TypeKey};
///
/// struct Settings(&'static str);
/// struct Client(Arc<Settings>);
///
/// enum AppDispatch {}
///
/// fn construct_client(resolver: &Resolver<AppDispatch>) -> Result<Instance> {
///     let p0 = resolver.resolve_as::<Settings>()?;
///     Ok(Arc::new(Client(p0)))
/// }
///
/// impl Dispatch for AppDispatch {
///     const ENTRIES: &'static [Entry<Self>] = &[Entry::new(TypeKey::of::<Client>, construct_client)];
/// }
///
/// let mut resolver = Resolver::<AppDispatch>::new();
/// resolver.bind_value(Settings("prod"));
/// let client = resolver.inject::<Client>().unwrap();
/// assert_eq!(client.0.0, "prod");
/// ```
pub struct Resolver<D> {
    overrides: OverrideRegistry,
    table: HashMap<TypeKey, Constructor<D>>,
    _dispatch: PhantomData<fn() -> D>,
}

impl<D: Dispatch> Resolver<D> {
    pub fn new() -> Self {
        let table = D::ENTRIES
            .iter()
            .map(|entry| ((entry.key)(), entry.construct))
            .collect();
        Self {
            overrides: OverrideRegistry::new(),
            table,
            _dispatch: PhantomData,
        }
    }

    /// Register `instance` as the value for its type, replacing any earlier one.
    pub fn bind<T: Any + Send + Sync>(&mut self, instance: Arc<T>) -> &mut Self {
        let key = TypeKey::of::<T>();
        tracing::debug!("Binding override: {}", key);
        self.overrides.insert(key, instance);
        self
    }

    /// Wrap `value` in an `Arc` and bind it.
    pub fn bind_value<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.bind(Arc::new(value))
    }

    /// Look up or construct an instance for `key`.
    ///
    /// # Errors
    /// Returns [`TinyDiError::MissingBinding`] naming the first type in the
    /// graph that has neither an override nor a generated constructor.
    pub fn resolve(&self, key: &TypeKey) -> Result<Instance> {
        if let Some(instance) = self.overrides.get(key) {
            tracing::trace!("Resolved {} from overrides", key);
            return Ok(instance);
        }

        let construct = self
            .table
            .get(key)
            .ok_or_else(|| TinyDiError::missing_binding(key.name()))?;
        tracing::trace!("Constructing {}", key);
        construct(self)
    }

    /// Resolve `T` and check that the produced instance really is a `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.resolve(&TypeKey::of::<T>())?
            .downcast::<T>()
            .map_err(|_| TinyDiError::downcast_failed(std::any::type_name::<T>()))
    }

    /// Typed entry point for application code.
    pub fn inject<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.resolve_as::<T>()
    }

    pub fn is_bound<T: Any>(&self) -> bool {
        self.overrides.contains(&TypeKey::of::<T>())
    }

    /// Whether the dispatch table can construct `T`.
    pub fn can_construct<T: Any>(&self) -> bool {
        self.table.contains_key(&TypeKey::of::<T>())
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    /// Drop every override bound so far.
    pub fn reset(&mut self) {
        self.overrides.clear();
    }
}

impl<D: Dispatch> Default for Resolver<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> std::fmt::Debug for Resolver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("overrides", &self.overrides)
            .field("constructible", &self.table.len())
            .finish()
    }
}
