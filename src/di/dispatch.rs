use crate::di::{Instance, Resolver, TypeKey};
use crate::error::Result;
use std::marker::PhantomData;

/// Builds one instance of a known type, resolving its parameters through the
/// given resolver.
pub type Constructor<D> = fn(&Resolver<D>) -> Result<Instance>;

/// One row of a generated dispatch table.
pub struct Entry<D> {
    pub key: fn() -> TypeKey,
    pub construct: Constructor<D>,
    _dispatch: PhantomData<fn() -> D>,
}

impl<D> Entry<D> {
    pub const fn new(key: fn() -> TypeKey, construct: Constructor<D>) -> Self {
        Self {
            key,
            construct,
            _dispatch: PhantomData,
        }
    }
}

/// The closed set of constructible types known when the resolver was generated.
///
/// This trait is implemented by the generated component; each entry pairs a
/// type with the function that constructs it from its declared parameters.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tinydi::{Dispatch, Entry, Instance, Resolver, Result, TypeKey};
///
/// struct Clock;
///
/// enum AppDispatch {}
///
/// fn construct_clock(_: &Resolver<AppDispatch>) -> Result<Instance> {
///     Ok(Arc::new(Clock))
/// }
///
/// impl Dispatch for AppDispatch {
///     const ENTRIES: &'static [Entry<Self>] = &[Entry::new(TypeKey::of::<Clock>, construct_clock)];
/// }
///
/// let resolver = Resolver::<AppDispatch>::new();
/// assert!(resolver.inject::<Clock>().is_ok());
/// ```
pub trait Dispatch: Sized + 'static {
    const ENTRIES: &'static [Entry<Self>];
}
