use proc_macro::TokenStream;

mod inject;

/// Marks an associated function as the injectable constructor of its type
///
/// The attribute itself leaves the function untouched; `tinydi-codegen`
/// discovers it from the build script and generates a factory plus a
/// dispatch entry for the owning type. Every parameter is a dependency and
/// must be an `Arc<T>`.
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use tinydi::inject;
///
/// pub struct Repository {
///     net: Arc<NetworkClient>,
/// }
///
/// impl Repository {
///     #[inject]
///     pub fn new(net: Arc<NetworkClient>) -> Self {
///         Self { net }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn inject(attr: TokenStream, item: TokenStream) -> TokenStream {
    inject::inject_attribute(attr, item)
}
