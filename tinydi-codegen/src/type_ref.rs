use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nominal identity of a type: the module it lives in plus its simple name.
///
/// Two `TypeRef`s are equal iff their qualified names are equal. Generic
/// arguments are not representable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    module: String,
    name: String,
}

impl TypeRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Split `a::b::Name` into module `a::b` and name `Name`.
    ///
    /// Returns `None` for an empty string or a single segment without module.
    pub fn parse(qualified: &str) -> Option<Self> {
        let qualified = qualified.trim_start_matches("::");
        let (module, name) = qualified.rsplit_once("::")?;
        if module.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(module, name))
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    /// Whether the type is declared in the crate being generated for.
    pub fn is_local(&self) -> bool {
        self.module == "crate" || self.module.starts_with("crate::")
    }

    /// Absolute path tokens: `crate::a::Name` for local types and `::a::Name`
    /// for everything else.
    pub fn to_tokens(&self) -> TokenStream {
        path_tokens(&self.qualified())
    }

    /// Path of a sibling item in the same module, e.g. the generated factory.
    pub fn sibling(&self, name: &str) -> TokenStream {
        path_tokens(&format!("{}::{}", self.module, name))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// Turn a `::`-separated path into tokens, anchoring non-`crate` paths at the
/// extern prelude.
pub(crate) fn path_tokens(path: &str) -> TokenStream {
    let mut segments = path.trim_start_matches("::").split("::").map(ident);
    match segments.next() {
        Some(first) if first == "crate" => quote!(#first #(:: #segments)*),
        Some(first) => quote!(:: #first #(:: #segments)*),
        None => TokenStream::new(),
    }
}

/// Identifier tokens for a segment that came out of parsed Rust source.
pub(crate) fn ident(segment: &str) -> Ident {
    match segment.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(segment, Span::call_site()),
    }
}
