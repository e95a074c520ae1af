//! # tinydi
//!
//! Build-time dependency injection for Rust.
//!
//! Constructors marked with `#[inject]` are scanned by `tinydi-codegen` from a
//! build script. The generator writes one factory per injectable type and a
//! single component: a [`Resolver`] specialised with a generated [`Dispatch`]
//! table. At runtime the component resolves whole object graphs without any
//! reflection.
//!
//! ## Features
//!
//! - **Generated wiring**: no hand-written factory code, no registration calls
//! - **Overrides**: `bind` supplies instances the generator cannot construct
//!   (platform handles, configuration, shared clients)
//! - **No hidden caching**: every unbound dependency is constructed fresh;
//!   sharing happens only through `bind`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tinydi::inject;
//!
//! pub struct NetworkClient;
//!
//! impl NetworkClient {
//!     #[inject]
//!     pub fn new() -> Self {
//!         Self
//!     }
//! }
//!
//! pub struct Repository {
//!     net: Arc<NetworkClient>,
//! }
//!
//! impl Repository {
//!     #[inject]
//!     pub fn new(net: Arc<NetworkClient>) -> Self {
//!         Self { net }
//!     }
//! }
//!
//! // build.rs runs tinydi_codegen::Builder, then:
//! let component = crate::di::TinyDiComponent::new();
//! let repository = component.inject::<Repository>()?;
//! ```

pub mod di;
pub mod error;

pub use di::{
    Constructor, Dispatch, Entry, Instance, OverrideRegistry, Resolver, TypeKey,
};
pub use error::{Result, TinyDiError};

// Re-export macros
pub use tinydi_macro::inject;

/// Prelude module for convenient imports
///
/// ```
/// use tinydi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::di::{Dispatch, Entry, Instance, Resolver, TypeKey};
    pub use crate::error::{Result, TinyDiError};
    pub use crate::inject;
    pub use std::sync::Arc;
}
