//! A small view model graph wired entirely by generated code.
//!
//! `NetworkClient`, both repositories and `MyViewModel` carry `#[inject]`
//! constructors; `build.rs` turns them into factories and the
//! [`di::TinyDiComponent`]. Only the platform [`Context`] has to be bound by
//! hand.

pub mod di;
pub mod net;
pub mod platform;
pub mod repository;
pub mod view_model;

pub use di::TinyDiComponent;
pub use net::NetworkClient;
pub use platform::Context;
pub use repository::{Repository1, Repository2};
pub use view_model::MyViewModel;
