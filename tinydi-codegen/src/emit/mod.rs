//! Turning descriptors into Rust source.
//!
//! Output is rendered straight from token streams, so equal input always
//! yields byte-identical files.

mod component;
mod factory;

pub use component::ComponentEmitter;
pub use factory::FactoryEmitter;

use proc_macro2::TokenStream;

pub const HEADER: &str = "// @generated by tinydi-codegen. Do not edit.\n";

fn render(tokens: TokenStream) -> String {
    format!("{}{}\n", HEADER, tokens)
}
