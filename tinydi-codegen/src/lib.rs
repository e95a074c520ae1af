//! # tinydi-codegen
//!
//! Build-time generator for `tinydi`.
//!
//! Scans a crate's sources for constructors marked `#[inject]`, writes one
//! factory per injectable type and aggregates every injectable into a single
//! component type over `tinydi::Resolver`.
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> anyhow::Result<()> {
//!     tinydi_codegen::Builder::new()
//!         .emit_rerun_if_changed(true)
//!         .generate()?;
//!     Ok(())
//! }
//! ```
//!
//! The generated files are then included where they belong:
//!
//! ```rust,ignore
//! // src/net.rs
//! include!(concat!(env!("OUT_DIR"), "/net/network_client_factory.rs"));
//!
//! // src/di.rs
//! include!(concat!(env!("OUT_DIR"), "/di/tiny_di_component.rs"));
//! ```

pub mod builder;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod graph;
pub mod processor;
pub mod scanner;
pub mod sink;
pub mod symbol;
pub mod type_ref;

pub use builder::{Builder, run};
pub use config::GeneratorConfig;
pub use descriptor::InjectDescriptor;
pub use emit::{ComponentEmitter, FactoryEmitter, HEADER};
pub use error::{CodegenError, Diagnostic, DiagnosticKind, Diagnostics, Result};
pub use graph::DependencyGraph;
pub use processor::{GenerationReport, Processor, RoundOutcome};
pub use scanner::{ScanOutcome, Scanner};
pub use sink::{
    Artifact, ArtifactKind, CodeSink, Dependencies, FsSink, Manifest, ManifestEntry, MemorySink,
};
pub use symbol::{SourceFile, SourceSymbolTable, SymbolTable};
pub use type_ref::TypeRef;
