use crate::config::{ENV_VARS, GeneratorConfig};
use crate::error::{CodegenError, Result};
use crate::processor::{GenerationReport, Processor};
use crate::sink::{CodeSink, FsSink};
use crate::symbol::{SourceFile, SourceSymbolTable};
use std::env;
use std::path::PathBuf;

/// Entry point for a host `build.rs`.
///
/// # Example
/// ```no_run
/// fn main() {
///     tinydi_codegen::Builder::new()
///         .emit_rerun_if_changed(true)
///         .generate()
///         .unwrap();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    config: GeneratorConfig,
    source_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    rerun_if_changed: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            source_dir: None,
            out_dir: None,
            rerun_if_changed: false,
        }
    }

    /// Builder whose configuration is read from `TINYDI_*` variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new().config(GeneratorConfig::from_env()?))
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory scanned for injectables. Defaults to `$CARGO_MANIFEST_DIR/src`.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Directory receiving artifacts. Defaults to `$OUT_DIR`.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Print `cargo:rerun-if-changed` for the source directory.
    pub fn emit_rerun_if_changed(mut self, emit: bool) -> Self {
        self.rerun_if_changed = emit;
        self
    }

    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        let source_dir = match self.source_dir {
            Some(dir) => dir,
            None => env::var_os("CARGO_MANIFEST_DIR")
                .map(|dir| PathBuf::from(dir).join("src"))
                .ok_or_else(|| CodegenError::config("CARGO_MANIFEST_DIR is not set and no source_dir was given"))?,
        };
        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or_else(|| CodegenError::config("OUT_DIR is not set and no out_dir was given"))?,
        };

        let mut table = SourceSymbolTable::new(&self.config.marker);
        let files = table.add_dir(&source_dir)?;
        tracing::info!("Scanning {} files below {}", files, source_dir.display());

        let mut sink = FsSink::new(&out_dir)?;
        let report = run(self.config, &mut table, &mut sink)?;
        let (written, unchanged) = (sink.written(), sink.unchanged());
        let manifest = sink.finish()?;
        tracing::info!(
            "{} artifacts in {} ({} written, {} unchanged)",
            manifest.artifacts.len(),
            out_dir.display(),
            written,
            unchanged
        );

        if self.rerun_if_changed {
            println!("cargo:rerun-if-changed={}", source_dir.display());
            for var in ENV_VARS {
                println!("cargo:rerun-if-env-changed={}", var);
            }
        }
        Ok(report)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive rounds over `table` until nothing is deferred, a round makes no
/// progress, or `max_rounds` is reached, then emit the component.
///
/// Factories emitted by a round are added to `table` before the next one, so
/// declarations that mention generated types resolve later.
pub fn run(
    config: GeneratorConfig,
    table: &mut SourceSymbolTable,
    sink: &mut dyn CodeSink,
) -> Result<GenerationReport> {
    let max_rounds = config.max_rounds;
    let mut processor = Processor::new(config);
    loop {
        let round = processor.process(table, sink)?;
        if round.deferred.is_empty() || !round.progressed() || processor.rounds() >= max_rounds {
            break;
        }
        for artifact in &round.emitted {
            table.add_source(&SourceFile::new(
                artifact.relative_path(),
                artifact.namespace.as_str(),
                artifact.content.as_str(),
            ))?;
        }
    }
    processor.finish(sink)
}
