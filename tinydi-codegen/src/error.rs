use crate::symbol::Location;
use std::fmt;
use std::path::PathBuf;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodegenError>;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Invalid injectable declarations:\n{0}")]
    Validation(Diagnostics),

    #[error("Unresolved symbols after {rounds} rounds: {symbols}")]
    UnresolvedSymbols { rounds: usize, symbols: String },

    #[error("Dependency cycle detected: {cycle}")]
    Cycle { cycle: String },

    #[error("Artifacts {first} and {second} both map to {}", .path.display())]
    ArtifactClash {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("Failed to parse {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CodegenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum DiagnosticKind {
    #[strum(serialize = "not a constructor")]
    NotAConstructor,
    #[strum(serialize = "generic owner")]
    GenericOwner,
    #[strum(serialize = "unsupported parameter")]
    UnsupportedParameter,
    #[strum(serialize = "duplicate binding")]
    DuplicateBinding,
}

/// One rejected declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
    pub symbol: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}: {}",
            self.location, self.symbol, self.kind, self.message
        )
    }
}

/// Every problem found during one scanning round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", diagnostic)?;
        }
        Ok(())
    }
}
