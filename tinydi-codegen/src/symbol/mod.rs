//! The symbol table the scanner reads from.
//!
//! A table hands out every declaration carrying the injectable marker and
//! answers whether the types that declaration mentions can be qualified yet.

mod source;

pub use source::{SourceFile, SourceSymbolTable};

use crate::type_ref::TypeRef;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A path exactly as it was written in source, before qualification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrittenPath {
    pub leading_colon: bool,
    pub segments: Vec<String>,
}

impl WrittenPath {
    pub fn new(leading_colon: bool, segments: Vec<String>) -> Self {
        Self {
            leading_colon,
            segments,
        }
    }

    pub fn single(name: impl Into<String>) -> Self {
        Self::new(false, vec![name.into()])
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for WrittenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.leading_colon {
            f.write_str("::")?;
        }
        f.write_str(&self.segments.join("::"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Associated function of an inherent impl, returning `Self`.
    Constructor,
    NotConstructor { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    /// `Arc<T>` with `T` a plain path.
    Shared(WrittenPath),
    Unsupported { written: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub shape: ParamShape,
}

/// A declaration carrying the injectable marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub location: Location,
    pub module: String,
    /// Table-defined handle to the lexical scope the symbol was found in.
    pub scope: usize,
    pub owner: Option<WrittenPath>,
    pub owner_generic: bool,
    pub name: String,
    pub kind: SymbolKind,
    pub params: Vec<Param>,
}

impl Symbol {
    /// Stable identity across rounds.
    pub fn key(&self) -> String {
        format!("{}#{}", self.location, self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}::{}", owner, self.name),
            None => write!(f, "{}::{}", self.module, self.name),
        }
    }
}

pub trait SymbolTable {
    /// Every declaration carrying the injectable marker, in source order.
    fn marked_symbols(&self) -> Vec<Symbol>;

    /// Qualified owning type, or `None` while it cannot be resolved.
    fn owner_type(&self, symbol: &Symbol) -> Option<TypeRef>;

    /// Qualified parameter types in declaration order, or `None` while any of
    /// them cannot be resolved. Only meaningful when every parameter is
    /// [`ParamShape::Shared`].
    fn parameter_types(&self, symbol: &Symbol) -> Option<Vec<TypeRef>>;

    /// Whether every type the symbol mentions is fully resolved.
    fn is_resolved(&self, symbol: &Symbol) -> bool {
        self.owner_type(symbol).is_some() && self.parameter_types(symbol).is_some()
    }
}
