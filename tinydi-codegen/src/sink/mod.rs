//! Where generated artifacts go.

mod fs;
mod memory;

pub use fs::{FsSink, MANIFEST_FILE, Manifest, ManifestEntry};
pub use memory::MemorySink;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum_macros::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    Factory,
    Component,
}

/// Incremental build token of one artifact.
///
/// An isolating artifact depends only on the files it was derived from; an
/// aggregating one must be regenerated whenever any input changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    pub aggregating: bool,
    /// Files declaring the injectables the artifact was generated from.
    pub sources: Vec<PathBuf>,
}

impl Dependencies {
    pub fn isolating(sources: Vec<PathBuf>) -> Self {
        Self {
            aggregating: false,
            sources,
        }
    }

    pub fn aggregating(sources: Vec<PathBuf>) -> Self {
        Self {
            aggregating: true,
            sources,
        }
    }
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub namespace: String,
    pub name: String,
    pub kind: ArtifactKind,
    pub content: String,
    pub dependencies: Dependencies,
}

impl Artifact {
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// `crate::net` + `NetworkClientFactory` -> `net/network_client_factory.rs`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .namespace
            .split("::")
            .filter(|segment| !segment.is_empty() && *segment != "crate")
            .collect();
        path.push(format!("{}.rs", snake_case(&self.name)));
        path
    }
}

pub trait CodeSink {
    fn write(&mut self, artifact: &Artifact) -> Result<()>;
}

impl<S: CodeSink + ?Sized> CodeSink for &mut S {
    fn write(&mut self, artifact: &Artifact) -> Result<()> {
        (**self).write(artifact)
    }
}

pub(crate) fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
