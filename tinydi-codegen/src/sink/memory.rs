use super::{Artifact, CodeSink};
use crate::error::Result;
use std::collections::BTreeMap;

/// Keeps artifacts in memory, keyed by qualified name.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<String, Artifact>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Artifact> {
        self.artifacts.get(qualified_name)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Number of `write` calls, including overwrites.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CodeSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> Result<()> {
        self.writes += 1;
        self.artifacts
            .insert(artifact.qualified_name(), artifact.clone());
        Ok(())
    }
}
