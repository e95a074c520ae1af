use super::{Artifact, ArtifactKind, CodeSink, Dependencies};
use crate::error::{CodegenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "tinydi-manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub dependencies: Dependencies,
}

/// Every artifact of one generation run, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub artifacts: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CodegenError::io(path, e)),
        }
    }
}

/// Writes artifacts below an output directory.
///
/// Files whose content did not change are left untouched so their mtime
/// stays stable for the host build system. [`FsSink::finish`] removes files
/// the previous run produced but this one did not, then persists the
/// manifest.
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
    previous: Manifest,
    current: Manifest,
    written: usize,
    unchanged: usize,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| CodegenError::io(&root, e))?;
        let previous = Manifest::load(&root.join(MANIFEST_FILE))?.unwrap_or_default();
        Ok(Self {
            root,
            previous,
            current: Manifest::default(),
            written: 0,
            unchanged: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files actually (re)written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Artifacts skipped because the file already had identical content.
    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    pub fn finish(self) -> Result<Manifest> {
        for (name, entry) in &self.previous.artifacts {
            if self.current.artifacts.contains_key(name) {
                continue;
            }
            let stale = self.root.join(&entry.path);
            match fs::remove_file(&stale) {
                Ok(()) => tracing::debug!("Removed stale artifact {}", stale.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(CodegenError::io(stale, e)),
            }
        }

        let manifest_path = self.root.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&self.current)?;
        fs::write(&manifest_path, json).map_err(|e| CodegenError::io(&manifest_path, e))?;
        Ok(self.current)
    }
}

impl CodeSink for FsSink {
    fn write(&mut self, artifact: &Artifact) -> Result<()> {
        let relative = artifact.relative_path();
        let name = artifact.qualified_name();
        if let Some((other, _)) = self
            .current
            .artifacts
            .iter()
            .find(|(other, entry)| entry.path == relative && **other != name)
        {
            return Err(CodegenError::ArtifactClash {
                path: relative,
                first: other.clone(),
                second: name,
            });
        }
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
        }

        let existing = fs::read_to_string(&path).ok();
        if existing.as_deref() == Some(artifact.content.as_str()) {
            tracing::debug!("Unchanged artifact {}", path.display());
            self.unchanged += 1;
        } else {
            fs::write(&path, &artifact.content).map_err(|e| CodegenError::io(&path, e))?;
            tracing::debug!("Wrote artifact {}", path.display());
            self.written += 1;
        }

        self.current.artifacts.insert(
            name,
            ManifestEntry {
                path: relative,
                kind: artifact.kind,
                dependencies: artifact.dependencies.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(name: &str, content: &str) -> Artifact {
        Artifact {
            namespace: "crate::net".to_string(),
            name: name.to_string(),
            kind: ArtifactKind::Factory,
            content: content.to_string(),
            dependencies: Dependencies::isolating(vec![PathBuf::from("src/net.rs")]),
        }
    }

    #[test]
    fn test_writes_artifact_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path()).unwrap();

        sink.write(&factory("NetworkClientFactory", "pub struct NetworkClientFactory;"))
            .unwrap();
        let manifest = sink.finish().unwrap();

        let written = dir.path().join("net").join("network_client_factory.rs");
        assert_eq!(
            fs::read_to_string(written).unwrap(),
            "pub struct NetworkClientFactory;"
        );
        let entry = &manifest.artifacts["crate::net::NetworkClientFactory"];
        assert_eq!(entry.kind, ArtifactKind::Factory);
        assert!(!entry.dependencies.aggregating);
        assert_eq!(
            Manifest::load(&dir.path().join(MANIFEST_FILE)).unwrap(),
            Some(manifest)
        );
    }

    #[test]
    fn test_identical_content_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = factory("NetworkClientFactory", "pub struct NetworkClientFactory;");

        let mut first = FsSink::new(dir.path()).unwrap();
        first.write(&artifact).unwrap();
        assert_eq!(first.written(), 1);
        first.finish().unwrap();

        let mut second = FsSink::new(dir.path()).unwrap();
        second.write(&artifact).unwrap();
        assert_eq!(second.written(), 0);
        assert_eq!(second.unchanged(), 1);
    }

    #[test]
    fn test_names_mapping_to_one_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path()).unwrap();

        sink.write(&factory("HTTPClientFactory", "pub struct HTTPClientFactory;"))
            .unwrap();
        let err = sink
            .write(&factory("HttpClientFactory", "pub struct HttpClientFactory;"))
            .unwrap_err();

        let CodegenError::ArtifactClash { path, first, second } = err else {
            panic!("expected artifact clash");
        };
        assert_eq!(path, PathBuf::from("net").join("http_client_factory.rs"));
        assert_eq!(first, "crate::net::HTTPClientFactory");
        assert_eq!(second, "crate::net::HttpClientFactory");
        assert_eq!(
            fs::read_to_string(dir.path().join(&path)).unwrap(),
            "pub struct HTTPClientFactory;"
        );
    }

    #[test]
    fn test_rewriting_same_artifact_is_not_a_clash() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path()).unwrap();

        sink.write(&factory("NetworkClientFactory", "pub struct A;")).unwrap();
        sink.write(&factory("NetworkClientFactory", "pub struct B;")).unwrap();

        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn test_stale_artifacts_are_removed() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = FsSink::new(dir.path()).unwrap();
        first.write(&factory("OldFactory", "pub struct OldFactory;")).unwrap();
        first.write(&factory("KeptFactory", "pub struct KeptFactory;")).unwrap();
        first.finish().unwrap();

        let mut second = FsSink::new(dir.path()).unwrap();
        second.write(&factory("KeptFactory", "pub struct KeptFactory;")).unwrap();
        let manifest = second.finish().unwrap();

        assert!(!dir.path().join("net").join("old_factory.rs").exists());
        assert!(dir.path().join("net").join("kept_factory.rs").exists());
        assert_eq!(manifest.artifacts.len(), 1);
    }
}
