//! Artifact containers and the ordered sets a tenant searches.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::core::types::Definition;
use crate::error::{ResolveError, Result};

/// An addressable container of named resources.
///
/// `contains` and `open` may block on storage.
pub trait Artifact: Send + Sync + fmt::Debug {
    /// Stable location string, also used as the origin of candidates.
    fn location(&self) -> &str;

    /// `Ok(false)` when the resource is absent; `Err` only for real I/O failures.
    fn contains(&self, resource: &str) -> io::Result<bool>;

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Directory on disk; resources are relative paths below it.
#[derive(Debug, Clone)]
pub struct DirArtifact {
    root: PathBuf,
    location: String,
}

impl DirArtifact {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let location = root.to_string_lossy().into_owned();
        Self { root, location }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative paths address entries; anything escaping the root is absent.
    fn entry_path(&self, resource: &str) -> Option<PathBuf> {
        let relative = Path::new(resource);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !plain || resource.is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Artifact for DirArtifact {
    fn location(&self) -> &str {
        &self.location
    }

    fn contains(&self, resource: &str) -> io::Result<bool> {
        let Some(path) = self.entry_path(resource) else {
            return Ok(false);
        };
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = self.entry_path(resource).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no entry `{resource}`"))
        })?;
        Ok(Box::new(File::open(path)?))
    }
}

/// In-memory container, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifact {
    location: String,
    entries: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryArtifact {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, resource: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        self.entries.insert(resource.into(), Arc::from(bytes));
        self
    }
}

impl Artifact for MemoryArtifact {
    fn location(&self) -> &str {
        &self.location
    }

    fn contains(&self, resource: &str) -> io::Result<bool> {
        Ok(self.entries.contains_key(resource))
    }

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>> {
        let bytes = self.entries.get(resource).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no entry `{resource}`"))
        })?;
        Ok(Box::new(Cursor::new(Arc::clone(bytes))))
    }
}

/// A located resource: origin artifact, resource name and a byte accessor.
#[derive(Debug, Clone)]
pub struct ResolvedCandidate {
    resource: String,
    artifact: Arc<dyn Artifact>,
}

impl ResolvedCandidate {
    pub fn new(resource: impl Into<String>, artifact: Arc<dyn Artifact>) -> Self {
        Self {
            resource: resource.into(),
            artifact,
        }
    }

    pub fn origin(&self) -> &str {
        self.artifact.location()
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// `<origin>!/<resource>`.
    pub fn url(&self) -> String {
        format!("{}!/{}", self.origin(), self.resource)
    }

    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.artifact.open(&self.resource)
    }

    /// Read the candidate's bytes into a fresh definition of unit `name`.
    pub fn define(&self, name: &str) -> Result<Arc<Definition>> {
        let mut bytes = Vec::new();
        self.open()
            .and_then(|mut reader| reader.read_to_end(&mut bytes))
            .map_err(|err| ResolveError::io(&self.resource, self.origin(), err))?;
        Ok(Arc::new(Definition {
            name: name.to_string(),
            resource: self.resource.clone(),
            origin: self.origin().to_string(),
            bytes,
        }))
    }
}

/// Ordered artifacts owned by one resolver; order is search order.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    artifacts: Vec<Arc<dyn Artifact>>,
}

impl ArtifactSet {
    pub fn new(artifacts: Vec<Arc<dyn Artifact>>) -> Self {
        Self { artifacts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// One [`DirArtifact`] per path, in the given order.
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        dirs.into_iter()
            .map(|dir| Arc::new(DirArtifact::new(dir)) as Arc<dyn Artifact>)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Artifact>> {
        self.artifacts.iter()
    }

    /// First artifact holding `resource`.
    ///
    /// An I/O failure stops the search; it is not treated as absence.
    pub fn locate_first(&self, resource: &str) -> Result<Option<ResolvedCandidate>> {
        for artifact in &self.artifacts {
            let found = artifact
                .contains(resource)
                .map_err(|err| ResolveError::io(resource, artifact.location(), err))?;
            if found {
                trace!(resource, origin = artifact.location(), "located");
                return Ok(Some(ResolvedCandidate::new(resource, Arc::clone(artifact))));
            }
        }
        Ok(None)
    }

    /// Every artifact holding `resource`, in search order. Unreadable artifacts are skipped.
    pub fn locate_all(&self, resource: &str) -> Vec<ResolvedCandidate> {
        let mut found = Vec::new();
        for artifact in &self.artifacts {
            match artifact.contains(resource) {
                Ok(true) => found.push(ResolvedCandidate::new(resource, Arc::clone(artifact))),
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        resource,
                        origin = artifact.location(),
                        err = %err,
                        "skipping unreadable artifact"
                    );
                }
            }
        }
        found
    }
}

impl FromIterator<Arc<dyn Artifact>> for ArtifactSet {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Artifact>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
