//! Test-only helpers for building artifacts and instrumented layers.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::core::types::Definition;
use crate::error::Result;
use crate::io::artifact::{Artifact, ArtifactSet, MemoryArtifact, ResolvedCandidate};
use crate::resolver::Upstream;
use crate::shared::SharedEnvironment;

/// In-memory artifact whose every entry holds the artifact's location as bytes.
pub fn memory_artifact(location: &str, resources: &[&str]) -> Arc<dyn Artifact> {
    let artifact = resources
        .iter()
        .fold(MemoryArtifact::new(location), |acc, resource| {
            acc.with_entry(*resource, location.as_bytes().to_vec())
        });
    Arc::new(artifact)
}

/// Shared environment over a single in-memory artifact.
pub fn shared_environment(location: &str, resources: &[&str]) -> Arc<dyn Upstream> {
    Arc::new(SharedEnvironment::new(ArtifactSet::new(vec![
        memory_artifact(location, resources),
    ])))
}

/// Write `files` (relative path, contents) below `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> io::Result<()> {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

/// Fresh temp directory holding `files`.
pub fn artifact_dir(files: &[(&str, &str)]) -> io::Result<tempfile::TempDir> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), files)?;
    Ok(temp)
}

/// Artifact wrapper counting lookups, optionally slowed down to widen races.
#[derive(Debug)]
pub struct CountingArtifact {
    inner: Arc<dyn Artifact>,
    lookups: AtomicUsize,
    delay: Duration,
}

impl CountingArtifact {
    pub fn new(inner: Arc<dyn Artifact>) -> Self {
        Self::with_delay(inner, Duration::ZERO)
    }

    pub fn with_delay(inner: Arc<dyn Artifact>, delay: Duration) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Artifact for CountingArtifact {
    fn location(&self) -> &str {
        self.inner.location()
    }

    fn contains(&self, resource: &str) -> io::Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.inner.contains(resource)
    }

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>> {
        self.inner.open(resource)
    }
}

/// Artifact whose lookups always fail with the given error kind.
#[derive(Debug)]
pub struct FailingArtifact {
    location: String,
    kind: io::ErrorKind,
}

impl FailingArtifact {
    pub fn new(location: impl Into<String>, kind: io::ErrorKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }
}

impl Artifact for FailingArtifact {
    fn location(&self) -> &str {
        &self.location
    }

    fn contains(&self, _resource: &str) -> io::Result<bool> {
        Err(io::Error::new(self.kind, "storage unavailable"))
    }

    fn open(&self, _resource: &str) -> io::Result<Box<dyn Read + Send>> {
        Err(io::Error::new(self.kind, "storage unavailable"))
    }
}

/// Upstream wrapper counting `resolve_one` calls.
#[derive(Debug)]
pub struct CountingUpstream {
    inner: Arc<dyn Upstream>,
    calls: AtomicUsize,
}

impl CountingUpstream {
    pub fn new(inner: Arc<dyn Upstream>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Upstream for CountingUpstream {
    fn resolve_one(&self, name: &str) -> Result<Arc<Definition>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_one(name)
    }

    fn resolve_resource(&self, resource: &str) -> Result<Option<ResolvedCandidate>> {
        self.inner.resolve_resource(resource)
    }

    fn resolve_all(&self, resource: &str) -> Vec<ResolvedCandidate> {
        self.inner.resolve_all(resource)
    }
}
