//! Shared parent environment.
//!
//! A flat layer over the artifacts every tenant sees. It routes nothing and
//! filters nothing; the child resolvers apply their own shim filters to what
//! it returns.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::core::types::{DEFAULT_UNIT_EXTENSION, Definition, unit_resource};
use crate::error::{ResolveError, Result};
use crate::io::artifact::{ArtifactSet, ResolvedCandidate};
use crate::load_lock::LoadTable;
use crate::resolver::Upstream;

#[derive(Debug)]
pub struct SharedEnvironment {
    artifacts: ArtifactSet,
    unit_extension: String,
    loads: LoadTable,
}

impl SharedEnvironment {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            artifacts,
            unit_extension: DEFAULT_UNIT_EXTENSION.to_string(),
            loads: LoadTable::new(),
        }
    }

    pub fn with_unit_extension(mut self, extension: impl Into<String>) -> Self {
        self.unit_extension = extension.into();
        self
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }
}

impl Upstream for SharedEnvironment {
    #[instrument(skip(self), name = "shared_resolve_one")]
    fn resolve_one(&self, name: &str) -> Result<Arc<Definition>> {
        self.loads.load_once(name, || {
            let resource = unit_resource(name, &self.unit_extension);
            match self.artifacts.locate_first(&resource)? {
                Some(candidate) => {
                    debug!(origin = candidate.origin(), "defining from shared artifact");
                    candidate.define(name)
                }
                None => Err(ResolveError::not_found(name)),
            }
        })
    }

    fn resolve_resource(&self, resource: &str) -> Result<Option<ResolvedCandidate>> {
        self.artifacts.locate_first(resource)
    }

    fn resolve_all(&self, resource: &str) -> Vec<ResolvedCandidate> {
        self.artifacts.locate_all(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_artifact;

    #[test]
    fn shared_definitions_are_memoized() {
        let shared = SharedEnvironment::new(ArtifactSet::new(vec![memory_artifact(
            "mem:/shared",
            &["org/slf4j/Logger.class"],
        )]));
        let first = shared.resolve_one("org.slf4j.Logger").expect("first");
        let second = shared.resolve_one("org.slf4j.Logger").expect("second");
        assert!(Definition::same(&first, &second));
    }

    #[test]
    fn shared_resolve_all_is_unfiltered() {
        let shared = SharedEnvironment::new(ArtifactSet::new(vec![
            memory_artifact("mem:/flink-1.12.jar", &["conf.yaml"]),
            memory_artifact("mem:/flink-1.14.jar", &["conf.yaml"]),
        ]));
        assert_eq!(shared.resolve_all("conf.yaml").len(), 2);
    }

    #[test]
    fn shared_resolve_resource_takes_first_artifact() {
        let shared = SharedEnvironment::new(ArtifactSet::new(vec![
            memory_artifact("mem:/flink-1.14.jar", &["conf.yaml"]),
            memory_artifact("mem:/flink-1.12.jar", &["conf.yaml"]),
        ]));
        let candidate = shared
            .resolve_resource("conf.yaml")
            .expect("resolve")
            .expect("present");
        assert_eq!(candidate.origin(), "mem:/flink-1.14.jar");
        assert!(shared.resolve_resource("missing.yaml").expect("resolve").is_none());
    }

    #[test]
    fn empty_environment_finds_nothing() {
        let shared = SharedEnvironment::new(ArtifactSet::empty());
        assert!(
            shared
                .resolve_one("com.acme.Job")
                .expect_err("missing")
                .is_not_found()
        );
        assert!(shared.resolve_all("conf.yaml").is_empty());
    }
}
