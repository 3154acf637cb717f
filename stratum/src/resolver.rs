//! Child-first, isolation-aware resolver.
//!
//! A lookup walks a fixed sequence: memo, reserved-namespace routing, local
//! artifacts, parent. Each step is a plain method on [`Resolver`]; the parent
//! is any [`Upstream`], so resolvers nest.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::core::namespace::NamespaceRouter;
use crate::core::shim::{FrameworkPattern, VersionSelector, VersionShimFilter};
use crate::core::types::{DEFAULT_UNIT_EXTENSION, Definition, unit_resource};
use crate::error::{ResolveError, Result};
use crate::io::artifact::{ArtifactSet, ResolvedCandidate};
use crate::load_lock::{LoadTable, Outcome};
use crate::observer::FailureObserver;

/// A layer a resolver can fall back to.
pub trait Upstream: Send + Sync + fmt::Debug {
    /// The unique definition of unit `name`, or `NotFound`.
    fn resolve_one(&self, name: &str) -> Result<Arc<Definition>>;

    /// First candidate for `resource`, own artifacts before any parent.
    fn resolve_resource(&self, resource: &str) -> Result<Option<ResolvedCandidate>>;

    /// Every visible candidate for `resource`, in search order.
    fn resolve_all(&self, resource: &str) -> Vec<ResolvedCandidate>;
}

/// Per-tenant resolver: local artifacts first, then the parent.
///
/// Names under a reserved namespace skip the local artifacts entirely, and
/// framework builds other than the selected one are hidden from
/// [`Resolver::resolve_all`].
#[derive(Debug)]
pub struct Resolver {
    tenant: String,
    artifacts: ArtifactSet,
    parent: Option<Arc<dyn Upstream>>,
    router: NamespaceRouter,
    filter: VersionShimFilter,
    observer: FailureObserver,
    unit_extension: String,
    loads: LoadTable,
}

impl Resolver {
    pub fn builder(artifacts: ArtifactSet) -> ResolverBuilder {
        ResolverBuilder::new(artifacts)
    }

    /// Resolve unit `name` to its unique definition.
    ///
    /// The first call for a name does the work; later calls return the same
    /// definition, or the same failure. Every failing call is reported to the
    /// failure observer.
    #[instrument(skip(self), fields(tenant = %self.tenant))]
    pub fn resolve_one(&self, name: &str) -> Result<Arc<Definition>> {
        let outcome = self.loads.load_once(name, || self.load(name));
        if let Err(err) = &outcome {
            debug!(%err, "resolution failed");
            self.observer.notify(err);
        }
        outcome
    }

    /// First candidate for `resource`: local artifacts, then the parent.
    ///
    /// Unlike [`Resolver::resolve_all`] this applies no shim filtering and no
    /// namespace routing, and nothing is memoized. `Ok(None)` when no layer
    /// holds the resource.
    #[instrument(skip(self), fields(tenant = %self.tenant))]
    pub fn resolve_resource(&self, resource: &str) -> Result<Option<ResolvedCandidate>> {
        if let Some(candidate) = self.artifacts.locate_first(resource)? {
            debug!(origin = candidate.origin(), "found locally");
            return Ok(Some(candidate));
        }
        match &self.parent {
            Some(parent) => parent.resolve_resource(resource),
            None => Ok(None),
        }
    }

    /// Every candidate for `resource` that survives shim filtering.
    ///
    /// Local candidates come first, then the parent's, each tier in discovery
    /// order. Never fails: an absent resource yields an empty list.
    #[instrument(skip(self), fields(tenant = %self.tenant))]
    pub fn resolve_all(&self, resource: &str) -> Vec<ResolvedCandidate> {
        let mut found: Vec<ResolvedCandidate> = self
            .artifacts
            .locate_all(resource)
            .into_iter()
            .filter(|candidate| self.filter.keep(candidate.origin()))
            .collect();
        if let Some(parent) = &self.parent {
            found.extend(
                parent
                    .resolve_all(resource)
                    .into_iter()
                    .filter(|candidate| self.filter.keep(candidate.origin())),
            );
        }
        debug!(count = found.len(), "collected candidates");
        found
    }

    /// Whether `name` already has a settled outcome.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loads.peek(name).is_some()
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    pub fn selector(&self) -> &VersionSelector {
        self.filter.selector()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    fn load(&self, name: &str) -> Outcome {
        if self.router.is_parent_first(name) {
            debug!("reserved namespace, asking parent");
            return self.delegate(name);
        }
        let resource = unit_resource(name, &self.unit_extension);
        if let Some(candidate) = self.artifacts.locate_first(&resource)? {
            debug!(origin = candidate.origin(), "defining from local artifact");
            return candidate.define(name);
        }
        self.delegate(name)
    }

    // Parent failures are returned as-is.
    fn delegate(&self, name: &str) -> Outcome {
        match &self.parent {
            Some(parent) => parent.resolve_one(name),
            None => Err(ResolveError::not_found(name)),
        }
    }
}

impl Upstream for Resolver {
    fn resolve_one(&self, name: &str) -> Result<Arc<Definition>> {
        Resolver::resolve_one(self, name)
    }

    fn resolve_resource(&self, resource: &str) -> Result<Option<ResolvedCandidate>> {
        Resolver::resolve_resource(self, resource)
    }

    fn resolve_all(&self, resource: &str) -> Vec<ResolvedCandidate> {
        Resolver::resolve_all(self, resource)
    }
}

/// Construction parameters for [`Resolver`].
///
/// The parent must already exist when the child is built, so parent chains
/// cannot form cycles.
pub struct ResolverBuilder {
    tenant: String,
    artifacts: ArtifactSet,
    parent: Option<Arc<dyn Upstream>>,
    selector: VersionSelector,
    framework: FrameworkPattern,
    observer: Option<FailureObserver>,
    unit_extension: String,
}

impl ResolverBuilder {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            tenant: "default".to_string(),
            artifacts,
            parent: None,
            selector: VersionSelector::any(),
            framework: FrameworkPattern::default(),
            observer: None,
            unit_extension: DEFAULT_UNIT_EXTENSION.to_string(),
        }
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn parent(mut self, parent: Arc<dyn Upstream>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn selector(mut self, selector: VersionSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn framework(mut self, framework: FrameworkPattern) -> Self {
        self.framework = framework;
        self
    }

    /// Defaults to the process-wide observer captured at `build` time.
    pub fn observer(mut self, observer: FailureObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn unit_extension(mut self, extension: impl Into<String>) -> Self {
        self.unit_extension = extension.into();
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            tenant: self.tenant,
            artifacts: self.artifacts,
            parent: self.parent,
            router: NamespaceRouter::reserved(),
            filter: VersionShimFilter::new(self.framework, self.selector),
            observer: self.observer.unwrap_or_default(),
            unit_extension: self.unit_extension,
            loads: LoadTable::new(),
        }
    }
}
