//! Build the shared environment and tenant resolver described by a config file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::shim::{FrameworkPattern, VersionSelector};
use crate::io::artifact::ArtifactSet;
use crate::io::config::{StratumConfig, load_config};
use crate::observer::FailureObserver;
use crate::resolver::{Resolver, Upstream};
use crate::shared::SharedEnvironment;

/// The two layers of one tenant.
#[derive(Debug)]
pub struct Layers {
    pub shared: Arc<SharedEnvironment>,
    pub tenant: Resolver,
}

/// Assemble layers from an already validated config.
///
/// Artifact paths are used as-is; see [`StratumConfig::rebased`].
pub fn assemble(config: &StratumConfig, observer: Option<FailureObserver>) -> Result<Layers> {
    let selector = VersionSelector::new(&config.tenant.version_selector)
        .context("compile tenant.version_selector")?;
    let framework = FrameworkPattern::new(&config.shim.framework_pattern)
        .context("compile shim.framework_pattern")?;

    warn_missing(&config.shared.artifacts);
    warn_missing(&config.tenant.artifacts);

    let shared = Arc::new(
        SharedEnvironment::new(ArtifactSet::from_dirs(config.shared.artifacts.iter().cloned()))
            .with_unit_extension(&config.units.extension),
    );

    let parent: Arc<dyn Upstream> = shared.clone();
    let mut builder = Resolver::builder(ArtifactSet::from_dirs(
        config.tenant.artifacts.iter().cloned(),
    ))
    .tenant(&config.tenant.name)
    .parent(parent)
    .selector(selector)
    .framework(framework)
    .unit_extension(&config.units.extension);
    if let Some(observer) = observer {
        builder = builder.observer(observer);
    }
    let tenant = builder.build();

    info!(
        tenant = tenant.tenant(),
        shared_artifacts = shared.artifacts().len(),
        tenant_artifacts = tenant.artifacts().len(),
        selector = tenant.selector().as_str(),
        "assembled layers"
    );
    Ok(Layers { shared, tenant })
}

/// Load `path`, rebase relative artifact paths onto its directory, assemble.
pub fn assemble_from_file(path: &Path, observer: Option<FailureObserver>) -> Result<Layers> {
    let config = load_config(path)?;
    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    assemble(&config.rebased(&base), observer)
        .with_context(|| format!("assemble layers from {}", path.display()))
}

fn warn_missing(paths: &[PathBuf]) {
    for path in paths.iter().filter(|path| !path.is_dir()) {
        warn!(path = %path.display(), "artifact directory missing");
    }
}
