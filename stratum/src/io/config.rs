//! Resolver layout stored in `stratum.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::shim::{DEFAULT_FRAMEWORK_PATTERN, FrameworkPattern, VersionSelector};
use crate::core::types::DEFAULT_UNIT_EXTENSION;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stratum.toml";

/// Resolver layout (TOML).
///
/// Intended to be edited by humans. Missing fields default to an empty shared
/// environment and a tenant that accepts every framework build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StratumConfig {
    pub shared: SharedConfig,
    pub tenant: TenantConfig,
    pub shim: ShimConfig,
    pub units: UnitsConfig,
}

/// Parent environment shared by every tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SharedConfig {
    /// Artifact directories, in search order.
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TenantConfig {
    /// Label attached to log events.
    pub name: String,

    /// Tenant-private artifact directories, searched before the shared ones.
    pub artifacts: Vec<PathBuf>,

    /// Regex the framework version token must match for a shim to stay visible.
    pub version_selector: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            artifacts: Vec::new(),
            version_selector: ".*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShimConfig {
    /// Naming of framework build artifacts; must capture the version token.
    pub framework_pattern: String,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            framework_pattern: DEFAULT_FRAMEWORK_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UnitsConfig {
    /// Extension appended to a unit's path (`org.acme.Job` -> `org/acme/Job.<ext>`).
    pub extension: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_UNIT_EXTENSION.to_string(),
        }
    }
}

impl StratumConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tenant.name.trim().is_empty() {
            return Err(anyhow!("tenant.name must be non-empty"));
        }
        VersionSelector::new(&self.tenant.version_selector)
            .context("tenant.version_selector")?;
        FrameworkPattern::new(&self.shim.framework_pattern).context("shim.framework_pattern")?;
        let ext = &self.units.extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(anyhow!("units.extension must be a bare extension, got `{ext}`"));
        }
        Ok(())
    }

    /// Rebase relative artifact paths onto `base` (usually the config file's directory).
    pub fn rebased(mut self, base: &Path) -> Self {
        for path in self
            .shared
            .artifacts
            .iter_mut()
            .chain(self.tenant.artifacts.iter_mut())
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StratumConfig::default()`.
pub fn load_config(path: &Path) -> Result<StratumConfig> {
    if !path.exists() {
        let cfg = StratumConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StratumConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &StratumConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize layout toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

// Readers of the layout file never observe a half-written file.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("layout file {} has no directory", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create layout dir {}", dir.display()))?;
    let staged = path.with_extension("toml.tmp");
    fs::write(&staged, contents)
        .with_context(|| format!("stage layout file {}", staged.display()))?;
    fs::rename(&staged, path)
        .with_context(|| format!("install layout file {}", path.display()))?;
    Ok(())
}
