//! Version shim filtering.
//!
//! When several builds of one framework sit on the combined search path (for
//! example `flink-1.12.jar` from one tenant and `flink-1.14.jar` merged in at
//! the shared level), only the build matching the tenant's selector stays
//! visible. Artifacts that do not look like a framework build pass untouched.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::debug;

use crate::error::ResolveError;

/// Framework build naming used when none is configured.
pub const DEFAULT_FRAMEWORK_PATTERN: &str = r"flink-(?P<version>.+)\.jar";

/// Capture group holding the version token.
const VERSION_GROUP: &str = "version";

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("framework pattern `{0}` needs a capture group for the version token")]
    MissingVersionGroup(String),
}

fn compile_anchored(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| PatternError::Invalid {
            pattern: pattern.to_string(),
            source,
        })
}

/// Which framework build a resolver is entitled to see.
///
/// Matched against the whole version token, case-insensitively.
#[derive(Debug, Clone)]
pub struct VersionSelector {
    pattern: String,
    regex: Regex,
}

impl VersionSelector {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: pattern.to_string(),
            regex: compile_anchored(pattern)?,
        })
    }

    /// Selector that accepts every version, i.e. disables filtering.
    pub fn any() -> Self {
        Self {
            pattern: ".*".to_string(),
            regex: Regex::new("^(?s:.*)$").expect("match-all pattern compiles"),
        }
    }

    pub fn accepts(&self, version: &str) -> bool {
        self.regex.is_match(version)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Naming scheme of shimmed framework artifacts: name plus version token.
#[derive(Debug, Clone)]
pub struct FrameworkPattern {
    pattern: String,
    regex: Regex,
}

impl FrameworkPattern {
    /// Compile `pattern`; the version token is the `version` named group, or
    /// the first capture group when that name is absent.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = compile_anchored(pattern)?;
        if regex.captures_len() < 2 {
            return Err(PatternError::MissingVersionGroup(pattern.to_string()));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Version token of `artifact_name`, or `None` for non-framework artifacts.
    pub fn version_token<'a>(&self, artifact_name: &'a str) -> Option<&'a str> {
        let caps = self.regex.captures(artifact_name)?;
        caps.name(VERSION_GROUP)
            .or_else(|| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl Default for FrameworkPattern {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMEWORK_PATTERN).expect("default framework pattern compiles")
    }
}

/// File name of the artifact an origin points into.
///
/// Accepts plain paths (`/lib/flink-1.12.jar`), URL-ish locations
/// (`file:/lib/flink-1.12.jar`) and entry-qualified forms
/// (`jar:file:/lib/flink-1.12.jar!/org/A.class`).
pub fn artifact_name(origin: &str) -> Result<&str, ResolveError> {
    let container = origin.split_once("!/").map_or(origin, |(head, _)| head);
    let trimmed = container.trim_end_matches(['/', '\\']);
    let name = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .rsplit(':')
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ResolveError::MalformedOrigin {
            origin: origin.to_string(),
        });
    }
    Ok(name)
}

/// Drops candidates that come from a different framework build.
#[derive(Debug, Clone)]
pub struct VersionShimFilter {
    framework: FrameworkPattern,
    selector: VersionSelector,
}

impl VersionShimFilter {
    pub fn new(framework: FrameworkPattern, selector: VersionSelector) -> Self {
        Self {
            framework,
            selector,
        }
    }

    /// Whether a candidate from `origin` stays visible.
    ///
    /// Origins without a usable artifact name are kept.
    pub fn keep(&self, origin: &str) -> bool {
        let name = match artifact_name(origin) {
            Ok(name) => name,
            Err(err) => {
                debug!(%err, "keeping candidate");
                return true;
            }
        };
        match self.framework.version_token(name) {
            Some(version) => {
                let keep = self.selector.accepts(version);
                if !keep {
                    debug!(
                        artifact = name,
                        version,
                        selector = self.selector.as_str(),
                        "dropping shim"
                    );
                }
                keep
            }
            None => true,
        }
    }

    pub fn selector(&self) -> &VersionSelector {
        &self.selector
    }

    pub fn framework(&self) -> &FrameworkPattern {
        &self.framework
    }
}
