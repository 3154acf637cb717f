//! Resolution failures.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Condition raised by a resolution attempt.
///
/// `Clone` so that a memoized failure can be handed to every later caller for
/// the same name. I/O sources are shared behind an `Arc` for the same reason.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Name is not present in any layer of the chain.
    #[error("`{name}` not found in any layer")]
    NotFound { name: String },

    /// Reading an artifact failed for a reason other than absence.
    #[error("read `{resource}` from {origin}: {source}")]
    Io {
        resource: String,
        origin: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// Origin location carries no artifact name usable for shim filtering.
    #[error("cannot derive artifact name from origin `{origin}`")]
    MalformedOrigin { origin: String },
}

impl ResolveError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn io(resource: impl Into<String>, origin: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            resource: resource.into(),
            origin: origin.into(),
            source: Arc::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
