//! Shared types for resolution results.
//!
//! These types carry no I/O handles; the bytes of a definition are read once
//! when it is defined and then shared.

use std::fmt;
use std::sync::Arc;

/// Unit extension used when none is configured.
pub const DEFAULT_UNIT_EXTENSION: &str = "class";

/// A unit defined from exactly one artifact.
///
/// Handed out as `Arc<Definition>`; two lookups observed the same definition
/// iff [`Definition::same`] holds.
#[derive(Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub resource: String,
    pub origin: String,
    pub bytes: Vec<u8>,
}

impl Definition {
    /// Identity comparison, not structural equality.
    pub fn same(a: &Arc<Definition>, b: &Arc<Definition>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("origin", &self.origin)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Resource path of a dotted unit name, e.g. `org.acme.Job` -> `org/acme/Job.class`.
pub fn unit_resource(name: &str, extension: &str) -> String {
    format!("{}.{}", name.replace('.', "/"), extension)
}
