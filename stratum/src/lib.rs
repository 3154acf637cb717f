//! Layered, isolation-aware unit and resource resolution.
//!
//! Each tenant (one job execution) gets a [`Resolver`] that searches its own
//! artifacts before a shared parent environment. The architecture keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic decisions (reserved namespaces, shim
//!   filtering, unit naming). No I/O, fully testable in isolation.
//! - **[`io`]**: Artifact storage and config files.
//!
//! [`resolver`], [`shared`] and [`load_lock`] combine the two into the
//! load-once lookup; [`assemble`] wires layers from a config file for the CLI.

pub mod assemble;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod load_lock;
pub mod logging;
pub mod observer;
pub mod resolver;
pub mod shared;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::change_tag::ChangeTag;
pub use crate::core::shim::{FrameworkPattern, VersionSelector, VersionShimFilter};
pub use crate::core::types::Definition;
pub use error::{ResolveError, Result};
pub use io::artifact::{Artifact, ArtifactSet, DirArtifact, MemoryArtifact, ResolvedCandidate};
pub use observer::FailureObserver;
pub use resolver::{Resolver, ResolverBuilder, Upstream};
pub use shared::SharedEnvironment;
