//! Stable exit codes for `stratum` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config or an I/O error.
pub const INVALID: i32 = 1;
/// `stratum resolve` found no definition, or `stratum resources` found no candidate.
pub const NOT_FOUND: i32 = 2;
