//! Deterministic, pure logic shared by the resolvers.
//!
//! Core modules must be free of I/O side effects. They decide routing and
//! visibility from names alone and return deterministic outputs suitable for
//! tests.

pub mod change_tag;
pub mod namespace;
pub mod shim;
pub mod types;
