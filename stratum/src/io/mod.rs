//! I/O helpers: artifact storage and config files.

pub mod artifact;
pub mod config;
