//! Shared plumbing for the workspace: bounded worker pools, logging setup
//! and configuration files.

pub mod config_file;
pub mod log_setup;
pub mod parallel;
