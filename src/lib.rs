// ABOUTME: Library root for kubectl-setimg - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod build_info;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod invocation;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod rollout;
pub mod types;
pub mod workload;
