//! # cloudock-common
//!
//! Shared types, error definitions, project paths, and constants
//! used across the entire cloudock workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives (application version,
//! service names, the umbrella error) that all other crates build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
