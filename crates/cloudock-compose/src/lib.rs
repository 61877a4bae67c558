//! # cloudock-compose
//!
//! The topology compiler and the version compatibility validator.
//!
//! Handles:
//! - **Constraint**: Parsing and evaluation of version range expressions.
//! - **Table**: The ordered application-version × service-version rule list.
//! - **Validator**: Aggregated compatibility checking of requested versions.
//! - **Extension**: The PHP extension catalog and effective extension set.
//! - **Factory**: Construction of single service definitions.
//! - **Compiler**: Assembly of the full, dependency-ordered service topology.
//! - **Graph**: Startup ordering and cycle detection over `depends_on` edges.
//!
//! Everything in this crate is pure: no file, network, or process access.

pub mod compiler;
pub mod constraint;
pub mod cron;
pub mod error;
pub mod extension;
pub mod factory;
pub mod graph;
pub mod request;
pub mod table;
pub mod topology;
pub mod validator;
