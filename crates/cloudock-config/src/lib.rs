//! # cloudock-config
//!
//! Turns the files of a project checkout into compiler inputs.
//!
//! Handles:
//! - **App**: The application config (`.magento.app.yaml`): runtime, extensions, crons.
//! - **Services**: The services config (`.magento/services.yaml`).
//! - **Composer**: The application version recorded in `composer.lock`.
//! - **Project**: Aggregation of all of the above plus explicit overrides.

pub mod app;
pub mod composer;
pub mod project;
pub mod services;

mod fs;
