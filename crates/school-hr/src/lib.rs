//! School HR records service.
//!
//! Schools, roles and users form the directory; employees carry a self-service profile
//! whose completion is scored on every save and gates the verification workflow.

pub mod config;
pub mod directory;
pub mod employees;
pub mod error;
pub mod store;
pub mod telemetry;

mod validation;
