//! Energy projection engine.
//!
//! Projects technology unit costs (Wright's Law), clean-energy deployment
//! (capacity-constrained logistic adoption) and full system costs by
//! scenario, region and year.

pub mod config;
pub mod costs;
pub mod domain;
pub mod error;
pub mod models;
pub mod projection;
pub mod report;
pub mod runner;
pub mod store;
pub mod telemetry;

pub use error::{ProjectionError, ProjectionResult};
