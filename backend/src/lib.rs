//! HTTP backend for enzyme kinetics, stability classification and batch
//! efficiency calculations.

pub mod batch;
pub mod config;
pub mod error;
pub mod kinetics;
pub mod models;
pub mod routes;
pub mod stability;

pub use config::{Limits, ServerConfig};
pub use error::{ApiError, ParseError};
