//! canonhost - canonical host redirect front.
//!
//! Redirects every request that did not arrive on the configured canonical
//! host/port to `https://<canonical host>/`. The canonical host is read from a JSON
//! record in the data directory and reloaded whenever that record changes.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod provider;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use provider::{ConfigProvider, Configuration, ConfigurationError};
