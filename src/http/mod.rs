//! HTTP layer: canonical host redirect decision and server startup.
//!
//! The server runs in one of two modes:
//! - **Manual**: User-provided certificate and key files
//! - **None**: Plain HTTP (behind a TLS-terminating reverse proxy)
//!
//! The server includes:
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Certificate hot-reload via SIGHUP (manual mode)

pub mod redirect;
mod server;
mod shutdown;

pub use redirect::{decide, RedirectOutcome};
pub use server::{listen_addr, start_server, ServerError};
