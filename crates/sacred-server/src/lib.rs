//! `SacredSecret` sign-up HTTP server.
//!
//! Wires the validation engine and a registrar into an Axum server. The
//! presentation layer calls `/v1/signup/*` for live field results and for
//! registration; `/v1/sys/health` serves liveness probes.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
#[cfg(feature = "upstream")]
pub mod upstream;
