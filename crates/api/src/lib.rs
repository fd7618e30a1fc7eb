//! Merchant bank API library.
//!
//! Customer registration, token-based sessions and payment submission over
//! a directory of JSON collection files. The `merchant-bank-api` binary
//! serves [`routes::app`]; the CLI and the integration tests use the same
//! library.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
