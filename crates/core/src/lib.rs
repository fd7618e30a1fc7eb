//! Merchant Bank Core - Shared types library.
//!
//! This crate provides common types used across all Merchant Bank components:
//! - `api` - The HTTP service (sessions, payments, history journal)
//! - `cli` - Command-line tools for the data directory
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no file access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, usernames, amounts, roles and
//!   history actions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
