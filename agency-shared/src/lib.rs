//! # Agency Shared Library
//!
//! Database pool management and the user/agency models used by the agency
//! backfill.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool with connect timeout and TLS selection
//! - `models`: `User` and `Agency` records with their SQL operations

pub mod db;
pub mod models;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
