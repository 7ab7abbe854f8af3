//! # Agency Backfill Library
//!
//! One-shot reconciliation that gives every non-privileged user without an
//! agency an agency of their own.
//!
//! ## Modules
//!
//! - `config`: Environment-driven configuration
//! - `error`: Error taxonomy, one variant per failing step
//! - `store`: Storage seam and the transactional PostgreSQL store
//! - `backfill`: The sequential select-then-provision loop
//! - `report`: Per-user outcomes, summary, and exit status

pub mod backfill;
pub mod config;
pub mod error;
pub mod report;
pub mod store;
