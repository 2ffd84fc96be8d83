//! Storage layer for the clinical-canvas backend.
//!
//! Everything lives in one table keyed by a composite (PK, SK) pair with four
//! global secondary index projections. Two backends implement the repository
//! traits from [`clinical_canvas_core`]: a DynamoDB adapter for production and
//! an in-process backend for tests and local development. Both share the same
//! key derivation, codec, and query planner, so a query exercised against the
//! local backend touches the same key strings the production table would see.

pub mod config;
pub mod logging;
pub mod state;
pub mod storage;
