//! Core domain types and storage contracts for the clinical-canvas backend.
//!
//! This crate is I/O free. It defines the clinical entities (patients, tasks,
//! staff, notes), the typed creation/patch payloads that flow into the storage
//! layer, and the repository traits plus error taxonomy that the storage
//! backends in the `clinical_canvas` crate implement.

pub mod clinical;
pub mod storage;
