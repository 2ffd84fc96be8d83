//! In-process storage backend.

mod repository;

pub use repository::LocalRepository;
