//! DynamoDB storage backend.

mod error;
mod repository;
mod transactions;
mod update;

pub use repository::{DynamoDbRepository, DEFAULT_TABLE_NAME};
