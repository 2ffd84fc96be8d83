//! Storage backends and the shared machinery between them.
//!
//! The codec, key derivation, item conversions, and query planner are shared;
//! `dynamodb` and `local` execute the same plans against their own stores.

pub mod codec;
pub mod dynamodb;
pub mod items;
pub mod keys;
pub mod local;
pub mod router;

pub use dynamodb::DynamoDbRepository;
pub use local::LocalRepository;
