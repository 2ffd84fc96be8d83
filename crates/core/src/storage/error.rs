use thiserror::Error;

use super::types::ItemKey;

/// Errors surfaced by the storage backends.
///
/// Backend-specific failures are mapped into this taxonomy at the adapter
/// boundary so callers never see SDK error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// The addressed record does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    /// A create collided with an existing record at the same key.
    #[error("{entity_type} already exists: {id}")]
    DuplicateKey { entity_type: &'static str, id: String },

    /// An identifier contains a reserved character or is empty, so no key
    /// could be derived from it.
    #[error("invalid key input for {field}: {reason}")]
    InvalidKeyInput { field: &'static str, reason: String },

    /// A stored item could not be decoded, or a value could not be encoded.
    #[error("codec failure for {entity_type}: {message}")]
    Codec { entity_type: &'static str, message: String },

    /// A multi-item transaction was cancelled and no write took effect.
    #[error("transaction aborted: {reason}")]
    TransactionAborted { reason: String },

    /// A cascade delete stopped partway; `remaining` holds the keys of items
    /// that survived and still need deletion.
    #[error("cascade delete for patient {patient_id} left {} item(s) behind", remaining.len())]
    PartialCascade { patient_id: String, remaining: Vec<ItemKey> },

    /// The backend could not be reached or timed out.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        StorageError::NotFound { entity_type, id: id.into() }
    }

    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        StorageError::DuplicateKey { entity_type, id: id.into() }
    }

    pub fn codec(entity_type: &'static str, message: impl Into<String>) -> Self {
        StorageError::Codec { entity_type, message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        StorageError::Unavailable { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found("Patient", "p-123");
        assert_eq!(err.to_string(), "Patient not found: p-123");
    }

    #[test]
    fn test_duplicate_display() {
        let err = StorageError::duplicate("Task", "t-9");
        assert_eq!(err.to_string(), "Task already exists: t-9");
    }

    #[test]
    fn test_partial_cascade_display() {
        let err = StorageError::PartialCascade {
            patient_id: "p-1".to_string(),
            remaining: vec![
                ItemKey::new("PATIENT#p-1", "NOTE#2026-01-01T00:00:00.000Z#n-1"),
                ItemKey::new("PATIENT#p-1", "TASK#2026-01-02T00:00:00.000Z#t-1"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cascade delete for patient p-1 left 2 item(s) behind"
        );
    }

    #[test]
    fn test_invalid_key_input_display() {
        let err = StorageError::InvalidKeyInput {
            field: "patient_id",
            reason: "contains '#'".to_string(),
        };
        assert_eq!(err.to_string(), "invalid key input for patient_id: contains '#'");
    }
}
