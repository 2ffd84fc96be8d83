//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StorageError` from `clinical_canvas_core::storage`.
//! Transport failures (timeouts, dispatch failures) become `Unavailable`
//! before any service error is inspected.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

use clinical_canvas_core::storage::StorageError;

/// Pulls transport-level failures out before service error inspection.
fn transport_error<E, R: Debug + Send + Sync + 'static>(
    err: &SdkError<E, R>,
) -> Option<StorageError> {
    match err {
        SdkError::TimeoutError(_) => Some(StorageError::unavailable("request timed out")),
        SdkError::DispatchFailure(failure) => Some(StorageError::unavailable(format!(
            "dispatch failure: {failure:?}"
        ))),
        _ => None,
    }
}

/// Map a GetItem SDK error to StorageError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            StorageError::unavailable("table not found")
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        GetItemError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        err => StorageError::unavailable(format!("GetItem failed: {err:?}")),
    }
}

/// Map a Query SDK error to StorageError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => StorageError::unavailable("table not found"),
        QueryError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        QueryError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        err => StorageError::unavailable(format!("Query failed: {err:?}")),
    }
}

/// Map a Scan SDK error to StorageError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => StorageError::unavailable("table not found"),
        ScanError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        ScanError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        err => StorageError::unavailable(format!("Scan failed: {err:?}")),
    }
}

/// Map a PutItem SDK error to StorageError. A failed condition check means
/// the create collided with an existing record.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    let id_str = id.into();
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StorageError::DuplicateKey {
            entity_type,
            id: id_str,
        },
        PutItemError::ResourceNotFoundException(_) => StorageError::unavailable("table not found"),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        PutItemError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        PutItemError::TransactionConflictException(_) => {
            StorageError::unavailable("transaction conflict, please retry")
        }
        err => StorageError::unavailable(format!("PutItem failed: {err:?}")),
    }
}

/// Map an UpdateItem SDK error to StorageError. A failed condition check
/// means the addressed record does not exist.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    let id_str = id.into();
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => StorageError::NotFound {
            entity_type,
            id: id_str,
        },
        UpdateItemError::ResourceNotFoundException(_) => {
            StorageError::unavailable("table not found")
        }
        UpdateItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        UpdateItemError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        UpdateItemError::TransactionConflictException(_) => {
            StorageError::unavailable("transaction conflict, please retry")
        }
        err => StorageError::unavailable(format!("UpdateItem failed: {err:?}")),
    }
}

/// Map a DeleteItem SDK error to StorageError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    let id_str = id.into();
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => StorageError::NotFound {
            entity_type,
            id: id_str,
        },
        DeleteItemError::ResourceNotFoundException(_) => {
            StorageError::unavailable("table not found")
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        DeleteItemError::TransactionConflictException(_) => {
            StorageError::unavailable("transaction conflict, please retry")
        }
        err => StorageError::unavailable(format!("DeleteItem failed: {err:?}")),
    }
}

/// Map a BatchWriteItem SDK error to StorageError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => {
            StorageError::unavailable("table not found")
        }
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        BatchWriteItemError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        err => StorageError::unavailable(format!("BatchWriteItem failed: {err:?}")),
    }
}

/// Map a note-creation transaction error to StorageError.
///
/// The transaction is submitted as `[put note, update patient]`, so
/// cancellation reasons line up with that order: a failed condition on the
/// note put is a duplicate note; a failed condition on the patient update
/// means the patient does not exist. Anything else aborted the transaction
/// without a write.
pub fn map_note_transact_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
    patient_id: &str,
    note_id: &str,
) -> StorageError {
    if let Some(unavailable) = transport_error(&err) {
        return unavailable;
    }
    match err.into_service_error() {
        TransactWriteItemsError::TransactionCanceledException(cancelled) => {
            let reasons = cancelled.cancellation_reasons.unwrap_or_default();
            let failed = |idx: usize| {
                reasons
                    .get(idx)
                    .and_then(|r| r.code.as_deref())
                    .is_some_and(|code| code == "ConditionalCheckFailed")
            };
            if failed(1) {
                return StorageError::not_found("Patient", patient_id);
            }
            if failed(0) {
                return StorageError::duplicate("Note", note_id);
            }
            let codes: Vec<&str> = reasons
                .iter()
                .filter_map(|r| r.code.as_deref())
                .collect();
            StorageError::TransactionAborted {
                reason: format!("cancelled: {codes:?}"),
            }
        }
        TransactWriteItemsError::TransactionInProgressException(_) => {
            StorageError::TransactionAborted {
                reason: "transaction already in progress".to_string(),
            }
        }
        TransactWriteItemsError::IdempotentParameterMismatchException(_) => {
            StorageError::TransactionAborted {
                reason: "idempotent parameter mismatch".to_string(),
            }
        }
        TransactWriteItemsError::ResourceNotFoundException(_) => {
            StorageError::unavailable("table not found")
        }
        TransactWriteItemsError::ProvisionedThroughputExceededException(_) => {
            StorageError::unavailable("throughput exceeded, please retry")
        }
        TransactWriteItemsError::RequestLimitExceeded(_) => {
            StorageError::unavailable("request limit exceeded, please retry")
        }
        err => StorageError::TransactionAborted {
            reason: format!("TransactWriteItems failed: {err:?}"),
        },
    }
}
