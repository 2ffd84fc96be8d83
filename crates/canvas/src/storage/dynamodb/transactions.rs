//! Transaction assembly for multi-item writes.

use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem, Update};
use chrono::{DateTime, Utc};

use clinical_canvas_core::storage::{Result, StorageError};

use crate::storage::codec::format_ts;
use crate::storage::items::Item;
use crate::storage::keys;

/// Update expression bumping the patient counter when a note lands.
pub const NOTE_COUNTER_UPDATE: &str =
    "ADD update_counter :inc SET last_updated = :ts, updated_at = :ts";

/// Builds the note-creation transaction: put the note, conditioned on its
/// sort key being free, and bump the owning patient's counter, conditioned
/// on the patient existing. Item order is load-bearing for error mapping:
/// the note put is first, the patient update second.
pub fn note_create_items(
    table_name: &str,
    note_item: Item,
    patient_pk: &str,
    ts: DateTime<Utc>,
) -> Result<Vec<TransactWriteItem>> {
    let put = Put::builder()
        .table_name(table_name)
        .set_item(Some(note_item))
        .condition_expression("attribute_not_exists(SK)")
        .build()
        .map_err(|e| StorageError::codec("Note", format!("building transaction put: {e}")))?;

    let update = Update::builder()
        .table_name(table_name)
        .key(keys::PK_ATTR, AttributeValue::S(patient_pk.to_string()))
        .key(keys::SK_ATTR, AttributeValue::S(keys::patient_sk().to_string()))
        .update_expression(NOTE_COUNTER_UPDATE)
        .condition_expression("attribute_exists(PK)")
        .expression_attribute_values(":inc", AttributeValue::N("1".to_string()))
        .expression_attribute_values(":ts", AttributeValue::S(format_ts(ts)))
        .build()
        .map_err(|e| StorageError::codec("Note", format!("building transaction update: {e}")))?;

    Ok(vec![
        TransactWriteItem::builder().put(put).build(),
        TransactWriteItem::builder().update(update).build(),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use clinical_canvas_core::clinical::{NewNote, Note, NoteCategory};

    use crate::storage::items::note_to_item;

    use super::*;

    #[test]
    fn test_note_transaction_shape() {
        let note = Note::new(NewNote {
            patient_id: "p-1".to_string(),
            author_id: "d-1".to_string(),
            category: NoteCategory::NurseNote,
            content: "Vitals stable.".to_string(),
        });
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        let items = note_create_items(
            "clinical-canvas",
            note_to_item(&note).unwrap(),
            "PATIENT#p-1",
            ts,
        )
        .unwrap();

        assert_eq!(items.len(), 2);

        let put = items[0].put().unwrap();
        assert_eq!(put.condition_expression(), Some("attribute_not_exists(SK)"));

        let update = items[1].update().unwrap();
        assert_eq!(update.update_expression(), NOTE_COUNTER_UPDATE);
        assert_eq!(update.condition_expression(), Some("attribute_exists(PK)"));
        assert_eq!(update.key()["PK"], AttributeValue::S("PATIENT#p-1".to_string()));
        assert_eq!(update.key()["SK"], AttributeValue::S("META".to_string()));
        let values = update.expression_attribute_values().unwrap();
        assert_eq!(values[":inc"], AttributeValue::N("1".to_string()));
        assert_eq!(
            values[":ts"],
            AttributeValue::S("2026-03-01T09:00:00.000Z".to_string())
        );
    }
}
