//! Item conversion functions.
//!
//! Pure functions converting between domain entities and DynamoDB attribute
//! maps, including the derived key attributes. Testable in isolation without
//! DynamoDB access. Both backends store and read the exact shapes produced
//! here.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};

use clinical_canvas_core::clinical::{
    Note, NoteCategory, Pathway, Patient, StaffRole, StaffUser, Task, TaskPriority, TaskStatus,
    TaskType,
};
use clinical_canvas_core::storage::{Result, StorageError};

use super::codec::{decode_value, encode_value, format_ts, parse_ts};
use super::keys;

/// A stored item: attribute name to attribute value.
pub type Item = HashMap<String, AttributeValue>;

pub const ENTITY_TYPE_PATIENT: &str = "Patient";
pub const ENTITY_TYPE_TASK: &str = "Task";
pub const ENTITY_TYPE_STAFF: &str = "StaffUser";
pub const ENTITY_TYPE_NOTE: &str = "Note";

pub const ENTITY_TYPE_ATTR: &str = "entity_type";

// ============================================================================
// Patient conversions
// ============================================================================

pub fn patient_to_item(patient: &Patient) -> Result<Item> {
    let mut item = Item::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::patient_pk(&patient.patient_id)?),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::patient_sk().to_string()),
    );
    item.insert(
        "GSI3PK".to_string(),
        AttributeValue::S(keys::patient_gsi3_pk(patient.pathway)),
    );
    item.insert(
        "GSI3SK".to_string(),
        AttributeValue::S(keys::patient_gsi3_sk(&patient.current_state, &patient.name)?),
    );

    item.insert(
        ENTITY_TYPE_ATTR.to_string(),
        AttributeValue::S(ENTITY_TYPE_PATIENT.to_string()),
    );

    // Data
    item.insert(
        "patient_id".to_string(),
        AttributeValue::S(patient.patient_id.clone()),
    );
    item.insert("name".to_string(), AttributeValue::S(patient.name.clone()));
    if let Some(qr_code) = &patient.qr_code {
        item.insert("qr_code".to_string(), AttributeValue::S(qr_code.clone()));
    }
    item.insert(
        "pathway".to_string(),
        AttributeValue::S(patient.pathway.as_str().to_string()),
    );
    item.insert(
        "current_state".to_string(),
        AttributeValue::S(patient.current_state.clone()),
    );
    item.insert(
        "diagnosis".to_string(),
        AttributeValue::S(patient.diagnosis.clone()),
    );
    item.insert(
        "comorbidities".to_string(),
        string_list_attr(&patient.comorbidities),
    );
    item.insert(
        "update_counter".to_string(),
        AttributeValue::N(patient.update_counter.to_string()),
    );
    item.insert(
        "last_updated".to_string(),
        AttributeValue::S(format_ts(patient.last_updated)),
    );
    if let Some(doctor) = &patient.assigned_doctor {
        item.insert("assigned_doctor".to_string(), AttributeValue::S(doctor.clone()));
    }
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(format_ts(patient.created_at)),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(format_ts(patient.updated_at)),
    );

    Ok(item)
}

pub fn item_to_patient(item: &Item) -> Result<Patient> {
    Ok(Patient {
        patient_id: get_string(item, "patient_id", ENTITY_TYPE_PATIENT)?,
        name: get_string(item, "name", ENTITY_TYPE_PATIENT)?,
        qr_code: get_optional_string(item, "qr_code"),
        pathway: parse_enum(item, "pathway", ENTITY_TYPE_PATIENT, Pathway::parse)?,
        current_state: get_string(item, "current_state", ENTITY_TYPE_PATIENT)?,
        diagnosis: get_string(item, "diagnosis", ENTITY_TYPE_PATIENT)?,
        comorbidities: get_string_list(item, "comorbidities", ENTITY_TYPE_PATIENT)?,
        update_counter: get_i64(item, "update_counter", ENTITY_TYPE_PATIENT)?,
        last_updated: get_datetime(item, "last_updated", ENTITY_TYPE_PATIENT)?,
        assigned_doctor: get_optional_string(item, "assigned_doctor"),
        created_at: get_datetime(item, "created_at", ENTITY_TYPE_PATIENT)?,
        updated_at: get_datetime(item, "updated_at", ENTITY_TYPE_PATIENT)?,
    })
}

// ============================================================================
// Task conversions
// ============================================================================

pub fn task_to_item(task: &Task) -> Result<Item> {
    let mut item = Item::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::patient_pk(&task.patient_id)?),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::task_sk(task.due, &task.task_id)?),
    );
    item.insert(
        "GSI1PK".to_string(),
        AttributeValue::S(keys::task_gsi1_pk(&task.assignee_id)?),
    );
    item.insert(
        "GSI1SK".to_string(),
        AttributeValue::S(keys::task_gsi1_sk(task.due, &task.patient_id)?),
    );

    item.insert(
        ENTITY_TYPE_ATTR.to_string(),
        AttributeValue::S(ENTITY_TYPE_TASK.to_string()),
    );

    // Data
    item.insert("task_id".to_string(), AttributeValue::S(task.task_id.clone()));
    item.insert(
        "patient_id".to_string(),
        AttributeValue::S(task.patient_id.clone()),
    );
    item.insert("title".to_string(), AttributeValue::S(task.title.clone()));
    item.insert(
        "task_type".to_string(),
        AttributeValue::S(task.task_type.as_str().to_string()),
    );
    item.insert("due".to_string(), AttributeValue::S(format_ts(task.due)));
    item.insert(
        "assignee_id".to_string(),
        AttributeValue::S(task.assignee_id.clone()),
    );
    item.insert(
        "status".to_string(),
        AttributeValue::S(task.status.as_str().to_string()),
    );
    item.insert(
        "priority".to_string(),
        AttributeValue::S(task.priority.as_str().to_string()),
    );
    item.insert("recurring".to_string(), AttributeValue::Bool(task.recurring));
    if let Some(details) = &task.details {
        item.insert(
            "details".to_string(),
            encode_value(details, ENTITY_TYPE_TASK)?,
        );
    }
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(format_ts(task.created_at)),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(format_ts(task.updated_at)),
    );

    Ok(item)
}

pub fn item_to_task(item: &Item) -> Result<Task> {
    let details = match item.get("details") {
        Some(av) => Some(decode_value(av, ENTITY_TYPE_TASK)?),
        None => None,
    };

    Ok(Task {
        task_id: get_string(item, "task_id", ENTITY_TYPE_TASK)?,
        patient_id: get_string(item, "patient_id", ENTITY_TYPE_TASK)?,
        title: get_string(item, "title", ENTITY_TYPE_TASK)?,
        task_type: parse_enum(item, "task_type", ENTITY_TYPE_TASK, TaskType::parse)?,
        due: get_datetime(item, "due", ENTITY_TYPE_TASK)?,
        assignee_id: get_string(item, "assignee_id", ENTITY_TYPE_TASK)?,
        status: parse_enum(item, "status", ENTITY_TYPE_TASK, TaskStatus::parse)?,
        priority: parse_enum(item, "priority", ENTITY_TYPE_TASK, TaskPriority::parse)?,
        recurring: get_bool(item, "recurring", ENTITY_TYPE_TASK)?,
        details,
        created_at: get_datetime(item, "created_at", ENTITY_TYPE_TASK)?,
        updated_at: get_datetime(item, "updated_at", ENTITY_TYPE_TASK)?,
    })
}

// ============================================================================
// Staff conversions
// ============================================================================

pub fn staff_to_item(staff: &StaffUser) -> Result<Item> {
    let mut item = Item::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::staff_pk(&staff.user_id)?),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::staff_sk().to_string()),
    );
    item.insert(
        "GSI2PK".to_string(),
        AttributeValue::S(keys::staff_gsi2_pk(staff.role)),
    );
    item.insert(
        "GSI2SK".to_string(),
        AttributeValue::S(keys::staff_gsi2_sk(&staff.name)),
    );

    item.insert(
        ENTITY_TYPE_ATTR.to_string(),
        AttributeValue::S(ENTITY_TYPE_STAFF.to_string()),
    );

    // Data
    item.insert("user_id".to_string(), AttributeValue::S(staff.user_id.clone()));
    item.insert("name".to_string(), AttributeValue::S(staff.name.clone()));
    item.insert(
        "role".to_string(),
        AttributeValue::S(staff.role.as_str().to_string()),
    );
    if let Some(avatar) = &staff.avatar {
        item.insert("avatar".to_string(), AttributeValue::S(avatar.clone()));
    }
    item.insert("contact_info".to_string(), string_map_attr(&staff.contact_info));
    item.insert("permissions".to_string(), string_list_attr(&staff.permissions));
    item.insert("email".to_string(), AttributeValue::S(staff.email.clone()));
    if let Some(hash) = &staff.password_hash {
        item.insert("password_hash".to_string(), AttributeValue::S(hash.clone()));
    }
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(format_ts(staff.created_at)),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(format_ts(staff.updated_at)),
    );

    Ok(item)
}

pub fn item_to_staff(item: &Item) -> Result<StaffUser> {
    Ok(StaffUser {
        user_id: get_string(item, "user_id", ENTITY_TYPE_STAFF)?,
        name: get_string(item, "name", ENTITY_TYPE_STAFF)?,
        role: parse_enum(item, "role", ENTITY_TYPE_STAFF, StaffRole::parse)?,
        avatar: get_optional_string(item, "avatar"),
        contact_info: get_string_map(item, "contact_info", ENTITY_TYPE_STAFF)?,
        permissions: get_string_list(item, "permissions", ENTITY_TYPE_STAFF)?,
        email: get_string(item, "email", ENTITY_TYPE_STAFF)?,
        password_hash: get_optional_string(item, "password_hash"),
        created_at: get_datetime(item, "created_at", ENTITY_TYPE_STAFF)?,
        updated_at: get_datetime(item, "updated_at", ENTITY_TYPE_STAFF)?,
    })
}

// ============================================================================
// Note conversions
// ============================================================================

pub fn note_to_item(note: &Note) -> Result<Item> {
    let mut item = Item::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::patient_pk(&note.patient_id)?),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::note_sk(note.created_at, &note.note_id)?),
    );
    item.insert(
        "GSI4PK".to_string(),
        AttributeValue::S(keys::note_gsi4_pk().to_string()),
    );
    item.insert(
        "GSI4SK".to_string(),
        AttributeValue::S(keys::note_gsi4_sk(note.created_at)),
    );

    item.insert(
        ENTITY_TYPE_ATTR.to_string(),
        AttributeValue::S(ENTITY_TYPE_NOTE.to_string()),
    );

    // Data
    item.insert("note_id".to_string(), AttributeValue::S(note.note_id.clone()));
    item.insert(
        "patient_id".to_string(),
        AttributeValue::S(note.patient_id.clone()),
    );
    item.insert(
        "author_id".to_string(),
        AttributeValue::S(note.author_id.clone()),
    );
    item.insert(
        "category".to_string(),
        AttributeValue::S(note.category.as_str().to_string()),
    );
    item.insert("content".to_string(), AttributeValue::S(note.content.clone()));
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(format_ts(note.created_at)),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(format_ts(note.updated_at)),
    );

    Ok(item)
}

pub fn item_to_note(item: &Item) -> Result<Note> {
    Ok(Note {
        note_id: get_string(item, "note_id", ENTITY_TYPE_NOTE)?,
        patient_id: get_string(item, "patient_id", ENTITY_TYPE_NOTE)?,
        author_id: get_string(item, "author_id", ENTITY_TYPE_NOTE)?,
        category: parse_enum(item, "category", ENTITY_TYPE_NOTE, NoteCategory::parse)?,
        content: get_string(item, "content", ENTITY_TYPE_NOTE)?,
        created_at: get_datetime(item, "created_at", ENTITY_TYPE_NOTE)?,
        updated_at: get_datetime(item, "updated_at", ENTITY_TYPE_NOTE)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn string_list_attr(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn string_map_attr(map: &BTreeMap<String, String>) -> AttributeValue {
    AttributeValue::M(
        map.iter()
            .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
            .collect(),
    )
}

fn get_string(item: &Item, key: &str, entity_type: &'static str) -> Result<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| StorageError::codec(entity_type, format!("missing or invalid field: {key}")))
}

fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

fn get_datetime(item: &Item, key: &str, entity_type: &'static str) -> Result<DateTime<Utc>> {
    let s = get_string(item, key, entity_type)?;
    parse_ts(&s)
        .ok_or_else(|| StorageError::codec(entity_type, format!("invalid timestamp in {key}: {s}")))
}

fn get_bool(item: &Item, key: &str, entity_type: &'static str) -> Result<bool> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| StorageError::codec(entity_type, format!("missing or invalid field: {key}")))
}

fn get_i64(item: &Item, key: &str, entity_type: &'static str) -> Result<i64> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StorageError::codec(entity_type, format!("missing or invalid field: {key}")))
}

fn get_string_list(item: &Item, key: &str, entity_type: &'static str) -> Result<Vec<String>> {
    let list = item
        .get(key)
        .and_then(|v| v.as_l().ok())
        .ok_or_else(|| StorageError::codec(entity_type, format!("missing or invalid field: {key}")))?;
    list.iter()
        .map(|av| {
            av.as_s().map(|s| s.to_string()).map_err(|_| {
                StorageError::codec(entity_type, format!("non-string element in {key}"))
            })
        })
        .collect()
}

fn get_string_map(
    item: &Item,
    key: &str,
    entity_type: &'static str,
) -> Result<BTreeMap<String, String>> {
    let map = item
        .get(key)
        .and_then(|v| v.as_m().ok())
        .ok_or_else(|| StorageError::codec(entity_type, format!("missing or invalid field: {key}")))?;
    let mut out = BTreeMap::new();
    for (k, av) in map {
        let s = av.as_s().map_err(|_| {
            StorageError::codec(entity_type, format!("non-string value in {key}"))
        })?;
        out.insert(k.clone(), s.to_string());
    }
    Ok(out)
}

fn parse_enum<T>(
    item: &Item,
    key: &str,
    entity_type: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
    let s = get_string(item, key, entity_type)?;
    parse(&s).ok_or_else(|| StorageError::codec(entity_type, format!("unknown {key}: {s}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use clinical_canvas_core::clinical::{
        NewNote, NewPatient, NewStaffUser, NewTask, Value,
    };

    use super::*;

    fn sample_patient() -> Patient {
        let mut patient = Patient::new(NewPatient {
            name: "Jane Roe".to_string(),
            pathway: Pathway::Surgical,
            current_state: "pre-op".to_string(),
            diagnosis: "cholecystitis".to_string(),
            comorbidities: vec!["diabetes".to_string(), "hypertension".to_string()],
            assigned_doctor: Some("d-1".to_string()),
        })
        .with_id("p-1");
        patient.update_counter = 3;
        patient
    }

    #[test]
    fn test_patient_round_trip() {
        let patient = sample_patient();
        let item = patient_to_item(&patient).unwrap();

        assert_eq!(item["PK"].as_s().unwrap(), "PATIENT#p-1");
        assert_eq!(item["SK"].as_s().unwrap(), "META");
        assert_eq!(item["GSI3PK"].as_s().unwrap(), "PATHWAY#surgical");
        assert_eq!(item["GSI3SK"].as_s().unwrap(), "STATE#pre-op#Jane Roe");
        assert_eq!(item[ENTITY_TYPE_ATTR].as_s().unwrap(), "Patient");

        assert_eq!(item_to_patient(&item).unwrap(), patient);
    }

    #[test]
    fn test_patient_without_optionals() {
        let mut patient = sample_patient();
        patient.assigned_doctor = None;
        patient.qr_code = None;

        let item = patient_to_item(&patient).unwrap();
        assert!(!item.contains_key("assigned_doctor"));
        assert!(!item.contains_key("qr_code"));
        assert_eq!(item_to_patient(&item).unwrap(), patient);
    }

    #[test]
    fn test_task_round_trip_with_details() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut map = std::collections::BTreeMap::new();
        map.insert("dose_mg".to_string(), Value::Number(250.0));
        let task = Task::new(NewTask {
            patient_id: "p-1".to_string(),
            title: "Administer antibiotics".to_string(),
            task_type: TaskType::Medication,
            due,
            assignee_id: "n-1".to_string(),
            priority: Some(TaskPriority::High),
            recurring: true,
            details: Some(Value::Map(map)),
        })
        .with_id("t-1");

        let item = task_to_item(&task).unwrap();
        assert_eq!(item["PK"].as_s().unwrap(), "PATIENT#p-1");
        assert_eq!(item["SK"].as_s().unwrap(), "TASK#2026-03-01T09:00:00.000Z#t-1");
        assert_eq!(item["GSI1PK"].as_s().unwrap(), "ASSIGNEE#n-1");
        assert_eq!(
            item["GSI1SK"].as_s().unwrap(),
            "DUE#2026-03-01T09:00:00.000Z#PATIENT#p-1"
        );
        assert_eq!(item["status"].as_s().unwrap(), "open");
        assert_eq!(item["priority"].as_s().unwrap(), "high");

        assert_eq!(item_to_task(&item).unwrap(), task);
    }

    #[test]
    fn test_staff_round_trip() {
        let mut contact_info = BTreeMap::new();
        contact_info.insert("phone".to_string(), "555-0100".to_string());
        let staff = StaffUser::new(NewStaffUser {
            name: "Riley Chen".to_string(),
            role: StaffRole::Nurse,
            email: "riley@example.com".to_string(),
            avatar: None,
            contact_info,
            permissions: vec!["tasks:write".to_string()],
            password_hash: Some("$argon2id$stub".to_string()),
        })
        .with_id("u-1");

        let item = staff_to_item(&staff).unwrap();
        assert_eq!(item["PK"].as_s().unwrap(), "USER#u-1");
        assert_eq!(item["SK"].as_s().unwrap(), "PROFILE");
        assert_eq!(item["GSI2PK"].as_s().unwrap(), "ROLE#nurse");
        assert_eq!(item["GSI2SK"].as_s().unwrap(), "NAME#Riley Chen");

        assert_eq!(item_to_staff(&item).unwrap(), staff);
    }

    #[test]
    fn test_note_round_trip() {
        let note = Note::new(NewNote {
            patient_id: "p-1".to_string(),
            author_id: "d-1".to_string(),
            category: NoteCategory::DoctorNote,
            content: "Recovering well.".to_string(),
        });

        let item = note_to_item(&note).unwrap();
        assert_eq!(item["PK"].as_s().unwrap(), "PATIENT#p-1");
        assert!(item["SK"].as_s().unwrap().starts_with("NOTE#"));
        assert_eq!(item["GSI4PK"].as_s().unwrap(), "ENTITY#Note");
        assert!(item["GSI4SK"].as_s().unwrap().starts_with("TS#"));
        assert_eq!(item["category"].as_s().unwrap(), "doctorNote");

        assert_eq!(item_to_note(&item).unwrap(), note);
    }

    #[test]
    fn test_missing_field_is_codec_error() {
        let patient = sample_patient();
        let mut item = patient_to_item(&patient).unwrap();
        item.remove("diagnosis");

        let err = item_to_patient(&item).unwrap_err();
        assert!(matches!(err, StorageError::Codec { entity_type: "Patient", .. }));
    }

    #[test]
    fn test_unknown_enum_value_is_codec_error() {
        let patient = sample_patient();
        let mut item = patient_to_item(&patient).unwrap();
        item.insert(
            "pathway".to_string(),
            AttributeValue::S("icu".to_string()),
        );

        let err = item_to_patient(&item).unwrap_err();
        assert!(matches!(err, StorageError::Codec { .. }));
    }

    #[test]
    fn test_invalid_patient_id_fails_encoding() {
        let patient = sample_patient().with_id("p#1");
        let err = patient_to_item(&patient).unwrap_err();
        assert!(matches!(err, StorageError::InvalidKeyInput { .. }));
    }
}
