//! Key derivation for the single-table layout.
//!
//! Every record lives under a composite (PK, SK) pair; four GSI projections
//! hang off attributes derived here. Key strings are built from validated
//! identifier components joined by `#`, so identifiers themselves must never
//! contain `#`. Names are only ever the final component of a key, so they are
//! exempt from that rule.
//!
//! Layout:
//!
//! | Record  | PK                  | SK                           |
//! |---------|---------------------|------------------------------|
//! | Patient | `PATIENT#<id>`      | `META`                       |
//! | Task    | `PATIENT#<pid>`     | `TASK#<due>#<task_id>`       |
//! | Note    | `PATIENT#<pid>`     | `NOTE#<created>#<note_id>`   |
//! | Staff   | `USER#<id>`         | `PROFILE`                    |

use chrono::{DateTime, Utc};

use clinical_canvas_core::clinical::{Pathway, StaffRole};
use clinical_canvas_core::storage::{Result, StorageError};

use super::codec::format_ts;

pub const PK_ATTR: &str = "PK";
pub const SK_ATTR: &str = "SK";

pub const PATIENT_PREFIX: &str = "PATIENT#";
pub const META_SK: &str = "META";
pub const TASK_PREFIX: &str = "TASK#";
pub const NOTE_PREFIX: &str = "NOTE#";
pub const USER_PREFIX: &str = "USER#";
pub const PROFILE_SK: &str = "PROFILE";

pub const ASSIGNEE_PREFIX: &str = "ASSIGNEE#";
pub const DUE_PREFIX: &str = "DUE#";
pub const ROLE_PREFIX: &str = "ROLE#";
pub const NAME_PREFIX: &str = "NAME#";
pub const PATHWAY_PREFIX: &str = "PATHWAY#";
pub const STATE_PREFIX: &str = "STATE#";
pub const NOTE_ENTITY_PK: &str = "ENTITY#Note";
pub const TS_PREFIX: &str = "TS#";

/// Rejects identifier components that would corrupt a derived key.
pub fn validate_key_component(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StorageError::InvalidKeyInput {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.contains('#') {
        return Err(StorageError::InvalidKeyInput {
            field,
            reason: "must not contain '#'".to_string(),
        });
    }
    Ok(())
}

pub fn patient_pk(patient_id: &str) -> Result<String> {
    validate_key_component("patient_id", patient_id)?;
    Ok(format!("{PATIENT_PREFIX}{patient_id}"))
}

pub fn patient_sk() -> &'static str {
    META_SK
}

pub fn task_sk(due: DateTime<Utc>, task_id: &str) -> Result<String> {
    validate_key_component("task_id", task_id)?;
    Ok(format!("{TASK_PREFIX}{}#{task_id}", format_ts(due)))
}

pub fn note_sk(created_at: DateTime<Utc>, note_id: &str) -> Result<String> {
    validate_key_component("note_id", note_id)?;
    Ok(format!("{NOTE_PREFIX}{}#{note_id}", format_ts(created_at)))
}

pub fn staff_pk(user_id: &str) -> Result<String> {
    validate_key_component("user_id", user_id)?;
    Ok(format!("{USER_PREFIX}{user_id}"))
}

pub fn staff_sk() -> &'static str {
    PROFILE_SK
}

/// AssigneeDue index partition: all tasks assigned to one staff member.
pub fn task_gsi1_pk(assignee_id: &str) -> Result<String> {
    validate_key_component("assignee_id", assignee_id)?;
    Ok(format!("{ASSIGNEE_PREFIX}{assignee_id}"))
}

/// AssigneeDue index sort key: soonest due first, patient id for context.
pub fn task_gsi1_sk(due: DateTime<Utc>, patient_id: &str) -> Result<String> {
    validate_key_component("patient_id", patient_id)?;
    Ok(format!("{DUE_PREFIX}{}#PATIENT#{patient_id}", format_ts(due)))
}

/// RoleName index partition: all staff holding one role.
pub fn staff_gsi2_pk(role: StaffRole) -> String {
    format!("{ROLE_PREFIX}{}", role.as_str())
}

/// RoleName index sort key. The name is the last key component, so it may
/// contain any character.
pub fn staff_gsi2_sk(name: &str) -> String {
    format!("{NAME_PREFIX}{name}")
}

/// PathwayState index partition: all patients on one pathway.
pub fn patient_gsi3_pk(pathway: Pathway) -> String {
    format!("{PATHWAY_PREFIX}{}", pathway.as_str())
}

/// PathwayState index sort key. The state is validated; the trailing name is
/// the last component and unconstrained.
pub fn patient_gsi3_sk(current_state: &str, name: &str) -> Result<String> {
    validate_key_component("current_state", current_state)?;
    Ok(format!("{STATE_PREFIX}{current_state}#{name}"))
}

/// Prefix of PathwayState sort keys for one state, for prefix queries.
pub fn patient_gsi3_sk_state_prefix(current_state: &str) -> Result<String> {
    validate_key_component("current_state", current_state)?;
    Ok(format!("{STATE_PREFIX}{current_state}#"))
}

/// EntityTS feed partition: every note in the table.
pub fn note_gsi4_pk() -> &'static str {
    NOTE_ENTITY_PK
}

/// EntityTS feed sort key: epoch milliseconds of creation.
pub fn note_gsi4_sk(created_at: DateTime<Utc>) -> String {
    format!("{TS_PREFIX}{}", created_at.timestamp_millis())
}
