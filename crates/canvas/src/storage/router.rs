//! Query planning.
//!
//! Listing operations are described as backend-agnostic [`QueryPlan`]s built
//! here, then executed by whichever backend is active. Plans name the index
//! and the exact key strings, so the local backend answers queries against
//! the same keys the production table would see. Falling back to a table
//! scan is legal but logged, since a scan reads every record.

use tracing::{debug, info};

use clinical_canvas_core::clinical::{Patient, StaffRole, Task};
use clinical_canvas_core::storage::{PatientFilter, Result, TaskFilter};

use super::keys;

/// AssigneeDue: tasks for one staff member ordered by due time.
pub const INDEX_ASSIGNEE_DUE: &str = "GSI1";
/// RoleName: staff for one role ordered by name.
pub const INDEX_ROLE_NAME: &str = "GSI2";
/// PathwayState: patients for one pathway ordered by state then name.
pub const INDEX_PATHWAY_STATE: &str = "GSI3";
/// EntityTS: all notes ordered by creation time.
pub const INDEX_ENTITY_TS: &str = "GSI4";

/// Key attribute names projected into each index.
pub fn index_key_attrs(index: &'static str) -> (&'static str, &'static str) {
    match index {
        INDEX_ASSIGNEE_DUE => ("GSI1PK", "GSI1SK"),
        INDEX_ROLE_NAME => ("GSI2PK", "GSI2SK"),
        INDEX_PATHWAY_STATE => ("GSI3PK", "GSI3SK"),
        INDEX_ENTITY_TS => ("GSI4PK", "GSI4SK"),
        _ => (keys::PK_ATTR, keys::SK_ATTR),
    }
}

/// A backend-agnostic description of one listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Query a GSI partition, optionally narrowed by a sort key prefix.
    Index {
        index: &'static str,
        pk: String,
        sk_prefix: Option<String>,
        newest_first: bool,
        limit: Option<usize>,
    },
    /// Query the base table partition, optionally narrowed by a sort key
    /// prefix.
    Partition {
        pk: String,
        sk_prefix: Option<String>,
        newest_first: bool,
        limit: Option<usize>,
    },
    /// Read every record and filter in process. Last resort.
    Scan(ScanFilter),
}

/// Server-side predicate for scan plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// All patient metadata records.
    PatientMeta,
    /// The staff profile with this email.
    StaffByEmail(String),
}

/// Tasks assigned to one staff member, soonest due first.
pub fn plan_tasks_by_assignee(assignee_id: &str, limit: Option<usize>) -> Result<QueryPlan> {
    let pk = keys::task_gsi1_pk(assignee_id)?;
    debug!(index = INDEX_ASSIGNEE_DUE, %pk, "planned index query");
    Ok(QueryPlan::Index {
        index: INDEX_ASSIGNEE_DUE,
        pk,
        sk_prefix: Some(keys::DUE_PREFIX.to_string()),
        newest_first: false,
        limit,
    })
}

/// All tasks under one patient, soonest due first.
pub fn plan_tasks_by_patient(patient_id: &str) -> Result<QueryPlan> {
    let pk = keys::patient_pk(patient_id)?;
    debug!(%pk, prefix = keys::TASK_PREFIX, "planned partition query");
    Ok(QueryPlan::Partition {
        pk,
        sk_prefix: Some(keys::TASK_PREFIX.to_string()),
        newest_first: false,
        limit: None,
    })
}

/// Notes for one patient, newest first.
pub fn plan_notes_by_patient(patient_id: &str) -> Result<QueryPlan> {
    let pk = keys::patient_pk(patient_id)?;
    debug!(%pk, prefix = keys::NOTE_PREFIX, "planned partition query");
    Ok(QueryPlan::Partition {
        pk,
        sk_prefix: Some(keys::NOTE_PREFIX.to_string()),
        newest_first: true,
        limit: None,
    })
}

/// The most recent notes across every patient, newest first.
pub fn plan_recent_notes(limit: usize) -> QueryPlan {
    debug!(index = INDEX_ENTITY_TS, limit, "planned index query");
    QueryPlan::Index {
        index: INDEX_ENTITY_TS,
        pk: keys::note_gsi4_pk().to_string(),
        sk_prefix: None,
        newest_first: true,
        limit: Some(limit),
    }
}

/// Staff holding one role, ordered by name.
pub fn plan_staff_by_role(role: StaffRole) -> QueryPlan {
    let pk = keys::staff_gsi2_pk(role);
    debug!(index = INDEX_ROLE_NAME, %pk, "planned index query");
    QueryPlan::Index {
        index: INDEX_ROLE_NAME,
        pk,
        sk_prefix: Some(keys::NAME_PREFIX.to_string()),
        newest_first: false,
        limit: None,
    }
}

/// Staff profile lookup by email. There is no email index, so this is a scan.
pub fn plan_staff_by_email(email: &str) -> QueryPlan {
    info!(%email, "no index covers email lookup, falling back to table scan");
    QueryPlan::Scan(ScanFilter::StaffByEmail(email.to_string()))
}

/// Patient listing. A pathway filter routes to the PathwayState index,
/// optionally narrowed to one state; anything else scans patient metadata.
pub fn plan_patients(filter: &PatientFilter) -> Result<QueryPlan> {
    if let Some(pathway) = filter.pathway {
        let pk = keys::patient_gsi3_pk(pathway);
        let sk_prefix = match &filter.current_state {
            Some(state) => Some(keys::patient_gsi3_sk_state_prefix(state)?),
            None => Some(keys::STATE_PREFIX.to_string()),
        };
        debug!(index = INDEX_PATHWAY_STATE, %pk, "planned index query");
        return Ok(QueryPlan::Index {
            index: INDEX_PATHWAY_STATE,
            pk,
            sk_prefix,
            newest_first: false,
            limit: None,
        });
    }

    info!("patient listing without a pathway filter, falling back to table scan");
    Ok(QueryPlan::Scan(ScanFilter::PatientMeta))
}

/// Residual predicate applied in process after a patient plan runs. The plan
/// only narrows by pathway and state; the rest is filtered here.
pub fn patient_matches(patient: &Patient, filter: &PatientFilter) -> bool {
    if let Some(pathway) = filter.pathway {
        if patient.pathway != pathway {
            return false;
        }
    }
    if let Some(state) = &filter.current_state {
        if &patient.current_state != state {
            return false;
        }
    }
    if let Some(doctor) = &filter.assigned_doctor {
        if patient.assigned_doctor.as_deref() != Some(doctor.as_str()) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let in_name = patient.name.to_lowercase().contains(&needle);
        let in_diagnosis = patient.diagnosis.to_lowercase().contains(&needle);
        if !in_name && !in_diagnosis {
            return false;
        }
    }
    true
}

/// Residual predicate applied in process after a task plan runs.
pub fn task_matches(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(status) = filter.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if task.priority != priority {
            return false;
        }
    }
    if let Some(due_before) = filter.due_before {
        if task.due >= due_before {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use clinical_canvas_core::clinical::{
        NewPatient, NewTask, Pathway, TaskPriority, TaskStatus, TaskType,
    };
    use clinical_canvas_core::storage::StorageError;

    use super::*;

    #[test]
    fn test_assignee_plan_targets_gsi1() {
        let plan = plan_tasks_by_assignee("d-1", Some(50)).unwrap();
        assert_eq!(
            plan,
            QueryPlan::Index {
                index: INDEX_ASSIGNEE_DUE,
                pk: "ASSIGNEE#d-1".to_string(),
                sk_prefix: Some("DUE#".to_string()),
                newest_first: false,
                limit: Some(50),
            }
        );
    }

    #[test]
    fn test_pathway_filter_routes_to_index() {
        let filter = PatientFilter {
            pathway: Some(Pathway::Surgical),
            current_state: Some("pre-op".to_string()),
            ..Default::default()
        };
        let plan = plan_patients(&filter).unwrap();
        assert_eq!(
            plan,
            QueryPlan::Index {
                index: INDEX_PATHWAY_STATE,
                pk: "PATHWAY#surgical".to_string(),
                sk_prefix: Some("STATE#pre-op#".to_string()),
                newest_first: false,
                limit: None,
            }
        );
    }

    #[test]
    fn test_unindexed_patient_filter_scans() {
        let filter = PatientFilter {
            search: Some("chole".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan_patients(&filter).unwrap(),
            QueryPlan::Scan(ScanFilter::PatientMeta)
        );
    }

    #[test]
    fn test_recent_notes_plan_is_newest_first() {
        let plan = plan_recent_notes(20);
        assert!(matches!(
            plan,
            QueryPlan::Index { index: INDEX_ENTITY_TS, newest_first: true, limit: Some(20), .. }
        ));
    }

    #[test]
    fn test_invalid_assignee_rejected_before_any_io() {
        assert!(matches!(
            plan_tasks_by_assignee("a#b", None),
            Err(StorageError::InvalidKeyInput { field: "assignee_id", .. })
        ));
    }

    #[test]
    fn test_patient_matches_search_is_case_insensitive() {
        let patient = Patient::new(NewPatient {
            name: "Jane Roe".to_string(),
            pathway: Pathway::Surgical,
            current_state: "pre-op".to_string(),
            diagnosis: "Cholecystitis".to_string(),
            comorbidities: vec![],
            assigned_doctor: Some("d-1".to_string()),
        });

        let filter = PatientFilter { search: Some("CHOLE".to_string()), ..Default::default() };
        assert!(patient_matches(&patient, &filter));

        let filter = PatientFilter { search: Some("fracture".to_string()), ..Default::default() };
        assert!(!patient_matches(&patient, &filter));

        let filter = PatientFilter {
            assigned_doctor: Some("d-2".to_string()),
            ..Default::default()
        };
        assert!(!patient_matches(&patient, &filter));
    }

    #[test]
    fn test_task_matches_filters() {
        let task = Task::new(NewTask {
            patient_id: "p-1".to_string(),
            title: "Draw blood".to_string(),
            task_type: TaskType::Lab,
            due: Utc::now() + Duration::hours(1),
            assignee_id: "n-1".to_string(),
            priority: Some(TaskPriority::High),
            recurring: false,
            details: None,
        });

        let filter = TaskFilter { status: Some(TaskStatus::Open), ..Default::default() };
        assert!(task_matches(&task, &filter));

        let filter = TaskFilter { status: Some(TaskStatus::Done), ..Default::default() };
        assert!(!task_matches(&task, &filter));

        let filter = TaskFilter { due_before: Some(Utc::now()), ..Default::default() };
        assert!(!task_matches(&task, &filter));
    }
}
