use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clinical::{Pathway, TaskPriority, TaskStatus};

/// Raw partition/sort key pair of a stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self { pk: pk.into(), sk: sk.into() }
    }
}

/// Full address of a task.
///
/// Tasks live under their patient's partition with the due time embedded in
/// the sort key, so the patient id and the exact sort key together are the
/// only way to address one without a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskKey {
    pub patient_id: String,
    pub sort_key: String,
}

impl TaskKey {
    pub fn new(patient_id: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self { patient_id: patient_id.into(), sort_key: sort_key.into() }
    }
}

/// Client-side filter applied to patient listings after the index query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientFilter {
    #[serde(default)]
    pub pathway: Option<Pathway>,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
    /// Case-insensitive substring match on name or diagnosis.
    #[serde(default)]
    pub search: Option<String>,
}

impl PatientFilter {
    pub fn is_empty(&self) -> bool {
        self.pathway.is_none()
            && self.current_state.is_none()
            && self.assigned_doctor.is_none()
            && self.search.is_none()
    }
}

/// Client-side filter applied to task listings after the index query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.due_before.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        assert!(PatientFilter::default().is_empty());
        assert!(TaskFilter::default().is_empty());

        let filter = PatientFilter { pathway: Some(Pathway::Emergency), ..Default::default() };
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_task_key_fields() {
        let key = TaskKey::new("p-1", "TASK#2026-03-01T09:00:00.000Z#t-1");
        assert_eq!(key.patient_id, "p-1");
        assert!(key.sort_key.starts_with("TASK#"));
    }
}
