use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{
    NoteCategory, Pathway, Patient, StaffRole, StaffUser, Task, TaskPriority, TaskStatus, TaskType,
};
use super::value::Value;

/// Payload for creating a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub pathway: Pathway,
    pub current_state: String,
    pub diagnosis: String,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub patient_id: String,
    pub title: String,
    pub task_type: TaskType,
    pub due: DateTime<Utc>,
    pub assignee_id: String,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub details: Option<Value>,
}

/// Payload for creating a staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaffUser {
    pub name: String,
    pub role: StaffRole,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub contact_info: BTreeMap<String, String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
}

/// Payload for creating a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub patient_id: String,
    pub author_id: String,
    pub category: NoteCategory,
    pub content: String,
}

/// Partial update for a patient. Every field is optional; absent fields keep
/// their stored value. The patient id itself is never patchable.
///
/// List and map fields are replaced wholesale when present, never merged
/// element by element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pathway: Option<Pathway>,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub comorbidities: Option<Vec<String>>,
    #[serde(default)]
    pub assigned_doctor: Option<Option<String>>,
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.pathway.is_none()
            && self.current_state.is_none()
            && self.diagnosis.is_none()
            && self.comorbidities.is_none()
            && self.assigned_doctor.is_none()
    }

    /// True when the patch touches a field that feeds the PathwayState index.
    pub fn touches_index_keys(&self) -> bool {
        self.name.is_some() || self.pathway.is_some() || self.current_state.is_some()
    }

    pub fn apply(&self, patient: &mut Patient) {
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(pathway) = self.pathway {
            patient.pathway = pathway;
        }
        if let Some(state) = &self.current_state {
            patient.current_state = state.clone();
        }
        if let Some(diagnosis) = &self.diagnosis {
            patient.diagnosis = diagnosis.clone();
        }
        if let Some(comorbidities) = &self.comorbidities {
            patient.comorbidities = comorbidities.clone();
        }
        if let Some(assigned_doctor) = &self.assigned_doctor {
            patient.assigned_doctor = assigned_doctor.clone();
        }
    }
}

/// Partial update for a task.
///
/// Deliberately has no `due` field: the due time lives in the sort key, so
/// changing it means deleting the task and recreating it at the new position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub details: Option<Option<Value>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.task_type.is_none()
            && self.assignee_id.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.recurring.is_none()
            && self.details.is_none()
    }

    /// True when the patch moves the task to a different AssigneeDue partition.
    pub fn touches_index_keys(&self) -> bool {
        self.assignee_id.is_some()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(task_type) = self.task_type {
            task.task_type = task_type;
        }
        if let Some(assignee_id) = &self.assignee_id {
            task.assignee_id = assignee_id.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(recurring) = self.recurring {
            task.recurring = recurring;
        }
        if let Some(details) = &self.details {
            task.details = details.clone();
        }
    }
}

/// Partial update for a staff member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<StaffRole>,
    #[serde(default)]
    pub avatar: Option<Option<String>>,
    #[serde(default)]
    pub contact_info: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password_hash: Option<Option<String>>,
}

impl StaffPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.avatar.is_none()
            && self.contact_info.is_none()
            && self.permissions.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
    }

    /// True when the patch touches a field that feeds the RoleName index.
    pub fn touches_index_keys(&self) -> bool {
        self.name.is_some() || self.role.is_some()
    }

    pub fn apply(&self, staff: &mut StaffUser) {
        if let Some(name) = &self.name {
            staff.name = name.clone();
        }
        if let Some(role) = self.role {
            staff.role = role;
        }
        if let Some(avatar) = &self.avatar {
            staff.avatar = avatar.clone();
        }
        if let Some(contact_info) = &self.contact_info {
            staff.contact_info = contact_info.clone();
        }
        if let Some(permissions) = &self.permissions {
            staff.permissions = permissions.clone();
        }
        if let Some(email) = &self.email {
            staff.email = email.clone();
        }
        if let Some(password_hash) = &self.password_hash {
            staff.password_hash = password_hash.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_patient_patch_apply() {
        let mut patient = Patient::new(NewPatient {
            name: "Jane Roe".to_string(),
            pathway: Pathway::Surgical,
            current_state: "pre-op".to_string(),
            diagnosis: "cholecystitis".to_string(),
            comorbidities: vec![],
            assigned_doctor: Some("d1".to_string()),
        });

        let patch = PatientPatch {
            current_state: Some("post-op".to_string()),
            assigned_doctor: Some(None),
            ..Default::default()
        };
        assert!(patch.touches_index_keys());
        patch.apply(&mut patient);

        assert_eq!(patient.current_state, "post-op");
        assert_eq!(patient.assigned_doctor, None);
        assert_eq!(patient.name, "Jane Roe");
    }

    #[test]
    fn test_task_patch_has_no_due_field() {
        let mut task = Task::new(NewTask {
            patient_id: "p1".to_string(),
            title: "Draw blood".to_string(),
            task_type: TaskType::Lab,
            due: Utc::now(),
            assignee_id: "d1".to_string(),
            priority: None,
            recurring: false,
            details: None,
        });
        let due = task.due;

        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            details: Some(None),
            ..Default::default()
        };
        assert!(!patch.touches_index_keys());
        patch.apply(&mut task);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.details, None);
        assert_eq!(task.due, due);
    }

    #[test]
    fn test_staff_patch_role_touches_index() {
        let patch = StaffPatch {
            role: Some(StaffRole::Admin),
            ..Default::default()
        };
        assert!(patch.touches_index_keys());
        assert!(!patch.is_empty());
        assert!(StaffPatch::default().is_empty());
    }

    #[test]
    fn test_patch_deserializes_with_absent_fields() {
        let patch: TaskPatch = serde_json::from_str("{\"status\":\"in-progress\"}").unwrap();
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert!(patch.title.is_none());
    }
}
