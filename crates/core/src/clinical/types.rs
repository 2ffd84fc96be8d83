use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::requests::{NewNote, NewPatient, NewStaffUser, NewTask};
use super::value::Value;

/// Base URL embedded into generated patient QR codes.
pub const QR_CODE_BASE_URL: &str = "https://clinical-canvas.com/qr";

// Stored timestamps carry millisecond precision, so new entities are stamped
// at that precision to survive a storage round trip unchanged.
fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now)
}

/// Clinical pathway a patient is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pathway {
    Surgical,
    Consultation,
    Emergency,
}

impl Pathway {
    /// Wire string stored in the table and embedded into index keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pathway::Surgical => "surgical",
            Pathway::Consultation => "consultation",
            Pathway::Emergency => "emergency",
        }
    }

    /// Parse the wire string back into a pathway.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "surgical" => Some(Pathway::Surgical),
            "consultation" => Some(Pathway::Consultation),
            "emergency" => Some(Pathway::Emergency),
            _ => None,
        }
    }
}

/// Category of clinical task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Lab,
    Medication,
    Procedure,
    Assessment,
    Discharge,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Lab => "lab",
            TaskType::Medication => "medication",
            TaskType::Procedure => "procedure",
            TaskType::Assessment => "assessment",
            TaskType::Discharge => "discharge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lab" => Some(TaskType::Lab),
            "medication" => Some(TaskType::Medication),
            "procedure" => Some(TaskType::Procedure),
            "assessment" => Some(TaskType::Assessment),
            "discharge" => Some(TaskType::Discharge),
            _ => None,
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TaskStatus::Open),
            "in-progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// A task still waiting to be completed.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Open | TaskStatus::InProgress)
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

/// Role of a staff member, used as the RoleName index partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Doctor,
    Nurse,
    Pharmacist,
    Technician,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Pharmacist => "pharmacist",
            StaffRole::Technician => "technician",
            StaffRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(StaffRole::Doctor),
            "nurse" => Some(StaffRole::Nurse),
            "pharmacist" => Some(StaffRole::Pharmacist),
            "technician" => Some(StaffRole::Technician),
            "admin" => Some(StaffRole::Admin),
            _ => None,
        }
    }
}

/// Category of a clinical note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteCategory {
    DoctorNote,
    NurseNote,
    Pharmacy,
    Discharge,
}

impl NoteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::DoctorNote => "doctorNote",
            NoteCategory::NurseNote => "nurseNote",
            NoteCategory::Pharmacy => "pharmacy",
            NoteCategory::Discharge => "discharge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctorNote" => Some(NoteCategory::DoctorNote),
            "nurseNote" => Some(NoteCategory::NurseNote),
            "pharmacy" => Some(NoteCategory::Pharmacy),
            "discharge" => Some(NoteCategory::Discharge),
            _ => None,
        }
    }
}

/// Patient metadata record.
///
/// One per patient; tasks and notes are co-located under the same partition.
/// `update_counter` is bumped transactionally for every note created for this
/// patient and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub qr_code: Option<String>,
    pub pathway: Pathway,
    pub current_state: String,
    pub diagnosis: String,
    pub comorbidities: Vec<String>,
    pub update_counter: i64,
    pub last_updated: DateTime<Utc>,
    pub assigned_doctor: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Builds a fresh patient from a creation request, generating the id,
    /// QR code, and timestamps.
    pub fn new(req: NewPatient) -> Self {
        let patient_id = Uuid::new_v4().to_string();
        let now = now_ms();
        Self {
            qr_code: Some(format!("{QR_CODE_BASE_URL}/{patient_id}")),
            patient_id,
            name: req.name,
            pathway: req.pathway,
            current_state: req.current_state,
            diagnosis: req.diagnosis,
            comorbidities: req.comorbidities,
            update_counter: 0,
            last_updated: now,
            assigned_doctor: req.assigned_doctor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific id (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.patient_id = id.into();
        self.qr_code = Some(format!("{QR_CODE_BASE_URL}/{}", self.patient_id));
        self
    }
}

/// A clinical task, co-located with its patient.
///
/// The due time is embedded in the sort key, so it is not patchable: moving a
/// task to a new due time is a delete plus recreate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub patient_id: String,
    pub title: String,
    pub task_type: TaskType,
    pub due: DateTime<Utc>,
    pub assignee_id: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub recurring: bool,
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(req: NewTask) -> Self {
        let now = now_ms();
        Self {
            task_id: Uuid::new_v4().to_string(),
            patient_id: req.patient_id,
            title: req.title,
            task_type: req.task_type,
            due: req.due,
            assignee_id: req.assignee_id,
            status: TaskStatus::Open,
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            recurring: req.recurring,
            details: req.details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific id (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.task_id = id.into();
        self
    }
}

/// Staff member profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffUser {
    pub user_id: String,
    pub name: String,
    pub role: StaffRole,
    pub avatar: Option<String>,
    pub contact_info: BTreeMap<String, String>,
    pub permissions: Vec<String>,
    pub email: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffUser {
    pub fn new(req: NewStaffUser) -> Self {
        let now = now_ms();
        Self {
            user_id: Uuid::new_v4().to_string(),
            name: req.name,
            role: req.role,
            avatar: req.avatar,
            contact_info: req.contact_info,
            permissions: req.permissions,
            email: req.email,
            password_hash: req.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific id (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = id.into();
        self
    }
}

/// A clinical note attached to a patient.
///
/// Creation time is embedded in the sort key and the EntityTS feed key, so
/// notes keep their position once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    pub patient_id: String,
    pub author_id: String,
    pub category: NoteCategory,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(req: NewNote) -> Self {
        let now = now_ms();
        Self {
            note_id: Uuid::new_v4().to_string(),
            patient_id: req.patient_id,
            author_id: req.author_id,
            category: req.category,
            content: req.content,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathway_wire_strings_round_trip() {
        for pathway in [Pathway::Surgical, Pathway::Consultation, Pathway::Emergency] {
            assert_eq!(Pathway::parse(pathway.as_str()), Some(pathway));
        }
        assert_eq!(Pathway::parse("icu"), None);
    }

    #[test]
    fn test_task_status_wire_strings() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert!(TaskStatus::Open.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Done.is_open());
        assert!(!TaskStatus::Cancelled.is_open());
    }

    #[test]
    fn test_note_category_wire_strings() {
        assert_eq!(NoteCategory::DoctorNote.as_str(), "doctorNote");
        assert_eq!(NoteCategory::parse("nurseNote"), Some(NoteCategory::NurseNote));
        assert_eq!(NoteCategory::parse("doctornote"), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_new_patient_defaults() {
        let patient = Patient::new(NewPatient {
            name: "Jane Roe".to_string(),
            pathway: Pathway::Surgical,
            current_state: "pre-op".to_string(),
            diagnosis: "cholecystitis".to_string(),
            comorbidities: vec!["diabetes".to_string()],
            assigned_doctor: None,
        });

        assert_eq!(patient.update_counter, 0);
        assert_eq!(
            patient.qr_code.as_deref(),
            Some(format!("{QR_CODE_BASE_URL}/{}", patient.patient_id).as_str())
        );
        assert_eq!(patient.created_at, patient.updated_at);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(NewTask {
            patient_id: "p1".to_string(),
            title: "Draw blood".to_string(),
            task_type: TaskType::Lab,
            due: Utc::now(),
            assignee_id: "d1".to_string(),
            priority: None,
            recurring: false,
            details: None,
        });

        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.priority, TaskPriority::Medium);
    }
}
