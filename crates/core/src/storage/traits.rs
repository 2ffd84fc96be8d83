use async_trait::async_trait;

use crate::clinical::{
    NewNote, NewPatient, NewStaffUser, NewTask, Note, Patient, PatientPatch, StaffPatch,
    StaffUser, Task, TaskPatch,
};

use super::error::Result;
use super::types::{PatientFilter, TaskFilter, TaskKey};

/// Storage operations for patient metadata records.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Creates a patient, failing with `DuplicateKey` if one already exists
    /// under the generated id.
    async fn create_patient(&self, req: NewPatient) -> Result<Patient>;

    /// Fetches a patient by id. `Ok(None)` when the record does not exist.
    async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>>;

    /// Applies a partial update and returns the stored record after the
    /// write. Index keys derived from patched fields are recomputed in the
    /// same write.
    async fn update_patient(&self, patient_id: &str, patch: PatientPatch) -> Result<Patient>;

    /// Deletes a patient together with every task and note under its
    /// partition. A partially applied cascade surfaces as `PartialCascade`
    /// with the surviving keys.
    async fn delete_patient(&self, patient_id: &str) -> Result<()>;

    /// Lists patients, filtered client-side, up to `limit` records.
    async fn list_patients(&self, filter: PatientFilter, limit: usize) -> Result<Vec<Patient>>;
}

/// Storage operations for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, req: NewTask) -> Result<Task>;

    async fn get_task(&self, key: &TaskKey) -> Result<Option<Task>>;

    /// Applies a partial update. The due time is not patchable; callers move
    /// a task by deleting it and creating a replacement.
    async fn update_task(&self, key: &TaskKey, patch: TaskPatch) -> Result<Task>;

    async fn delete_task(&self, key: &TaskKey) -> Result<()>;

    /// Tasks assigned to one staff member, soonest due first.
    async fn list_tasks_by_assignee(
        &self,
        assignee_id: &str,
        filter: TaskFilter,
        limit: usize,
    ) -> Result<Vec<Task>>;

    /// All tasks under one patient's partition, soonest due first.
    async fn list_tasks_by_patient(&self, patient_id: &str) -> Result<Vec<Task>>;
}

/// Storage operations for staff profiles.
#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create_staff(&self, req: NewStaffUser) -> Result<StaffUser>;

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffUser>>;

    /// Looks a staff member up by email. Backed by a scan, so intended for
    /// login flows only.
    async fn get_staff_by_email(&self, email: &str) -> Result<Option<StaffUser>>;

    async fn update_staff(&self, user_id: &str, patch: StaffPatch) -> Result<StaffUser>;

    /// Staff members holding one role, ordered by name.
    async fn list_staff_by_role(&self, role: crate::clinical::StaffRole) -> Result<Vec<StaffUser>>;
}

/// Storage operations for clinical notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Writes the note and bumps the owning patient's `update_counter` in one
    /// transaction. Fails with `NotFound` when the patient does not exist and
    /// nothing is written.
    async fn create_note(&self, req: NewNote) -> Result<Note>;

    /// Notes for one patient, newest first.
    async fn list_notes_by_patient(&self, patient_id: &str) -> Result<Vec<Note>>;

    /// The most recent notes across all patients, newest first.
    async fn list_recent_notes(&self, limit: usize) -> Result<Vec<Note>>;
}
