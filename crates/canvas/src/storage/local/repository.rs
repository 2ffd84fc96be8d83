//! In-process repository implementation.
//!
//! Stores encoded items in a `BTreeMap` keyed by (PK, SK) and executes the
//! same query plans the DynamoDB backend does, against the same key strings
//! and item shapes. Used for tests and local development; data is lost when
//! the repository is dropped.
//!
//! Fault injection knobs let tests exercise the failure paths the production
//! backend maps from service errors: an aborted note transaction and a
//! cascade delete that stops partway.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clinical_canvas_core::clinical::{
    NewNote, NewPatient, NewStaffUser, NewTask, Note, Patient, PatientPatch, StaffPatch,
    StaffRole, StaffUser, Task, TaskPatch,
};
use clinical_canvas_core::storage::{
    ItemKey, NoteRepository, PatientFilter, PatientRepository, Result, StaffRepository,
    StorageError, TaskFilter, TaskKey, TaskRepository,
};

use crate::storage::codec::now_ms;
use crate::storage::items::{
    self, item_to_note, item_to_patient, item_to_staff, item_to_task, note_to_item,
    patient_to_item, staff_to_item, task_to_item, Item,
};
use crate::storage::keys;
use crate::storage::router::{
    self, index_key_attrs, patient_matches, task_matches, QueryPlan, ScanFilter,
};

type Table = BTreeMap<(String, String), Item>;

#[derive(Debug, Default)]
struct Faults {
    fail_next_transact: Option<String>,
    fail_cascade_after: Option<usize>,
}

/// In-process storage backend.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    table: Arc<RwLock<Table>>,
    faults: Arc<RwLock<Faults>>,
}

impl LocalRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next note-creation transaction abort without writing.
    pub async fn fail_next_transaction(&self, reason: impl Into<String>) {
        self.faults.write().await.fail_next_transact = Some(reason.into());
    }

    /// Makes the next cascade delete stop after removing `count` items.
    pub async fn fail_cascade_after(&self, count: usize) {
        self.faults.write().await.fail_cascade_after = Some(count);
    }

    /// Number of stored items, across all entity types.
    pub async fn item_count(&self) -> usize {
        self.table.read().await.len()
    }

    async fn run_plan(&self, plan: &QueryPlan) -> Vec<Item> {
        let table = self.table.read().await;
        execute_plan(&table, plan)
    }

    fn task_table_key(key: &TaskKey) -> Result<(String, String)> {
        if !key.sort_key.starts_with(keys::TASK_PREFIX) {
            return Err(StorageError::InvalidKeyInput {
                field: "sort_key",
                reason: format!("expected a '{}' sort key", keys::TASK_PREFIX),
            });
        }
        Ok((keys::patient_pk(&key.patient_id)?, key.sort_key.clone()))
    }
}

fn attr_s<'a>(item: &'a Item, attr: &str) -> Option<&'a str> {
    item.get(attr).and_then(|v| v.as_s().ok()).map(|s| s.as_str())
}

fn execute_plan(table: &Table, plan: &QueryPlan) -> Vec<Item> {
    match plan {
        QueryPlan::Index { index, pk, sk_prefix, newest_first, limit } => {
            let (pk_attr, sk_attr) = index_key_attrs(index);
            key_query(table, pk_attr, sk_attr, pk, sk_prefix.as_deref(), *newest_first, *limit)
        }
        QueryPlan::Partition { pk, sk_prefix, newest_first, limit } => key_query(
            table,
            keys::PK_ATTR,
            keys::SK_ATTR,
            pk,
            sk_prefix.as_deref(),
            *newest_first,
            *limit,
        ),
        QueryPlan::Scan(filter) => table
            .values()
            .filter(|item| scan_matches(item, filter))
            .cloned()
            .collect(),
    }
}

fn key_query(
    table: &Table,
    pk_attr: &str,
    sk_attr: &str,
    pk: &str,
    sk_prefix: Option<&str>,
    newest_first: bool,
    limit: Option<usize>,
) -> Vec<Item> {
    let mut matched: Vec<&Item> = table
        .values()
        .filter(|item| attr_s(item, pk_attr) == Some(pk))
        .filter(|item| match sk_prefix {
            Some(prefix) => attr_s(item, sk_attr).is_some_and(|sk| sk.starts_with(prefix)),
            None => attr_s(item, sk_attr).is_some(),
        })
        .collect();

    matched.sort_by_key(|item| attr_s(item, sk_attr).unwrap_or_default().to_string());
    if newest_first {
        matched.reverse();
    }
    if let Some(limit) = limit {
        matched.truncate(limit);
    }
    matched.into_iter().cloned().collect()
}

fn scan_matches(item: &Item, filter: &ScanFilter) -> bool {
    match filter {
        ScanFilter::PatientMeta => attr_s(item, keys::SK_ATTR) == Some(keys::META_SK),
        ScanFilter::StaffByEmail(email) => {
            attr_s(item, keys::SK_ATTR) == Some(keys::PROFILE_SK)
                && attr_s(item, "email") == Some(email.as_str())
        }
    }
}

// ============================================================================
// PatientRepository implementation
// ============================================================================

#[async_trait]
impl PatientRepository for LocalRepository {
    async fn create_patient(&self, req: NewPatient) -> Result<Patient> {
        let patient = Patient::new(req);
        let item = patient_to_item(&patient)?;
        let key = (keys::patient_pk(&patient.patient_id)?, keys::patient_sk().to_string());

        let mut table = self.table.write().await;
        if table.contains_key(&key) {
            return Err(StorageError::duplicate(
                items::ENTITY_TYPE_PATIENT,
                patient.patient_id,
            ));
        }
        table.insert(key, item);
        Ok(patient)
    }

    async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>> {
        let key = (keys::patient_pk(patient_id)?, keys::patient_sk().to_string());
        let table = self.table.read().await;
        match table.get(&key) {
            Some(item) => Ok(Some(item_to_patient(item)?)),
            None => Ok(None),
        }
    }

    async fn update_patient(&self, patient_id: &str, patch: PatientPatch) -> Result<Patient> {
        let key = (keys::patient_pk(patient_id)?, keys::patient_sk().to_string());
        let mut table = self.table.write().await;
        let item = table
            .get(&key)
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_PATIENT, patient_id))?;

        let mut patient = item_to_patient(item)?;
        if patch.is_empty() {
            return Ok(patient);
        }
        patch.apply(&mut patient);
        patient.updated_at = now_ms();

        // Re-encoding recomputes the derived index keys.
        table.insert(key, patient_to_item(&patient)?);
        Ok(patient)
    }

    async fn delete_patient(&self, patient_id: &str) -> Result<()> {
        let pk = keys::patient_pk(patient_id)?;
        let mut table = self.table.write().await;
        let all_keys: Vec<(String, String)> = table
            .keys()
            .filter(|(item_pk, _)| item_pk == &pk)
            .cloned()
            .collect();
        if all_keys.is_empty() {
            return Err(StorageError::not_found(items::ENTITY_TYPE_PATIENT, patient_id));
        }

        let stop_after = self.faults.write().await.fail_cascade_after.take();
        for (index, key) in all_keys.iter().enumerate() {
            if let Some(stop_after) = stop_after {
                if index >= stop_after {
                    let remaining = all_keys[index..]
                        .iter()
                        .map(|(pk, sk)| ItemKey::new(pk.clone(), sk.clone()))
                        .collect();
                    return Err(StorageError::PartialCascade {
                        patient_id: patient_id.to_string(),
                        remaining,
                    });
                }
            }
            table.remove(key);
        }
        Ok(())
    }

    async fn list_patients(&self, filter: PatientFilter, limit: usize) -> Result<Vec<Patient>> {
        let plan = router::plan_patients(&filter)?;
        let found = self.run_plan(&plan).await;

        let mut patients = Vec::new();
        for item in &found {
            let patient = item_to_patient(item)?;
            if patient_matches(&patient, &filter) {
                patients.push(patient);
                if patients.len() == limit {
                    break;
                }
            }
        }
        Ok(patients)
    }
}

// ============================================================================
// TaskRepository implementation
// ============================================================================

#[async_trait]
impl TaskRepository for LocalRepository {
    async fn create_task(&self, req: NewTask) -> Result<Task> {
        let task = Task::new(req);
        let item = task_to_item(&task)?;
        let key = (keys::patient_pk(&task.patient_id)?, keys::task_sk(task.due, &task.task_id)?);

        let mut table = self.table.write().await;
        if table.contains_key(&key) {
            return Err(StorageError::duplicate(items::ENTITY_TYPE_TASK, task.task_id));
        }
        table.insert(key, item);
        Ok(task)
    }

    async fn get_task(&self, key: &TaskKey) -> Result<Option<Task>> {
        let table_key = Self::task_table_key(key)?;
        let table = self.table.read().await;
        match table.get(&table_key) {
            Some(item) => Ok(Some(item_to_task(item)?)),
            None => Ok(None),
        }
    }

    async fn update_task(&self, key: &TaskKey, patch: TaskPatch) -> Result<Task> {
        let table_key = Self::task_table_key(key)?;
        let mut table = self.table.write().await;
        let item = table
            .get(&table_key)
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_TASK, &key.sort_key))?;

        let mut task = item_to_task(item)?;
        if patch.is_empty() {
            return Ok(task);
        }
        patch.apply(&mut task);
        task.updated_at = now_ms();

        table.insert(table_key, task_to_item(&task)?);
        Ok(task)
    }

    async fn delete_task(&self, key: &TaskKey) -> Result<()> {
        let table_key = Self::task_table_key(key)?;
        let mut table = self.table.write().await;
        if table.remove(&table_key).is_none() {
            return Err(StorageError::not_found(items::ENTITY_TYPE_TASK, &key.sort_key));
        }
        Ok(())
    }

    async fn list_tasks_by_assignee(
        &self,
        assignee_id: &str,
        filter: TaskFilter,
        limit: usize,
    ) -> Result<Vec<Task>> {
        let plan_limit = filter.is_empty().then_some(limit);
        let plan = router::plan_tasks_by_assignee(assignee_id, plan_limit)?;
        let found = self.run_plan(&plan).await;

        let mut tasks = Vec::new();
        for item in &found {
            let task = item_to_task(item)?;
            if task_matches(&task, &filter) {
                tasks.push(task);
                if tasks.len() == limit {
                    break;
                }
            }
        }
        Ok(tasks)
    }

    async fn list_tasks_by_patient(&self, patient_id: &str) -> Result<Vec<Task>> {
        let plan = router::plan_tasks_by_patient(patient_id)?;
        let found = self.run_plan(&plan).await;
        found.iter().map(item_to_task).collect()
    }
}

// ============================================================================
// StaffRepository implementation
// ============================================================================

#[async_trait]
impl StaffRepository for LocalRepository {
    async fn create_staff(&self, req: NewStaffUser) -> Result<StaffUser> {
        let staff = StaffUser::new(req);
        let item = staff_to_item(&staff)?;
        let key = (keys::staff_pk(&staff.user_id)?, keys::staff_sk().to_string());

        let mut table = self.table.write().await;
        if table.contains_key(&key) {
            return Err(StorageError::duplicate(items::ENTITY_TYPE_STAFF, staff.user_id));
        }
        table.insert(key, item);
        Ok(staff)
    }

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffUser>> {
        let key = (keys::staff_pk(user_id)?, keys::staff_sk().to_string());
        let table = self.table.read().await;
        match table.get(&key) {
            Some(item) => Ok(Some(item_to_staff(item)?)),
            None => Ok(None),
        }
    }

    async fn get_staff_by_email(&self, email: &str) -> Result<Option<StaffUser>> {
        let plan = router::plan_staff_by_email(email);
        let found = self.run_plan(&plan).await;
        match found.first() {
            Some(item) => Ok(Some(item_to_staff(item)?)),
            None => Ok(None),
        }
    }

    async fn update_staff(&self, user_id: &str, patch: StaffPatch) -> Result<StaffUser> {
        let key = (keys::staff_pk(user_id)?, keys::staff_sk().to_string());
        let mut table = self.table.write().await;
        let item = table
            .get(&key)
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_STAFF, user_id))?;

        let mut staff = item_to_staff(item)?;
        if patch.is_empty() {
            return Ok(staff);
        }
        patch.apply(&mut staff);
        staff.updated_at = now_ms();

        table.insert(key, staff_to_item(&staff)?);
        Ok(staff)
    }

    async fn list_staff_by_role(&self, role: StaffRole) -> Result<Vec<StaffUser>> {
        let plan = router::plan_staff_by_role(role);
        let found = self.run_plan(&plan).await;
        found.iter().map(item_to_staff).collect()
    }
}

// ============================================================================
// NoteRepository implementation
// ============================================================================

#[async_trait]
impl NoteRepository for LocalRepository {
    async fn create_note(&self, req: NewNote) -> Result<Note> {
        let note = Note::new(req);
        let note_item = note_to_item(&note)?;
        let patient_key =
            (keys::patient_pk(&note.patient_id)?, keys::patient_sk().to_string());
        let note_key = (patient_key.0.clone(), keys::note_sk(note.created_at, &note.note_id)?);

        if let Some(reason) = self.faults.write().await.fail_next_transact.take() {
            return Err(StorageError::TransactionAborted { reason });
        }

        // One write guard covers both items, so the note insert and the
        // counter bump land together or not at all.
        let mut table = self.table.write().await;
        let patient_item = table
            .get(&patient_key)
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_PATIENT, &note.patient_id))?;
        let mut patient = item_to_patient(patient_item)?;

        if table.contains_key(&note_key) {
            return Err(StorageError::duplicate(items::ENTITY_TYPE_NOTE, note.note_id));
        }

        patient.update_counter += 1;
        patient.last_updated = note.created_at;
        patient.updated_at = note.created_at;

        // Encode before touching the table so a codec failure leaves neither
        // item behind.
        let patient_item = patient_to_item(&patient)?;
        table.insert(note_key, note_item);
        table.insert(patient_key, patient_item);
        Ok(note)
    }

    async fn list_notes_by_patient(&self, patient_id: &str) -> Result<Vec<Note>> {
        let plan = router::plan_notes_by_patient(patient_id)?;
        let found = self.run_plan(&plan).await;
        found.iter().map(item_to_note).collect()
    }

    async fn list_recent_notes(&self, limit: usize) -> Result<Vec<Note>> {
        let plan = router::plan_recent_notes(limit);
        let found = self.run_plan(&plan).await;
        found.iter().map(item_to_note).collect()
    }
}
