//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `clinical_canvas_core::storage`
//! against the single production table.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::warn;

use clinical_canvas_core::clinical::{
    NewNote, NewPatient, NewStaffUser, NewTask, Note, Patient, PatientPatch, StaffPatch,
    StaffRole, StaffUser, Task, TaskPatch,
};
use clinical_canvas_core::storage::{
    ItemKey, NoteRepository, PatientFilter, PatientRepository, Result, StaffRepository,
    StorageError, TaskFilter, TaskKey, TaskRepository,
};

use crate::storage::codec::{format_ts, now_ms};
use crate::storage::items::{
    self, item_to_note, item_to_patient, item_to_staff, item_to_task, note_to_item,
    patient_to_item, staff_to_item, task_to_item, Item,
};
use crate::storage::keys;
use crate::storage::router::{
    self, index_key_attrs, patient_matches, task_matches, QueryPlan, ScanFilter,
};

use super::error::{
    map_batch_write_error, map_delete_item_error, map_get_item_error, map_note_transact_error,
    map_put_item_error, map_query_error, map_scan_error, map_update_item_error,
};
use super::transactions::note_create_items;
use super::update::UpdateBuilder;

/// Default table name when the environment does not specify one.
pub const DEFAULT_TABLE_NAME: &str = "clinical-canvas";

/// BatchWriteItem accepts at most 25 requests per call.
const CASCADE_BATCH_SIZE: usize = 25;

/// DynamoDB-backed repository.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a new repository from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain and reads the table name
    /// from `CANVAS_TABLE_NAME` (defaults to "clinical-canvas").
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        let table_name =
            std::env::var("CANVAS_TABLE_NAME").unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());

        Ok(Self::new(client, table_name))
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Executes a query plan, paginating until the plan is exhausted or its
    /// limit is reached. The limit is enforced here, not trusted to the
    /// server.
    async fn run_plan(&self, plan: QueryPlan) -> Result<Vec<Item>> {
        match plan {
            QueryPlan::Index { index, pk, sk_prefix, newest_first, limit } => {
                let (pk_attr, sk_attr) = index_key_attrs(index);
                self.run_key_query(Some(index), pk_attr, sk_attr, pk, sk_prefix, newest_first, limit)
                    .await
            }
            QueryPlan::Partition { pk, sk_prefix, newest_first, limit } => {
                self.run_key_query(
                    None,
                    keys::PK_ATTR,
                    keys::SK_ATTR,
                    pk,
                    sk_prefix,
                    newest_first,
                    limit,
                )
                .await
            }
            QueryPlan::Scan(filter) => self.run_scan(filter).await,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_key_query(
        &self,
        index: Option<&'static str>,
        pk_attr: &'static str,
        sk_attr: &'static str,
        pk: String,
        sk_prefix: Option<String>,
        newest_first: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Item>> {
        let mut collected = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .scan_index_forward(!newest_first)
                .expression_attribute_names("#pk", pk_attr)
                .expression_attribute_values(":pk", AttributeValue::S(pk.clone()));

            if let Some(index_name) = index {
                request = request.index_name(index_name);
            }
            request = match &sk_prefix {
                Some(prefix) => request
                    .key_condition_expression("#pk = :pk AND begins_with(#sk, :sk)")
                    .expression_attribute_names("#sk", sk_attr)
                    .expression_attribute_values(":sk", AttributeValue::S(prefix.clone())),
                None => request.key_condition_expression("#pk = :pk"),
            };
            if let Some(limit) = limit {
                request = request.limit(limit as i32);
            }
            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let result = request.send().await.map_err(map_query_error)?;
            collected.extend(result.items.unwrap_or_default());

            if let Some(limit) = limit {
                if collected.len() >= limit {
                    collected.truncate(limit);
                    return Ok(collected);
                }
            }
            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => return Ok(collected),
            }
        }
    }

    async fn run_scan(&self, filter: ScanFilter) -> Result<Vec<Item>> {
        let mut collected = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self.client.scan().table_name(&self.table_name);
            request = match &filter {
                ScanFilter::PatientMeta => request
                    .filter_expression("SK = :sk")
                    .expression_attribute_values(
                        ":sk",
                        AttributeValue::S(keys::META_SK.to_string()),
                    ),
                ScanFilter::StaffByEmail(email) => request
                    .filter_expression("SK = :sk AND email = :email")
                    .expression_attribute_values(
                        ":sk",
                        AttributeValue::S(keys::PROFILE_SK.to_string()),
                    )
                    .expression_attribute_values(":email", AttributeValue::S(email.clone())),
            };
            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let result = request.send().await.map_err(map_scan_error)?;
            collected.extend(result.items.unwrap_or_default());

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => return Ok(collected),
            }
        }
    }

    /// Every (PK, SK) pair under one partition, for cascade deletion.
    async fn partition_keys(&self, pk: &str) -> Result<Vec<ItemKey>> {
        let items = self
            .run_key_query(None, keys::PK_ATTR, keys::SK_ATTR, pk.to_string(), None, false, None)
            .await?;

        items
            .iter()
            .map(|item| {
                let pk = item
                    .get(keys::PK_ATTR)
                    .and_then(|v| v.as_s().ok())
                    .ok_or_else(|| StorageError::codec("ItemKey", "item missing PK"))?;
                let sk = item
                    .get(keys::SK_ATTR)
                    .and_then(|v| v.as_s().ok())
                    .ok_or_else(|| StorageError::codec("ItemKey", "item missing SK"))?;
                Ok(ItemKey::new(pk.clone(), sk.clone()))
            })
            .collect()
    }

    /// Deletes the given keys in batches. Returns the keys that survived.
    async fn batch_delete(&self, all_keys: &[ItemKey]) -> Result<Vec<ItemKey>> {
        let mut remaining = Vec::new();

        for (chunk_index, chunk) in all_keys.chunks(CASCADE_BATCH_SIZE).enumerate() {
            let mut requests = Vec::with_capacity(chunk.len());
            for key in chunk {
                let delete = DeleteRequest::builder()
                    .key(keys::PK_ATTR, AttributeValue::S(key.pk.clone()))
                    .key(keys::SK_ATTR, AttributeValue::S(key.sk.clone()))
                    .build()
                    .map_err(|e| {
                        StorageError::codec("ItemKey", format!("building delete request: {e}"))
                    })?;
                requests.push(WriteRequest::builder().delete_request(delete).build());
            }

            let result = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, requests)
                .send()
                .await;

            match result {
                Ok(output) => {
                    let unprocessed = output
                        .unprocessed_items
                        .unwrap_or_default()
                        .remove(&self.table_name)
                        .unwrap_or_default();
                    for request in unprocessed {
                        if let Some(key) = delete_request_key(&request) {
                            remaining.push(key);
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %map_batch_write_error(err), "cascade batch failed");
                    // This chunk and everything after it never got deleted.
                    let start = chunk_index * CASCADE_BATCH_SIZE;
                    remaining.extend(all_keys[start..].iter().cloned());
                    return Ok(remaining);
                }
            }
        }

        Ok(remaining)
    }

    fn task_item_key(&self, key: &TaskKey) -> Result<(String, String)> {
        if !key.sort_key.starts_with(keys::TASK_PREFIX) {
            return Err(StorageError::InvalidKeyInput {
                field: "sort_key",
                reason: format!("expected a '{}' sort key", keys::TASK_PREFIX),
            });
        }
        Ok((keys::patient_pk(&key.patient_id)?, key.sort_key.clone()))
    }
}

fn delete_request_key(request: &WriteRequest) -> Option<ItemKey> {
    let key = request.delete_request()?.key();
    let pk = key.get(keys::PK_ATTR)?.as_s().ok()?;
    let sk = key.get(keys::SK_ATTR)?.as_s().ok()?;
    Some(ItemKey::new(pk.clone(), sk.clone()))
}

// ============================================================================
// PatientRepository implementation
// ============================================================================

#[async_trait]
impl PatientRepository for DynamoDbRepository {
    async fn create_patient(&self, req: NewPatient) -> Result<Patient> {
        let patient = Patient::new(req);
        let item = patient_to_item(&patient)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(e, items::ENTITY_TYPE_PATIENT, patient.patient_id.clone())
            })?;

        Ok(patient)
    }

    async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(keys::patient_pk(patient_id)?))
            .key(keys::SK_ATTR, AttributeValue::S(keys::patient_sk().to_string()))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_patient(&item)?)),
            None => Ok(None),
        }
    }

    async fn update_patient(&self, patient_id: &str, patch: PatientPatch) -> Result<Patient> {
        let mut patient = self
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_PATIENT, patient_id))?;

        if patch.is_empty() {
            return Ok(patient);
        }

        patch.apply(&mut patient);
        patient.updated_at = now_ms();

        let mut builder = UpdateBuilder::new();
        if let Some(name) = &patch.name {
            builder.set("name", AttributeValue::S(name.clone()));
        }
        if let Some(pathway) = patch.pathway {
            builder.set("pathway", AttributeValue::S(pathway.as_str().to_string()));
        }
        if let Some(state) = &patch.current_state {
            builder.set("current_state", AttributeValue::S(state.clone()));
        }
        if let Some(diagnosis) = &patch.diagnosis {
            builder.set("diagnosis", AttributeValue::S(diagnosis.clone()));
        }
        if let Some(comorbidities) = &patch.comorbidities {
            builder.set(
                "comorbidities",
                AttributeValue::L(
                    comorbidities.iter().cloned().map(AttributeValue::S).collect(),
                ),
            );
        }
        if let Some(assigned_doctor) = &patch.assigned_doctor {
            match assigned_doctor {
                Some(doctor) => builder.set("assigned_doctor", AttributeValue::S(doctor.clone())),
                None => builder.remove("assigned_doctor"),
            };
        }
        // Index keys are derived from patched fields, so they move in the
        // same write.
        if patch.touches_index_keys() {
            builder.set("GSI3PK", AttributeValue::S(keys::patient_gsi3_pk(patient.pathway)));
            builder.set(
                "GSI3SK",
                AttributeValue::S(keys::patient_gsi3_sk(&patient.current_state, &patient.name)?),
            );
        }
        builder.set("updated_at", AttributeValue::S(format_ts(patient.updated_at)));

        let (expression, names, values) = builder.build();
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(keys::patient_pk(patient_id)?))
            .key(keys::SK_ATTR, AttributeValue::S(keys::patient_sk().to_string()))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_update_item_error(e, items::ENTITY_TYPE_PATIENT, patient_id))?;

        Ok(patient)
    }

    async fn delete_patient(&self, patient_id: &str) -> Result<()> {
        let pk = keys::patient_pk(patient_id)?;
        let all_keys = self.partition_keys(&pk).await?;
        if all_keys.is_empty() {
            return Err(StorageError::not_found(items::ENTITY_TYPE_PATIENT, patient_id));
        }

        let remaining = self.batch_delete(&all_keys).await?;
        if remaining.is_empty() {
            Ok(())
        } else {
            Err(StorageError::PartialCascade {
                patient_id: patient_id.to_string(),
                remaining,
            })
        }
    }

    async fn list_patients(&self, filter: PatientFilter, limit: usize) -> Result<Vec<Patient>> {
        let plan = router::plan_patients(&filter)?;
        let items = self.run_plan(plan).await?;

        let mut patients = Vec::new();
        for item in &items {
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
impl TaskRepository for DynamoDbRepository {
    async fn create_task(&self, req: NewTask) -> Result<Task> {
        let task = Task::new(req);
        let item = task_to_item(&task)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(SK)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, items::ENTITY_TYPE_TASK, task.task_id.clone()))?;

        Ok(task)
    }

    async fn get_task(&self, key: &TaskKey) -> Result<Option<Task>> {
        let (pk, sk) = self.task_item_key(key)?;
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(pk))
            .key(keys::SK_ATTR, AttributeValue::S(sk))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_task(&item)?)),
            None => Ok(None),
        }
    }

    async fn update_task(&self, key: &TaskKey, patch: TaskPatch) -> Result<Task> {
        let mut task = self
            .get_task(key)
            .await?
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_TASK, &key.sort_key))?;

        if patch.is_empty() {
            return Ok(task);
        }

        patch.apply(&mut task);
        task.updated_at = now_ms();

        let mut builder = UpdateBuilder::new();
        if let Some(title) = &patch.title {
            builder.set("title", AttributeValue::S(title.clone()));
        }
        if let Some(task_type) = patch.task_type {
            builder.set("task_type", AttributeValue::S(task_type.as_str().to_string()));
        }
        if let Some(assignee_id) = &patch.assignee_id {
            builder.set("assignee_id", AttributeValue::S(assignee_id.clone()));
            // The due time and patient are immutable here, so only the
            // partition half of the AssigneeDue key moves.
            builder.set("GSI1PK", AttributeValue::S(keys::task_gsi1_pk(assignee_id)?));
        }
        if let Some(status) = patch.status {
            builder.set("status", AttributeValue::S(status.as_str().to_string()));
        }
        if let Some(priority) = patch.priority {
            builder.set("priority", AttributeValue::S(priority.as_str().to_string()));
        }
        if let Some(recurring) = patch.recurring {
            builder.set("recurring", AttributeValue::Bool(recurring));
        }
        if let Some(details) = &patch.details {
            match details {
                Some(value) => {
                    builder.set(
                        "details",
                        crate::storage::codec::encode_value(value, items::ENTITY_TYPE_TASK)?,
                    );
                }
                None => {
                    builder.remove("details");
                }
            }
        }
        builder.set("updated_at", AttributeValue::S(format_ts(task.updated_at)));

        let (pk, sk) = self.task_item_key(key)?;
        let (expression, names, values) = builder.build();
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(pk))
            .key(keys::SK_ATTR, AttributeValue::S(sk))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_update_item_error(e, items::ENTITY_TYPE_TASK, &key.sort_key))?;

        Ok(task)
    }

    async fn delete_task(&self, key: &TaskKey) -> Result<()> {
        let (pk, sk) = self.task_item_key(key)?;
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(pk))
            .key(keys::SK_ATTR, AttributeValue::S(sk))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, items::ENTITY_TYPE_TASK, &key.sort_key))?;

        Ok(())
    }

    async fn list_tasks_by_assignee(
        &self,
        assignee_id: &str,
        filter: TaskFilter,
        limit: usize,
    ) -> Result<Vec<Task>> {
        // A residual filter can disqualify fetched rows, so the plan limit is
        // only usable when there is nothing left to filter.
        let plan_limit = filter.is_empty().then_some(limit);
        let plan = router::plan_tasks_by_assignee(assignee_id, plan_limit)?;
        let items = self.run_plan(plan).await?;

        let mut tasks = Vec::new();
        for item in &items {
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
        let items = self.run_plan(plan).await?;
        items.iter().map(item_to_task).collect()
    }
}

// ============================================================================
// StaffRepository implementation
// ============================================================================

#[async_trait]
impl StaffRepository for DynamoDbRepository {
    async fn create_staff(&self, req: NewStaffUser) -> Result<StaffUser> {
        let staff = StaffUser::new(req);
        let item = staff_to_item(&staff)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, items::ENTITY_TYPE_STAFF, staff.user_id.clone()))?;

        Ok(staff)
    }

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffUser>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(keys::staff_pk(user_id)?))
            .key(keys::SK_ATTR, AttributeValue::S(keys::staff_sk().to_string()))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_staff(&item)?)),
            None => Ok(None),
        }
    }

    async fn get_staff_by_email(&self, email: &str) -> Result<Option<StaffUser>> {
        let plan = router::plan_staff_by_email(email);
        let items = self.run_plan(plan).await?;

        match items.first() {
            Some(item) => Ok(Some(item_to_staff(item)?)),
            None => Ok(None),
        }
    }

    async fn update_staff(&self, user_id: &str, patch: StaffPatch) -> Result<StaffUser> {
        let mut staff = self
            .get_staff(user_id)
            .await?
            .ok_or_else(|| StorageError::not_found(items::ENTITY_TYPE_STAFF, user_id))?;

        if patch.is_empty() {
            return Ok(staff);
        }

        patch.apply(&mut staff);
        staff.updated_at = now_ms();

        let mut builder = UpdateBuilder::new();
        if let Some(name) = &patch.name {
            builder.set("name", AttributeValue::S(name.clone()));
        }
        if let Some(role) = patch.role {
            builder.set("role", AttributeValue::S(role.as_str().to_string()));
        }
        if let Some(avatar) = &patch.avatar {
            match avatar {
                Some(url) => builder.set("avatar", AttributeValue::S(url.clone())),
                None => builder.remove("avatar"),
            };
        }
        if let Some(contact_info) = &patch.contact_info {
            builder.set(
                "contact_info",
                AttributeValue::M(
                    contact_info
                        .iter()
                        .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
                        .collect(),
                ),
            );
        }
        if let Some(permissions) = &patch.permissions {
            builder.set(
                "permissions",
                AttributeValue::L(permissions.iter().cloned().map(AttributeValue::S).collect()),
            );
        }
        if let Some(email) = &patch.email {
            builder.set("email", AttributeValue::S(email.clone()));
        }
        if let Some(password_hash) = &patch.password_hash {
            match password_hash {
                Some(hash) => builder.set("password_hash", AttributeValue::S(hash.clone())),
                None => builder.remove("password_hash"),
            };
        }
        if patch.touches_index_keys() {
            builder.set("GSI2PK", AttributeValue::S(keys::staff_gsi2_pk(staff.role)));
            builder.set("GSI2SK", AttributeValue::S(keys::staff_gsi2_sk(&staff.name)));
        }
        builder.set("updated_at", AttributeValue::S(format_ts(staff.updated_at)));

        let (expression, names, values) = builder.build();
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(keys::PK_ATTR, AttributeValue::S(keys::staff_pk(user_id)?))
            .key(keys::SK_ATTR, AttributeValue::S(keys::staff_sk().to_string()))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(PK)")
            .send()
            .await
            .map_err(|e| map_update_item_error(e, items::ENTITY_TYPE_STAFF, user_id))?;

        Ok(staff)
    }

    async fn list_staff_by_role(&self, role: StaffRole) -> Result<Vec<StaffUser>> {
        let plan = router::plan_staff_by_role(role);
        let items = self.run_plan(plan).await?;
        items.iter().map(item_to_staff).collect()
    }
}

// ============================================================================
// NoteRepository implementation
// ============================================================================

#[async_trait]
impl NoteRepository for DynamoDbRepository {
    async fn create_note(&self, req: NewNote) -> Result<Note> {
        let note = Note::new(req);
        let item = note_to_item(&note)?;
        let patient_pk = keys::patient_pk(&note.patient_id)?;

        let transact_items = note_create_items(&self.table_name, item, &patient_pk, note.created_at)?;
        self.client
            .transact_write_items()
            .set_transact_items(Some(transact_items))
            .send()
            .await
            .map_err(|e| map_note_transact_error(e, &note.patient_id, &note.note_id))?;

        Ok(note)
    }

    async fn list_notes_by_patient(&self, patient_id: &str) -> Result<Vec<Note>> {
        let plan = router::plan_notes_by_patient(patient_id)?;
        let items = self.run_plan(plan).await?;
        items.iter().map(item_to_note).collect()
    }

    async fn list_recent_notes(&self, limit: usize) -> Result<Vec<Note>> {
        let plan = router::plan_recent_notes(limit);
        let items = self.run_plan(plan).await?;
        items.iter().map(item_to_note).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_request_key_extraction() {
        let delete = DeleteRequest::builder()
            .key("PK", AttributeValue::S("PATIENT#p-1".to_string()))
            .key("SK", AttributeValue::S("META".to_string()))
            .build()
            .unwrap();
        let request = WriteRequest::builder().delete_request(delete).build();

        assert_eq!(
            delete_request_key(&request),
            Some(ItemKey::new("PATIENT#p-1", "META"))
        );
        assert_eq!(delete_request_key(&WriteRequest::builder().build()), None);
    }
}
