//! Shared application state.
//!
//! Groups the four repository trait objects behind one cloneable handle so
//! callers depend on the traits, not on a concrete backend.

use std::sync::Arc;

use tracing::info;

use clinical_canvas_core::storage::{
    NoteRepository, PatientRepository, Result, StaffRepository, TaskRepository,
};

use crate::config::Config;
use crate::storage::{DynamoDbRepository, LocalRepository};

/// Shared state handed to whatever service layer sits on top of storage.
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub config: Config,
}

impl AppState {
    fn build<R>(repo: Arc<R>, config: Config) -> Self
    where
        R: PatientRepository + TaskRepository + StaffRepository + NoteRepository + 'static,
    {
        Self {
            patients: repo.clone(),
            tasks: repo.clone(),
            staff: repo.clone(),
            notes: repo,
            config,
        }
    }

    /// Builds state from environment configuration, choosing the backend via
    /// `CANVAS_LOCAL_STORAGE`.
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env();
        if config.use_local_storage {
            info!("using in-process storage backend");
            return Ok(Self::with_local(config));
        }

        info!(table = %config.table_name, "using DynamoDB storage backend");
        let repo = Arc::new(DynamoDbRepository::from_env().await?);
        Ok(Self::build(repo, config))
    }

    /// Builds state over the in-process backend.
    pub fn with_local(config: Config) -> Self {
        Self::build(Arc::new(LocalRepository::new()), config)
    }
}

#[cfg(test)]
mod tests {
    use clinical_canvas_core::clinical::{NewPatient, Pathway};

    use super::*;

    #[tokio::test]
    async fn test_state_exposes_all_repositories() {
        let state = AppState::with_local(Config::from_env());
        let patient = state
            .patients
            .create_patient(NewPatient {
                name: "Jane Roe".to_string(),
                pathway: Pathway::Consultation,
                current_state: "triage".to_string(),
                diagnosis: "headache".to_string(),
                comorbidities: vec![],
                assigned_doctor: None,
            })
            .await
            .unwrap();

        assert!(state.patients.get_patient(&patient.patient_id).await.unwrap().is_some());
        assert!(state.notes.list_recent_notes(10).await.unwrap().is_empty());
    }
}
