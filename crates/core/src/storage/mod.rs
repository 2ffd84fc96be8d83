mod error;
mod traits;
mod types;

pub use error::{Result, StorageError};
pub use traits::{NoteRepository, PatientRepository, StaffRepository, TaskRepository};
pub use types::{ItemKey, PatientFilter, TaskFilter, TaskKey};
