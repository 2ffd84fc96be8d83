mod requests;
mod triage;
mod types;
mod value;

pub use requests::{
    NewNote, NewPatient, NewStaffUser, NewTask, PatientPatch, StaffPatch, TaskPatch,
};
pub use triage::{is_due_soon, is_overdue, is_urgent, urgent_window};
pub use types::{
    Note, NoteCategory, Pathway, Patient, StaffRole, StaffUser, Task, TaskPriority, TaskStatus,
    TaskType,
};
pub use value::Value;
