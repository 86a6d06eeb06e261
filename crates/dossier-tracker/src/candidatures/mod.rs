//! Candidatures, their task checklists and reconciliation with the official
//! deadlines.

pub mod domain;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod service;
pub mod suggestions;

pub use domain::{
    Candidature, CandidatureStatus, CandidatureType, CandidatureView, CreateCandidatureRequest,
    Deleted, SyncOutcome, Task, TaskStatus, TaskView,
};
pub use repository::CandidatureRepository;
pub use router::candidatures_router;
pub use schedule::reminder_times;
pub use service::{CandidatureService, DeadlineCalendar};
pub use suggestions::suggestion_for;
