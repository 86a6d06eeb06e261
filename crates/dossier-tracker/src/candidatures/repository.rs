use super::domain::{Candidature, Task};
use crate::ids::{CandidatureId, TaskId, UserId};
use crate::store::RepositoryError;

/// Storage contract for candidatures and their tasks.
pub trait CandidatureRepository: Send + Sync {
    fn insert(&self, candidature: Candidature) -> Result<Candidature, RepositoryError>;
    fn update(&self, candidature: Candidature) -> Result<Candidature, RepositoryError>;
    fn find(&self, id: &CandidatureId) -> Result<Option<Candidature>, RepositoryError>;
    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Candidature>, RepositoryError>;
    /// Removes the candidature together with its tasks.
    fn delete(&self, id: &CandidatureId) -> Result<(), RepositoryError>;

    /// Conflict when the candidature already has a task for the same deadline.
    fn insert_task(&self, task: Task) -> Result<Task, RepositoryError>;
    fn update_task(&self, task: Task) -> Result<Task, RepositoryError>;
    fn task(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError>;
    fn tasks_for(&self, candidature_id: &CandidatureId) -> Result<Vec<Task>, RepositoryError>;
    fn delete_task(&self, id: &TaskId) -> Result<(), RepositoryError>;
}
