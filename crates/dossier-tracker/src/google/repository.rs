use super::domain::GoogleCredential;
use crate::ids::UserId;
use crate::store::RepositoryError;

pub trait CredentialRepository: Send + Sync {
    fn find_by_user(&self, user_id: &UserId) -> Result<Option<GoogleCredential>, RepositoryError>;
    /// Inserts or replaces the user's credential.
    fn upsert(&self, credential: GoogleCredential) -> Result<GoogleCredential, RepositoryError>;
    fn set_calendar(&self, user_id: &UserId, calendar_id: &str) -> Result<(), RepositoryError>;
}
