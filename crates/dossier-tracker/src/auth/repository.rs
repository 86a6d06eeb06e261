use super::domain::User;
use crate::ids::UserId;
use crate::store::RepositoryError;

/// Account storage. Emails are unique; `insert` reports a conflict otherwise.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<User, RepositoryError>;
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}
