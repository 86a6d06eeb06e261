use super::domain::{Contest, Deadline, Leaderboard, LeaderboardEntry, Program, School};
use crate::ids::{ContestId, DeadlineId, LeaderboardId, ProgramId, SchoolId};
use crate::store::RepositoryError;

/// Storage contract for the shared catalog (contests, schools, programs,
/// deadlines and rankings).
///
/// Reads return unordered snapshots; ordering is applied by the service.
pub trait CatalogRepository: Send + Sync {
    fn contests(&self) -> Result<Vec<Contest>, RepositoryError>;
    fn contest(&self, id: &ContestId) -> Result<Option<Contest>, RepositoryError>;
    fn insert_contest(&self, contest: Contest) -> Result<Contest, RepositoryError>;

    fn schools(&self) -> Result<Vec<School>, RepositoryError>;
    fn school(&self, id: &SchoolId) -> Result<Option<School>, RepositoryError>;
    fn find_school_by_name(&self, name: &str) -> Result<Option<School>, RepositoryError>;
    fn insert_school(&self, school: School) -> Result<School, RepositoryError>;

    fn programs(&self) -> Result<Vec<Program>, RepositoryError>;
    fn program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError>;
    fn find_program_by_slug(&self, slug: &str) -> Result<Option<Program>, RepositoryError>;
    /// Fails with a conflict when the slug is taken.
    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError>;

    fn deadlines(&self) -> Result<Vec<Deadline>, RepositoryError>;
    fn deadline(&self, id: &DeadlineId) -> Result<Option<Deadline>, RepositoryError>;
    fn insert_deadline(&self, deadline: Deadline) -> Result<Deadline, RepositoryError>;

    fn leaderboards(&self) -> Result<Vec<Leaderboard>, RepositoryError>;
    /// Inserts or replaces the leaderboard with the same slug, keeping its id.
    fn upsert_leaderboard(&self, leaderboard: Leaderboard) -> Result<Leaderboard, RepositoryError>;
    fn leaderboard_entries(&self) -> Result<Vec<LeaderboardEntry>, RepositoryError>;
    /// Drops every entry of the leaderboard and stores `entries` instead.
    fn replace_leaderboard_entries(
        &self,
        leaderboard_id: &LeaderboardId,
        entries: Vec<LeaderboardEntry>,
    ) -> Result<(), RepositoryError>;
}
