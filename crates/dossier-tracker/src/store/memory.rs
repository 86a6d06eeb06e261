use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::auth::{User, UserRepository};
use crate::candidatures::{Candidature, CandidatureRepository, Task};
use crate::catalog::{
    CatalogRepository, Contest, Deadline, Leaderboard, LeaderboardEntry, Program, School,
};
use crate::google::{CredentialRepository, GoogleCredential};
use crate::ids::{
    CandidatureId, ContestId, DeadlineId, LeaderboardId, ProgramId, SchoolId, TaskId, UserId,
};
use crate::reminders::{Reminder, ReminderRepository, ReminderStatus};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    contests: Vec<Contest>,
    schools: Vec<School>,
    programs: Vec<Program>,
    deadlines: Vec<Deadline>,
    leaderboards: Vec<Leaderboard>,
    entries: Vec<LeaderboardEntry>,
    candidatures: Vec<Candidature>,
    tasks: Vec<Task>,
    reminders: Vec<Reminder>,
    credentials: Vec<GoogleCredential>,
}

/// Process-local store backing every repository trait. Rows keep insertion
/// order; callers sort.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn replace<T>(
    rows: &mut [T],
    row: T,
    same: impl Fn(&T) -> bool,
    what: &'static str,
) -> Result<(), RepositoryError> {
    let slot = rows
        .iter_mut()
        .find(|existing| same(existing))
        .ok_or(RepositoryError::NotFound(what))?;
    *slot = row;
    Ok(())
}

impl UserRepository for MemoryStore {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email) || existing.id == user.id)
        {
            return Err(RepositoryError::Conflict("user"));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        let id = user.id.clone();
        replace(&mut tables.users, user.clone(), |existing| existing.id == id, "user")?;
        Ok(user)
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|user| &user.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

impl CatalogRepository for MemoryStore {
    fn contests(&self) -> Result<Vec<Contest>, RepositoryError> {
        Ok(self.lock()?.contests.clone())
    }

    fn contest(&self, id: &ContestId) -> Result<Option<Contest>, RepositoryError> {
        Ok(self.lock()?.contests.iter().find(|c| &c.id == id).cloned())
    }

    fn insert_contest(&self, contest: Contest) -> Result<Contest, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .contests
            .iter()
            .any(|existing| existing.id == contest.id || existing.name == contest.name)
        {
            return Err(RepositoryError::Conflict("contest"));
        }
        tables.contests.push(contest.clone());
        Ok(contest)
    }

    fn schools(&self) -> Result<Vec<School>, RepositoryError> {
        Ok(self.lock()?.schools.clone())
    }

    fn school(&self, id: &SchoolId) -> Result<Option<School>, RepositoryError> {
        Ok(self.lock()?.schools.iter().find(|s| &s.id == id).cloned())
    }

    fn find_school_by_name(&self, name: &str) -> Result<Option<School>, RepositoryError> {
        Ok(self
            .lock()?
            .schools
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    fn insert_school(&self, school: School) -> Result<School, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.schools.iter().any(|existing| existing.id == school.id) {
            return Err(RepositoryError::Conflict("school"));
        }
        tables.schools.push(school.clone());
        Ok(school)
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        Ok(self.lock()?.programs.clone())
    }

    fn program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        Ok(self.lock()?.programs.iter().find(|p| &p.id == id).cloned())
    }

    fn find_program_by_slug(&self, slug: &str) -> Result<Option<Program>, RepositoryError> {
        Ok(self
            .lock()?
            .programs
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .programs
            .iter()
            .any(|existing| existing.slug == program.slug || existing.id == program.id)
        {
            return Err(RepositoryError::Conflict("program"));
        }
        tables.programs.push(program.clone());
        Ok(program)
    }

    fn deadlines(&self) -> Result<Vec<Deadline>, RepositoryError> {
        Ok(self.lock()?.deadlines.clone())
    }

    fn deadline(&self, id: &DeadlineId) -> Result<Option<Deadline>, RepositoryError> {
        Ok(self.lock()?.deadlines.iter().find(|d| &d.id == id).cloned())
    }

    fn insert_deadline(&self, deadline: Deadline) -> Result<Deadline, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.deadlines.iter().any(|existing| existing.id == deadline.id) {
            return Err(RepositoryError::Conflict("deadline"));
        }
        tables.deadlines.push(deadline.clone());
        Ok(deadline)
    }

    fn leaderboards(&self) -> Result<Vec<Leaderboard>, RepositoryError> {
        Ok(self.lock()?.leaderboards.clone())
    }

    fn upsert_leaderboard(&self, leaderboard: Leaderboard) -> Result<Leaderboard, RepositoryError> {
        let mut tables = self.lock()?;
        let position = tables
            .leaderboards
            .iter()
            .position(|existing| existing.slug == leaderboard.slug);
        let stored = match position {
            Some(index) => {
                let id = tables.leaderboards[index].id.clone();
                let stored = Leaderboard { id, ..leaderboard };
                tables.leaderboards[index] = stored.clone();
                stored
            }
            None => {
                tables.leaderboards.push(leaderboard.clone());
                leaderboard
            }
        };
        Ok(stored)
    }

    fn leaderboard_entries(&self) -> Result<Vec<LeaderboardEntry>, RepositoryError> {
        Ok(self.lock()?.entries.clone())
    }

    fn replace_leaderboard_entries(
        &self,
        leaderboard_id: &LeaderboardId,
        entries: Vec<LeaderboardEntry>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.leaderboards.iter().any(|l| &l.id == leaderboard_id) {
            return Err(RepositoryError::NotFound("leaderboard"));
        }
        tables
            .entries
            .retain(|entry| &entry.leaderboard_id != leaderboard_id);
        tables.entries.extend(entries);
        Ok(())
    }
}

impl CandidatureRepository for MemoryStore {
    fn insert(&self, candidature: Candidature) -> Result<Candidature, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.candidatures.iter().any(|c| c.id == candidature.id) {
            return Err(RepositoryError::Conflict("candidature"));
        }
        tables.candidatures.push(candidature.clone());
        Ok(candidature)
    }

    fn update(&self, candidature: Candidature) -> Result<Candidature, RepositoryError> {
        let mut tables = self.lock()?;
        let id = candidature.id.clone();
        replace(
            &mut tables.candidatures,
            candidature.clone(),
            |existing| existing.id == id,
            "candidature",
        )?;
        Ok(candidature)
    }

    fn find(&self, id: &CandidatureId) -> Result<Option<Candidature>, RepositoryError> {
        Ok(self.lock()?.candidatures.iter().find(|c| &c.id == id).cloned())
    }

    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Candidature>, RepositoryError> {
        Ok(self
            .lock()?
            .candidatures
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &CandidatureId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.candidatures.len();
        tables.candidatures.retain(|c| &c.id != id);
        if tables.candidatures.len() == before {
            return Err(RepositoryError::NotFound("candidature"));
        }
        tables.tasks.retain(|task| &task.candidature_id != id);
        Ok(())
    }

    fn insert_task(&self, task: Task) -> Result<Task, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.candidatures.iter().any(|c| c.id == task.candidature_id) {
            return Err(RepositoryError::NotFound("candidature"));
        }
        let duplicate = tables.tasks.iter().any(|existing| {
            existing.id == task.id
                || (task.deadline_id.is_some()
                    && existing.candidature_id == task.candidature_id
                    && existing.deadline_id == task.deadline_id)
        });
        if duplicate {
            return Err(RepositoryError::Conflict("task"));
        }
        tables.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&self, task: Task) -> Result<Task, RepositoryError> {
        let mut tables = self.lock()?;
        let id = task.id.clone();
        replace(&mut tables.tasks, task.clone(), |existing| existing.id == id, "task")?;
        Ok(task)
    }

    fn task(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.lock()?.tasks.iter().find(|t| &t.id == id).cloned())
    }

    fn tasks_for(&self, candidature_id: &CandidatureId) -> Result<Vec<Task>, RepositoryError> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|t| &t.candidature_id == candidature_id)
            .cloned()
            .collect())
    }

    fn delete_task(&self, id: &TaskId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| &t.id != id);
        if tables.tasks.len() == before {
            return Err(RepositoryError::NotFound("task"));
        }
        Ok(())
    }
}

impl ReminderRepository for MemoryStore {
    fn insert(&self, reminder: Reminder) -> Result<Reminder, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.reminders.iter().any(|r| r.same_slot(&reminder)) {
            return Err(RepositoryError::Conflict("reminder"));
        }
        tables.reminders.push(reminder.clone());
        Ok(reminder)
    }

    fn insert_many(&self, reminders: Vec<Reminder>) -> Result<usize, RepositoryError> {
        let mut tables = self.lock()?;
        let mut inserted = 0;
        for reminder in reminders {
            if tables.reminders.iter().any(|r| r.same_slot(&reminder)) {
                continue;
            }
            tables.reminders.push(reminder);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn update(&self, reminder: Reminder) -> Result<Reminder, RepositoryError> {
        let mut tables = self.lock()?;
        let id = reminder.id.clone();
        replace(
            &mut tables.reminders,
            reminder.clone(),
            |existing| existing.id == id,
            "reminder",
        )?;
        Ok(reminder)
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, RepositoryError> {
        Ok(self
            .lock()?
            .reminders
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Reminder>, RepositoryError> {
        let mut due: Vec<Reminder> = self
            .lock()?
            .reminders
            .iter()
            .filter(|r| r.status == ReminderStatus::Pending && r.send_at <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.send_at.cmp(&b.send_at));
        due.truncate(limit);
        Ok(due)
    }
}

impl CredentialRepository for MemoryStore {
    fn find_by_user(&self, user_id: &UserId) -> Result<Option<GoogleCredential>, RepositoryError> {
        Ok(self
            .lock()?
            .credentials
            .iter()
            .find(|c| &c.user_id == user_id)
            .cloned())
    }

    fn upsert(&self, credential: GoogleCredential) -> Result<GoogleCredential, RepositoryError> {
        let mut tables = self.lock()?;
        tables.credentials.retain(|c| c.user_id != credential.user_id);
        tables.credentials.push(credential.clone());
        Ok(credential)
    }

    fn set_calendar(&self, user_id: &UserId, calendar_id: &str) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let credential = tables
            .credentials
            .iter_mut()
            .find(|c| &c.user_id == user_id)
            .ok_or(RepositoryError::NotFound("google credential"))?;
        credential.calendar_id = Some(calendar_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::candidatures::{CandidatureStatus, CandidatureType, TaskStatus};
    use crate::reminders::ReminderChannel;
    use chrono::Duration;

    fn user(id: &str, email: &str) -> User {
        User {
            id: UserId::from(id),
            email: email.to_string(),
            password_hash: "hash".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            role: UserRole::Student,
            created_at: Utc::now(),
        }
    }

    fn candidature(id: &str) -> Candidature {
        let now = Utc::now();
        Candidature {
            id: CandidatureId::from(id),
            user_id: UserId::from("usr_1"),
            candidature_type: CandidatureType::Concours,
            contest_id: ContestId::from("cnt_1"),
            school_id: None,
            program_id: None,
            diploma_name: None,
            session_label: None,
            status: CandidatureStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(id: &str, candidature: &str, deadline: Option<&str>) -> Task {
        Task {
            id: TaskId::from(id),
            candidature_id: CandidatureId::from(candidature),
            title: "Task".into(),
            status: TaskStatus::Todo,
            deadline_id: deadline.map(DeadlineId::from),
            tips: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn user_emails_are_unique_case_insensitively() {
        let store = MemoryStore::default();
        UserRepository::insert(&store, user("usr_1", "ada@example.com")).expect("first");
        let err = UserRepository::insert(&store, user("usr_2", "ADA@example.com"))
            .expect_err("duplicate");
        assert_eq!(err, RepositoryError::Conflict("user"));
        assert!(store.find_by_email("Ada@Example.com").unwrap().is_some());
    }

    #[test]
    fn one_task_per_candidature_and_deadline() {
        let store = MemoryStore::default();
        CandidatureRepository::insert(&store, candidature("cand_1")).expect("candidature");
        store
            .insert_task(task("tsk_1", "cand_1", Some("ddl_1")))
            .expect("first");
        assert_eq!(
            store.insert_task(task("tsk_2", "cand_1", Some("ddl_1"))),
            Err(RepositoryError::Conflict("task"))
        );
        store
            .insert_task(task("tsk_3", "cand_1", None))
            .expect("free task");
        store
            .insert_task(task("tsk_4", "cand_1", None))
            .expect("second free task");
        assert_eq!(
            store.insert_task(task("tsk_5", "cand_missing", None)),
            Err(RepositoryError::NotFound("candidature"))
        );
    }

    #[test]
    fn deleting_candidature_cascades_to_tasks() {
        let store = MemoryStore::default();
        CandidatureRepository::insert(&store, candidature("cand_1")).expect("candidature");
        CandidatureRepository::insert(&store, candidature("cand_2")).expect("candidature");
        store.insert_task(task("tsk_1", "cand_1", None)).expect("task");
        store.insert_task(task("tsk_2", "cand_2", None)).expect("task");

        CandidatureRepository::delete(&store, &CandidatureId::from("cand_1")).expect("delete");
        assert!(store.task(&TaskId::from("tsk_1")).unwrap().is_none());
        assert!(store.task(&TaskId::from("tsk_2")).unwrap().is_some());
        assert_eq!(
            CandidatureRepository::delete(&store, &CandidatureId::from("cand_1")),
            Err(RepositoryError::NotFound("candidature"))
        );
    }

    #[test]
    fn reminders_skip_duplicate_slots_and_sort_due() {
        let store = MemoryStore::default();
        let now = Utc::now();
        let reminder = |minutes: i64| {
            Reminder::pending(
                UserId::from("usr_1"),
                DeadlineId::from("ddl_1"),
                ReminderChannel::Email,
                now - Duration::minutes(minutes),
                now,
            )
        };

        let inserted = store
            .insert_many(vec![reminder(5), reminder(10), reminder(5), reminder(-5)])
            .expect("insert");
        assert_eq!(inserted, 3);
        assert_eq!(
            ReminderRepository::insert(&store, reminder(10)),
            Err(RepositoryError::Conflict("reminder"))
        );

        let due = store.due(now, 10).expect("due");
        assert_eq!(due.len(), 2);
        assert!(due[0].send_at < due[1].send_at);
        assert_eq!(store.due(now, 1).expect("due").len(), 1);
    }

    #[test]
    fn leaderboard_upsert_keeps_id() {
        let store = MemoryStore::default();
        let now = Utc::now();
        let board = |id: &str, name: &str| Leaderboard {
            id: LeaderboardId::from(id),
            slug: "ft-mim-2025".into(),
            name: name.into(),
            source: "Financial Times".into(),
            category: "Master in Management".into(),
            region: None,
            year: 2025,
            url: None,
            description: None,
            updated_at: now,
        };
        store.upsert_leaderboard(board("ldb_1", "First")).expect("insert");
        let updated = store
            .upsert_leaderboard(board("ldb_2", "Second"))
            .expect("upsert");
        assert_eq!(updated.id.as_str(), "ldb_1");
        assert_eq!(updated.name, "Second");
        assert_eq!(store.leaderboards().unwrap().len(), 1);
    }

    #[test]
    fn credentials_are_one_per_user() {
        let store = MemoryStore::default();
        let credential = |token: &str| GoogleCredential {
            user_id: UserId::from("usr_1"),
            access_token: token.into(),
            refresh_token: "refresh".into(),
            scope: "calendar".into(),
            token_type: "Bearer".into(),
            expiry_date: None,
            calendar_id: None,
            updated_at: Utc::now(),
        };
        store.upsert(credential("a")).expect("first");
        store.upsert(credential("b")).expect("second");
        store
            .set_calendar(&UserId::from("usr_1"), "cal-1")
            .expect("calendar");
        let stored = store
            .find_by_user(&UserId::from("usr_1"))
            .unwrap()
            .expect("credential");
        assert_eq!(stored.access_token, "b");
        assert_eq!(stored.calendar_id.as_deref(), Some("cal-1"));
        assert!(store.set_calendar(&UserId::from("usr_2"), "x").is_err());
    }
}
