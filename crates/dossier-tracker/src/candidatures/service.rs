use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{
    Candidature, CandidatureStatus, CandidatureType, CandidatureView, CreateCandidatureRequest,
    CreateTaskRequest, Deleted, SyncOutcome, Task, TaskStatus, TaskView,
    UpdateCandidatureRequest,
};
use super::repository::CandidatureRepository;
use super::schedule::reminder_times;
use super::suggestions::suggestion_for;
use crate::catalog::{CatalogRepository, Deadline};
use crate::error::ServiceError;
use crate::google::CalendarDeadline;
use crate::ids::{CandidatureId, ContestId, DeadlineId, ProgramId, SchoolId, TaskId, UserId};
use crate::reminders::{Reminder, ReminderChannel, ReminderRepository};
use crate::store::RepositoryError;

/// Where upcoming deadlines get mirrored when the user linked a calendar.
#[async_trait]
pub trait DeadlineCalendar: Send + Sync {
    async fn is_connected(&self, user_id: &UserId) -> Result<bool, ServiceError>;
    /// Returns how many deadlines were written.
    async fn push_deadlines(
        &self,
        user_id: &UserId,
        deadlines: &[CalendarDeadline],
        now: DateTime<Utc>,
    ) -> Result<usize, ServiceError>;
}

/// A student's candidatures, their checklists and deadline reconciliation.
#[derive(Clone)]
pub struct CandidatureService {
    candidatures: Arc<dyn CandidatureRepository>,
    catalog: Arc<dyn CatalogRepository>,
    reminders: Arc<dyn ReminderRepository>,
    calendar: Option<Arc<dyn DeadlineCalendar>>,
}

impl CandidatureService {
    pub fn new(
        candidatures: Arc<dyn CandidatureRepository>,
        catalog: Arc<dyn CatalogRepository>,
        reminders: Arc<dyn ReminderRepository>,
    ) -> Self {
        Self {
            candidatures,
            catalog,
            reminders,
            calendar: None,
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn DeadlineCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CandidatureView>, ServiceError> {
        let mut candidatures = self.candidatures.list_by_user(user_id)?;
        candidatures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let deadlines = self.deadline_index()?;
        candidatures
            .into_iter()
            .map(|candidature| self.view(candidature, &deadlines))
            .collect()
    }

    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateCandidatureRequest,
        now: DateTime<Utc>,
    ) -> Result<CandidatureView, ServiceError> {
        self.ensure_references(
            Some(&request.contest_id),
            request.school_id.as_ref(),
            request.program_id.as_ref(),
        )?;
        for task in &request.initial_tasks {
            require_title(&task.title)?;
            if let Some(deadline_id) = &task.deadline_id {
                self.require_deadline(deadline_id)?;
            }
        }

        let candidature_type = request.candidature_type.unwrap_or(if request.program_id.is_some() {
            CandidatureType::Diplome
        } else {
            CandidatureType::Concours
        });
        let candidature = self.candidatures.insert(Candidature {
            id: CandidatureId::generate(),
            user_id: user_id.clone(),
            candidature_type,
            contest_id: request.contest_id,
            school_id: request.school_id,
            program_id: request.program_id,
            diploma_name: request.diploma_name,
            session_label: request.session_label,
            status: CandidatureStatus::Draft,
            created_at: now,
            updated_at: now,
        })?;

        for initial in request.initial_tasks {
            self.store_task(Task {
                id: TaskId::generate(),
                candidature_id: candidature.id.clone(),
                title: initial.title.trim().to_string(),
                status: TaskStatus::Todo,
                deadline_id: initial.deadline_id,
                tips: None,
                created_at: now,
            })?;
        }

        tracing::info!(candidature_id = %candidature.id, user_id = %user_id, "candidature created");
        self.sync_deadlines(user_id, &candidature.id, now).await?;
        self.view_by_id(&candidature.id)
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        id: &CandidatureId,
        request: UpdateCandidatureRequest,
        now: DateTime<Utc>,
    ) -> Result<CandidatureView, ServiceError> {
        let mut candidature = self.owned(user_id, id)?;
        self.ensure_references(
            request.contest_id.as_ref(),
            request.school_id.as_ref().and_then(Option::as_ref),
            request.program_id.as_ref().and_then(Option::as_ref),
        )?;

        let scope_changed = request
            .contest_id
            .as_ref()
            .is_some_and(|contest| contest != &candidature.contest_id)
            || request
                .school_id
                .as_ref()
                .is_some_and(|school| school.as_ref() != candidature.school_id.as_ref())
            || request
                .program_id
                .as_ref()
                .is_some_and(|program| program.as_ref() != candidature.program_id.as_ref());

        if let Some(candidature_type) = request.candidature_type {
            candidature.candidature_type = candidature_type;
        }
        if let Some(contest_id) = request.contest_id {
            candidature.contest_id = contest_id;
        }
        if let Some(school_id) = request.school_id {
            candidature.school_id = school_id;
        }
        if let Some(program_id) = request.program_id {
            candidature.program_id = program_id;
        }
        if let Some(diploma_name) = request.diploma_name {
            candidature.diploma_name = diploma_name;
        }
        if let Some(session_label) = request.session_label {
            candidature.session_label = session_label;
        }
        if let Some(status) = request.status {
            candidature.status = status;
        }
        candidature.updated_at = now;
        self.candidatures.update(candidature)?;

        if scope_changed {
            self.sync_deadlines(user_id, id, now).await?;
        }
        self.view_by_id(id)
    }

    pub fn delete(&self, user_id: &UserId, id: &CandidatureId) -> Result<Deleted, ServiceError> {
        self.owned(user_id, id)?;
        self.candidatures.delete(id)?;
        tracing::info!(candidature_id = %id, "candidature deleted");
        Ok(Deleted::YES)
    }

    pub fn add_task(
        &self,
        user_id: &UserId,
        candidature_id: &CandidatureId,
        request: CreateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<TaskView, ServiceError> {
        self.owned(user_id, candidature_id)?;
        require_title(&request.title)?;
        let deadline = match &request.deadline_id {
            Some(deadline_id) => Some(self.require_deadline(deadline_id)?),
            None => None,
        };

        let task = self.candidatures.insert_task(Task {
            id: TaskId::generate(),
            candidature_id: candidature_id.clone(),
            title: request.title.trim().to_string(),
            status: TaskStatus::Todo,
            deadline_id: request.deadline_id,
            tips: request.tips,
            created_at: now,
        })?;
        Ok(task_view(task, deadline))
    }

    pub fn update_task_status(
        &self,
        user_id: &UserId,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> Result<TaskView, ServiceError> {
        let mut task = self.owned_task(user_id, task_id)?;
        task.status = status;
        let task = self.candidatures.update_task(task)?;
        let deadline = match &task.deadline_id {
            Some(deadline_id) => self.catalog.deadline(deadline_id)?,
            None => None,
        };
        Ok(task_view(task, deadline))
    }

    pub fn delete_task(&self, user_id: &UserId, task_id: &TaskId) -> Result<Deleted, ServiceError> {
        self.owned_task(user_id, task_id)?;
        self.candidatures.delete_task(task_id)?;
        Ok(Deleted::YES)
    }

    /// Reconciles a candidature with the official deadlines: one task per
    /// matching deadline, email reminders for upcoming ones, and a calendar
    /// push when the user linked one.
    pub async fn sync_deadlines(
        &self,
        user_id: &UserId,
        candidature_id: &CandidatureId,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, ServiceError> {
        let candidature = self
            .candidatures
            .find(candidature_id)?
            .filter(|candidature| candidature.is_owned_by(user_id))
            .ok_or_else(ServiceError::forbidden)?;

        let mut matching: Vec<Deadline> = self
            .catalog
            .deadlines()?
            .into_iter()
            .filter(|deadline| candidature.matches_deadline(deadline))
            .collect();
        matching.sort_by(|a, b| a.due_at.cmp(&b.due_at));

        let linked: HashSet<DeadlineId> = self
            .candidatures
            .tasks_for(candidature_id)?
            .into_iter()
            .filter_map(|task| task.deadline_id)
            .collect();

        let mut created = 0;
        for deadline in matching.iter().filter(|d| !linked.contains(&d.id)) {
            let task = Task {
                id: TaskId::generate(),
                candidature_id: candidature_id.clone(),
                title: deadline.title.clone(),
                status: TaskStatus::Todo,
                deadline_id: Some(deadline.id.clone()),
                tips: None,
                created_at: now,
            };
            match self.candidatures.insert_task(task) {
                Ok(_) => created += 1,
                Err(RepositoryError::Conflict(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let upcoming: Vec<&Deadline> = matching.iter().filter(|d| d.due_at > now).collect();
        let reminded: HashSet<DeadlineId> = self
            .reminders
            .list_for_user(user_id)?
            .into_iter()
            .filter(|reminder| reminder.channel == ReminderChannel::Email)
            .map(|reminder| reminder.deadline_id)
            .collect();
        let reminders: Vec<Reminder> = upcoming
            .iter()
            .flat_map(|deadline| {
                let already_reminded = reminded.contains(&deadline.id);
                reminder_times(deadline.due_at, now, already_reminded)
                    .into_iter()
                    .map(move |send_at| {
                        Reminder::pending(
                            user_id.clone(),
                            deadline.id.clone(),
                            ReminderChannel::Email,
                            send_at,
                            now,
                        )
                    })
            })
            .collect();
        let reminders_scheduled = self.reminders.insert_many(reminders)?;

        let calendar_synced = self
            .push_to_calendar(user_id, candidature_id, &upcoming, now)
            .await;

        tracing::debug!(
            candidature_id = %candidature_id,
            created,
            reminders_scheduled,
            "deadlines synced"
        );
        Ok(SyncOutcome {
            created,
            reminders_scheduled,
            calendar_synced,
        })
    }

    async fn push_to_calendar(
        &self,
        user_id: &UserId,
        candidature_id: &CandidatureId,
        upcoming: &[&Deadline],
        now: DateTime<Utc>,
    ) -> Option<usize> {
        let calendar = self.calendar.as_ref()?;
        match calendar.is_connected(user_id).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "calendar status unavailable");
                return None;
            }
        }

        let deadlines: Vec<CalendarDeadline> = upcoming
            .iter()
            .map(|deadline| CalendarDeadline {
                id: deadline.id.clone(),
                title: deadline.title.clone(),
                due_at: deadline.due_at,
                candidature_id: Some(candidature_id.clone()),
            })
            .collect();
        match calendar.push_deadlines(user_id, &deadlines, now).await {
            Ok(synced) => Some(synced),
            Err(err) => {
                tracing::warn!(
                    candidature_id = %candidature_id,
                    error = %err,
                    "calendar push failed"
                );
                None
            }
        }
    }

    fn owned(&self, user_id: &UserId, id: &CandidatureId) -> Result<Candidature, ServiceError> {
        self.candidatures
            .find(id)?
            .filter(|candidature| candidature.is_owned_by(user_id))
            .ok_or_else(ServiceError::forbidden)
    }

    fn owned_task(&self, user_id: &UserId, task_id: &TaskId) -> Result<Task, ServiceError> {
        let task = self
            .candidatures
            .task(task_id)?
            .ok_or_else(|| ServiceError::not_found("Task not found"))?;
        self.owned(user_id, &task.candidature_id)?;
        Ok(task)
    }

    fn store_task(&self, task: Task) -> Result<(), ServiceError> {
        match self.candidatures.insert_task(task) {
            Ok(_) | Err(RepositoryError::Conflict(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn ensure_references(
        &self,
        contest_id: Option<&ContestId>,
        school_id: Option<&SchoolId>,
        program_id: Option<&ProgramId>,
    ) -> Result<(), ServiceError> {
        if let Some(contest_id) = contest_id {
            self.catalog
                .contest(contest_id)?
                .ok_or_else(|| ServiceError::not_found("Contest not found"))?;
        }
        if let Some(school_id) = school_id {
            self.catalog
                .school(school_id)?
                .ok_or_else(|| ServiceError::not_found("School not found"))?;
        }
        if let Some(program_id) = program_id {
            self.catalog
                .program(program_id)?
                .ok_or_else(|| ServiceError::not_found("Program not found"))?;
        }
        Ok(())
    }

    fn require_deadline(&self, deadline_id: &DeadlineId) -> Result<Deadline, ServiceError> {
        self.catalog
            .deadline(deadline_id)?
            .ok_or_else(|| ServiceError::not_found("Deadline not found"))
    }

    fn deadline_index(&self) -> Result<HashMap<DeadlineId, Deadline>, ServiceError> {
        Ok(self
            .catalog
            .deadlines()?
            .into_iter()
            .map(|deadline| (deadline.id.clone(), deadline))
            .collect())
    }

    fn view_by_id(&self, id: &CandidatureId) -> Result<CandidatureView, ServiceError> {
        let candidature = self
            .candidatures
            .find(id)?
            .ok_or(RepositoryError::NotFound("candidature"))?;
        let deadlines = self.deadline_index()?;
        self.view(candidature, &deadlines)
    }

    fn view(
        &self,
        candidature: Candidature,
        deadlines: &HashMap<DeadlineId, Deadline>,
    ) -> Result<CandidatureView, ServiceError> {
        let contest = self.catalog.contest(&candidature.contest_id)?;
        let school = match &candidature.school_id {
            Some(school_id) => self.catalog.school(school_id)?,
            None => None,
        };
        let mut tasks = self.candidatures.tasks_for(&candidature.id)?;
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let tasks = tasks
            .into_iter()
            .map(|task| {
                let deadline = task
                    .deadline_id
                    .as_ref()
                    .and_then(|id| deadlines.get(id))
                    .cloned();
                task_view(task, deadline)
            })
            .collect();

        Ok(CandidatureView {
            candidature,
            contest,
            school,
            tasks,
        })
    }
}

fn task_view(task: Task, deadline: Option<Deadline>) -> TaskView {
    let suggestion =
        suggestion_for(&task.title, deadline.as_ref().map(|d| d.deadline_type)).to_string();
    TaskView {
        task,
        suggestion,
        deadline,
    }
}

fn require_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::validation("title must not be empty"));
    }
    Ok(())
}
