use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Contest, Deadline, School};
use crate::ids::{CandidatureId, ContestId, DeadlineId, ProgramId, SchoolId, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatureType {
    Concours,
    Diplome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatureStatus {
    Draft,
    Submitted,
}

/// Progress of a checklist item. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidature {
    pub id: CandidatureId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub candidature_type: CandidatureType,
    pub contest_id: ContestId,
    pub school_id: Option<SchoolId>,
    pub program_id: Option<ProgramId>,
    pub diploma_name: Option<String>,
    pub session_label: Option<String>,
    pub status: CandidatureStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidature {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Official deadlines that apply to this candidature: same contest, and
    /// school/program either unset on the deadline or equal to ours.
    pub fn matches_deadline(&self, deadline: &Deadline) -> bool {
        deadline.contest_id.as_ref() == Some(&self.contest_id)
            && deadline
                .school_id
                .as_ref()
                .map_or(true, |id| self.school_id.as_ref() == Some(id))
            && deadline
                .program_id
                .as_ref()
                .map_or(true, |id| self.program_id.as_ref() == Some(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub candidature_id: CandidatureId,
    pub title: String,
    pub status: TaskStatus,
    pub deadline_id: Option<DeadlineId>,
    pub tips: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub suggestion: String,
    pub deadline: Option<Deadline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatureView {
    #[serde(flatten)]
    pub candidature: Candidature,
    pub contest: Option<Contest>,
    pub school: Option<School>,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialTask {
    pub title: String,
    #[serde(default)]
    pub deadline_id: Option<DeadlineId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidatureRequest {
    pub contest_id: ContestId,
    #[serde(default, rename = "type")]
    pub candidature_type: Option<CandidatureType>,
    #[serde(default)]
    pub school_id: Option<SchoolId>,
    #[serde(default)]
    pub program_id: Option<ProgramId>,
    #[serde(default)]
    pub diploma_name: Option<String>,
    #[serde(default)]
    pub session_label: Option<String>,
    #[serde(default)]
    pub initial_tasks: Vec<InitialTask>,
}

impl CreateCandidatureRequest {
    pub fn for_contest(contest_id: ContestId) -> Self {
        Self {
            contest_id,
            candidature_type: None,
            school_id: None,
            program_id: None,
            diploma_name: None,
            session_label: None,
            initial_tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidatureRequest {
    #[serde(default, rename = "type")]
    pub candidature_type: Option<CandidatureType>,
    #[serde(default)]
    pub contest_id: Option<ContestId>,
    /// `None` leaves the field alone, `Some(None)` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub school_id: Option<Option<SchoolId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub program_id: Option<Option<ProgramId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub diploma_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub session_label: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<CandidatureStatus>,
}

/// Tells an explicit `null` apart from a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub deadline_id: Option<DeadlineId>,
    #[serde(default)]
    pub tips: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

/// Result of reconciling a candidature with the official deadlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub created: usize,
    pub reminders_scheduled: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_synced: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

impl Deleted {
    pub const YES: Deleted = Deleted { deleted: true };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DeadlineType;

    fn candidature(school: Option<&str>, program: Option<&str>) -> Candidature {
        let now = Utc::now();
        Candidature {
            id: CandidatureId::from("cand_1"),
            user_id: UserId::from("usr_1"),
            candidature_type: CandidatureType::Diplome,
            contest_id: ContestId::from("cnt_1"),
            school_id: school.map(SchoolId::from),
            program_id: program.map(ProgramId::from),
            diploma_name: None,
            session_label: None,
            status: CandidatureStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    fn deadline(contest: &str, school: Option<&str>, program: Option<&str>) -> Deadline {
        Deadline {
            id: DeadlineId::generate(),
            title: "Round".to_string(),
            deadline_type: DeadlineType::Registration,
            due_at: Utc::now(),
            contest_id: Some(ContestId::from(contest)),
            school_id: school.map(SchoolId::from),
            program_id: program.map(ProgramId::from),
            diploma_name: None,
            session_label: None,
            created_by_admin: true,
        }
    }

    #[test]
    fn deadline_matching_respects_school_and_program_scope() {
        let contest_only = candidature(None, None);
        assert!(contest_only.matches_deadline(&deadline("cnt_1", None, None)));
        assert!(!contest_only.matches_deadline(&deadline("cnt_1", Some("sch_1"), None)));
        assert!(!contest_only.matches_deadline(&deadline("cnt_2", None, None)));

        let with_program = candidature(Some("sch_1"), Some("prg_1"));
        assert!(with_program.matches_deadline(&deadline("cnt_1", Some("sch_1"), Some("prg_1"))));
        assert!(with_program.matches_deadline(&deadline("cnt_1", Some("sch_1"), None)));
        assert!(!with_program.matches_deadline(&deadline("cnt_1", Some("sch_1"), Some("prg_2"))));
        assert!(!with_program.matches_deadline(&deadline("cnt_1", Some("sch_2"), None)));
    }

    #[test]
    fn sync_outcome_omits_calendar_when_not_attempted() {
        let value = serde_json::to_value(SyncOutcome {
            created: 2,
            reminders_scheduled: 3,
            calendar_synced: None,
        })
        .expect("json");
        assert_eq!(value, serde_json::json!({"created": 2, "remindersScheduled": 3}));
    }

    #[test]
    fn update_request_tells_null_from_missing() {
        let request: UpdateCandidatureRequest = serde_json::from_value(serde_json::json!({
            "schoolId": null,
            "diplomaName": "MSc Finance"
        }))
        .expect("parses");
        assert_eq!(request.school_id, Some(None));
        assert_eq!(request.diploma_name, Some(Some("MSc Finance".to_string())));
        assert_eq!(request.program_id, None);
        assert_eq!(request.session_label, None);
    }
}
