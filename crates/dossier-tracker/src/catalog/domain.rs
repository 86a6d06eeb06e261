use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ContestId, DeadlineId, LeaderboardEntryId, LeaderboardId, ProgramId, SchoolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    TageMage,
    Toeic,
    Toefl,
    Ielts,
    Gmat,
    Gre,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Master,
    Msc,
    SpecializedMsc,
    Mba,
    Emba,
    Bachelor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramFormat {
    FullTime,
    PartTime,
    Online,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineType {
    Registration,
    Test,
    Oral,
    Result,
    Other,
}

/// Score expectations a contest places on a standardized test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequirement {
    pub test: TestType,
    #[serde(default)]
    pub minimum_score: Option<f64>,
    #[serde(default)]
    pub recommended_score: Option<f64>,
    #[serde(default)]
    pub weight_percent: Option<u32>,
    #[serde(default)]
    pub validity_months: Option<u32>,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: ContestId,
    pub name: String,
    pub year: i32,
    pub url: Option<String>,
    pub description: Option<String>,
    pub exam_format: Option<String>,
    pub fees_cents: Option<i64>,
    pub currency: Option<String>,
    pub registration_url: Option<String>,
    pub languages: Vec<String>,
    pub exam_locations: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub score_scale: Option<String>,
    pub max_attempts: Option<u32>,
    pub tests: Vec<TestRequirement>,
}

impl Contest {
    pub fn summary(&self) -> ContestSummary {
        ContestSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSummary {
    pub id: ContestId,
    pub name: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub contest_id: Option<ContestId>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub campuses: Vec<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub tuition_cents: Option<i64>,
    pub currency: String,
}

impl School {
    /// Bare school as created by the ranking ingest.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: SchoolId::generate(),
            name: name.into(),
            contest_id: None,
            description: None,
            website: None,
            city: None,
            country: None,
            campuses: Vec::new(),
            contact_email: None,
            contact_phone: None,
            tuition_cents: None,
            currency: "EUR".to_string(),
        }
    }

    pub fn summary(&self) -> SchoolSummary {
        SchoolSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSummary {
    pub id: SchoolId,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramCourse {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramCareer {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub slug: String,
    pub name: String,
    pub school_id: SchoolId,
    pub contest_id: Option<ContestId>,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub objectives: Option<String>,
    pub outcomes: Vec<String>,
    pub duration_months: Option<u32>,
    pub ects: Option<u32>,
    pub format: Option<ProgramFormat>,
    pub campuses: Vec<String>,
    pub languages: Vec<String>,
    pub start_periods: Vec<String>,
    pub tuition_cents: Option<i64>,
    pub application_fee_cents: Option<i64>,
    pub currency: String,
    pub financing: Option<String>,
    pub admission_prerequisites: Vec<String>,
    pub admission_tests: Vec<String>,
    pub admission_documents: Vec<String>,
    pub admission_process: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub courses: Vec<ProgramCourse>,
    pub careers: Vec<ProgramCareer>,
}

impl Program {
    /// Minimal program attached to a school, as created by the ranking ingest.
    pub fn minimal(
        slug: impl Into<String>,
        name: impl Into<String>,
        school_id: SchoolId,
        program_type: ProgramType,
    ) -> Self {
        Self {
            id: ProgramId::generate(),
            slug: slug.into(),
            name: name.into(),
            school_id,
            contest_id: None,
            program_type,
            domain: None,
            description: None,
            objectives: None,
            outcomes: Vec::new(),
            duration_months: None,
            ects: None,
            format: None,
            campuses: Vec::new(),
            languages: Vec::new(),
            start_periods: Vec::new(),
            tuition_cents: None,
            application_fee_cents: None,
            currency: "EUR".to_string(),
            financing: None,
            admission_prerequisites: Vec::new(),
            admission_tests: Vec::new(),
            admission_documents: Vec::new(),
            admission_process: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            courses: Vec::new(),
            careers: Vec::new(),
        }
    }
}

/// Officially published date tied to a contest, school or program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: DeadlineId,
    pub title: String,
    #[serde(rename = "type")]
    pub deadline_type: DeadlineType,
    pub due_at: DateTime<Utc>,
    pub contest_id: Option<ContestId>,
    pub school_id: Option<SchoolId>,
    pub program_id: Option<ProgramId>,
    pub diploma_name: Option<String>,
    pub session_label: Option<String>,
    pub created_by_admin: bool,
}

impl Deadline {
    /// Contest-wide deadline, not tied to any school or program.
    pub fn is_general(&self) -> bool {
        self.school_id.is_none() && self.program_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub id: LeaderboardId,
    pub slug: String,
    pub name: String,
    pub source: String,
    pub category: String,
    pub region: Option<String>,
    pub year: i32,
    pub url: Option<String>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: LeaderboardEntryId,
    pub leaderboard_id: LeaderboardId,
    pub rank: u32,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub school_id: SchoolId,
    pub program_id: Option<ProgramId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestView {
    #[serde(flatten)]
    pub contest: Contest,
    pub deadlines: Vec<Deadline>,
}

/// Ranking entry together with the leaderboard it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub leaderboard: Leaderboard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolView {
    #[serde(flatten)]
    pub school: School,
    pub contest: Option<ContestSummary>,
    pub leaderboard_entries: Vec<RankingView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramView {
    #[serde(flatten)]
    pub program: Program,
    pub school: Option<SchoolSummary>,
    pub contest: Option<ContestSummary>,
    pub leaderboard_entries: Vec<RankingView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolDetail {
    #[serde(flatten)]
    pub school: School,
    pub leaderboard_entries: Vec<RankingView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: Program,
    pub school: Option<SchoolDetail>,
    pub contest: Option<Contest>,
    pub leaderboard_entries: Vec<RankingView>,
    pub deadlines: Vec<Deadline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub school: Option<School>,
    pub program: Option<Program>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    #[serde(flatten)]
    pub leaderboard: Leaderboard,
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestFilter {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub test: Option<TestType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramFilter {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default, rename = "type")]
    pub program_type: Option<ProgramType>,
    #[serde(default)]
    pub format: Option<ProgramFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineFilter {
    #[serde(default)]
    pub contest_id: Option<ContestId>,
    #[serde(default)]
    pub school_id: Option<SchoolId>,
    #[serde(default)]
    pub program_id: Option<ProgramId>,
    #[serde(default)]
    pub diploma_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFilter {
    #[serde(default)]
    pub contest_id: Option<ContestId>,
}
