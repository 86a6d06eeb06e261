//! JSON catalog seed: contests with their schools, programs and deadlines,
//! plus published leaderboards.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::{
    Contest, Deadline, DeadlineType, Leaderboard, LeaderboardEntry, Program, ProgramCareer,
    ProgramCourse, ProgramFormat, ProgramType, School, TestRequirement,
};
use super::repository::CatalogRepository;
use crate::ids::{
    ContestId, DeadlineId, LeaderboardEntryId, LeaderboardId, ProgramId, SchoolId,
};
use crate::store::RepositoryError;

const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, thiserror::Error)]
pub enum CatalogSeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog seed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to store catalog seed: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub contests: Vec<SeedContest>,
    #[serde(default)]
    pub leaderboards: Vec<SeedLeaderboard>,
    /// Optional demo account enrolled on a program after seeding.
    #[serde(default)]
    pub demo: Option<SeedDemoAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedContest {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exam_format: Option<String>,
    #[serde(default)]
    pub fees_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub exam_locations: Vec<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub score_scale: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub tests: Vec<TestRequirement>,
    #[serde(default)]
    pub contest_deadlines: Vec<SeedDeadline>,
    #[serde(default)]
    pub schools: Vec<SeedSchool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDeadline {
    pub title: String,
    #[serde(rename = "type")]
    pub deadline_type: DeadlineType,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub session_label: Option<String>,
    #[serde(default)]
    pub diploma_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSchool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub campuses: Vec<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub tuition_cents: Option<i64>,
    #[serde(default)]
    pub programs: Vec<SeedProgram>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProgram {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub ects: Option<u32>,
    #[serde(default)]
    pub format: Option<ProgramFormat>,
    #[serde(default)]
    pub campuses: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub start_periods: Vec<String>,
    #[serde(default)]
    pub tuition_cents: Option<i64>,
    #[serde(default)]
    pub application_fee_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub financing: Option<String>,
    #[serde(default)]
    pub admission_prerequisites: Vec<String>,
    #[serde(default)]
    pub admission_tests: Vec<String>,
    #[serde(default)]
    pub admission_documents: Vec<String>,
    #[serde(default)]
    pub admission_process: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub deadlines: Vec<SeedDeadline>,
    #[serde(default)]
    pub courses: Vec<ProgramCourse>,
    #[serde(default)]
    pub careers: Vec<ProgramCareer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedLeaderboard {
    pub slug: String,
    pub name: String,
    pub source: String,
    pub category: String,
    #[serde(default)]
    pub region: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<SeedRankingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRankingEntry {
    pub rank: u32,
    pub school_name: String,
    #[serde(default)]
    pub program_slug: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDemoAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub program_slug: Option<String>,
}

/// Counts of records written by [`CatalogSeed::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub contests: usize,
    pub schools: usize,
    pub programs: usize,
    pub deadlines: usize,
    pub leaderboards: usize,
    pub entries: usize,
}

impl CatalogSeed {
    pub fn from_json(raw: &str) -> Result<Self, CatalogSeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogSeedError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogSeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Writes the seed into `catalog`, resolving ranking entries by school
    /// name and program slug. Entries naming an unknown school are skipped.
    pub fn apply(
        &self,
        catalog: &dyn CatalogRepository,
        now: DateTime<Utc>,
    ) -> Result<SeedSummary, CatalogSeedError> {
        let mut summary = SeedSummary::default();
        let mut schools_by_name: HashMap<String, SchoolId> = HashMap::new();
        let mut programs_by_slug: HashMap<String, ProgramId> = HashMap::new();

        for seed in &self.contests {
            let currency = seed
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
            let contest = catalog.insert_contest(Contest {
                id: ContestId::generate(),
                name: seed.name.clone(),
                year: seed.year,
                url: seed.url.clone(),
                description: seed.description.clone(),
                exam_format: seed.exam_format.clone(),
                fees_cents: seed.fees_cents,
                currency: seed.currency.clone(),
                registration_url: seed.registration_url.clone(),
                languages: seed.languages.clone(),
                exam_locations: seed.exam_locations.clone(),
                duration_minutes: seed.duration_minutes,
                score_scale: seed.score_scale.clone(),
                max_attempts: seed.max_attempts,
                tests: seed.tests.clone(),
            })?;
            summary.contests += 1;

            for deadline in &seed.contest_deadlines {
                catalog.insert_deadline(deadline.to_deadline(
                    Some(&contest.id),
                    None,
                    None,
                    deadline.diploma_name.clone(),
                ))?;
                summary.deadlines += 1;
            }

            for school_seed in &seed.schools {
                let school = catalog.insert_school(School {
                    id: SchoolId::generate(),
                    name: school_seed.name.clone(),
                    contest_id: Some(contest.id.clone()),
                    description: school_seed.description.clone(),
                    website: school_seed.website.clone(),
                    city: school_seed.city.clone(),
                    country: school_seed.country.clone(),
                    campuses: school_seed.campuses.clone(),
                    contact_email: school_seed.contact_email.clone(),
                    contact_phone: school_seed.contact_phone.clone(),
                    tuition_cents: school_seed.tuition_cents,
                    currency: currency.clone(),
                })?;
                schools_by_name.insert(school.name.clone(), school.id.clone());
                summary.schools += 1;

                for program_seed in &school_seed.programs {
                    let program = catalog.insert_program(
                        program_seed.to_program(&school.id, &contest.id, &currency),
                    )?;
                    programs_by_slug.insert(program.slug.clone(), program.id.clone());
                    summary.programs += 1;

                    for deadline in &program_seed.deadlines {
                        catalog.insert_deadline(deadline.to_deadline(
                            Some(&contest.id),
                            Some(&school.id),
                            Some(&program.id),
                            Some(program.name.clone()),
                        ))?;
                        summary.deadlines += 1;
                    }
                }
            }
        }

        for seed in &self.leaderboards {
            let leaderboard = catalog.upsert_leaderboard(Leaderboard {
                id: LeaderboardId::generate(),
                slug: seed.slug.clone(),
                name: seed.name.clone(),
                source: seed.source.clone(),
                category: seed.category.clone(),
                region: seed.region.clone(),
                year: seed.year,
                url: seed.url.clone(),
                description: seed.description.clone(),
                updated_at: now,
            })?;
            summary.leaderboards += 1;

            let mut entries = Vec::with_capacity(seed.entries.len());
            for entry in &seed.entries {
                let school_id = match schools_by_name.get(&entry.school_name) {
                    Some(id) => id.clone(),
                    None => match catalog.find_school_by_name(&entry.school_name)? {
                        Some(school) => school.id,
                        None => {
                            tracing::warn!(
                                leaderboard = %leaderboard.slug,
                                school = %entry.school_name,
                                "skipping ranking entry for unknown school"
                            );
                            continue;
                        }
                    },
                };
                let program_id = entry
                    .program_slug
                    .as_ref()
                    .and_then(|slug| programs_by_slug.get(slug))
                    .cloned();
                entries.push(LeaderboardEntry {
                    id: LeaderboardEntryId::generate(),
                    leaderboard_id: leaderboard.id.clone(),
                    rank: entry.rank,
                    score: entry.score,
                    notes: entry.notes.clone(),
                    school_id,
                    program_id,
                });
            }
            summary.entries += entries.len();
            catalog.replace_leaderboard_entries(&leaderboard.id, entries)?;
        }

        tracing::info!(
            contests = summary.contests,
            schools = summary.schools,
            programs = summary.programs,
            deadlines = summary.deadlines,
            leaderboards = summary.leaderboards,
            "catalog seeded"
        );
        Ok(summary)
    }
}

impl SeedDeadline {
    fn to_deadline(
        &self,
        contest_id: Option<&ContestId>,
        school_id: Option<&SchoolId>,
        program_id: Option<&ProgramId>,
        diploma_name: Option<String>,
    ) -> Deadline {
        Deadline {
            id: DeadlineId::generate(),
            title: self.title.clone(),
            deadline_type: self.deadline_type,
            due_at: self.due_at,
            contest_id: contest_id.cloned(),
            school_id: school_id.cloned(),
            program_id: program_id.cloned(),
            diploma_name,
            session_label: self.session_label.clone(),
            created_by_admin: true,
        }
    }
}

impl SeedProgram {
    fn to_program(&self, school_id: &SchoolId, contest_id: &ContestId, currency: &str) -> Program {
        Program {
            id: ProgramId::generate(),
            slug: self.slug.clone(),
            name: self.name.clone(),
            school_id: school_id.clone(),
            contest_id: Some(contest_id.clone()),
            program_type: self.program_type,
            domain: self.domain.clone(),
            description: self.description.clone(),
            objectives: self.objectives.clone(),
            outcomes: self.outcomes.clone(),
            duration_months: self.duration_months,
            ects: self.ects,
            format: self.format,
            campuses: self.campuses.clone(),
            languages: self.languages.clone(),
            start_periods: self.start_periods.clone(),
            tuition_cents: self.tuition_cents,
            application_fee_cents: self.application_fee_cents,
            currency: self
                .currency
                .clone()
                .unwrap_or_else(|| currency.to_string()),
            financing: self.financing.clone(),
            admission_prerequisites: self.admission_prerequisites.clone(),
            admission_tests: self.admission_tests.clone(),
            admission_documents: self.admission_documents.clone(),
            admission_process: self.admission_process.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            website: self.website.clone(),
            courses: self.courses.clone(),
            careers: self.careers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::CATALOG_FIXTURE;

    #[test]
    fn fixture_seed_populates_catalog() {
        let store = MemoryStore::default();
        let seed = CatalogSeed::from_json(CATALOG_FIXTURE).expect("seed parses");
        let summary = seed.apply(&store, Utc::now()).expect("seed applies");

        assert_eq!(summary.contests, 3);
        assert_eq!(summary.schools, 2);
        assert_eq!(summary.programs, 2);
        assert_eq!(summary.leaderboards, 1);
        assert_eq!(summary.entries, 2, "unknown school entry skipped");

        let program = store
            .find_program_by_slug("hec-mba")
            .expect("lookup")
            .expect("program stored");
        let deadlines = store.deadlines().expect("deadlines");
        let mba_deadline = deadlines
            .iter()
            .find(|d| d.program_id.as_ref() == Some(&program.id))
            .expect("program deadline");
        assert_eq!(mba_deadline.diploma_name.as_deref(), Some("MBA"));
        assert_eq!(mba_deadline.school_id.as_ref(), Some(&program.school_id));
        assert!(mba_deadline.created_by_admin);
    }

    #[test]
    fn duplicate_program_slugs_are_rejected() {
        let store = MemoryStore::default();
        let seed = CatalogSeed::from_json(CATALOG_FIXTURE).expect("seed parses");
        seed.apply(&store, Utc::now()).expect("first apply");
        let err = seed.apply(&store, Utc::now()).expect_err("second apply");
        assert!(matches!(
            err,
            CatalogSeedError::Repository(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        assert!(matches!(
            CatalogSeed::from_json("{\"contests\": 3}"),
            Err(CatalogSeedError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CatalogSeed::from_path(Path::new("/nonexistent/catalog.json"))
            .expect_err("missing");
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}
