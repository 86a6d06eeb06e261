use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    Contest, ContestFilter, ContestSummary, ContestView, Deadline, DeadlineFilter, EntryView,
    Leaderboard, LeaderboardView, Program, ProgramDetail, ProgramFilter, ProgramView, RankingView,
    School, SchoolDetail, SchoolFilter, SchoolView,
};
use super::repository::CatalogRepository;
use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::ids::{ContestId, LeaderboardId, ProgramId, SchoolId};
use crate::rankings::{ingest_leaderboard, IngestSummary, LeaderboardPayload};

/// Read model over the shared catalog plus the admin ranking import.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub fn list_contests(&self, filter: &ContestFilter) -> Result<Vec<ContestView>, ServiceError> {
        let deadlines = self.catalog.deadlines()?;
        let mut contests: Vec<Contest> = self
            .catalog
            .contests()?
            .into_iter()
            .filter(|contest| filter.year.map_or(true, |year| contest.year == year))
            .filter(|contest| {
                filter
                    .test
                    .map_or(true, |test| contest.tests.iter().any(|req| req.test == test))
            })
            .collect();
        contests.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.name.cmp(&b.name)));

        Ok(contests
            .into_iter()
            .map(|mut contest| {
                contest
                    .tests
                    .sort_by(|a, b| b.weight_percent.cmp(&a.weight_percent));
                let mut general: Vec<Deadline> = deadlines
                    .iter()
                    .filter(|deadline| {
                        deadline.is_general() && deadline.contest_id.as_ref() == Some(&contest.id)
                    })
                    .cloned()
                    .collect();
                sort_by_due(&mut general);
                ContestView {
                    contest,
                    deadlines: general,
                }
            })
            .collect())
    }

    pub fn list_schools(&self, filter: &SchoolFilter) -> Result<Vec<SchoolView>, ServiceError> {
        let contests = self.contest_index()?;
        let rankings = self.ranking_views()?;

        let mut schools: Vec<School> = self
            .catalog
            .schools()?
            .into_iter()
            .filter(|school| {
                filter
                    .contest_id
                    .as_ref()
                    .map_or(true, |id| school.contest_id.as_ref() == Some(id))
            })
            .collect();
        schools.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(schools
            .into_iter()
            .map(|school| SchoolView {
                contest: summary_for(&contests, school.contest_id.as_ref()),
                leaderboard_entries: best_for_school(&rankings, &school.id),
                school,
            })
            .collect())
    }

    pub fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<ProgramView>, ServiceError> {
        let contests = self.contest_index()?;
        let schools: HashMap<SchoolId, School> = self
            .catalog
            .schools()?
            .into_iter()
            .map(|school| (school.id.clone(), school))
            .collect();
        let rankings = self.ranking_views()?;

        let domain = filter
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);

        let mut programs: Vec<Program> = self
            .catalog
            .programs()?
            .into_iter()
            .filter(|program| match &domain {
                Some(needle) => program
                    .domain
                    .as_deref()
                    .is_some_and(|value| value.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .filter(|program| {
                filter
                    .campus
                    .as_ref()
                    .map_or(true, |campus| program.campuses.iter().any(|c| c == campus))
            })
            .filter(|program| {
                filter
                    .program_type
                    .map_or(true, |kind| program.program_type == kind)
            })
            .filter(|program| {
                filter
                    .format
                    .map_or(true, |format| program.format == Some(format))
            })
            .collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(programs
            .into_iter()
            .map(|program| ProgramView {
                school: schools.get(&program.school_id).map(School::summary),
                contest: summary_for(&contests, program.contest_id.as_ref()),
                leaderboard_entries: best_for_program(&rankings, &program.id),
                program,
            })
            .collect())
    }

    pub fn get_program(&self, slug_or_id: &str) -> Result<ProgramDetail, ServiceError> {
        let mut program = self
            .catalog
            .programs()?
            .into_iter()
            .find(|program| program.id.as_str() == slug_or_id || program.slug == slug_or_id)
            .ok_or_else(|| ServiceError::not_found("Program not found"))?;
        program.courses.sort_by(|a, b| a.title.cmp(&b.title));

        let rankings = self.ranking_views()?;
        let school = self.catalog.school(&program.school_id)?.map(|school| SchoolDetail {
            leaderboard_entries: rankings
                .iter()
                .filter(|view| view.entry.school_id == school.id)
                .cloned()
                .collect(),
            school,
        });
        let contest = match &program.contest_id {
            Some(id) => self.catalog.contest(id)?,
            None => None,
        };
        let program_rankings = rankings
            .iter()
            .filter(|view| view.entry.program_id.as_ref() == Some(&program.id))
            .cloned()
            .collect();
        let mut deadlines: Vec<Deadline> = self
            .catalog
            .deadlines()?
            .into_iter()
            .filter(|deadline| deadline.program_id.as_ref() == Some(&program.id))
            .collect();
        sort_by_due(&mut deadlines);

        Ok(ProgramDetail {
            program,
            school,
            contest,
            leaderboard_entries: program_rankings,
            deadlines,
        })
    }

    pub fn list_deadlines(&self, filter: &DeadlineFilter) -> Result<Vec<Deadline>, ServiceError> {
        let mut deadlines: Vec<Deadline> = self
            .catalog
            .deadlines()?
            .into_iter()
            .filter(|deadline| matches_filter(&filter.contest_id, &deadline.contest_id))
            .filter(|deadline| matches_filter(&filter.school_id, &deadline.school_id))
            .filter(|deadline| matches_filter(&filter.program_id, &deadline.program_id))
            .filter(|deadline| matches_filter(&filter.diploma_name, &deadline.diploma_name))
            .collect();
        sort_by_due(&mut deadlines);
        Ok(deadlines)
    }

    pub fn list_leaderboards(&self) -> Result<Vec<LeaderboardView>, ServiceError> {
        let mut boards = self.catalog.leaderboards()?;
        boards.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.name.cmp(&b.name)));
        boards
            .into_iter()
            .map(|board| self.leaderboard_view(board, Some(3)))
            .collect()
    }

    pub fn get_leaderboard(&self, slug_or_id: &str) -> Result<LeaderboardView, ServiceError> {
        let board = self
            .catalog
            .leaderboards()?
            .into_iter()
            .find(|board| board.id.as_str() == slug_or_id || board.slug == slug_or_id)
            .ok_or_else(|| ServiceError::not_found("Leaderboard not found"))?;
        self.leaderboard_view(board, None)
    }

    /// Imports a scraped leaderboard. Restricted to catalog administrators.
    pub fn import_leaderboard(
        &self,
        user: &AuthUser,
        payload: &LeaderboardPayload,
        now: DateTime<Utc>,
    ) -> Result<IngestSummary, ServiceError> {
        user.require_admin()?;
        let summary = ingest_leaderboard(self.catalog.as_ref(), payload, now)?;
        tracing::info!(
            leaderboard = %summary.slug,
            entries = summary.entries,
            user_id = %user.user_id,
            "leaderboard imported"
        );
        Ok(summary)
    }

    fn leaderboard_view(
        &self,
        leaderboard: Leaderboard,
        limit: Option<usize>,
    ) -> Result<LeaderboardView, ServiceError> {
        let schools: HashMap<SchoolId, School> = self
            .catalog
            .schools()?
            .into_iter()
            .map(|school| (school.id.clone(), school))
            .collect();
        let programs: HashMap<ProgramId, Program> = self
            .catalog
            .programs()?
            .into_iter()
            .map(|program| (program.id.clone(), program))
            .collect();

        let mut entries: Vec<_> = self
            .catalog
            .leaderboard_entries()?
            .into_iter()
            .filter(|entry| entry.leaderboard_id == leaderboard.id)
            .collect();
        entries.sort_by_key(|entry| entry.rank);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        let entries = entries
            .into_iter()
            .map(|entry| EntryView {
                school: schools.get(&entry.school_id).cloned(),
                program: entry
                    .program_id
                    .as_ref()
                    .and_then(|id| programs.get(id))
                    .cloned(),
                entry,
            })
            .collect();

        Ok(LeaderboardView {
            leaderboard,
            entries,
        })
    }

    fn contest_index(&self) -> Result<HashMap<ContestId, ContestSummary>, ServiceError> {
        Ok(self
            .catalog
            .contests()?
            .iter()
            .map(|contest| (contest.id.clone(), contest.summary()))
            .collect())
    }

    /// Every ranking entry joined with its leaderboard, best rank first.
    fn ranking_views(&self) -> Result<Vec<RankingView>, ServiceError> {
        let boards: HashMap<LeaderboardId, Leaderboard> = self
            .catalog
            .leaderboards()?
            .into_iter()
            .map(|board| (board.id.clone(), board))
            .collect();
        let mut views: Vec<RankingView> = self
            .catalog
            .leaderboard_entries()?
            .into_iter()
            .filter_map(|entry| {
                let leaderboard = boards.get(&entry.leaderboard_id)?.clone();
                Some(RankingView { entry, leaderboard })
            })
            .collect();
        views.sort_by_key(|view| view.entry.rank);
        Ok(views)
    }
}

fn sort_by_due(deadlines: &mut [Deadline]) {
    deadlines.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.title.cmp(&b.title)));
}

fn matches_filter<T: PartialEq>(wanted: &Option<T>, actual: &Option<T>) -> bool {
    match wanted {
        Some(value) => actual.as_ref() == Some(value),
        None => true,
    }
}

fn summary_for(
    contests: &HashMap<ContestId, ContestSummary>,
    id: Option<&ContestId>,
) -> Option<ContestSummary> {
    id.and_then(|id| contests.get(id)).cloned()
}

fn best_for_school(rankings: &[RankingView], school_id: &SchoolId) -> Vec<RankingView> {
    rankings
        .iter()
        .find(|view| &view.entry.school_id == school_id)
        .cloned()
        .into_iter()
        .collect()
}

fn best_for_program(rankings: &[RankingView], program_id: &ProgramId) -> Vec<RankingView> {
    rankings
        .iter()
        .find(|view| view.entry.program_id.as_ref() == Some(program_id))
        .cloned()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::catalog::domain::{ProgramFormat, ProgramType, TestType};
    use crate::ids::UserId;
    use crate::test_support::seeded_store;

    fn service() -> CatalogService {
        CatalogService::new(seeded_store())
    }

    #[test]
    fn contests_are_ordered_and_carry_general_deadlines() {
        let contests = service()
            .list_contests(&ContestFilter::default())
            .expect("contests");
        let names: Vec<&str> = contests.iter().map(|c| c.contest.name.as_str()).collect();
        assert_eq!(names, vec!["Masters Test 2026", "TOEFL iBT 2026", "Masters Test 2025"]);

        let toefl = &contests[1];
        assert_eq!(toefl.deadlines.len(), 2);
        assert!(toefl.deadlines[0].due_at < toefl.deadlines[1].due_at);
        assert!(toefl.deadlines.iter().all(Deadline::is_general));

        let masters = &contests[0];
        assert!(masters.deadlines.is_empty(), "program deadlines are not general");
        assert_eq!(masters.contest.tests[0].test, TestType::Gmat);
    }

    #[test]
    fn contests_filter_by_year_and_test() {
        let service = service();
        let only_2025 = service
            .list_contests(&ContestFilter {
                year: Some(2025),
                test: None,
            })
            .expect("contests");
        assert_eq!(only_2025.len(), 1);

        let toefl = service
            .list_contests(&ContestFilter {
                year: None,
                test: Some(TestType::Toefl),
            })
            .expect("contests");
        let names: Vec<&str> = toefl.iter().map(|c| c.contest.name.as_str()).collect();
        assert_eq!(names, vec!["Masters Test 2026", "TOEFL iBT 2026"]);
    }

    #[test]
    fn schools_carry_contest_and_best_ranking() {
        let schools = service()
            .list_schools(&SchoolFilter::default())
            .expect("schools");
        let names: Vec<&str> = schools.iter().map(|s| s.school.name.as_str()).collect();
        assert_eq!(names, vec!["ESCP Business School", "HEC Paris"]);

        let hec = &schools[1];
        assert_eq!(hec.contest.as_ref().map(|c| c.year), Some(2026));
        assert_eq!(hec.leaderboard_entries.len(), 1);
        assert_eq!(hec.leaderboard_entries[0].entry.rank, 2);
    }

    #[test]
    fn programs_filter_on_domain_campus_type_and_format() {
        let service = service();
        let data = service
            .list_programs(&ProgramFilter {
                domain: Some("analytics".to_string()),
                ..ProgramFilter::default()
            })
            .expect("programs");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].program.slug, "escp-msc-business-analytics-ai");
        assert_eq!(
            data[0].school.as_ref().map(|s| s.name.as_str()),
            Some("ESCP Business School")
        );

        let berlin = service
            .list_programs(&ProgramFilter {
                campus: Some("Berlin".to_string()),
                ..ProgramFilter::default()
            })
            .expect("programs");
        assert_eq!(berlin.len(), 1);

        let mba = service
            .list_programs(&ProgramFilter {
                program_type: Some(ProgramType::Mba),
                format: Some(ProgramFormat::FullTime),
                ..ProgramFilter::default()
            })
            .expect("programs");
        assert_eq!(mba.len(), 1);
        assert_eq!(mba[0].program.slug, "hec-mba");
    }

    #[test]
    fn program_detail_resolves_by_slug_or_id() {
        let service = service();
        let detail = service
            .get_program("escp-msc-business-analytics-ai")
            .expect("program");
        let titles: Vec<&str> = detail
            .program
            .courses
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Data Analytics", "Machine Learning for Business"]);
        assert_eq!(detail.deadlines.len(), 2);
        assert!(detail.deadlines[0].due_at < detail.deadlines[1].due_at);
        assert!(detail.contest.is_some());

        let by_id = service
            .get_program(detail.program.id.as_str())
            .expect("program by id");
        assert_eq!(by_id.program.slug, detail.program.slug);

        assert!(matches!(
            service.get_program("unknown"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn deadlines_match_every_provided_filter() {
        let service = service();
        let detail = service
            .get_program("escp-msc-business-analytics-ai")
            .expect("program");
        let by_program = service
            .list_deadlines(&DeadlineFilter {
                program_id: Some(detail.program.id.clone()),
                ..DeadlineFilter::default()
            })
            .expect("deadlines");
        assert_eq!(by_program.len(), 2);

        let by_session = service
            .list_deadlines(&DeadlineFilter {
                program_id: Some(detail.program.id.clone()),
                diploma_name: Some("Unknown diploma".to_string()),
                ..DeadlineFilter::default()
            })
            .expect("deadlines");
        assert!(by_session.is_empty());
    }

    #[test]
    fn leaderboards_list_top_entries_and_detail_lists_all() {
        let service = service();
        let boards = service.list_leaderboards().expect("leaderboards");
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].entries.len(), 2);
        assert_eq!(boards[0].entries[0].entry.rank, 2);
        assert_eq!(
            boards[0].entries[0].school.as_ref().map(|s| s.name.as_str()),
            Some("HEC Paris")
        );

        let detail = service
            .get_leaderboard("ft-european-business-schools-2025")
            .expect("leaderboard");
        assert_eq!(detail.entries.len(), 2);
        assert!(matches!(
            service.get_leaderboard("nope"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn leaderboard_import_requires_admin_role() {
        let service = service();
        let student = AuthUser {
            user_id: UserId::from("usr_student"),
            role: UserRole::Student,
        };
        let payload = crate::rankings::LeaderboardPayload::sample();
        let err = service
            .import_leaderboard(&student, &payload, Utc::now())
            .expect_err("forbidden");
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let admin = AuthUser {
            user_id: UserId::from("usr_admin"),
            role: UserRole::SuperAdmin,
        };
        let summary = service
            .import_leaderboard(&admin, &payload, Utc::now())
            .expect("imported");
        assert_eq!(summary.entries, payload.entries.len());
        assert!(service.get_leaderboard(&summary.slug).is_ok());
    }
}
