use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::payload::{LeaderboardPayload, RankingEntry};
use super::slug::{program_type_from, slugify};
use super::RankingImportError;
use crate::catalog::domain::ProgramFormat;
use crate::catalog::{CatalogRepository, Leaderboard, LeaderboardEntry, Program, School};
use crate::ids::{LeaderboardEntryId, LeaderboardId, ProgramId, SchoolId};

/// Outcome of one leaderboard import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub leaderboard_id: LeaderboardId,
    pub slug: String,
    pub name: String,
    pub entries: usize,
    pub schools_created: usize,
    pub programs_created: usize,
}

pub fn leaderboard_slug(payload: &LeaderboardPayload) -> String {
    slugify(&format!(
        "{}-{}-{}-{}",
        payload.source, payload.category, payload.year, payload.master_type
    ))
}

/// Upserts the leaderboard and replaces all of its entries. Schools are
/// matched by name among schools outside any contest; programs by name within
/// their school. Missing ones are created.
pub fn ingest_leaderboard(
    catalog: &dyn CatalogRepository,
    payload: &LeaderboardPayload,
    now: DateTime<Utc>,
) -> Result<IngestSummary, RankingImportError> {
    payload.validate()?;

    let leaderboard = catalog.upsert_leaderboard(Leaderboard {
        id: LeaderboardId::generate(),
        slug: leaderboard_slug(payload),
        name: format!("{} - {}", payload.category, payload.source),
        source: payload.source.clone(),
        category: payload.category.clone(),
        region: payload.region.clone(),
        year: payload.year,
        url: Some(payload.source_url.clone()),
        description: Some(format!("Scraped {} {}", payload.master_type, payload.year)),
        updated_at: now,
    })?;

    let mut schools: HashMap<String, SchoolId> = catalog
        .schools()?
        .into_iter()
        .filter(|school| school.contest_id.is_none())
        .map(|school| (school.name, school.id))
        .collect();
    let mut summary = IngestSummary {
        leaderboard_id: leaderboard.id.clone(),
        slug: leaderboard.slug.clone(),
        name: leaderboard.name.clone(),
        entries: 0,
        schools_created: 0,
        programs_created: 0,
    };

    let mut entries = Vec::with_capacity(payload.entries.len());
    for entry in &payload.entries {
        let school_id = match schools.get(&entry.school_name) {
            Some(id) => id.clone(),
            None => {
                let school = catalog.insert_school(school_from(entry))?;
                summary.schools_created += 1;
                schools.insert(school.name.clone(), school.id.clone());
                school.id
            }
        };

        let program_id = match &entry.program_name {
            Some(name) => Some(ensure_program(catalog, entry, name, &school_id, payload, &mut summary)?),
            None => None,
        };

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

    summary.entries = entries.len();
    catalog.replace_leaderboard_entries(&leaderboard.id, entries)?;
    Ok(summary)
}

fn school_from(entry: &RankingEntry) -> School {
    let mut school = School::named(entry.school_name.clone());
    school.country = entry.country.clone();
    school.city = entry.city.clone();
    school.website = entry.link.clone();
    school
}

fn ensure_program(
    catalog: &dyn CatalogRepository,
    entry: &RankingEntry,
    name: &str,
    school_id: &SchoolId,
    payload: &LeaderboardPayload,
    summary: &mut IngestSummary,
) -> Result<ProgramId, RankingImportError> {
    let existing = catalog
        .programs()?
        .into_iter()
        .find(|program| program.name == name && &program.school_id == school_id);
    if let Some(program) = existing {
        return Ok(program.id);
    }

    let slug = unique_program_slug(catalog, &format!("{name}-{}", payload.master_type))?;
    let mut program = Program::minimal(
        slug,
        name,
        school_id.clone(),
        program_type_from(&payload.master_type),
    );
    program.domain = Some(payload.category.clone());
    program.description = entry.notes.clone();
    program.format = Some(ProgramFormat::FullTime);
    program.campuses = entry.city.iter().cloned().collect();

    let program = catalog.insert_program(program)?;
    summary.programs_created += 1;
    Ok(program.id)
}

fn unique_program_slug(
    catalog: &dyn CatalogRepository,
    base: &str,
) -> Result<String, RankingImportError> {
    let base = slugify(base);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while catalog.find_program_by_slug(&candidate)?.is_some() {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(candidate)
}
