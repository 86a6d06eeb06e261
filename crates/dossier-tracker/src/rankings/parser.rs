use std::io::Read;

use super::payload::{LeaderboardPayload, RankingEntry};
use super::RankingImportError;

/// Leaderboard metadata supplied alongside a CSV table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvMetadata {
    pub master_type: String,
    pub source: String,
    pub category: String,
    pub year: i32,
    pub source_url: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Rank,
    School,
    Program,
    Country,
    City,
    Score,
    Notes,
    Link,
}

const HEADER_ALIASES: &[(Column, &[&str])] = &[
    (Column::Rank, &["rank", "position", "#"]),
    (
        Column::School,
        &["school", "university", "institution", "business school"],
    ),
    (
        Column::Program,
        &["program", "programme", "degree", "master", "course"],
    ),
    (Column::Country, &["country", "location"]),
    (Column::City, &["city", "campus"]),
    (Column::Score, &["score", "points", "index"]),
    (Column::Notes, &["notes", "comment", "remarks"]),
    (Column::Link, &["link", "url", "website"]),
];

/// Parses a ranking table. Rows without a usable rank or school are skipped.
pub fn parse_csv<R: Read>(
    reader: R,
    metadata: &CsvMetadata,
) -> Result<LeaderboardPayload, RankingImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut columns: Vec<Option<Column>> = Vec::new();
    for header in csv_reader.headers()?.iter() {
        let column = match_header(header).filter(|column| !columns.contains(&Some(*column)));
        columns.push(column);
    }
    if !columns.contains(&Some(Column::Rank)) || !columns.contains(&Some(Column::School)) {
        return Err(RankingImportError::Invalid(
            "CSV must have rank and school columns".to_string(),
        ));
    }

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut entry = RankingEntry::new(0, "", None);

        for (value, column) in record.iter().zip(&columns) {
            let Some(column) = column else { continue };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match column {
                Column::Rank => entry.rank = parse_rank(value).unwrap_or(0),
                Column::School => entry.school_name = collapse_whitespace(value),
                Column::Program => entry.program_name = Some(collapse_whitespace(value)),
                Column::Country => entry.country = Some(value.to_string()),
                Column::City => entry.city = Some(value.to_string()),
                Column::Score => entry.score = value.replace(',', ".").parse().ok(),
                Column::Notes => entry.notes = Some(value.to_string()),
                Column::Link => entry.link = Some(value.to_string()),
            }
        }

        if entry.rank == 0 || entry.school_name.is_empty() {
            continue;
        }
        entries.push(entry);
    }

    let payload = LeaderboardPayload {
        master_type: metadata.master_type.clone(),
        source: metadata.source.clone(),
        category: metadata.category.clone(),
        year: metadata.year,
        source_url: metadata.source_url.clone(),
        region: metadata.region.clone(),
        entries,
        scraped_at: None,
    };
    payload.validate()?;
    Ok(payload)
}

fn normalize_header(value: &str) -> String {
    let lowered: String = value
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '#' {
                ch
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&lowered)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn match_header(header: &str) -> Option<Column> {
    let normalized = normalize_header(header);
    HEADER_ALIASES.iter().find_map(|(column, aliases)| {
        aliases
            .iter()
            .any(|alias| normalized.starts_with(&normalize_header(alias)))
            .then_some(*column)
    })
}

/// First number in the cell, so `"=3"` and `"12."` both parse.
fn parse_rank(raw: &str) -> Option<u32> {
    let start = raw.find(|ch: char| ch.is_ascii_digit())?;
    let number: String = raw[start..]
        .chars()
        .take_while(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == ',')
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    let value: f64 = number.trim_end_matches('.').parse().ok()?;
    if value >= 1.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}
