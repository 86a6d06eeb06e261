use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::RankingImportError;

/// Leaderboard as produced by the ranking scrapers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPayload {
    pub master_type: String,
    pub source: String,
    pub category: String,
    pub year: i32,
    pub source_url: String,
    #[serde(default)]
    pub region: Option<String>,
    pub entries: Vec<RankingEntry>,
    #[serde(default)]
    pub scraped_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub school_name: String,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl LeaderboardPayload {
    /// Reads and validates a JSON payload file.
    pub fn from_path(path: &Path) -> Result<Self, RankingImportError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RankingImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, RankingImportError> {
        let payload: Self = serde_json::from_str(raw)?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn validate(&self) -> Result<(), RankingImportError> {
        require_text("master_type", &self.master_type)?;
        require_text("source", &self.source)?;
        require_text("category", &self.category)?;
        if self.year < 1900 {
            return Err(invalid("year must be >= 1900"));
        }
        Url::parse(&self.source_url).map_err(|_| invalid("source_url must be a URL"))?;
        if self.entries.is_empty() {
            return Err(invalid("entries must contain at least 1 element"));
        }

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.rank == 0 {
                return Err(invalid(format!("entries[{index}].rank must be >= 1")));
            }
            if entry.school_name.trim().is_empty() {
                return Err(invalid(format!("entries[{index}].school_name is required")));
            }
            if let Some(link) = &entry.link {
                Url::parse(link)
                    .map_err(|_| invalid(format!("entries[{index}].link must be a URL")))?;
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn sample() -> Self {
        Self {
            master_type: "mim".to_string(),
            source: "Financial Times".to_string(),
            category: "Master in Management".to_string(),
            year: 2025,
            source_url: "https://rankings.ft.com/rankings/2025".to_string(),
            region: Some("Europe".to_string()),
            entries: vec![
                RankingEntry::new(1, "Université Paris Dauphine", Some("Master Management")),
                RankingEntry::new(2, "HEC Paris", Some("Master in Management")),
                RankingEntry::new(3, "HEC Paris", None),
            ],
            scraped_at: None,
        }
    }
}

impl RankingEntry {
    pub fn new(rank: u32, school_name: &str, program_name: Option<&str>) -> Self {
        Self {
            rank,
            school_name: school_name.to_string(),
            program_name: program_name.map(str::to_string),
            country: None,
            city: None,
            score: None,
            notes: None,
            link: None,
            metadata: None,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), RankingImportError> {
    if value.trim().is_empty() {
        Err(invalid(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RankingImportError {
    RankingImportError::Invalid(message.into())
}
