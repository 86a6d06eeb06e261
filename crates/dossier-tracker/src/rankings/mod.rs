//! Import of scraped school leaderboards (JSON payloads or CSV tables) into
//! the catalog.

mod ingest;
mod parser;
mod payload;
mod slug;

use std::path::{Path, PathBuf};

pub use ingest::{ingest_leaderboard, leaderboard_slug, IngestSummary};
pub use parser::{parse_csv, CsvMetadata};
pub use payload::{LeaderboardPayload, RankingEntry};
pub use slug::{program_type_from, slugify};

use crate::error::ServiceError;
use crate::store::RepositoryError;

#[derive(Debug)]
pub enum RankingImportError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    Csv(csv::Error),
    Invalid(String),
    MissingMetadata(&'static str),
    Repository(RepositoryError),
}

impl std::fmt::Display for RankingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingImportError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            RankingImportError::Json(err) => write!(f, "invalid leaderboard JSON: {}", err),
            RankingImportError::Csv(err) => write!(f, "invalid leaderboard CSV: {}", err),
            RankingImportError::Invalid(message) => write!(f, "invalid leaderboard: {}", message),
            RankingImportError::MissingMetadata(field) => {
                write!(f, "CSV import requires --{}", field)
            }
            RankingImportError::Repository(err) => {
                write!(f, "could not store leaderboard: {}", err)
            }
        }
    }
}

impl std::error::Error for RankingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RankingImportError::Io { source, .. } => Some(source),
            RankingImportError::Json(err) => Some(err),
            RankingImportError::Csv(err) => Some(err),
            RankingImportError::Repository(err) => Some(err),
            RankingImportError::Invalid(_) | RankingImportError::MissingMetadata(_) => None,
        }
    }
}

impl From<serde_json::Error> for RankingImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for RankingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for RankingImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<RankingImportError> for ServiceError {
    fn from(err: RankingImportError) -> Self {
        match err {
            RankingImportError::Repository(inner) => ServiceError::Repository(inner),
            RankingImportError::Io { .. } => ServiceError::Internal(err.to_string()),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

/// Loads a leaderboard file. `.csv` files need `metadata`; anything else is
/// read as a JSON payload.
pub fn load_payload(
    path: &Path,
    metadata: Option<&CsvMetadata>,
) -> Result<LeaderboardPayload, RankingImportError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return LeaderboardPayload::from_path(path);
    }

    let metadata = metadata.ok_or(RankingImportError::MissingMetadata("master-type"))?;
    let file = std::fs::File::open(path).map_err(|source| RankingImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(file, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_without_metadata_is_rejected() {
        let err = load_payload(Path::new("rankings.csv"), None).expect_err("metadata required");
        assert!(matches!(err, RankingImportError::MissingMetadata(_)));
    }

    #[test]
    fn validation_failures_become_bad_requests() {
        let err = ServiceError::from(RankingImportError::Invalid("year must be >= 1900".into()));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("year"));
    }
}
