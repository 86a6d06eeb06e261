use crate::{infra, server};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dossier_tracker::config::AppConfig;
use dossier_tracker::error::AppError;
use dossier_tracker::rankings::{
    leaderboard_slug, load_payload, CsvMetadata, LeaderboardPayload, RankingImportError,
};
use dossier_tracker::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dossier-tracker-api",
    about = "Serve the DossierTracker API and run its maintenance commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Leaderboard file utilities
    Rankings {
        #[command(subcommand)]
        command: RankingsCommand,
    },
    /// Reminder delivery utilities
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RankingsCommand {
    /// Validate a leaderboard JSON or CSV file and print a summary
    Check(RankingsCheckArgs),
}

#[derive(Subcommand, Debug)]
enum RemindersCommand {
    /// Run one dispatch pass against a freshly seeded store
    DispatchOnce,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Leaderboard JSON files imported before serving
    #[arg(long = "rankings", value_name = "FILE")]
    pub(crate) rankings: Vec<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RankingsCheckArgs {
    /// Leaderboard file (`.json` payload or `.csv` table)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Master type of a CSV table (e.g. mim, mba)
    #[arg(long)]
    pub(crate) master_type: Option<String>,
    /// Publisher of a CSV table
    #[arg(long)]
    pub(crate) source: Option<String>,
    /// Ranking category of a CSV table
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Ranking year of a CSV table
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Source URL of a CSV table
    #[arg(long)]
    pub(crate) source_url: Option<String>,
    /// Optional region of a CSV table
    #[arg(long)]
    pub(crate) region: Option<String>,
}

impl RankingsCheckArgs {
    fn metadata(&self) -> Result<Option<CsvMetadata>, RankingImportError> {
        let any = self.master_type.is_some()
            || self.source.is_some()
            || self.category.is_some()
            || self.year.is_some()
            || self.source_url.is_some();
        if !any {
            return Ok(None);
        }

        let required = |value: &Option<String>, flag: &'static str| {
            value
                .clone()
                .ok_or(RankingImportError::MissingMetadata(flag))
        };
        Ok(Some(CsvMetadata {
            master_type: required(&self.master_type, "master-type")?,
            source: required(&self.source, "source")?,
            category: required(&self.category, "category")?,
            year: self
                .year
                .ok_or(RankingImportError::MissingMetadata("year"))?,
            source_url: required(&self.source_url, "source-url")?,
            region: self.region.clone(),
        }))
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rankings {
            command: RankingsCommand::Check(args),
        } => {
            let payload = check_rankings(&args)?;
            println!("{}", ranking_summary(&payload));
            Ok(())
        }
        Command::Reminders {
            command: RemindersCommand::DispatchOnce,
        } => dispatch_once().await,
    }
}

fn check_rankings(args: &RankingsCheckArgs) -> Result<LeaderboardPayload, AppError> {
    let metadata = args.metadata()?;
    let payload = load_payload(&args.input, metadata.as_ref())?;
    payload.validate()?;
    Ok(payload)
}

fn ranking_summary(payload: &LeaderboardPayload) -> String {
    let schools: std::collections::BTreeSet<&str> = payload
        .entries
        .iter()
        .map(|entry| entry.school_name.as_str())
        .collect();
    format!(
        "{slug}: {category} ({source}, {year}) - {entries} entries across {schools} schools",
        slug = leaderboard_slug(payload),
        category = payload.category,
        source = payload.source,
        year = payload.year,
        entries = payload.entries.len(),
        schools = schools.len(),
    )
}

async fn dispatch_once() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let now = Utc::now();
    let wiring = infra::build(&config, now).await?;
    let report = wiring.api.reminders.dispatch_due(now).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| format!("{report:?}"))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_tracker::rankings::RankingEntry;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["dossier-tracker-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "dossier-tracker-api",
            "serve",
            "--port",
            "8080",
            "--rankings",
            "a.json",
            "--rankings",
            "b.json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.rankings.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn csv_metadata_is_all_or_nothing() {
        let mut args = RankingsCheckArgs {
            input: PathBuf::from("ft.csv"),
            ..RankingsCheckArgs::default()
        };
        assert!(args.metadata().expect("no metadata").is_none());

        args.master_type = Some("mim".to_string());
        args.source = Some("Financial Times".to_string());
        assert!(matches!(
            args.metadata(),
            Err(RankingImportError::MissingMetadata("category"))
        ));

        args.category = Some("Master in Management".to_string());
        args.year = Some(2025);
        args.source_url = Some("https://rankings.ft.com".to_string());
        let metadata = args.metadata().expect("complete").expect("metadata");
        assert_eq!(metadata.year, 2025);
        assert!(metadata.region.is_none());
    }

    #[test]
    fn summary_counts_distinct_schools() {
        let payload = LeaderboardPayload {
            master_type: "mim".to_string(),
            source: "Financial Times".to_string(),
            category: "Master in Management".to_string(),
            year: 2025,
            source_url: "https://rankings.ft.com".to_string(),
            region: None,
            entries: vec![
                RankingEntry::new(1, "HEC Paris", None),
                RankingEntry::new(2, "ESSEC Business School", None),
                RankingEntry::new(3, "HEC Paris", Some("MBA")),
            ],
            scraped_at: None,
        };
        let summary = ranking_summary(&payload);
        assert!(summary.contains("3 entries across 2 schools"));
        assert!(summary.starts_with(&leaderboard_slug(&payload)));
    }
}
