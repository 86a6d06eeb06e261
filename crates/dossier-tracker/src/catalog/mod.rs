//! Shared admissions catalog: contests, schools, programs, official
//! deadlines and school rankings.

pub mod domain;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;

pub use domain::{
    Contest, Deadline, DeadlineType, Leaderboard, LeaderboardEntry, Program, ProgramType, School,
    TestType,
};
pub use repository::CatalogRepository;
pub use router::catalog_router;
pub use seed::{CatalogSeed, CatalogSeedError, SeedDemoAccount, SeedSummary};
pub use service::CatalogService;
