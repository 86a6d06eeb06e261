//! Identifier newtypes shared by every record.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(UserId, "usr");
record_id!(ContestId, "cnt");
record_id!(SchoolId, "sch");
record_id!(ProgramId, "prg");
record_id!(DeadlineId, "ddl");
record_id!(CandidatureId, "cand");
record_id!(TaskId, "tsk");
record_id!(ReminderId, "rmd");
record_id!(LeaderboardId, "ldb");
record_id!(LeaderboardEntryId, "lde");
