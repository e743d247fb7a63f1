// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Enrollment status of a student.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

/// The three entity kinds a console operator manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Course,
    Student,
    Teacher,
}
