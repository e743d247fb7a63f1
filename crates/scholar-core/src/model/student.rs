use serde::{Deserialize, Serialize};

use super::common::Status;
use super::entity_id::EntityId;

/// Enrollment cap per student.
pub const MAX_ENROLLED_COURSES: usize = 3;

/// A student record.
///
/// `courses` holds course names, not ids. Renaming or deleting a course
/// leaves existing enrollments untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: EntityId,
    pub name: String,
    pub grade: String,
    pub department: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub courses: Vec<String>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn is_enrolled_in(&self, course: &str) -> bool {
        self.courses.iter().any(|c| c == course)
    }
}
