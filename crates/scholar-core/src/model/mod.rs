// ── Domain model ──
//
// Canonical representations of the school entities. Wire quirks
// (capitalised keys, `_id`) stay in scholar-api; `convert` maps them here.

pub mod common;
pub mod course;
pub mod entity_id;
pub mod student;
pub mod teacher;
pub mod user;

// ── Re-exports ──────────────────────────────────────────────────────

pub use common::{EntityKind, Status};
pub use course::Course;
pub use entity_id::EntityId;
pub use student::{MAX_ENROLLED_COURSES, Student};
pub use teacher::Teacher;
pub use user::User;
