// scholar-core: Entity state-synchronization layer between scholar-api and consumers (CLI).

pub mod config;
pub mod console;
pub mod convert;
pub mod draft;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod model;
pub mod projection;
pub mod requests;
pub mod session;
mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use draft::{CourseDraft, CourseField, StudentDraft, StudentField, TeacherDraft, TeacherField};
pub use entity::{Entity, LocalIdStrategy};
pub use error::{CoreError, Operation};
pub use gateway::{CourseGateway, Gateway, StudentGateway};
pub use manager::{DEFAULT_OPERATION_TIMEOUT, EntityManager, SyncFault};
pub use projection::{
    CatalogSummary, CourseSortField, Projectable, Query, RosterSummary, SortDirection, SortState,
    StudentSortField, TeacherSortField, project,
};
pub use requests::{CourseRequest, StudentRequest, TeacherRequest};
pub use session::{FileUserDirectory, SessionContext, SessionStore, SignUp, UserDirectory};
pub use stream::{EntityStream, Snapshot};
pub use validate::FieldErrors;

// Re-export model types at the crate root for ergonomics.
pub use model::{Course, EntityId, EntityKind, MAX_ENROLLED_COURSES, Status, Student, Teacher, User};
