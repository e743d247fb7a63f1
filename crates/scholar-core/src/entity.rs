// ── Entity capability trait ──
//
// Ties each domain type to its draft, its validated form, and the way a
// local-only manager mints identifiers for it.

use std::sync::Arc;

use crate::draft::{CourseDraft, StudentDraft, TeacherDraft};
use crate::model::{Course, EntityId, EntityKind, Student, Teacher};
use crate::requests::{CourseRequest, StudentRequest, TeacherRequest};
use crate::validate::{self, FieldErrors};

/// How a local-only manager assigns ids to new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalIdStrategy {
    /// Highest existing numeric id + 1 (1 for an empty cache).
    Sequential,
    /// Current Unix time in milliseconds, bumped past the highest
    /// existing id on collision.
    Timestamp,
}

/// A record kind an `EntityManager` can own.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    const LOCAL_IDS: LocalIdStrategy = LocalIdStrategy::Sequential;

    type Draft: Send + Sync;
    type Valid: Clone + Send + Sync + 'static;

    fn id(&self) -> &EntityId;

    /// Run the validator. `existing` is the current cache; `editing` is
    /// the id of the record being replaced, if any.
    fn validate(
        draft: &Self::Draft,
        existing: &[Arc<Self>],
        editing: Option<&EntityId>,
    ) -> Result<Self::Valid, FieldErrors>;

    /// Materialise a committed record (local-only create, optimistic update).
    fn from_valid(id: EntityId, valid: &Self::Valid) -> Self;
}

impl Entity for Course {
    const KIND: EntityKind = EntityKind::Course;

    type Draft = CourseDraft;
    type Valid = CourseRequest;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn validate(
        draft: &CourseDraft,
        _existing: &[Arc<Self>],
        _editing: Option<&EntityId>,
    ) -> Result<CourseRequest, FieldErrors> {
        validate::validate_course(draft)
    }

    fn from_valid(id: EntityId, valid: &CourseRequest) -> Self {
        Self {
            id,
            name: valid.name.clone(),
            price: valid.price,
            institute: valid.institute.clone(),
        }
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    type Draft = StudentDraft;
    type Valid = StudentRequest;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn validate(
        draft: &StudentDraft,
        _existing: &[Arc<Self>],
        _editing: Option<&EntityId>,
    ) -> Result<StudentRequest, FieldErrors> {
        validate::validate_student(draft)
    }

    fn from_valid(id: EntityId, valid: &StudentRequest) -> Self {
        Self {
            id,
            name: valid.name.clone(),
            grade: valid.grade.clone(),
            department: valid.department.clone(),
            status: valid.status,
            courses: valid.courses.clone(),
        }
    }
}

impl Entity for Teacher {
    const KIND: EntityKind = EntityKind::Teacher;
    const LOCAL_IDS: LocalIdStrategy = LocalIdStrategy::Timestamp;

    type Draft = TeacherDraft;
    type Valid = TeacherRequest;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn validate(
        draft: &TeacherDraft,
        existing: &[Arc<Self>],
        editing: Option<&EntityId>,
    ) -> Result<TeacherRequest, FieldErrors> {
        validate::validate_teacher(draft, existing, editing)
    }

    fn from_valid(id: EntityId, valid: &TeacherRequest) -> Self {
        Self {
            id,
            name: valid.name.clone(),
            email: valid.email.clone(),
            course: valid.course.clone(),
        }
    }
}
