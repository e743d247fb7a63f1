// ── Editable drafts ──
//
// A draft is the in-progress form state for one record. Fields are set
// through a closed `…Field` enum, so an edit can only ever touch a field
// the entity actually has. Drafts may hold values the validator will
// later refuse (an over-full course list, a non-numeric price).

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::model::{Course, MAX_ENROLLED_COURSES, Status, Student, Teacher};
use crate::validate::FieldErrors;

// ── Course ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CourseField {
    Name,
    Price,
    Institute,
}

/// Form state for a course. `price` is kept as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseDraft {
    pub name: String,
    pub price: String,
    pub institute: String,
}

impl CourseDraft {
    pub fn set(&mut self, field: CourseField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CourseField::Name => self.name = value,
            CourseField::Price => self.price = value,
            CourseField::Institute => self.institute = value,
        }
    }
}

impl From<&Course> for CourseDraft {
    fn from(course: &Course) -> Self {
        Self {
            name: course.name.clone(),
            price: course.price.to_string(),
            institute: course.institute.clone(),
        }
    }
}

// ── Student ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StudentField {
    Name,
    Grade,
    Department,
    Status,
    Courses,
}

/// Form state for a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentDraft {
    pub name: String,
    pub grade: String,
    pub department: String,
    pub status: Status,
    pub courses: Vec<String>,
}

impl StudentDraft {
    /// Set one field from its text form.
    ///
    /// `Courses` takes a comma-separated list and stores every name, even
    /// past the enrollment cap; `is_over_course_limit` reports that state.
    /// Only an unrecognised status is refused.
    pub fn set(&mut self, field: StudentField, value: impl Into<String>) -> Result<(), FieldErrors> {
        let value = value.into();
        match field {
            StudentField::Name => self.name = value,
            StudentField::Grade => self.grade = value,
            StudentField::Department => self.department = value,
            StudentField::Status => {
                self.status = value.trim().parse().map_err(|_| {
                    FieldErrors::single(
                        StudentField::Status.into(),
                        format!("Unknown status '{}' (expected Active or Inactive)", value.trim()),
                    )
                })?;
            }
            StudentField::Courses => self.courses = parse_course_list(&value),
        }
        Ok(())
    }

    /// Add a course unless that would exceed the enrollment cap.
    ///
    /// Selecting a course that is already present is a no-op.
    pub fn select_course(&mut self, name: &str) -> Result<(), FieldErrors> {
        let name = name.trim();
        if name.is_empty() || self.courses.iter().any(|c| c == name) {
            return Ok(());
        }
        if self.courses.len() >= MAX_ENROLLED_COURSES {
            return Err(course_limit_error());
        }
        self.courses.push(name.to_owned());
        Ok(())
    }

    /// Remove a course if present. Returns whether anything changed.
    pub fn deselect_course(&mut self, name: &str) -> bool {
        let before = self.courses.len();
        self.courses.retain(|c| c != name.trim());
        self.courses.len() != before
    }

    /// Checkbox semantics: deselect when present, otherwise select.
    pub fn toggle_course(&mut self, name: &str) -> Result<(), FieldErrors> {
        if self.deselect_course(name) {
            Ok(())
        } else {
            self.select_course(name)
        }
    }

    pub fn is_over_course_limit(&self) -> bool {
        self.courses.len() > MAX_ENROLLED_COURSES
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            grade: student.grade.clone(),
            department: student.department.clone(),
            status: student.status,
            courses: student.courses.clone(),
        }
    }
}

pub(crate) fn course_limit_error() -> FieldErrors {
    FieldErrors::single(
        StudentField::Courses.into(),
        format!("A student can enroll in at most {MAX_ENROLLED_COURSES} courses"),
    )
}

/// Split comma-separated course names, dropping blanks and repeats.
pub fn parse_course_list(text: &str) -> Vec<String> {
    let mut courses: Vec<String> = Vec::new();
    for name in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !courses.iter().any(|c| c == name) {
            courses.push(name.to_owned());
        }
    }
    courses
}

// ── Teacher ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TeacherField {
    Name,
    Email,
    Course,
}

/// Form state for a teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub course: Option<String>,
}

impl TeacherDraft {
    /// Set one field. A blank course clears the assignment.
    pub fn set(&mut self, field: TeacherField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TeacherField::Name => self.name = value,
            TeacherField::Email => self.email = value,
            TeacherField::Course => {
                self.course = Some(value).filter(|v| !v.trim().is_empty());
            }
        }
    }
}

impl From<&Teacher> for TeacherDraft {
    fn from(teacher: &Teacher) -> Self {
        Self {
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            course: teacher.course.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_keys_parse_from_ui_names() {
        assert_eq!("department".parse::<StudentField>().unwrap(), StudentField::Department);
        assert_eq!("Price".parse::<CourseField>().unwrap(), CourseField::Price);
        assert!("salary".parse::<TeacherField>().is_err());
    }

    #[test]
    fn fourth_selected_course_is_refused() {
        let mut draft = StudentDraft::default();
        for name in ["Algebra", "Biology", "Chemistry"] {
            draft.select_course(name).unwrap();
        }
        let err = draft.select_course("Drama").unwrap_err();
        assert!(err.get("courses").is_some());
        assert_eq!(draft.courses.len(), 3);
    }

    #[test]
    fn toggle_deselects_then_reselects() {
        let mut draft = StudentDraft::default();
        draft.toggle_course("Algebra").unwrap();
        assert_eq!(draft.courses, vec!["Algebra"]);
        draft.toggle_course("Algebra").unwrap();
        assert!(draft.courses.is_empty());
    }

    #[test]
    fn typed_course_list_may_exceed_cap() {
        let mut draft = StudentDraft::default();
        draft
            .set(StudentField::Courses, "Algebra, Biology,, Chemistry, Drama, Algebra")
            .unwrap();
        assert_eq!(draft.courses, vec!["Algebra", "Biology", "Chemistry", "Drama"]);
        assert!(draft.is_over_course_limit());
    }

    #[test]
    fn unknown_status_is_a_field_error() {
        let mut draft = StudentDraft::default();
        let err = draft.set(StudentField::Status, "graduated").unwrap_err();
        assert!(err.get("status").is_some());
        assert_eq!(draft.status, Status::Active);
    }

    #[test]
    fn blank_teacher_course_clears_assignment() {
        let mut draft = TeacherDraft {
            course: Some("Physics".into()),
            ..TeacherDraft::default()
        };
        draft.set(TeacherField::Course, "  ");
        assert_eq!(draft.course, None);
    }
}
