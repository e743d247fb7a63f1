// ── Mutation validator ──
//
// Pure pre-flight checks run before any mutation reaches a cache or the
// backend. Each function maps a draft to its validated request or to the
// full set of field-scoped errors.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::draft::{CourseDraft, CourseField, StudentDraft, StudentField, TeacherDraft, TeacherField, course_limit_error};
use crate::model::{EntityId, MAX_ENROLLED_COURSES, Teacher};
use crate::requests::{CourseRequest, StudentRequest, TeacherRequest};

// ── FieldErrors ─────────────────────────────────────────────────────

/// Field name → message, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record an error. The first message per field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// ── Shared checks ───────────────────────────────────────────────────

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, message);
    }
    trimmed.to_owned()
}

/// Basic `local@domain.tld` shape: no whitespace, something before the
/// `@`, and a dot inside the domain with text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(at) = email
        .char_indices()
        .skip(1)
        .find_map(|(i, c)| (c == '@').then_some(i))
    else {
        return false;
    };
    let domain = &email[at + 1..];
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Parse a price: finite and non-negative.
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

// ── Course ──────────────────────────────────────────────────────────

pub fn validate_course(draft: &CourseDraft) -> Result<CourseRequest, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, CourseField::Name.into(), &draft.name, "Course name is required");

    let price = if draft.price.trim().is_empty() {
        errors.insert(CourseField::Price.into(), "Price is required");
        None
    } else {
        let parsed = parse_price(&draft.price);
        if parsed.is_none() {
            errors.insert(CourseField::Price.into(), "Price must be a non-negative number");
        }
        parsed
    };

    match price {
        Some(price) if errors.is_empty() => Ok(CourseRequest {
            name,
            price,
            institute: draft.institute.trim().to_owned(),
        }),
        _ => Err(errors),
    }
}

// ── Student ─────────────────────────────────────────────────────────

pub fn validate_student(draft: &StudentDraft) -> Result<StudentRequest, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, StudentField::Name.into(), &draft.name, "Name is required");
    let grade = required(&mut errors, StudentField::Grade.into(), &draft.grade, "Grade is required");
    let department = required(
        &mut errors,
        StudentField::Department.into(),
        &draft.department,
        "Department is required",
    );

    if draft.courses.len() > MAX_ENROLLED_COURSES {
        for (field, message) in course_limit_error().iter() {
            errors.insert(field, message);
        }
    }

    errors.into_result(StudentRequest {
        name,
        grade,
        department,
        status: draft.status,
        courses: draft.courses.clone(),
    })
}

// ── Teacher ─────────────────────────────────────────────────────────

/// Validate a teacher draft against the current roster.
///
/// `editing` names the record being edited; its own email does not count
/// as a duplicate.
pub fn validate_teacher(
    draft: &TeacherDraft,
    existing: &[Arc<Teacher>],
    editing: Option<&EntityId>,
) -> Result<TeacherRequest, FieldErrors> {
    let mut errors = FieldErrors::new();
    let email_field: &'static str = TeacherField::Email.into();

    let name = required(&mut errors, TeacherField::Name.into(), &draft.name, "Name is required");
    let email = required(&mut errors, email_field, &draft.email, "Email is required");

    if !email.is_empty() {
        if !is_valid_email(&email) {
            errors.insert(email_field, "Email is invalid");
        } else if existing
            .iter()
            .any(|t| t.email == email && Some(&t.id) != editing)
        {
            errors.insert(email_field, "A teacher with this email already exists");
        }
    }

    errors.into_result(TeacherRequest {
        name,
        email,
        course: draft
            .course
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn teacher(id: u64, email: &str) -> Arc<Teacher> {
        Arc::new(Teacher {
            id: EntityId::Local(id),
            name: format!("Teacher {id}"),
            email: email.into(),
            course: None,
        })
    }

    fn teacher_draft(name: &str, email: &str) -> TeacherDraft {
        TeacherDraft {
            name: name.into(),
            email: email.into(),
            course: None,
        }
    }

    // ── Email format ──

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@school.edu"));
        assert!(is_valid_email("a.b@c.d.e"));
        assert!(!is_valid_email("ada@school"));
        assert!(!is_valid_email("@school.edu"));
        assert!(!is_valid_email("ada@.edu"));
        assert!(!is_valid_email("ada@school."));
        assert!(!is_valid_email("ada lovelace@school.edu"));
    }

    // ── Course ──

    #[test]
    fn course_requires_name_and_price() {
        let errors = validate_course(&CourseDraft::default()).unwrap_err();
        assert_eq!(errors.get("name"), Some("Course name is required"));
        assert_eq!(errors.get("price"), Some("Price is required"));
    }

    #[test]
    fn course_price_must_be_finite_and_non_negative() {
        for bad in ["abc", "-1", "NaN", "inf"] {
            let draft = CourseDraft {
                name: "DB".into(),
                price: bad.into(),
                institute: String::new(),
            };
            let errors = validate_course(&draft).unwrap_err();
            assert!(errors.get("price").is_some(), "{bad} should be rejected");
        }
    }

    #[test]
    fn course_accepts_trimmed_input() {
        let draft = CourseDraft {
            name: "  DB ".into(),
            price: " 199.5".into(),
            institute: "X".into(),
        };
        let req = validate_course(&draft).unwrap();
        assert_eq!(req.name, "DB");
        assert!((req.price - 199.5).abs() < f64::EPSILON);
    }

    // ── Student ──

    #[test]
    fn student_whitespace_counts_as_missing() {
        let draft = StudentDraft {
            name: "   ".into(),
            grade: "A".into(),
            department: String::new(),
            ..StudentDraft::default()
        };
        let errors = validate_student(&draft).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["name", "department"]);
    }

    #[test]
    fn student_over_course_cap_is_refused() {
        let draft = StudentDraft {
            name: "Ada".into(),
            grade: "A".into(),
            department: "Math".into(),
            courses: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..StudentDraft::default()
        };
        let errors = validate_student(&draft).unwrap_err();
        assert!(errors.get("courses").is_some());
        assert_eq!(errors.len(), 1);
    }

    // ── Teacher ──

    #[test]
    fn teacher_messages() {
        let errors = validate_teacher(&teacher_draft("", ""), &[], None).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));

        let errors = validate_teacher(&teacher_draft("Ada", "nope"), &[], None).unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is invalid"));
    }

    #[test]
    fn duplicate_email_is_a_field_error() {
        let existing = vec![teacher(1, "ada@school.edu")];
        let errors =
            validate_teacher(&teacher_draft("Ada", "ada@school.edu"), &existing, None).unwrap_err();
        assert_eq!(
            errors.get("email"),
            Some("A teacher with this email already exists")
        );
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let existing = vec![teacher(1, "ada@school.edu")];
        assert!(validate_teacher(&teacher_draft("Ada", "Ada@school.edu"), &existing, None).is_ok());
    }

    #[test]
    fn editing_record_keeps_its_own_email() {
        let existing = vec![teacher(1, "ada@school.edu"), teacher(2, "bob@school.edu")];
        let draft = teacher_draft("Ada L.", "ada@school.edu");
        assert!(validate_teacher(&draft, &existing, Some(&EntityId::Local(1))).is_ok());
        assert!(validate_teacher(&draft, &existing, Some(&EntityId::Local(2))).is_err());
    }

    #[test]
    fn display_joins_fields_in_order() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Name is required");
        errors.insert("email", "Email is required");
        errors.insert("name", "ignored");
        assert_eq!(
            errors.to_string(),
            "name: Name is required; email: Email is required"
        );
    }
}
