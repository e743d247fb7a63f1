// ── Projection engine ──
//
// Derives the displayed list from a cache snapshot: substring search,
// then a stable sort. Never mutates the cache; every call returns a
// fresh vector.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::entity::Entity;
use crate::model::{Course, Student, Teacher};

// ── Sorting primitives ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortState<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Header-click semantics: the same field flips direction, a new
    /// field starts ascending.
    pub fn toggle(&mut self, field: F) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            *self = Self::asc(field);
        }
    }
}

/// Toggle an optional sort state, starting ascending when unset.
pub fn toggle_sort<F: Copy + PartialEq>(state: &mut Option<SortState<F>>, field: F) {
    match state {
        Some(s) => s.toggle(field),
        None => *state = Some(SortState::asc(field)),
    }
}

/// A comparable value extracted from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortKey<'_> {
    /// Strings compare lexically, numbers numerically (total order).
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

// ── Projectable ─────────────────────────────────────────────────────

/// An entity the projection engine can filter and sort.
pub trait Projectable: Entity {
    type SortField: Copy + PartialEq + Eq + std::fmt::Debug + Send + Sync + 'static;

    /// Fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn sort_key(&self, field: Self::SortField) -> SortKey<'_>;
}

/// Search term plus optional sort.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F> {
    pub search: String,
    pub sort: Option<SortState<F>>,
}

impl<F> Default for Query<F> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
        }
    }
}

impl<F> Query<F> {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: SortState<F>) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Filter then sort `cache` into a fresh sequence.
///
/// A record passes the filter when any search field contains the term,
/// ignoring case; an empty term passes everything. The sort is stable,
/// including under `Desc`, so ties keep their cache order.
pub fn project<E: Projectable>(cache: &[Arc<E>], query: &Query<E::SortField>) -> Vec<Arc<E>> {
    let term = query.search.to_lowercase();
    let mut rows: Vec<Arc<E>> = cache
        .iter()
        .filter(|record| {
            term.is_empty()
                || record
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&term))
        })
        .map(Arc::clone)
        .collect();

    if let Some(sort) = query.sort {
        rows.sort_by(|a, b| {
            let ord = a.sort_key(sort.field).compare(&b.sort_key(sort.field));
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }
    rows
}

// ── Per-kind fields ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StudentSortField {
    Name,
    Grade,
    Department,
    Status,
}

impl Projectable for Student {
    type SortField = StudentSortField;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.department.as_str()]
    }

    fn sort_key(&self, field: StudentSortField) -> SortKey<'_> {
        match field {
            StudentSortField::Name => SortKey::Text(&self.name),
            StudentSortField::Grade => SortKey::Text(&self.grade),
            StudentSortField::Department => SortKey::Text(&self.department),
            StudentSortField::Status => SortKey::Text(self.status.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CourseSortField {
    Name,
    Price,
    Institute,
}

impl Projectable for Course {
    type SortField = CourseSortField;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.institute.as_str()]
    }

    fn sort_key(&self, field: CourseSortField) -> SortKey<'_> {
        match field {
            CourseSortField::Name => SortKey::Text(&self.name),
            CourseSortField::Price => SortKey::Number(self.price),
            CourseSortField::Institute => SortKey::Text(&self.institute),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TeacherSortField {
    Name,
    Email,
    Course,
}

impl Projectable for Teacher {
    type SortField = TeacherSortField;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        if let Some(course) = &self.course {
            fields.push(course);
        }
        fields
    }

    fn sort_key(&self, field: TeacherSortField) -> SortKey<'_> {
        match field {
            TeacherSortField::Name => SortKey::Text(&self.name),
            TeacherSortField::Email => SortKey::Text(&self.email),
            TeacherSortField::Course => SortKey::Text(self.course.as_deref().unwrap_or_default()),
        }
    }
}

// ── Dashboard summaries ─────────────────────────────────────────────

/// Student counters shown above the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub total: usize,
    pub active: usize,
}

impl RosterSummary {
    pub fn from_students(students: &[Arc<Student>]) -> Self {
        Self {
            total: students.len(),
            active: students.iter().filter(|s| s.is_active()).count(),
        }
    }

    pub fn inactive(&self) -> usize {
        self.total - self.active
    }
}

/// Course counters shown above the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
}

impl CatalogSummary {
    pub fn from_courses(courses: &[Arc<Course>]) -> Self {
        Self {
            total: courses.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EntityId, Status};
    use pretty_assertions::assert_eq;

    fn course(id: u64, name: &str, price: f64, institute: &str) -> Arc<Course> {
        Arc::new(Course {
            id: EntityId::Local(id),
            name: name.into(),
            price,
            institute: institute.into(),
        })
    }

    fn student(id: u64, name: &str, grade: &str, department: &str, status: Status) -> Arc<Student> {
        Arc::new(Student {
            id: EntityId::Local(id),
            name: name.into(),
            grade: grade.into(),
            department: department.into(),
            status,
            courses: Vec::new(),
        })
    }

    fn ids<E: Entity>(rows: &[Arc<E>]) -> Vec<String> {
        rows.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let cache = vec![
            course(1, "Web Development", 499.99, "Tech Academy"),
            course(2, "Data Science", 599.99, "Insights"),
        ];
        let rows = project(&cache, &Query::search("data"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Data Science");
    }

    #[test]
    fn empty_search_passes_everything_in_cache_order() {
        let cache = vec![course(2, "B", 1.0, ""), course(1, "A", 2.0, "")];
        assert_eq!(ids(&project(&cache, &Query::default())), vec!["2", "1"]);
    }

    #[test]
    fn student_search_covers_department() {
        let cache = vec![
            student(1, "Ada", "A", "Mathematics", Status::Active),
            student(2, "Grace", "B", "Computing", Status::Active),
        ];
        assert_eq!(ids(&project(&cache, &Query::search("MATH"))), vec!["1"]);
    }

    #[test]
    fn numeric_sort_is_not_lexical() {
        let cache = vec![
            course(1, "a", 100.0, ""),
            course(2, "b", 9.5, ""),
            course(3, "c", 20.0, ""),
        ];
        let query = Query::default().sorted(SortState::asc(CourseSortField::Price));
        assert_eq!(ids(&project(&cache, &query)), vec!["2", "3", "1"]);
    }

    #[test]
    fn ties_keep_cache_order_in_both_directions() {
        let cache = vec![
            student(1, "Ada", "A", "Math", Status::Active),
            student(2, "Bob", "B", "Art", Status::Active),
            student(3, "Cy", "A", "Art", Status::Active),
            student(4, "Di", "B", "Math", Status::Active),
        ];
        let mut sort = SortState::asc(StudentSortField::Grade);
        let asc = project(&cache, &Query::default().sorted(sort));
        assert_eq!(ids(&asc), vec!["1", "3", "2", "4"]);

        sort.toggle(StudentSortField::Grade);
        let desc = project(&cache, &Query::default().sorted(sort));
        assert_eq!(ids(&desc), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn project_does_not_touch_the_cache() {
        let cache = vec![course(2, "B", 1.0, ""), course(1, "A", 2.0, "")];
        let query = Query::default().sorted(SortState::asc(CourseSortField::Name));
        let _ = project(&cache, &query);
        assert_eq!(ids(&cache), vec!["2", "1"]);
    }

    #[test]
    fn toggle_flips_same_field_and_resets_on_new_field() {
        let mut sort = SortState::asc(StudentSortField::Name);
        sort.toggle(StudentSortField::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
        sort.toggle(StudentSortField::Name);
        assert_eq!(sort.direction, SortDirection::Asc);
        sort.toggle(StudentSortField::Name);
        sort.toggle(StudentSortField::Grade);
        assert_eq!(sort, SortState::asc(StudentSortField::Grade));

        let mut none: Option<SortState<StudentSortField>> = None;
        toggle_sort(&mut none, StudentSortField::Status);
        assert_eq!(none, Some(SortState::asc(StudentSortField::Status)));
    }

    #[test]
    fn roster_summary_counts_active() {
        let cache = vec![
            student(1, "Ada", "A", "Math", Status::Active),
            student(2, "Bob", "B", "Art", Status::Inactive),
        ];
        let summary = RosterSummary::from_students(&cache);
        assert_eq!(summary, RosterSummary { total: 2, active: 1 });
        assert_eq!(summary.inactive(), 1);
    }
}
