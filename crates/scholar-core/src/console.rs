// ── Console facade ──
//
// Bundles the three entity managers behind one handle: courses and
// students against the backend, teachers local to this process.
// Student ↔ course links are resolved here, by name, against whatever
// the course cache currently holds.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use scholar_api::ApiClient;

use crate::config::ConsoleConfig;
use crate::draft::StudentDraft;
use crate::error::CoreError;
use crate::gateway::{CourseGateway, Gateway, StudentGateway};
use crate::manager::EntityManager;
use crate::model::{Course, EntityId, EntityKind, Student, Teacher};
use crate::validate::FieldErrors;

pub struct Console {
    courses: EntityManager<Course>,
    students: EntityManager<Student>,
    teachers: EntityManager<Teacher>,
}

impl Console {
    /// Connect the server-backed managers to the configured backend.
    pub fn new(config: &ConsoleConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_url.as_str(), &config.transport()).map_err(|e| {
            CoreError::Config {
                message: format!("cannot reach backend at {}: {e}", config.api_url),
            }
        })?;
        let client = Arc::new(client);
        debug!(url = %config.api_url, "console configured");
        Ok(Self::with_gateways(
            Arc::new(CourseGateway::new(Arc::clone(&client))),
            Arc::new(StudentGateway::new(client)),
            config.operation_timeout(),
        ))
    }

    /// Build from explicit gateways.
    pub fn with_gateways(
        courses: Arc<dyn Gateway<Course>>,
        students: Arc<dyn Gateway<Student>>,
        timeout: Duration,
    ) -> Self {
        Self {
            courses: EntityManager::remote(courses, timeout),
            students: EntityManager::remote(students, timeout),
            teachers: EntityManager::local(Vec::new()),
        }
    }

    pub fn courses(&self) -> &EntityManager<Course> {
        &self.courses
    }

    pub fn students(&self) -> &EntityManager<Student> {
        &self.students
    }

    pub fn teachers(&self) -> &EntityManager<Teacher> {
        &self.teachers
    }

    /// List courses and students concurrently.
    ///
    /// Both lists run to completion; the first failure (courses first) is
    /// returned and each manager keeps its own sync fault.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let (courses, students) = tokio::join!(self.courses.list(), self.students.list());
        courses?;
        students?;
        Ok(())
    }

    /// Course names a student may pick from, in catalog order.
    pub fn course_choices(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for course in self.courses.snapshot().iter() {
            if !names.contains(&course.name) {
                names.push(course.name.clone());
            }
        }
        names
    }

    /// Enrolled names that no longer match any course in the catalog.
    pub fn dangling_enrollments(&self, student: &Student) -> Vec<String> {
        let choices = self.course_choices();
        student
            .courses
            .iter()
            .filter(|c| !choices.contains(c))
            .cloned()
            .collect()
    }

    /// Add `course` to a student's enrollments and push the update.
    pub async fn enroll(&self, student_id: &EntityId, course: &str) -> Result<(), CoreError> {
        let mut draft = self.student_draft(student_id)?;
        if !self.course_choices().iter().any(|c| c == course.trim()) {
            return Err(FieldErrors::single("courses", format!("Unknown course '{}'", course.trim())).into());
        }
        draft.select_course(course)?;
        self.students.update(student_id, &draft).await
    }

    /// Remove `course` from a student's enrollments. Dropping a course
    /// the student is not enrolled in changes nothing.
    pub async fn drop_course(&self, student_id: &EntityId, course: &str) -> Result<(), CoreError> {
        let mut draft = self.student_draft(student_id)?;
        if !draft.deselect_course(course) {
            return Ok(());
        }
        self.students.update(student_id, &draft).await
    }

    fn student_draft(&self, id: &EntityId) -> Result<StudentDraft, CoreError> {
        self.students
            .get(id)
            .map(|s| StudentDraft::from(s.as_ref()))
            .ok_or_else(|| CoreError::NotFound {
                kind: EntityKind::Student,
                id: id.clone(),
            })
    }
}
