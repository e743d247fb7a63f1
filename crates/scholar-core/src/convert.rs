// ── Wire ↔ domain conversions ──
//
// Maps scholar-api's backend-shaped records into canonical domain types,
// and validated requests back into backend payloads.

use tracing::debug;

use scholar_api::{CoursePayload, CourseRecord, StudentPayload, StudentRecord};

use crate::model::{Course, Status, Student};
use crate::requests::{CourseRequest, StudentRequest};

impl From<CourseRecord> for Course {
    fn from(r: CourseRecord) -> Self {
        Self {
            id: r.id.into(),
            name: r.name,
            price: r.price,
            institute: r.institute,
        }
    }
}

impl From<StudentRecord> for Student {
    fn from(r: StudentRecord) -> Self {
        let status = match r.status.as_deref().map(str::parse::<Status>) {
            Some(Ok(status)) => status,
            Some(Err(_)) => {
                debug!(id = %r.id, status = ?r.status, "unrecognised student status, using default");
                Status::default()
            }
            None => Status::default(),
        };
        Self {
            id: r.id.into(),
            name: r.name,
            grade: r.grade,
            department: r.department,
            status,
            courses: r.courses,
        }
    }
}

impl From<&CourseRequest> for CoursePayload {
    fn from(req: &CourseRequest) -> Self {
        Self {
            name: req.name.clone(),
            institute: req.institute.clone(),
            price: req.price,
        }
    }
}

impl From<&StudentRequest> for StudentPayload {
    fn from(req: &StudentRequest) -> Self {
        Self {
            name: req.name.clone(),
            grade: req.grade.clone(),
            department: req.department.clone(),
            courses: req.courses.clone(),
            status: req.status.to_string(),
        }
    }
}
