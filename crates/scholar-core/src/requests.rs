// ── Validated records ──
//
// A value of one of these types only exists once the validator has
// accepted a draft. Managers and gateways take them by reference.

use serde::Serialize;

use crate::model::Status;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRequest {
    pub name: String,
    pub price: f64,
    pub institute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRequest {
    pub name: String,
    pub grade: String,
    pub department: String,
    pub status: Status,
    /// At most `MAX_ENROLLED_COURSES` names.
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherRequest {
    pub name: String,
    pub email: String,
    pub course: Option<String>,
}
