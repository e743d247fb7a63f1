// Wire types for the school-management backend.
//
// These mirror the JSON the backend actually sends and accepts, quirks
// included (capitalised `Name` / `Department` on students, `_id` keys).
// `scholar-core` converts them into canonical domain types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as issued by the backend: usually a string key, but older
/// collections hand out plain numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Courses ─────────────────────────────────────────────────────────

/// `GET /course/getcourse` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<CourseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(alias = "_id")]
    pub id: WireId,
    pub name: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub institute: String,
}

/// Body for `POST /course/addcourse` and `PUT /course/updatecourse/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePayload {
    pub name: String,
    pub institute: String,
    pub price: f64,
}

// ── Students ────────────────────────────────────────────────────────

/// `GET /student/getstudent` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentList {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(alias = "_id")]
    pub id: WireId,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(rename = "Department", alias = "department", default)]
    pub department: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for `POST /student/addstudent` and `PUT /student/updatestudent/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentPayload {
    #[serde(rename = "Name")]
    pub name: String,
    pub grade: String,
    #[serde(rename = "Department")]
    pub department: String,
    pub courses: Vec<String>,
    pub status: String,
}

/// Prices arrive as numbers, but hand-edited records sometimes carry
/// them as strings (`"499.99"`).
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn course_accepts_mongo_id_and_string_price() {
        let record: CourseRecord = serde_json::from_value(json!({
            "_id": "65f0c0ffee",
            "name": "Data Science",
            "price": "599.99",
            "institute": "Data Insights"
        }))
        .unwrap();
        assert_eq!(record.id, WireId::Text("65f0c0ffee".into()));
        assert!((record.price - 599.99).abs() < f64::EPSILON);
    }

    #[test]
    fn course_accepts_numeric_id() {
        let record: CourseRecord = serde_json::from_value(json!({
            "id": 1,
            "name": "Web Development",
            "price": 499.99
        }))
        .unwrap();
        assert_eq!(record.id, WireId::Number(1));
        assert_eq!(record.institute, "");
    }

    #[test]
    fn student_reads_capitalised_and_lowercase_keys() {
        let upper: StudentRecord = serde_json::from_value(json!({
            "_id": "s1", "Name": "Ada", "grade": "A", "Department": "Math",
            "courses": ["Algebra"], "status": "Active"
        }))
        .unwrap();
        let lower: StudentRecord = serde_json::from_value(json!({
            "_id": "s1", "name": "Ada", "grade": "A", "department": "Math",
            "courses": ["Algebra"], "status": "Active"
        }))
        .unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn student_payload_uses_backend_casing() {
        let payload = StudentPayload {
            name: "Ada".into(),
            grade: "A".into(),
            department: "Math".into(),
            courses: vec!["Algebra".into()],
            status: "Active".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["Name"], "Ada");
        assert_eq!(value["Department"], "Math");
        assert!(value.get("name").is_none());
    }
}
