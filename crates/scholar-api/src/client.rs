// Async HTTP client for the school-management backend.
//
// Collections live under `/course/*` and `/student/*`. List endpoints wrap
// their payload in a named field (`{courses: [...]}`); mutations answer with
// the affected record, which callers ignore in favour of a fresh list.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{CourseList, CoursePayload, CourseRecord, StudentList, StudentPayload, StudentRecord};
use crate::transport::TransportConfig;

/// Async client for the backend REST API.
///
/// Every non-2xx response is an error regardless of whether its body
/// parses. Only list endpoints decode a body.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// Identifiers are server-issued and opaque, so they go through the
    /// segment encoder rather than string formatting.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_empty(resp).await
    }

    async fn put<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_empty(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Courses ──────────────────────────────────────────────────────

    pub async fn list_courses(&self) -> Result<Vec<CourseRecord>, Error> {
        let list: CourseList = self.get(self.endpoint(&["course", "getcourse"])?).await?;
        Ok(list.courses)
    }

    pub async fn create_course(&self, body: &CoursePayload) -> Result<(), Error> {
        self.post(self.endpoint(&["course", "addcourse"])?, body)
            .await
    }

    pub async fn update_course(&self, id: &str, body: &CoursePayload) -> Result<(), Error> {
        self.put(self.endpoint(&["course", "updatecourse", id])?, body)
            .await
    }

    pub async fn delete_course(&self, id: &str) -> Result<(), Error> {
        self.delete(self.endpoint(&["course", "deletecourse", id])?)
            .await
    }

    // ── Students ─────────────────────────────────────────────────────

    pub async fn list_students(&self) -> Result<Vec<StudentRecord>, Error> {
        let list: StudentList = self.get(self.endpoint(&["student", "getstudent"])?).await?;
        Ok(list.students)
    }

    pub async fn create_student(&self, body: &StudentPayload) -> Result<(), Error> {
        self.post(self.endpoint(&["student", "addstudent"])?, body)
            .await
    }

    pub async fn update_student(&self, id: &str, body: &StudentPayload) -> Result<(), Error> {
        self.put(self.endpoint(&["student", "updatestudent", id])?, body)
            .await
    }

    pub async fn delete_student(&self, id: &str) -> Result<(), Error> {
        self.delete(self.endpoint(&["student", "deletestudent", id])?)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let c = client("http://localhost:5000/api/");
        let url = c.endpoint(&["course", "getcourse"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/course/getcourse");
    }

    #[test]
    fn endpoint_without_trailing_slash() {
        let c = client("http://localhost:5000");
        let url = c.endpoint(&["course", "deletecourse", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/course/deletecourse/abc");
    }

    #[test]
    fn endpoint_encodes_identifier() {
        let c = client("http://localhost:5000");
        let url = c.endpoint(&["student", "updatestudent", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/student/updatestudent/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let result = ApiClient::from_reqwest("mailto:admin@school.test", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }
}
