// ── Remote gateway port ──
//
// Abstraction over list/create/update/delete calls against one backend
// collection. A manager without a gateway runs in local-only mode.

use std::sync::Arc;

use async_trait::async_trait;

use scholar_api::{ApiClient, CoursePayload, StudentPayload};

use crate::entity::Entity;
use crate::model::{Course, EntityId, Student};
use crate::requests::{CourseRequest, StudentRequest};

/// Backend collection for one entity kind.
///
/// Any transport failure or non-2xx status is an `Err`; managers collapse
/// these into `CoreError::OperationFailed`.
#[async_trait]
pub trait Gateway<E: Entity>: Send + Sync {
    /// Fetch the full collection in server order.
    async fn list(&self) -> Result<Vec<E>, scholar_api::Error>;

    async fn create(&self, record: &E::Valid) -> Result<(), scholar_api::Error>;

    async fn update(&self, id: &EntityId, record: &E::Valid) -> Result<(), scholar_api::Error>;

    async fn delete(&self, id: &EntityId) -> Result<(), scholar_api::Error>;
}

// ── Course collection ───────────────────────────────────────────────

/// `/course/*` endpoints.
pub struct CourseGateway {
    client: Arc<ApiClient>,
}

impl CourseGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Gateway<Course> for CourseGateway {
    async fn list(&self) -> Result<Vec<Course>, scholar_api::Error> {
        let records = self.client.list_courses().await?;
        Ok(records.into_iter().map(Course::from).collect())
    }

    async fn create(&self, record: &CourseRequest) -> Result<(), scholar_api::Error> {
        self.client.create_course(&CoursePayload::from(record)).await
    }

    async fn update(
        &self,
        id: &EntityId,
        record: &CourseRequest,
    ) -> Result<(), scholar_api::Error> {
        self.client
            .update_course(&id.to_string(), &CoursePayload::from(record))
            .await
    }

    async fn delete(&self, id: &EntityId) -> Result<(), scholar_api::Error> {
        self.client.delete_course(&id.to_string()).await
    }
}

// ── Student collection ──────────────────────────────────────────────

/// `/student/*` endpoints.
pub struct StudentGateway {
    client: Arc<ApiClient>,
}

impl StudentGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Gateway<Student> for StudentGateway {
    async fn list(&self) -> Result<Vec<Student>, scholar_api::Error> {
        let records = self.client.list_students().await?;
        Ok(records.into_iter().map(Student::from).collect())
    }

    async fn create(&self, record: &StudentRequest) -> Result<(), scholar_api::Error> {
        self.client
            .create_student(&StudentPayload::from(record))
            .await
    }

    async fn update(
        &self,
        id: &EntityId,
        record: &StudentRequest,
    ) -> Result<(), scholar_api::Error> {
        self.client
            .update_student(&id.to_string(), &StudentPayload::from(record))
            .await
    }

    async fn delete(&self, id: &EntityId) -> Result<(), scholar_api::Error> {
        self.client.delete_student(&id.to_string()).await
    }
}
