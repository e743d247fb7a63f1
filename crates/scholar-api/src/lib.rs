// scholar-api: Async Rust client for the school-management REST backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    CourseList, CoursePayload, CourseRecord, StudentList, StudentPayload, StudentRecord, WireId,
};
pub use transport::{TlsMode, TransportConfig};
