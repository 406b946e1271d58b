//! Remote YAML service boundary.
//!
//! The conversation only sees [`YamlService`]; the HTTP implementation lives in
//! [`http`]. Every failure is tagged internally but surfaces to the user as a
//! single generic chat message.

mod http;

use crate::model::{ServiceRequest, YamlResponse};
use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpYamlService;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection refused, DNS, TLS, timeout, or the call task died.
    #[error("network error: {0}")]
    Network(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("malformed response payload: {0}")]
    Payload(String),
}

impl ServiceError {
    /// Short tag used in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            ServiceError::Network(_) => "network",
            ServiceError::Status(_) => "status",
            ServiceError::Payload(_) => "payload",
        }
    }
}

#[async_trait]
pub trait YamlService: Send + Sync {
    async fn call(&self, request: &ServiceRequest) -> Result<YamlResponse, ServiceError>;
}
