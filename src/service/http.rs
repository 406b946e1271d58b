use super::{ServiceError, YamlService};
use crate::model::{ClientConfig, ServiceRequest, YamlResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpYamlService {
    client: Client,
    base_url: String,
}

impl HttpYamlService {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build http client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, request: &ServiceRequest) -> String {
        format!("{}{}", self.base_url, request.mode().path())
    }
}

#[async_trait]
impl YamlService for HttpYamlService {
    async fn call(&self, request: &ServiceRequest) -> Result<YamlResponse, ServiceError> {
        let url = self.url_for(request);
        tracing::debug!(%url, mode = ?request.mode(), "dispatching request");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        // Read the body first so a dropped connection is not reported as a bad payload.
        let body = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        serde_json::from_slice::<YamlResponse>(&body).map_err(|e| ServiceError::Payload(e.to_string()))
    }
}
