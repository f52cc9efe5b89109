//! HTTP transport for the tracker API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::ProjectId,
    error::{ApiError, ErrorCode},
    protocol::{CreateProjectRequest, ProjectPayload, UpdateProjectRequest},
};

use crate::error::TransportError;

/// Remote calls the client core depends on. Endpoint paths, headers, and the
/// HTTP stack stay behind this seam.
#[async_trait]
pub trait ProjectTransport: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectPayload>, TransportError>;
    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectPayload, TransportError>;
    async fn update_project(
        &self,
        project_id: &ProjectId,
        request: &UpdateProjectRequest,
    ) -> Result<ProjectPayload, TransportError>;
    async fn delete_project(&self, project_id: &ProjectId) -> Result<(), TransportError>;
}

pub struct HttpTransport {
    http: Client,
    server_url: String,
}

impl HttpTransport {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    /// Non-2xx responses carry an [`ApiError`] body; pass its message through
    /// verbatim. An unparseable body still yields a `Server` failure so the
    /// status code is not lost.
    async fn decode_failure(response: Response) -> TransportError {
        let status = response.status();
        match response.json::<ApiError>().await {
            Ok(body) => body.into(),
            Err(_) => TransportError::Server {
                code: ErrorCode::Internal,
                message: format!("http status {status}"),
            },
        }
    }

    async fn expect_success(response: Response) -> Result<Response, TransportError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::decode_failure(response).await)
        }
    }
}

#[async_trait]
impl ProjectTransport for HttpTransport {
    async fn list_projects(&self) -> Result<Vec<ProjectPayload>, TransportError> {
        let response = self
            .http
            .get(format!("{}/projects", self.server_url))
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<ProjectPayload, TransportError> {
        let response = self
            .http
            .post(format!("{}/projects", self.server_url))
            .json(request)
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn update_project(
        &self,
        project_id: &ProjectId,
        request: &UpdateProjectRequest,
    ) -> Result<ProjectPayload, TransportError> {
        let response = self
            .http
            .put(format!("{}/projects/{project_id}", self.server_url))
            .json(request)
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_project(&self, project_id: &ProjectId) -> Result<(), TransportError> {
        let response = self
            .http
            .delete(format!("{}/projects/{project_id}", self.server_url))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}
