//! Client core for the tracker: remote-collection state, command
//! orchestration, and the HTTP transport seam.

use chrono::{DateTime, Utc};
use shared::{
    domain::ProjectId,
    protocol::{CreateProjectRequest, ProjectPayload, UpdateProjectRequest},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

pub mod error;
pub mod store;
pub mod transport;

pub use error::{error_message, TransportError, FALLBACK_ERROR_MESSAGE};
pub use store::{
    CollectionEntity, CollectionError, FetchStatus, RemoteCollection, RequestToken,
    SortPreference, SubmitStatus,
};
pub use transport::{HttpTransport, ProjectTransport};

impl CollectionEntity for ProjectPayload {
    fn entity_id(&self) -> &str {
        self.project_id.as_str()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Point-in-time copy of the project collection for rendering. `projects`
/// is already ordered by the active sort preference.
#[derive(Debug, Clone)]
pub struct ProjectsSnapshot {
    pub projects: Vec<ProjectPayload>,
    pub fetch_status: FetchStatus,
    pub fetch_error: Option<String>,
    pub submit_status: SubmitStatus,
    pub submit_error: Option<String>,
    pub sort_by: SortPreference,
}

/// Sequences remote calls through the collection's status machines: mark
/// loading, await the transport, then commit the result or the normalized
/// failure. The state lock is never held across a transport await, so a
/// fetch and a submission can be in flight at the same time without blocking
/// each other; late results are discarded by the store's token guard.
///
/// Failures are recorded in the corresponding status machine and also
/// returned to the caller. There are no automatic retries.
pub struct ProjectClient<T: ProjectTransport> {
    transport: T,
    projects: Mutex<RemoteCollection<ProjectPayload>>,
}

impl<T: ProjectTransport> ProjectClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            projects: Mutex::new(RemoteCollection::new()),
        }
    }

    /// Fetch the full project list, replacing the cached collection on
    /// success. On failure the stale collection stays visible alongside the
    /// recorded error.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let token = self.projects.lock().await.begin_fetch();
        match self.transport.list_projects().await {
            Ok(projects) => {
                self.projects.lock().await.fetch_succeeded(token, projects);
                Ok(())
            }
            Err(failure) => {
                let message = error_message(&failure);
                self.projects.lock().await.fetch_failed(token, message);
                Err(failure.into())
            }
        }
    }

    pub async fn create(&self, request: CreateProjectRequest) -> Result<(), ClientError> {
        let token = self.projects.lock().await.begin_submit();
        match self.transport.create_project(&request).await {
            Ok(project) => {
                let mut projects = self.projects.lock().await;
                match projects.create_succeeded(token, project) {
                    Ok(_applied) => Ok(()),
                    // Never routed through the failed-status path: a duplicate
                    // identifier on create is a transport/store contract
                    // violation, not a user-facing failure.
                    Err(violation) => {
                        debug_assert!(false, "create confirmed a duplicate identifier");
                        error!(%violation, "create confirmation violated collection invariant");
                        Err(violation.into())
                    }
                }
            }
            Err(failure) => {
                let message = error_message(&failure);
                self.projects.lock().await.submit_failed(token, message);
                Err(failure.into())
            }
        }
    }

    pub async fn rename(
        &self,
        project_id: ProjectId,
        request: UpdateProjectRequest,
    ) -> Result<(), ClientError> {
        let token = self.projects.lock().await.begin_submit();
        match self.transport.update_project(&project_id, &request).await {
            Ok(project) => {
                self.projects.lock().await.update_succeeded(token, project);
                Ok(())
            }
            Err(failure) => {
                let message = error_message(&failure);
                self.projects.lock().await.submit_failed(token, message);
                Err(failure.into())
            }
        }
    }

    pub async fn delete(&self, project_id: ProjectId) -> Result<(), ClientError> {
        let token = self.projects.lock().await.begin_submit();
        match self.transport.delete_project(&project_id).await {
            Ok(()) => {
                self.projects
                    .lock()
                    .await
                    .delete_succeeded(token, project_id.as_str());
                Ok(())
            }
            Err(failure) => {
                let message = error_message(&failure);
                self.projects.lock().await.submit_failed(token, message);
                Err(failure.into())
            }
        }
    }

    pub async fn set_sort_preference(&self, value: SortPreference) {
        self.projects.lock().await.set_sort_preference(value);
    }

    /// Dismiss the fetch error banner without implying a retry happened.
    pub async fn clear_fetch_error(&self) {
        self.projects.lock().await.clear_fetch_error();
    }

    pub async fn clear_submit_error(&self) {
        self.projects.lock().await.clear_submit_error();
    }

    pub async fn snapshot(&self) -> ProjectsSnapshot {
        let projects = self.projects.lock().await;
        ProjectsSnapshot {
            projects: projects.select_all().into_iter().cloned().collect(),
            fetch_status: projects.fetch_status(),
            fetch_error: projects.fetch_error().map(str::to_string),
            submit_status: projects.submit_status(),
            submit_error: projects.submit_error().map(str::to_string),
            sort_by: projects.sort_preference(),
        }
    }

    /// `None` only means "not cached"; check the snapshot's fetch status
    /// before treating absence as permanent.
    pub async fn project_by_id(&self, project_id: &ProjectId) -> Option<ProjectPayload> {
        let projects = self.projects.lock().await;
        let found = projects.select_by_id(project_id.as_str()).cloned();
        if found.is_none() {
            debug!(%project_id, "project not in cached collection");
        }
        found
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod store_tests;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
