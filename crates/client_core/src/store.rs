//! State container for a collection of server-owned entities.
//!
//! Read (bulk fetch) and write (create/update/delete) paths run through two
//! independent status machines so that an in-flight submission is never
//! confused with a concurrent list refresh. Every transition that resolves an
//! asynchronous call is guarded by a request token: a transition is applied
//! only if its token is still the most recent one issued for that dimension,
//! which keeps a slow response from overwriting newer state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Access the store needs into a stored entity.
pub trait CollectionEntity {
    fn entity_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Loading,
    /// Transient: holds only until the next `begin_submit`.
    Succeeded,
    Failed,
}

/// Display-only ordering applied by [`RemoteCollection::select_all`]. Never
/// affects the canonical arrival order of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPreference {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

/// Handle issued by `begin_fetch`/`begin_submit`. Each new `begin_*` call
/// invalidates every token previously issued for that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// A create was confirmed for an identifier the collection already holds.
    /// The server assigns fresh identifiers, so this is a contract violation,
    /// not a user-facing failure.
    #[error("create confirmed an identifier already in the collection: {0}")]
    DuplicateEntity(String),
}

#[derive(Debug)]
pub struct RemoteCollection<E> {
    entities: Vec<E>,
    fetch_status: FetchStatus,
    fetch_error: Option<String>,
    fetch_token: u64,
    submit_status: SubmitStatus,
    submit_error: Option<String>,
    submit_token: u64,
    sort_by: SortPreference,
}

impl<E> Default for RemoteCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RemoteCollection<E> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            fetch_status: FetchStatus::Idle,
            fetch_error: None,
            fetch_token: 0,
            submit_status: SubmitStatus::Idle,
            submit_error: None,
            submit_token: 0,
            sort_by: SortPreference::Newest,
        }
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn submit_status(&self) -> SubmitStatus {
        self.submit_status
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn sort_preference(&self) -> SortPreference {
        self.sort_by
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Mark the read path loading and invalidate earlier fetch tokens.
    /// Re-entrant: a second call while loading restarts the marker.
    pub fn begin_fetch(&mut self) -> RequestToken {
        self.fetch_token += 1;
        self.fetch_status = FetchStatus::Loading;
        self.fetch_error = None;
        RequestToken(self.fetch_token)
    }

    /// Mark the write path loading and invalidate earlier submit tokens.
    pub fn begin_submit(&mut self) -> RequestToken {
        self.submit_token += 1;
        self.submit_status = SubmitStatus::Loading;
        self.submit_error = None;
        RequestToken(self.submit_token)
    }

    pub fn clear_fetch_error(&mut self) {
        self.fetch_error = None;
    }

    pub fn clear_submit_error(&mut self) {
        self.submit_error = None;
    }

    pub fn set_sort_preference(&mut self, value: SortPreference) {
        self.sort_by = value;
    }

    fn fetch_token_is_current(&self, token: RequestToken) -> bool {
        token.0 == self.fetch_token
    }

    fn submit_token_is_current(&self, token: RequestToken) -> bool {
        token.0 == self.submit_token
    }
}

impl<E: CollectionEntity> RemoteCollection<E> {
    /// Replace the whole collection with a fetched snapshot. Returns `false`
    /// and leaves the state untouched when `token` has been superseded.
    pub fn fetch_succeeded(&mut self, token: RequestToken, entities: Vec<E>) -> bool {
        if !self.fetch_token_is_current(token) {
            debug!(token = token.0, "discarding superseded fetch result");
            return false;
        }
        self.entities = dedup_by_id(entities);
        self.fetch_status = FetchStatus::Succeeded;
        self.fetch_error = None;
        true
    }

    /// Record a fetch failure. The collection is left as-is so a transient
    /// failure does not blank out data that was already on screen.
    pub fn fetch_failed(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        if !self.fetch_token_is_current(token) {
            debug!(token = token.0, "discarding superseded fetch failure");
            return false;
        }
        self.fetch_status = FetchStatus::Failed;
        self.fetch_error = Some(message.into());
        true
    }

    /// Append the entity confirmed by a create. The server assigns fresh
    /// identifiers, so an already-present identifier is rejected as
    /// [`CollectionError::DuplicateEntity`] with the collection unchanged.
    pub fn create_succeeded(
        &mut self,
        token: RequestToken,
        entity: E,
    ) -> Result<bool, CollectionError> {
        if !self.submit_token_is_current(token) {
            debug!(token = token.0, "discarding superseded create result");
            return Ok(false);
        }
        if self.select_by_id(entity.entity_id()).is_some() {
            return Err(CollectionError::DuplicateEntity(
                entity.entity_id().to_string(),
            ));
        }
        self.entities.push(entity);
        self.submit_status = SubmitStatus::Succeeded;
        self.submit_error = None;
        Ok(true)
    }

    /// Apply the entity confirmed by an update in place. If a fetch raced the
    /// mutation and the identifier is gone, the confirmed entity is appended
    /// instead so the server's accepted state is not lost.
    pub fn update_succeeded(&mut self, token: RequestToken, entity: E) -> bool {
        if !self.submit_token_is_current(token) {
            debug!(token = token.0, "discarding superseded update result");
            return false;
        }
        match self
            .entities
            .iter()
            .position(|existing| existing.entity_id() == entity.entity_id())
        {
            Some(index) => self.entities[index] = entity,
            None => {
                warn!(
                    id = entity.entity_id(),
                    "update confirmed for an identifier no longer cached; re-appending"
                );
                self.entities.push(entity);
            }
        }
        self.submit_status = SubmitStatus::Succeeded;
        self.submit_error = None;
        true
    }

    /// Drop the entity confirmed deleted. A missing identifier means a fetch
    /// already observed the deletion; that is a no-op, not an error.
    pub fn delete_succeeded(&mut self, token: RequestToken, id: &str) -> bool {
        if !self.submit_token_is_current(token) {
            debug!(token = token.0, "discarding superseded delete result");
            return false;
        }
        match self
            .entities
            .iter()
            .position(|existing| existing.entity_id() == id)
        {
            Some(index) => {
                self.entities.remove(index);
            }
            None => warn!(id, "delete confirmed for an identifier no longer cached"),
        }
        self.submit_status = SubmitStatus::Succeeded;
        self.submit_error = None;
        true
    }

    /// Record a submit failure. The collection is never mutated on this path,
    /// so the caller can retry without data loss.
    pub fn submit_failed(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        if !self.submit_token_is_current(token) {
            debug!(token = token.0, "discarding superseded submit failure");
            return false;
        }
        self.submit_status = SubmitStatus::Failed;
        self.submit_error = Some(message.into());
        true
    }

    /// Freshly ordered view of the collection under the active sort
    /// preference. Stored order is left untouched; recomputed per call.
    pub fn select_all(&self) -> Vec<&E> {
        let mut view: Vec<&E> = self.entities.iter().collect();
        match self.sort_by {
            SortPreference::Newest => view.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
            SortPreference::Oldest => view.sort_by(|a, b| a.created_at().cmp(&b.created_at())),
            SortPreference::Alphabetical => {
                view.sort_by(|a, b| a.display_name().cmp(b.display_name()))
            }
        }
        view
    }

    /// Absence here only means "not cached": callers must check the fetch
    /// status before concluding the entity does not exist on the server.
    pub fn select_by_id(&self, id: &str) -> Option<&E> {
        self.entities.iter().find(|entity| entity.entity_id() == id)
    }
}

/// First occurrence wins when a fetch response violates identifier
/// uniqueness. Not expected in normal operation.
fn dedup_by_id<E: CollectionEntity>(entities: Vec<E>) -> Vec<E> {
    let mut seen = HashSet::with_capacity(entities.len());
    let mut unique = Vec::with_capacity(entities.len());
    for entity in entities {
        if seen.insert(entity.entity_id().to_string()) {
            unique.push(entity);
        } else {
            warn!(
                id = entity.entity_id(),
                "fetch result repeated an identifier; keeping the first occurrence"
            );
        }
    }
    unique
}
