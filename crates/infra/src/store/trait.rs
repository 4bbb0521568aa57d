use std::sync::Arc;

use thiserror::Error;

use cricket_core::DomainError;
use cricket_scoring::{Scoreboard, ScoreboardCommand, ScoreboardId};

/// Storage operation error.
///
/// Domain rejections raised while executing a command are passed through
/// unchanged in [`StoreError::Domain`]; everything else is a backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored document is malformed: {0}")]
    Corrupt(String),
}

/// Result of [`ScoreboardStore::first_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstOrCreated {
    pub scoreboard: Scoreboard,
    /// `true` when no scoreboard existed and a zeroed one was created.
    pub created: bool,
}

/// Persistent home of scoreboard documents.
#[async_trait::async_trait]
pub trait ScoreboardStore: Send + Sync {
    /// The first scoreboard (oldest), creating a zeroed one if none exists.
    async fn first_or_create(&self) -> Result<FirstOrCreated, StoreError>;

    /// All scoreboards, oldest first.
    async fn list(&self) -> Result<Vec<Scoreboard>, StoreError>;

    async fn get(&self, id: ScoreboardId) -> Result<Option<Scoreboard>, StoreError>;

    /// Run `command` against the stored document and persist the result.
    ///
    /// Either every event the command produces is applied or none is.
    /// Returns the post-mutation snapshot.
    async fn execute(
        &self,
        id: ScoreboardId,
        command: &ScoreboardCommand,
    ) -> Result<Scoreboard, StoreError>;

    /// Delete scoreboard `id` and create a fresh, zeroed one in its place.
    async fn reset(&self, id: ScoreboardId) -> Result<Scoreboard, StoreError>;
}

#[async_trait::async_trait]
impl<S> ScoreboardStore for Arc<S>
where
    S: ScoreboardStore + ?Sized,
{
    async fn first_or_create(&self) -> Result<FirstOrCreated, StoreError> {
        (**self).first_or_create().await
    }

    async fn list(&self) -> Result<Vec<Scoreboard>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: ScoreboardId) -> Result<Option<Scoreboard>, StoreError> {
        (**self).get(id).await
    }

    async fn execute(
        &self,
        id: ScoreboardId,
        command: &ScoreboardCommand,
    ) -> Result<Scoreboard, StoreError> {
        (**self).execute(id, command).await
    }

    async fn reset(&self, id: ScoreboardId) -> Result<Scoreboard, StoreError> {
        (**self).reset(id).await
    }
}
