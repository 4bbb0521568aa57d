use std::sync::RwLock;

use cricket_core::{Aggregate, DomainError};
use cricket_scoring::{Scoreboard, ScoreboardCommand, ScoreboardId};

use super::r#trait::{FirstOrCreated, ScoreboardStore, StoreError};

/// In-memory scoreboard store.
///
/// Intended for tests/dev. Documents are kept in insertion order so "first"
/// means oldest, as with the Postgres store.
#[derive(Debug, Default)]
pub struct InMemoryScoreboardStore {
    docs: RwLock<Vec<Scoreboard>>,
}

impl InMemoryScoreboardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ScoreboardStore for InMemoryScoreboardStore {
    async fn first_or_create(&self) -> Result<FirstOrCreated, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        if let Some(first) = docs.first() {
            return Ok(FirstOrCreated {
                scoreboard: first.clone(),
                created: false,
            });
        }

        let fresh = Scoreboard::empty(ScoreboardId::generate());
        docs.push(fresh.clone());
        Ok(FirstOrCreated {
            scoreboard: fresh,
            created: true,
        })
    }

    async fn list(&self) -> Result<Vec<Scoreboard>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.clone())
    }

    async fn get(&self, id: ScoreboardId) -> Result<Option<Scoreboard>, StoreError> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.iter().find(|d| d.id_typed() == id).cloned())
    }

    async fn execute(
        &self,
        id: ScoreboardId,
        command: &ScoreboardCommand,
    ) -> Result<Scoreboard, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id_typed() == id)
            .ok_or_else(|| DomainError::aggregate_not_found(id))?;

        // `execute` decides before applying, so a rejected command leaves the
        // document untouched.
        doc.execute(command)?;
        Ok(doc.clone())
    }

    async fn reset(&self, id: ScoreboardId) -> Result<Scoreboard, StoreError> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let pos = docs
            .iter()
            .position(|d| d.id_typed() == id)
            .ok_or_else(|| DomainError::aggregate_not_found(id))?;

        docs.remove(pos);
        let fresh = Scoreboard::empty(ScoreboardId::generate());
        docs.push(fresh.clone());
        Ok(fresh)
    }
}
