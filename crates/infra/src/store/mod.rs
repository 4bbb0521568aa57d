//! Scoreboard document storage.
//!
//! A store holds whole scoreboard documents. Every mutation goes through
//! [`ScoreboardStore::execute`], which runs the aggregate's `handle` + `apply`
//! against the stored document as one atomic update.

pub mod in_memory;
pub mod postgres;
mod r#trait;

pub use in_memory::InMemoryScoreboardStore;
pub use postgres::PostgresScoreboardStore;
pub use r#trait::{FirstOrCreated, ScoreboardStore, StoreError};
