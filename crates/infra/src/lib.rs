//! Infrastructure layer: scoreboard persistence, the ball audit log and the
//! mutation engine that ties them together.

pub mod ball_log;
pub mod engine;
pub mod store;

pub use ball_log::{BallLog, InMemoryBallLog, PostgresBallLog};
pub use engine::{MutationError, MutationOutcome, ScoreMutationEngine};
pub use store::{
    FirstOrCreated, InMemoryScoreboardStore, PostgresScoreboardStore, ScoreboardStore, StoreError,
};
