//! Cricket scoring domain (pure, no IO).
//!
//! - `catalog`: what kinds of delivery exist and how flat wire tags map onto them
//! - `delta`: the scoring rules, as a pure function from ball to increments
//! - `scoreboard`: the per-match aggregate, its commands and events
//! - `ball_event`: the raw ball record kept in the audit trail

pub mod ball_event;
pub mod catalog;
pub mod delta;
pub mod payload;
pub mod scoreboard;

pub use ball_event::BallEvent;
pub use catalog::{BallKind, BallType, Legality, ScoringSource};
pub use delta::{ScoreDelta, TeamDelta, score_delta};
pub use payload::BallPayload;
pub use scoreboard::{
    AddPlayer, BallRecorded, PlayerAdded, PlayerRecord, PlayerRole, RecordBall, Scoreboard,
    ScoreboardCommand, ScoreboardEvent, ScoreboardId, StrikersSwapped, SwapStrikers, TeamTotals,
};
