use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cricket_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult};
use cricket_events::Event;

use crate::catalog::BallKind;
use crate::delta::{ScoreDelta, TeamDelta, score_delta};
use crate::payload::BallPayload;

/// Scoreboard identifier (one per match).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreboardId(pub AggregateId);

impl ScoreboardId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ScoreboardId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ScoreboardId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Running team totals. Field names match the scorer UI's document shape.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamTotals {
    pub total_runs: u32,
    pub total_wickets: u32,
    pub total_wide_balls: u32,
    pub total_no_balls: u32,
    pub total_byes: u32,
    pub total_legbyes: u32,
    pub total_balls: u32,
}

impl TeamTotals {
    fn add(&mut self, d: &TeamDelta) {
        self.total_runs = self.total_runs.saturating_add(d.runs);
        self.total_wickets = self.total_wickets.saturating_add(d.wickets);
        self.total_wide_balls = self.total_wide_balls.saturating_add(d.wide_balls);
        self.total_no_balls = self.total_no_balls.saturating_add(d.no_balls);
        self.total_byes = self.total_byes.saturating_add(d.byes);
        self.total_legbyes = self.total_legbyes.saturating_add(d.legbyes);
        self.total_balls = self.total_balls.saturating_add(d.balls);
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// What a player is currently doing in the match.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Striker,
    #[serde(alias = "non-striker", alias = "non_striker")]
    NonStriker,
    Bowler,
    #[default]
    Unplayed,
    Played,
}

/// Per-player statistics, keyed by name on the scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets_taken: u32,
    /// Completed overs.
    pub overs_bowled: u32,
    pub runs_conceded: u32,
    pub extras_conceded: u32,
    pub overthrows: u32,
    /// Current role; named `review` in the scorer UI's documents.
    #[serde(rename = "review", alias = "role")]
    pub role: PlayerRole,
}

impl PlayerRecord {
    pub fn with_role(role: PlayerRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }
}

/// Aggregate root: the cumulative state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    #[serde(rename = "_id", alias = "id")]
    id: ScoreboardId,
    #[serde(default)]
    team_scoreboard: TeamTotals,
    #[serde(default)]
    players: BTreeMap<String, PlayerRecord>,
    #[serde(default)]
    version: u64,
}

impl Scoreboard {
    /// A fresh scoreboard: zero totals, no players.
    pub fn empty(id: ScoreboardId) -> Self {
        Self {
            id,
            team_scoreboard: TeamTotals::default(),
            players: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> ScoreboardId {
        self.id
    }

    pub fn totals(&self) -> &TeamTotals {
        &self.team_scoreboard
    }

    pub fn players(&self) -> &BTreeMap<String, PlayerRecord> {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.get(name)
    }

    /// First player (by name) currently holding `role`.
    pub fn player_with_role(&self, role: PlayerRole) -> Option<&str> {
        self.players
            .iter()
            .find(|(_, p)| p.role == role)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.team_scoreboard.is_zero() && self.players.is_empty()
    }

    fn ensure_id(&self, id: ScoreboardId) -> DomainResult<()> {
        if self.id != id {
            return Err(DomainError::aggregate_not_found(id));
        }
        Ok(())
    }

    fn player_mut(&mut self, name: &str) -> &mut PlayerRecord {
        self.players.entry(name.to_string()).or_default()
    }
}

impl AggregateRoot for Scoreboard {
    type Id = ScoreboardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordBall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBall {
    pub scoreboard_id: ScoreboardId,
    pub kind: BallKind,
    pub payload: BallPayload,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddPlayer (insert or overwrite by name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPlayer {
    pub scoreboard_id: ScoreboardId,
    pub name: String,
    pub record: PlayerRecord,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SwapStrikers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStrikers {
    pub scoreboard_id: ScoreboardId,
    pub striker: String,
    pub non_striker: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreboardCommand {
    RecordBall(RecordBall),
    AddPlayer(AddPlayer),
    SwapStrikers(SwapStrikers),
}

impl ScoreboardCommand {
    pub fn scoreboard_id(&self) -> ScoreboardId {
        match self {
            ScoreboardCommand::RecordBall(c) => c.scoreboard_id,
            ScoreboardCommand::AddPlayer(c) => c.scoreboard_id,
            ScoreboardCommand::SwapStrikers(c) => c.scoreboard_id,
        }
    }
}

/// Event: BallRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRecorded {
    pub scoreboard_id: ScoreboardId,
    pub kind: BallKind,
    pub delta: ScoreDelta,
    pub striker: String,
    pub bowler: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PlayerAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAdded {
    pub scoreboard_id: ScoreboardId,
    pub name: String,
    pub record: PlayerRecord,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StrikersSwapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikersSwapped {
    pub scoreboard_id: ScoreboardId,
    pub striker: String,
    pub non_striker: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreboardEvent {
    BallRecorded(BallRecorded),
    PlayerAdded(PlayerAdded),
    StrikersSwapped(StrikersSwapped),
}

impl Event for ScoreboardEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ScoreboardEvent::BallRecorded(_) => "scoreboard.ball.recorded",
            ScoreboardEvent::PlayerAdded(_) => "scoreboard.player.added",
            ScoreboardEvent::StrikersSwapped(_) => "scoreboard.strikers.swapped",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ScoreboardEvent::BallRecorded(e) => e.occurred_at,
            ScoreboardEvent::PlayerAdded(e) => e.occurred_at,
            ScoreboardEvent::StrikersSwapped(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Scoreboard {
    type Command = ScoreboardCommand;
    type Event = ScoreboardEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ScoreboardEvent::BallRecorded(e) => {
                self.team_scoreboard.add(&e.delta.team);
                if let Some(runs) = e.delta.striker_runs {
                    let striker = self.player_mut(&e.striker);
                    striker.runs = striker.runs.saturating_add(runs);
                }
                if e.delta.striker_out {
                    self.player_mut(&e.striker).role = PlayerRole::Played;
                }
                if let Some(overthrows) = e.delta.bowler_overthrows {
                    let bowler = self.player_mut(&e.bowler);
                    bowler.overthrows = bowler.overthrows.saturating_add(overthrows);
                }
            }
            ScoreboardEvent::PlayerAdded(e) => {
                self.players.insert(e.name.clone(), e.record.clone());
            }
            ScoreboardEvent::StrikersSwapped(e) => {
                let striker_role = self.players.get(&e.striker).map(|p| p.role);
                let non_striker_role = self.players.get(&e.non_striker).map(|p| p.role);
                if let (Some(a), Some(b)) = (striker_role, non_striker_role) {
                    self.player_mut(&e.striker).role = b;
                    self.player_mut(&e.non_striker).role = a;
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ScoreboardCommand::RecordBall(cmd) => self.handle_record_ball(cmd),
            ScoreboardCommand::AddPlayer(cmd) => self.handle_add_player(cmd),
            ScoreboardCommand::SwapStrikers(cmd) => self.handle_swap(cmd),
        }
    }
}

impl Scoreboard {
    fn handle_record_ball(&self, cmd: &RecordBall) -> DomainResult<Vec<ScoreboardEvent>> {
        self.ensure_id(cmd.scoreboard_id)?;
        cmd.payload.validate()?;

        Ok(vec![ScoreboardEvent::BallRecorded(BallRecorded {
            scoreboard_id: cmd.scoreboard_id,
            kind: cmd.kind,
            delta: score_delta(cmd.kind, &cmd.payload),
            striker: cmd.payload.onstrike.clone(),
            bowler: cmd.payload.bowler.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_player(&self, cmd: &AddPlayer) -> DomainResult<Vec<ScoreboardEvent>> {
        self.ensure_id(cmd.scoreboard_id)?;
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("player name cannot be empty"));
        }

        Ok(vec![ScoreboardEvent::PlayerAdded(PlayerAdded {
            scoreboard_id: cmd.scoreboard_id,
            name: cmd.name.clone(),
            record: cmd.record.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_swap(&self, cmd: &SwapStrikers) -> DomainResult<Vec<ScoreboardEvent>> {
        self.ensure_id(cmd.scoreboard_id)?;
        for name in [&cmd.striker, &cmd.non_striker] {
            if !self.players.contains_key(name) {
                return Err(DomainError::player_not_found(name.clone()));
            }
        }

        Ok(vec![ScoreboardEvent::StrikersSwapped(StrikersSwapped {
            scoreboard_id: cmd.scoreboard_id,
            striker: cmd.striker.clone(),
            non_striker: cmd.non_striker.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Legality, ScoringSource};
    use proptest::prelude::*;

    fn board() -> Scoreboard {
        Scoreboard::empty(ScoreboardId::generate())
    }

    fn ball(sb: &mut Scoreboard, tag: &str, payload: BallPayload) -> DomainResult<Vec<ScoreboardEvent>> {
        let cmd = ScoreboardCommand::RecordBall(RecordBall {
            scoreboard_id: sb.id_typed(),
            kind: BallKind::from_tag(tag)?,
            payload,
            occurred_at: Utc::now(),
        });
        sb.execute(&cmd)
    }

    fn add(sb: &mut Scoreboard, name: &str, role: PlayerRole) {
        let cmd = ScoreboardCommand::AddPlayer(AddPlayer {
            scoreboard_id: sb.id_typed(),
            name: name.to_string(),
            record: PlayerRecord::with_role(role),
            occurred_at: Utc::now(),
        });
        sb.execute(&cmd).unwrap();
    }

    fn swap(sb: &mut Scoreboard, a: &str, b: &str) -> DomainResult<Vec<ScoreboardEvent>> {
        let cmd = ScoreboardCommand::SwapStrikers(SwapStrikers {
            scoreboard_id: sb.id_typed(),
            striker: a.to_string(),
            non_striker: b.to_string(),
            occurred_at: Utc::now(),
        });
        sb.execute(&cmd)
    }

    #[test]
    fn four_runs_off_the_bat() {
        let mut sb = board();
        ball(&mut sb, "run", BallPayload::new("A", "B").with_runs(4)).unwrap();

        assert_eq!(sb.totals().total_runs, 4);
        assert_eq!(sb.totals().total_balls, 1);
        assert_eq!(sb.player("A").unwrap().runs, 4);
        assert_eq!(sb.version(), 1);
    }

    #[test]
    fn wide_with_a_run_does_not_count_as_a_ball() {
        let mut sb = board();
        ball(&mut sb, "wide", BallPayload::new("A", "B")).unwrap();
        ball(&mut sb, "wide", BallPayload::new("A", "B")).unwrap();
        let balls_before = sb.totals().total_balls;
        let runs_before = sb.player("A").unwrap().runs;

        ball(&mut sb, "wide", BallPayload::new("A", "B").with_runs(1)).unwrap();

        assert_eq!(sb.totals().total_wide_balls, 3);
        assert_eq!(sb.totals().total_balls, balls_before);
        assert_eq!(sb.player("A").unwrap().runs, runs_before + 1);
    }

    #[test]
    fn wicket_marks_striker_played() {
        let mut sb = board();
        add(&mut sb, "A", PlayerRole::Striker);

        ball(&mut sb, "wicket", BallPayload::new("A", "B")).unwrap();

        assert_eq!(sb.totals().total_wickets, 1);
        assert_eq!(sb.totals().total_balls, 1);
        assert_eq!(sb.player("A").unwrap().role, PlayerRole::Played);
    }

    #[test]
    fn overthrow_is_charged_to_the_bowler() {
        let mut sb = board();
        ball(&mut sb, "bye_overthrow", BallPayload::new("A", "B").with_bye(1).with_overthrow(4)).unwrap();

        assert_eq!(sb.totals().total_runs, 1);
        assert_eq!(sb.totals().total_byes, 1);
        assert_eq!(sb.player("B").unwrap().overthrows, 4);
        assert!(sb.player("A").is_none());
    }

    #[test]
    fn missing_striker_or_bowler_is_rejected_without_mutation() {
        let mut sb = board();
        let before = sb.clone();

        let err = ball(&mut sb, "run", BallPayload::new("", "B").with_runs(4)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = ball(&mut sb, "run", BallPayload::new("A", "").with_runs(4)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert_eq!(sb, before);
    }

    #[test]
    fn command_for_another_scoreboard_is_not_found() {
        let sb = board();
        let cmd = ScoreboardCommand::RecordBall(RecordBall {
            scoreboard_id: ScoreboardId::generate(),
            kind: BallKind::new(Legality::Legal, ScoringSource::Bat),
            payload: BallPayload::new("A", "B"),
            occurred_at: Utc::now(),
        });
        assert!(matches!(sb.handle(&cmd), Err(DomainError::AggregateNotFound(_))));
    }

    #[test]
    fn add_player_overwrites_by_name() {
        let mut sb = board();
        add(&mut sb, "A", PlayerRole::Unplayed);
        add(&mut sb, "A", PlayerRole::Striker);

        assert_eq!(sb.players().len(), 1);
        assert_eq!(sb.player_with_role(PlayerRole::Striker), Some("A"));
    }

    #[test]
    fn add_player_requires_a_name() {
        let sb = board();
        let cmd = ScoreboardCommand::AddPlayer(AddPlayer {
            scoreboard_id: sb.id_typed(),
            name: "  ".to_string(),
            record: PlayerRecord::default(),
            occurred_at: Utc::now(),
        });
        assert!(matches!(sb.handle(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn swap_requires_both_players() {
        let mut sb = board();
        add(&mut sb, "A", PlayerRole::Striker);

        let err = swap(&mut sb, "A", "Z").unwrap_err();
        assert_eq!(err, DomainError::PlayerNotFound("Z".to_string()));
        assert_eq!(sb.player("A").unwrap().role, PlayerRole::Striker);
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut sb = board();
        add(&mut sb, "A", PlayerRole::Striker);
        add(&mut sb, "B", PlayerRole::NonStriker);

        swap(&mut sb, "A", "B").unwrap();

        assert_eq!(sb.player("A").unwrap().role, PlayerRole::NonStriker);
        assert_eq!(sb.player("B").unwrap().role, PlayerRole::Striker);
    }

    #[test]
    fn serializes_in_scorer_ui_shape() {
        let mut sb = board();
        add(&mut sb, "A", PlayerRole::NonStriker);

        let json = serde_json::to_value(&sb).unwrap();
        assert_eq!(json["_id"], serde_json::json!(sb.id_typed().to_string()));
        assert_eq!(json["team_scoreboard"]["total_legbyes"], 0);
        assert_eq!(json["players"]["A"]["review"], "nonstriker");

        let back: Scoreboard = serde_json::from_value(json).unwrap();
        assert_eq!(back, sb);
    }

    fn any_role() -> impl Strategy<Value = PlayerRole> {
        prop_oneof![
            Just(PlayerRole::Striker),
            Just(PlayerRole::NonStriker),
            Just(PlayerRole::Bowler),
            Just(PlayerRole::Unplayed),
            Just(PlayerRole::Played),
        ]
    }

    proptest! {
        /// Property: swapping the same pair twice restores the original roles.
        #[test]
        fn swap_is_its_own_inverse(a in any_role(), b in any_role()) {
            let mut sb = board();
            add(&mut sb, "A", a);
            add(&mut sb, "B", b);
            let before: Vec<PlayerRole> = sb.players().values().map(|p| p.role).collect();

            swap(&mut sb, "A", "B").unwrap();
            swap(&mut sb, "A", "B").unwrap();

            let after: Vec<PlayerRole> = sb.players().values().map(|p| p.role).collect();
            prop_assert_eq!(before, after);
        }

        /// Property: totals never decrease across any sequence of balls.
        #[test]
        fn totals_are_monotonic(
            tags in prop::collection::vec(0usize..24, 1..40),
            runs in prop::collection::vec(0u32..7, 40),
        ) {
            let catalog: Vec<&str> = BallKind::catalog().map(|(t, _)| t).collect();
            let mut sb = board();

            for (i, idx) in tags.into_iter().enumerate() {
                let before = *sb.totals();
                let r = runs[i];
                let payload = BallPayload { runs: r, bye: r, legbye: r, overthrow: r, ..BallPayload::new("A", "B") };
                ball(&mut sb, catalog[idx], payload).unwrap();
                let after = *sb.totals();

                prop_assert!(after.total_runs >= before.total_runs);
                prop_assert!(after.total_wickets >= before.total_wickets);
                prop_assert!(after.total_balls >= before.total_balls);
                prop_assert!(after.total_wide_balls >= before.total_wide_balls);
                prop_assert!(after.total_no_balls >= before.total_no_balls);
                prop_assert!(after.total_byes >= before.total_byes);
                prop_assert!(after.total_legbyes >= before.total_legbyes);
            }
        }
    }
}
