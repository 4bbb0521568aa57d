//! Scoring rules: what one delivery adds to the scoreboard.

use serde::{Deserialize, Serialize};

use crate::catalog::{BallKind, ScoringSource};
use crate::payload::BallPayload;

/// Increments to the team totals.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDelta {
    pub runs: u32,
    pub wickets: u32,
    pub wide_balls: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub legbyes: u32,
    pub balls: u32,
}

/// Everything one delivery changes.
///
/// Player-level fields are `Some` when the player record is touched, even if
/// the increment is zero: touching a record creates it when missing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub team: TeamDelta,
    pub striker_runs: Option<u32>,
    pub striker_out: bool,
    pub bowler_overthrows: Option<u32>,
}

/// Runs credited to the batting side for this delivery.
pub fn credited_runs(kind: BallKind, payload: &BallPayload) -> u32 {
    match kind.source {
        ScoringSource::None => 0,
        ScoringSource::Bat => payload.runs,
        ScoringSource::Bye => payload.bye,
        ScoringSource::LegBye => payload.legbye,
    }
}

/// Pure scoring function.
pub fn score_delta(kind: BallKind, payload: &BallPayload) -> ScoreDelta {
    let credited = credited_runs(kind, payload);

    let team = TeamDelta {
        runs: credited,
        wickets: u32::from(kind.wicket),
        wide_balls: u32::from(kind.legality.is_wide()),
        no_balls: u32::from(kind.legality.is_no_ball()),
        byes: if kind.source == ScoringSource::Bye { payload.bye } else { 0 },
        legbyes: if kind.source == ScoringSource::LegBye { payload.legbye } else { 0 },
        balls: u32::from(kind.legality.is_legal()),
    };

    // Byes and leg-byes never reach the batter's tally. A batter given out
    // off a no-ball keeps the runs they made; the team total does not.
    let striker_runs = match kind.source {
        ScoringSource::None if kind.wicket && kind.legality.is_no_ball() => Some(payload.runs),
        ScoringSource::Bat | ScoringSource::None => Some(credited),
        ScoringSource::Bye | ScoringSource::LegBye => None,
    };

    ScoreDelta {
        team,
        striker_runs,
        striker_out: kind.wicket,
        bowler_overthrows: kind.overthrow.then_some(payload.overthrow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Legality;
    use proptest::prelude::*;

    fn payload() -> BallPayload {
        BallPayload {
            runs: 3,
            bye: 2,
            legbye: 1,
            overthrow: 4,
            ..BallPayload::new("A", "B")
        }
    }

    fn delta_for(tag: &str) -> ScoreDelta {
        score_delta(BallKind::from_tag(tag).unwrap(), &payload())
    }

    fn team(runs: u32, wickets: u32, wide: u32, no: u32, byes: u32, legbyes: u32, balls: u32) -> TeamDelta {
        TeamDelta {
            runs,
            wickets,
            wide_balls: wide,
            no_balls: no,
            byes,
            legbyes,
            balls,
        }
    }

    /// One row per flat tag, payload runs=3 bye=2 legbye=1 overthrow=4.
    #[test]
    fn catalog_table() {
        let rows: &[(&str, TeamDelta, Option<u32>, bool, Option<u32>)] = &[
            ("run", team(3, 0, 0, 0, 0, 0, 1), Some(3), false, None),
            ("wicket", team(0, 1, 0, 0, 0, 0, 1), Some(0), true, None),
            ("run_wicket", team(3, 1, 0, 0, 0, 0, 1), Some(3), true, None),
            ("normal", team(0, 0, 0, 0, 0, 0, 1), Some(0), false, None),
            ("normal_overthrow", team(3, 0, 0, 0, 0, 0, 1), Some(3), false, Some(4)),
            ("bye", team(2, 0, 0, 0, 2, 0, 1), None, false, None),
            ("bye_overthrow", team(2, 0, 0, 0, 2, 0, 1), None, false, Some(4)),
            ("legbye", team(1, 0, 0, 0, 0, 1, 1), None, false, None),
            ("legbye_overthrow", team(1, 0, 0, 0, 0, 1, 1), None, false, Some(4)),
            ("noball", team(3, 0, 0, 1, 0, 0, 0), Some(3), false, None),
            ("noball_overthrow", team(3, 0, 0, 1, 0, 0, 0), Some(3), false, Some(4)),
            ("noball_bye", team(2, 0, 0, 1, 2, 0, 0), None, false, None),
            ("noball_bye_overthrow", team(2, 0, 0, 1, 2, 0, 0), None, false, Some(4)),
            ("noball_legbye", team(1, 0, 0, 1, 0, 1, 0), None, false, None),
            ("noball_legbye_overthrow", team(1, 0, 0, 1, 0, 1, 0), None, false, Some(4)),
            ("wide", team(3, 0, 1, 0, 0, 0, 0), Some(3), false, None),
            ("wide_overthrow", team(3, 0, 1, 0, 0, 0, 0), Some(3), false, Some(4)),
            ("wide_bye", team(2, 0, 1, 0, 2, 0, 0), None, false, None),
            ("wide_bye_overthrow", team(2, 0, 1, 0, 2, 0, 0), None, false, Some(4)),
            ("wide_legbye", team(1, 0, 1, 0, 0, 1, 0), None, false, None),
            ("wide_legbye_overthrow", team(1, 0, 1, 0, 0, 1, 0), None, false, Some(4)),
            ("wide_ball_no_ball", team(3, 0, 1, 1, 0, 0, 0), Some(3), false, None),
            ("no_ball_wide_ball", team(3, 0, 1, 1, 0, 0, 0), Some(3), false, None),
            ("wicket_no_ball", team(0, 1, 0, 1, 0, 0, 0), Some(3), true, None),
        ];

        assert_eq!(rows.len(), BallKind::catalog().count());

        for (tag, team, striker_runs, striker_out, overthrows) in rows {
            let d = delta_for(tag);
            assert_eq!(d.team, *team, "team delta for {tag}");
            assert_eq!(d.striker_runs, *striker_runs, "striker runs for {tag}");
            assert_eq!(d.striker_out, *striker_out, "striker out for {tag}");
            assert_eq!(d.bowler_overthrows, *overthrows, "overthrows for {tag}");
        }
    }

    #[test]
    fn wicket_off_a_wide_counts_wide_and_wicket_but_no_ball() {
        let kind = BallKind::new(Legality::Wide, ScoringSource::None).with_wicket();
        let d = score_delta(kind, &payload());
        assert_eq!(d.team, team(0, 1, 1, 0, 0, 0, 0));
        assert!(d.striker_out);
    }

    #[test]
    fn wicket_off_a_no_ball_credits_the_striker_but_not_the_team() {
        let p = BallPayload {
            runs: 2,
            ..BallPayload::new("A", "B")
        };
        let d = score_delta(BallKind::from_tag("wicket_no_ball").unwrap(), &p);
        assert_eq!(d.striker_runs, Some(2));
        assert_eq!(d.team, team(0, 1, 0, 1, 0, 0, 0));
        assert!(d.striker_out);
    }

    fn any_kind() -> impl Strategy<Value = BallKind> {
        (
            prop_oneof![
                Just(Legality::Legal),
                Just(Legality::NoBall),
                Just(Legality::Wide),
                Just(Legality::NoBallAndWide),
            ],
            prop_oneof![
                Just(ScoringSource::None),
                Just(ScoringSource::Bat),
                Just(ScoringSource::Bye),
                Just(ScoringSource::LegBye),
            ],
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(legality, source, overthrow, wicket)| BallKind {
                legality,
                source,
                overthrow,
                wicket,
            })
    }

    proptest! {
        /// Property: exactly one of "legal ball", "no-ball", "wide" (or both
        /// extras together) is counted for every delivery.
        #[test]
        fn each_delivery_is_counted_once(kind in any_kind(), runs in 0u32..7, bye in 0u32..5) {
            let p = BallPayload { runs, bye, legbye: bye, ..BallPayload::new("A", "B") };
            let d = score_delta(kind, &p);
            prop_assert_eq!(d.team.balls == 1, kind.legality.is_legal());
            prop_assert!(d.team.balls + d.team.no_balls + d.team.wide_balls >= 1);
            prop_assert!(d.team.balls <= 1 && d.team.no_balls <= 1 && d.team.wide_balls <= 1);
        }

        /// Property: extras credited to the team never reach the striker.
        #[test]
        fn striker_runs_never_exceed_team_runs(kind in any_kind(), runs in 0u32..7, bye in 0u32..5) {
            let p = BallPayload { runs, bye, legbye: bye, ..BallPayload::new("A", "B") };
            let d = score_delta(kind, &p);
            let out_off_no_ball = kind.source == ScoringSource::None
                && kind.wicket
                && kind.legality.is_no_ball();
            prop_assume!(!out_off_no_ball);
            prop_assert!(d.striker_runs.unwrap_or(0) <= d.team.runs);
            prop_assert_eq!(d.team.byes + d.team.legbyes > 0, d.striker_runs.is_none() && bye > 0);
        }
    }
}
