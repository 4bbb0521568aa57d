use serde::{Deserialize, Serialize};

use cricket_core::{DomainError, DomainResult};

/// Flat ball payload as sent by the scorer UI.
///
/// Which of the numeric fields matter depends on the [`crate::BallKind`]:
/// `runs` for bat runs, `bye`/`legbye` for extras, `overthrow` for the
/// overthrow modifier. The remaining counters (`ball`, `wicket`, `no_ball`,
/// `wide_ball`) are kept for the audit trail only; the kind decides what is
/// counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallPayload {
    pub runs: u32,
    #[serde(alias = "ballsFaced", alias = "balls")]
    pub ball: u32,
    pub wicket: u32,
    #[serde(alias = "noBall")]
    pub no_ball: u32,
    #[serde(alias = "wideBall")]
    pub wide_ball: u32,
    pub bye: u32,
    #[serde(alias = "legBye")]
    pub legbye: u32,
    pub overthrow: u32,
    #[serde(alias = "onStrikePlayer")]
    pub onstrike: String,
    #[serde(alias = "bowlerName")]
    pub bowler: String,
}

impl BallPayload {
    pub fn new(onstrike: impl Into<String>, bowler: impl Into<String>) -> Self {
        Self {
            onstrike: onstrike.into(),
            bowler: bowler.into(),
            ..Self::default()
        }
    }

    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_bye(mut self, bye: u32) -> Self {
        self.bye = bye;
        self
    }

    pub fn with_legbye(mut self, legbye: u32) -> Self {
        self.legbye = legbye;
        self
    }

    pub fn with_overthrow(mut self, overthrow: u32) -> Self {
        self.overthrow = overthrow;
        self
    }

    /// Both the striker and the bowler must be named before a ball is scored.
    pub fn validate(&self) -> DomainResult<()> {
        if self.onstrike.trim().is_empty() {
            return Err(DomainError::validation("onstrike (striker name) is required"));
        }
        if self.bowler.trim().is_empty() {
            return Err(DomainError::validation("bowler name is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let p: BallPayload = serde_json::from_str(r#"{"runs":4,"onstrike":"A","bowler":"B"}"#).unwrap();
        assert_eq!(p, BallPayload::new("A", "B").with_runs(4));
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let p: BallPayload =
            serde_json::from_str(r#"{"legBye":2,"onStrikePlayer":"A","bowlerName":"B"}"#).unwrap();
        assert_eq!(p.legbye, 2);
        assert_eq!(p.onstrike, "A");
        assert_eq!(p.bowler, "B");
    }

    #[test]
    fn striker_and_bowler_are_required() {
        assert!(BallPayload::new("A", "B").validate().is_ok());
        assert!(matches!(
            BallPayload::new("", "B").validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            BallPayload::new("A", "   ").validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_counts_do_not_deserialize() {
        assert!(serde_json::from_str::<BallPayload>(r#"{"runs":-1}"#).is_err());
    }
}
