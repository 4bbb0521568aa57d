//! Delivery catalog.
//!
//! A delivery is described by four independent facets: whether it was a legal
//! ball, where the runs came from, whether an overthrow was involved and
//! whether a wicket fell. The scorer UI still speaks in flat tags such as
//! `noball_legbye_overthrow`; every tag it knows maps onto exactly one
//! [`BallKind`], and kinds without a flat tag (a wicket off a wide, say) can
//! be sent in structured form.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cricket_core::{DomainError, DomainResult};

/// Whether the delivery counts towards the over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legality {
    Legal,
    NoBall,
    Wide,
    NoBallAndWide,
}

impl Legality {
    /// Legal deliveries are the only ones counted in `total_balls`.
    pub fn is_legal(self) -> bool {
        matches!(self, Legality::Legal)
    }

    pub fn is_no_ball(self) -> bool {
        matches!(self, Legality::NoBall | Legality::NoBallAndWide)
    }

    pub fn is_wide(self) -> bool {
        matches!(self, Legality::Wide | Legality::NoBallAndWide)
    }
}

/// Where the runs scored off the delivery are credited from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringSource {
    /// No runs credited (dot ball, plain wicket).
    None,
    /// Off the bat; credited to the striker.
    Bat,
    Bye,
    LegBye,
}

/// Structured description of one delivery.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BallKind {
    pub legality: Legality,
    pub source: ScoringSource,
    #[serde(default)]
    pub overthrow: bool,
    #[serde(default)]
    pub wicket: bool,
}

const fn kind(legality: Legality, source: ScoringSource, overthrow: bool, wicket: bool) -> BallKind {
    BallKind {
        legality,
        source,
        overthrow,
        wicket,
    }
}

use Legality::{Legal, NoBall, NoBallAndWide, Wide};
use ScoringSource::{Bat, Bye, LegBye, None as NoRuns};

/// Flat tags understood on the wire, in the order the scorer UI lists them.
///
/// Where two tags describe the same delivery the first one is canonical.
const CATALOG: &[(&str, BallKind)] = &[
    ("run", kind(Legal, Bat, false, false)),
    ("wicket", kind(Legal, NoRuns, false, true)),
    ("run_wicket", kind(Legal, Bat, false, true)),
    ("normal", kind(Legal, NoRuns, false, false)),
    ("normal_overthrow", kind(Legal, Bat, true, false)),
    ("bye", kind(Legal, Bye, false, false)),
    ("bye_overthrow", kind(Legal, Bye, true, false)),
    ("legbye", kind(Legal, LegBye, false, false)),
    ("legbye_overthrow", kind(Legal, LegBye, true, false)),
    ("noball", kind(NoBall, Bat, false, false)),
    ("noball_overthrow", kind(NoBall, Bat, true, false)),
    ("noball_bye", kind(NoBall, Bye, false, false)),
    ("noball_bye_overthrow", kind(NoBall, Bye, true, false)),
    ("noball_legbye", kind(NoBall, LegBye, false, false)),
    ("noball_legbye_overthrow", kind(NoBall, LegBye, true, false)),
    ("wide", kind(Wide, Bat, false, false)),
    ("wide_overthrow", kind(Wide, Bat, true, false)),
    ("wide_bye", kind(Wide, Bye, false, false)),
    ("wide_bye_overthrow", kind(Wide, Bye, true, false)),
    ("wide_legbye", kind(Wide, LegBye, false, false)),
    ("wide_legbye_overthrow", kind(Wide, LegBye, true, false)),
    ("wide_ball_no_ball", kind(NoBallAndWide, Bat, false, false)),
    ("no_ball_wide_ball", kind(NoBallAndWide, Bat, false, false)),
    ("wicket_no_ball", kind(NoBall, NoRuns, false, true)),
];

impl BallKind {
    pub const fn new(legality: Legality, source: ScoringSource) -> Self {
        kind(legality, source, false, false)
    }

    pub const fn with_overthrow(mut self) -> Self {
        self.overthrow = true;
        self
    }

    pub const fn with_wicket(mut self) -> Self {
        self.wicket = true;
        self
    }

    /// Resolve a flat wire tag.
    pub fn from_tag(tag: &str) -> DomainResult<Self> {
        CATALOG
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, k)| *k)
            .ok_or_else(|| DomainError::unknown_event_type(tag))
    }

    /// Canonical flat tag for this kind, if the scorer UI has one.
    pub fn tag(&self) -> Option<&'static str> {
        CATALOG.iter().find(|(_, k)| k == self).map(|(t, _)| *t)
    }

    /// Every flat tag with the kind it resolves to.
    pub fn catalog() -> impl Iterator<Item = (&'static str, BallKind)> {
        CATALOG.iter().copied()
    }
}

impl FromStr for BallKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl core::fmt::Display for BallKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.tag() {
            Some(tag) => f.write_str(tag),
            None => write!(
                f,
                "{:?}/{:?}{}{}",
                self.legality,
                self.source,
                if self.overthrow { "+overthrow" } else { "" },
                if self.wicket { "+wicket" } else { "" },
            ),
        }
    }
}

/// The `type` field of a `new-ball` message: a flat tag or a structured kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallType {
    Tag(String),
    Kind(BallKind),
}

impl BallType {
    pub fn resolve(&self) -> DomainResult<BallKind> {
        match self {
            BallType::Tag(tag) => BallKind::from_tag(tag),
            BallType::Kind(kind) => Ok(*kind),
        }
    }
}

impl From<BallKind> for BallType {
    fn from(value: BallKind) -> Self {
        BallType::Kind(value)
    }
}
