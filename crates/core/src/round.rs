//! Round ("giornata") records and the normalizer that builds them.
//!
//! Incoming pushes arrive in a loosely shaped JSON form ([`IncomingRound`]).
//! Stored rows ([`StoredRound`]) carry the canonical fields written to the
//! historical collection. Both turn into a [`RoundRecord`], the typed form
//! every downstream computation consumes. No conversion here can fail: every
//! missing or malformed field falls back to a documented default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Number of tracked positions per round.
pub const POSITIONS: usize = 6;

/// Date used when an incoming round carries neither `dataRicerca` nor `data`.
pub const UNKNOWN_DATE: &str = "sconosciuta";

/// Round label used when an incoming round carries no `giornata`.
pub const UNKNOWN_ROUND: &str = "?";

/// Outcome tag of one position in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A goal occurred (`"G"`).
    #[serde(rename = "G")]
    Goal,
    /// No goal (`"NG"`).
    #[serde(rename = "NG")]
    NoGoal,
}

impl Outcome {
    /// Parses an outcome tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "G" => Some(Self::Goal),
            "NG" => Some(Self::NoGoal),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Goal => "G",
            Self::NoGoal => "NG",
        }
    }
}

/// One of the six outcome slots of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionSlot {
    /// Parsed outcome, `None` when the tag was missing or unknown.
    pub outcome: Option<Outcome>,
    /// Optional `"HOME-AWAY"` team pair.
    pub teams: Option<String>,
}

impl PositionSlot {
    #[must_use]
    pub fn is(&self, target: Outcome) -> bool {
        self.outcome == Some(target)
    }
}

/// Canonical, sortable form of one round observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    /// `DD/MM/YYYY` date of the observation.
    pub observation_date: String,
    /// Time of day, distinguishes several snapshots taken on one date.
    pub observation_time: String,
    /// Round number as it was received (usually `"1"`..`"22"`).
    pub round_label: String,
    /// At most [`POSITIONS`] slots, in position order.
    pub positions: Vec<PositionSlot>,
    /// The pushing system's own sequence number.
    pub insertion_order: i64,
}

impl RoundRecord {
    /// Round number as an integer, `None` when the label is not numeric.
    #[must_use]
    pub fn round_number(&self) -> Option<u32> {
        self.round_label.trim().parse().ok()
    }

    /// Round number used for ordering: non-numeric labels sort as 0.
    #[must_use]
    pub fn round_sort_key(&self) -> u32 {
        self.round_number().unwrap_or(0)
    }

    /// Round label padded to two digits when numeric ("5" -> "05").
    #[must_use]
    pub fn padded_round(&self) -> String {
        pad_round(&self.round_label)
    }

    /// Slot at `position`, `None` when the round did not carry it.
    #[must_use]
    pub fn slot(&self, position: usize) -> Option<&PositionSlot> {
        if position >= POSITIONS {
            return None;
        }
        self.positions.get(position)
    }
}

/// Pads a numeric round label to two digits; other labels are returned as-is.
#[must_use]
pub fn pad_round(label: &str) -> String {
    match label.trim().parse::<u32>() {
        Ok(n) => format!("{n:02}"),
        Err(_) => label.to_string(),
    }
}

/// Composite identity of a round in the historical collection.
#[must_use]
pub fn identity_key(date: &str, round_label: &str, time: &str) -> String {
    format!("{date}_{round_label}_{time}")
}

/// A scalar that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One match entry as pushed by the scraper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        alias = "match",
        alias = "squadre",
        skip_serializing_if = "Option::is_none"
    )]
    pub teams: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchEntry {
    fn to_slot(&self) -> PositionSlot {
        PositionSlot {
            outcome: self.result.as_deref().and_then(Outcome::from_tag),
            teams: self
                .teams
                .as_ref()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// A round as received in a sync push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingRound {
    /// External identifier used for incremental dedupe and insertion order.
    #[serde(
        default,
        deserialize_with = "lenient::scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Scalar>,
    #[serde(
        default,
        rename = "dataRicerca",
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_ricerca: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub giornata: Option<Scalar>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub ora: Option<String>,
    /// Positional: an unreadable entry becomes an empty slot.
    #[serde(default, deserialize_with = "lenient::list")]
    pub matches: Vec<MatchEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IncomingRound {
    /// String form of the external identifier, if any.
    #[must_use]
    pub fn external_id(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }

    /// Observation date: `dataRicerca`, then `data`, then [`UNKNOWN_DATE`].
    #[must_use]
    pub fn observation_date(&self) -> String {
        [&self.data_ricerca, &self.data]
            .into_iter()
            .flatten()
            .find(|d| !d.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_DATE.to_string())
    }

    #[must_use]
    pub fn round_label(&self) -> String {
        self.giornata
            .as_ref()
            .map_or_else(|| UNKNOWN_ROUND.to_string(), ToString::to_string)
    }

    #[must_use]
    pub fn observation_time(&self) -> String {
        self.ora.clone().unwrap_or_default()
    }

    /// Storage identity of this round.
    #[must_use]
    pub fn identity_key(&self) -> String {
        identity_key(
            &self.observation_date(),
            &self.round_label(),
            &self.observation_time(),
        )
    }

    /// Builds the row stored in the historical collection.
    ///
    /// `batch_index` stands in for the insertion order when `id` is missing
    /// or not an integer.
    #[must_use]
    pub fn to_stored(&self, batch_index: usize) -> StoredRound {
        let fallback = i64::try_from(batch_index).unwrap_or(i64::MAX);
        StoredRound {
            id: self.identity_key(),
            data_sisal: self.observation_date(),
            giornata: self.round_label(),
            ora: self.observation_time(),
            matches: self.matches.clone(),
            insertion_order: self.id.as_ref().and_then(Scalar::as_i64).unwrap_or(fallback),
        }
    }
}

/// Row of the permanent historical collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRound {
    /// Composite identity `"{date}_{round}_{time}"`.
    pub id: String,
    pub data_sisal: String,
    pub giornata: String,
    pub ora: String,
    pub matches: Vec<MatchEntry>,
    pub insertion_order: i64,
}

impl StoredRound {
    /// Normalizes this row. Slots beyond the sixth are dropped.
    #[must_use]
    pub fn to_record(&self) -> RoundRecord {
        RoundRecord {
            observation_date: self.data_sisal.clone(),
            observation_time: self.ora.clone(),
            round_label: self.giornata.clone(),
            positions: self
                .matches
                .iter()
                .take(POSITIONS)
                .map(MatchEntry::to_slot)
                .collect(),
            insertion_order: self.insertion_order,
        }
    }
}

impl From<&StoredRound> for RoundRecord {
    fn from(row: &StoredRound) -> Self {
        row.to_record()
    }
}
