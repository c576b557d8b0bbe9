//! The timeline: an ordered log of [`ScoreEntry`] values.
//!
//! Every scoring action appends exactly one entry. When the log is non-empty
//! it is the source of truth; the `points` array beside it is kept index
//! aligned with the `point` entries so legacy consumers can still read it.
//!
//! # Wire shape
//!
//! Entries are internally tagged on `type`:
//!
//! ```json
//! { "type": "point", "data": { "winner": 0, ... }, "pointIndex": 3, "timestamp": "..." }
//! { "type": "set", "data": { "side1Score": 6, "side2Score": 4, "winningSide": 1 }, "timestamp": "..." }
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::point::Point;

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Timeline container carried on the matchUp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub entries: Vec<ScoreEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<Vec<SubstitutionEvent>>,
}

impl History {
    /// Number of `point` entries in the timeline.
    pub fn point_entry_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_point()).count()
    }

    /// Synthesize `point` entries for a legacy history that only has the
    /// flat `points` array. Does nothing when entries already exist.
    pub fn migrate_legacy_points(&mut self) {
        if !self.entries.is_empty() {
            return;
        }
        self.entries = self
            .points
            .iter()
            .enumerate()
            .map(|(point_index, point)| ScoreEntry::from_point(point.clone(), point_index))
            .collect();
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Scores of one whole set, as passed to `addSet` or `setInitialScore`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScoreInput {
    pub side1_score: u32,
    pub side2_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side1_tiebreak_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side2_tiebreak_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_side: Option<u8>,
}

impl SetScoreInput {
    pub fn new(side1_score: u32, side2_score: u32) -> Self {
        Self {
            side1_score,
            side2_score,
            ..Self::default()
        }
    }

    /// The explicit winning side, else whichever score is strictly greater.
    /// Equal scores leave the set undecided.
    pub fn inferred_winning_side(&self) -> Option<u8> {
        self.winning_side
            .or_else(|| match self.side1_score.cmp(&self.side2_score) {
                Ordering::Greater => Some(1),
                Ordering::Less => Some(2),
                Ordering::Equal => None,
            })
    }
}

/// A whole game awarded to one side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    /// 0 for side 1, 1 for side 2.
    pub winner: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side1_tiebreak_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side2_tiebreak_score: Option<u32>,
}

impl GameInput {
    pub fn won_by(winner: u8) -> Self {
        Self {
            winner,
            ..Self::default()
        }
    }
}

/// End of a timed segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSegment {
    pub set_number: u32,
}

/// A lineup change on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionEvent {
    pub side_number: u8,
    pub out_participant_id: String,
    pub in_participant_id: String,
    /// Point count when the substitution took effect.
    pub before_point_index: usize,
    pub timestamp: DateTime<Utc>,
}

/// Score already on the board when scoring started.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialScore {
    #[serde(default)]
    pub sets: Vec<SetScoreInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_set_score: Option<SetScoreInput>,
}

// ---------------------------------------------------------------------------
// ScoreEntry
// ---------------------------------------------------------------------------

/// One unit of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScoreEntry {
    Point {
        data: Point,
        /// Index of this point in `history.points`.
        point_index: usize,
        timestamp: DateTime<Utc>,
    },
    Set {
        data: SetScoreInput,
        timestamp: DateTime<Utc>,
    },
    Game {
        data: GameInput,
        timestamp: DateTime<Utc>,
    },
    EndSegment {
        data: EndSegment,
        timestamp: DateTime<Utc>,
    },
    Substitution {
        data: SubstitutionEvent,
        timestamp: DateTime<Utc>,
    },
    SetInitialScore {
        data: InitialScore,
        timestamp: DateTime<Utc>,
    },
}

/// The tag of a [`ScoreEntry`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Point,
    Set,
    Game,
    EndSegment,
    Substitution,
    SetInitialScore,
}

impl ScoreEntry {
    /// A `point` entry stamped with the point's own timestamp.
    pub fn from_point(point: Point, point_index: usize) -> Self {
        let timestamp = point.timestamp;
        ScoreEntry::Point {
            data: point,
            point_index,
            timestamp,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ScoreEntry::Point { .. } => EntryKind::Point,
            ScoreEntry::Set { .. } => EntryKind::Set,
            ScoreEntry::Game { .. } => EntryKind::Game,
            ScoreEntry::EndSegment { .. } => EntryKind::EndSegment,
            ScoreEntry::Substitution { .. } => EntryKind::Substitution,
            ScoreEntry::SetInitialScore { .. } => EntryKind::SetInitialScore,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ScoreEntry::Point { timestamp, .. }
            | ScoreEntry::Set { timestamp, .. }
            | ScoreEntry::Game { timestamp, .. }
            | ScoreEntry::EndSegment { timestamp, .. }
            | ScoreEntry::Substitution { timestamp, .. }
            | ScoreEntry::SetInitialScore { timestamp, .. } => *timestamp,
        }
    }

    /// `Some` only for `point` entries.
    pub fn point_index(&self) -> Option<usize> {
        match self {
            ScoreEntry::Point { point_index, .. } => Some(*point_index),
            _ => None,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, ScoreEntry::Point { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
