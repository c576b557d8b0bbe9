//! The Match Record: score, sides, status, and history of one matchUp.
//!
//! A [`MatchUp`] is plain data. Engines own one exclusively and replace it
//! wholesale whenever the point mutator returns a new value.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::timeline::{History, ScoreEntry, SubstitutionEvent};

// ---------------------------------------------------------------------------
// Status and type
// ---------------------------------------------------------------------------

/// Lifecycle of a matchUp. Only ever advances in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchUpStatus {
    #[default]
    ToBePlayed,
    InProgress,
    Completed,
}

/// Singles or doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchUpType {
    #[default]
    Singles,
    Doubles,
}

// ---------------------------------------------------------------------------
// Sides and lineups
// ---------------------------------------------------------------------------

/// One competitor in a side's lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineUpMember {
    pub participant_id: String,
    /// Position within the team collection, kept across substitutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_position: Option<u32>,
}

impl LineUpMember {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            collection_position: None,
        }
    }
}

/// One of the two sides of a matchUp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    /// 1 or 2.
    pub side_number: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_up: Option<Vec<LineUpMember>>,
}

// ---------------------------------------------------------------------------
// SetScore
// ---------------------------------------------------------------------------

/// Score of a single set.
///
/// Side-indexed accessors take `0` for side 1 and `1` for side 2, matching
/// the `winner` index carried by points and games.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    /// 1-based position in the match.
    pub set_number: u32,
    /// Games, or points for timed sets.
    pub side1_score: u32,
    pub side2_score: u32,
    /// Points in the tiebreak, present once one has started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side1_tiebreak_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side2_tiebreak_score: Option<u32>,
    /// Points in the game currently being played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side1_point_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side2_point_score: Option<u32>,
    /// 1 or 2 once the set is decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_side: Option<u8>,
    /// Game indices past which recalculation must not cascade.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hard_boundaries: BTreeSet<u32>,
}

impl SetScore {
    /// An empty, undecided set.
    pub fn new(set_number: u32) -> Self {
        Self {
            set_number,
            ..Self::default()
        }
    }

    /// Games (or timed points) won by `side`.
    pub fn score(&self, side: usize) -> u32 {
        if side == 0 {
            self.side1_score
        } else {
            self.side2_score
        }
    }

    pub fn score_mut(&mut self, side: usize) -> &mut u32 {
        if side == 0 {
            &mut self.side1_score
        } else {
            &mut self.side2_score
        }
    }

    /// Tiebreak points for `side`, `None` before a tiebreak starts.
    pub fn tiebreak_score(&self, side: usize) -> Option<u32> {
        if side == 0 {
            self.side1_tiebreak_score
        } else {
            self.side2_tiebreak_score
        }
    }

    pub fn tiebreak_score_mut(&mut self, side: usize) -> &mut Option<u32> {
        if side == 0 {
            &mut self.side1_tiebreak_score
        } else {
            &mut self.side2_tiebreak_score
        }
    }

    /// Points for `side` in the game in progress.
    pub fn point_score(&self, side: usize) -> Option<u32> {
        if side == 0 {
            self.side1_point_score
        } else {
            self.side2_point_score
        }
    }

    pub fn point_score_mut(&mut self, side: usize) -> &mut Option<u32> {
        if side == 0 {
            &mut self.side1_point_score
        } else {
            &mut self.side2_point_score
        }
    }

    /// Tiebreak score where present, else the regular score.
    pub fn total(&self, side: usize) -> u32 {
        self.tiebreak_score(side).unwrap_or_else(|| self.score(side))
    }

    /// `true` once a winning side is set.
    pub fn is_decided(&self) -> bool {
        self.winning_side.is_some()
    }
}

/// Container for the ordered set scores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    #[serde(default)]
    pub sets: Vec<SetScore>,
}

// ---------------------------------------------------------------------------
// MatchUp
// ---------------------------------------------------------------------------

/// The canonical, mutable record of one contest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUp {
    pub match_up_id: String,
    pub match_up_format: String,
    #[serde(default)]
    pub match_up_type: MatchUpType,
    #[serde(default)]
    pub match_up_status: MatchUpStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_side: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: MatchScore,
    pub sides: [Side; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
}

impl MatchUp {
    /// Guarantee the history container exists before anything is pushed.
    pub fn ensure_history(&mut self) -> &mut History {
        self.history.get_or_insert_with(History::default)
    }

    /// Recorded points, in order.
    pub fn points(&self) -> &[Point] {
        self.history.as_ref().map_or(&[], |h| h.points.as_slice())
    }

    /// The timeline, in order.
    pub fn entries(&self) -> &[ScoreEntry] {
        self.history.as_ref().map_or(&[], |h| h.entries.as_slice())
    }

    /// Recorded substitutions, `None` until the first one happens.
    pub fn substitutions(&self) -> Option<&[SubstitutionEvent]> {
        self.history
            .as_ref()
            .and_then(|h| h.substitutions.as_deref())
    }

    pub fn point_count(&self) -> usize {
        self.points().len()
    }

    pub fn is_doubles(&self) -> bool {
        self.match_up_type == MatchUpType::Doubles
    }

    /// The side with the given number (1 or 2).
    pub fn side(&self, side_number: u8) -> Option<&Side> {
        self.sides.iter().find(|s| s.side_number == side_number)
    }

    pub fn side_mut(&mut self, side_number: u8) -> Option<&mut Side> {
        self.sides.iter_mut().find(|s| s.side_number == side_number)
    }

    /// TO_BE_PLAYED becomes IN_PROGRESS; later states are left alone.
    pub fn mark_in_progress(&mut self) {
        if self.match_up_status == MatchUpStatus::ToBePlayed {
            self.match_up_status = MatchUpStatus::InProgress;
        }
    }

    /// Index of the set being played, opening a new one when there is none
    /// or the last one is already decided.
    pub fn open_set(&mut self) -> usize {
        match self.score.sets.last() {
            Some(set) if !set.is_decided() => self.score.sets.len() - 1,
            _ => {
                let set_number = self.score.sets.len() as u32 + 1;
                self.score.sets.push(SetScore::new(set_number));
                self.score.sets.len() - 1
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Arguments for [`create_match_up`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateMatchUp {
    pub match_up_format: String,
    /// Generated as a UUID v4 when absent.
    pub match_up_id: Option<String>,
    pub is_doubles: bool,
}

/// Build a fresh, unplayed matchUp.
pub fn create_match_up(args: &CreateMatchUp) -> MatchUp {
    let match_up_id = args
        .match_up_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let match_up_type = if args.is_doubles {
        MatchUpType::Doubles
    } else {
        MatchUpType::Singles
    };

    MatchUp {
        match_up_id,
        match_up_format: args.match_up_format.clone(),
        match_up_type,
        match_up_status: MatchUpStatus::ToBePlayed,
        winning_side: None,
        end_time: None,
        score: MatchScore::default(),
        sides: [1u8, 2u8].map(|side_number| Side {
            side_number,
            ..Side::default()
        }),
        history: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
