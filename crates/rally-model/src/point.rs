//! Points and the point mutator.
//!
//! [`add_point`] is a pure function of `(matchUp, point input, config)`: it
//! consumes the record and returns the next one. It plays the point into the
//! open set according to the active set format, runs the completion rules,
//! and appends the [`Point`] to `history.points`. It never touches
//! `history.entries`; logging is the engine's job.

use chrono::{DateTime, Utc};
use rally_format::{MatchFormat, SetFormat, TiebreakFormat, TimedBasis, TimedSet};
use serde::{Deserialize, Serialize};

use crate::completion::{active_set_format, check_match_completion, check_set_completion};
use crate::matchup::{MatchUp, MatchUpStatus, SetScore};

// ---------------------------------------------------------------------------
// PointInput / Point
// ---------------------------------------------------------------------------

/// What the caller knows about a point when it is scored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInput {
    /// 0 for side 1, 1 for side 2.
    pub winner: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<u8>,
    /// Defaults to the current time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rally_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_type: Option<String>,
}

impl PointInput {
    pub fn won_by(winner: u8) -> Self {
        Self {
            winner,
            ..Self::default()
        }
    }

    pub fn with_server(mut self, server: u8) -> Self {
        self.server = Some(server);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A recorded point.
///
/// `active_players` and `penalty_type` are attached by the engine after the
/// mutator runs; `wrong_side`, `wrong_server` and `penalty_point` only ever
/// appear through later edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub winner: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<u8>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rally_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_type: Option<String>,
    /// Participant ids on court for side 1 and side 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_players: Option<[Vec<String>; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_side: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_server: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_point: Option<bool>,
}

impl Point {
    /// The point as the mutator records it. Engine-attached fields are empty.
    pub fn from_input(input: &PointInput, timestamp: DateTime<Utc>) -> Self {
        Self {
            winner: input.winner,
            server: input.server,
            timestamp,
            rally_length: input.rally_length,
            result: input.result.clone(),
            penalty_type: None,
            active_players: None,
            wrong_side: None,
            wrong_server: None,
            penalty_point: None,
        }
    }

    /// Input that replays this point through the mutator.
    pub fn to_input(&self) -> PointInput {
        PointInput {
            winner: self.winner,
            server: self.server,
            timestamp: Some(self.timestamp),
            rally_length: self.rally_length,
            result: self.result.clone(),
            penalty_type: self.penalty_type.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Point multipliers
// ---------------------------------------------------------------------------

/// A scoring-weight rule for point-counted timed sets.
///
/// A point matches when its `result` is listed in `results` or its
/// `penalty_type` is listed in `penalty_types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointMultiplier {
    /// Point results (such as `"Ace"`) this weight applies to.
    #[serde(default)]
    pub results: Vec<String>,
    /// Penalty types this weight applies to.
    #[serde(default)]
    pub penalty_types: Vec<String>,
    /// Points awarded instead of one.
    pub value: u32,
}

impl PointMultiplier {
    /// Whether the input's result or penalty type is listed.
    pub fn matches(&self, input: &PointInput) -> bool {
        let listed = |list: &[String], value: &Option<String>| {
            value.as_ref().is_some_and(|v| list.iter().any(|l| l == v))
        };
        listed(&self.results, &input.result) || listed(&self.penalty_types, &input.penalty_type)
    }
}

/// Weight of a point: the first matching multiplier's value, else 1.
pub fn point_value(input: &PointInput, multipliers: &[PointMultiplier]) -> u32 {
    multipliers
        .iter()
        .find(|m| m.matches(input))
        .map_or(1, |m| m.value)
}

/// Configuration the mutator reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointConfig<'a> {
    pub point_multipliers: &'a [PointMultiplier],
}

// ---------------------------------------------------------------------------
// add_point
// ---------------------------------------------------------------------------

/// Apply one point and return the next matchUp.
///
/// The point is always appended to `history.points`. It changes the score
/// only while the match is not completed and `winner` is 0 or 1.
pub fn add_point(mut match_up: MatchUp, input: &PointInput, config: &PointConfig<'_>) -> MatchUp {
    let point = Point::from_input(input, input.timestamp.unwrap_or_else(Utc::now));

    if match_up.match_up_status != MatchUpStatus::Completed && point.winner <= 1 {
        let format = rally_format::parse_format(&match_up.match_up_format).ok();
        match_up.mark_in_progress();
        score_point(&mut match_up, format.as_ref(), input, &point, config);
    } else {
        tracing::debug!(
            winner = point.winner,
            status = ?match_up.match_up_status,
            "add_point: point recorded without scoring"
        );
    }

    match_up.ensure_history().points.push(point);
    match_up
}

fn score_point(
    match_up: &mut MatchUp,
    format: Option<&MatchFormat>,
    input: &PointInput,
    point: &Point,
    config: &PointConfig<'_>,
) {
    let winner = usize::from(point.winner);
    let index = match_up.open_set();
    let set_format = format.map(|f| {
        let sets = &match_up.score.sets;
        active_set_format(f, &sets[..index])
    });

    let set = &mut match_up.score.sets[index];
    match set_format {
        Some(SetFormat::TiebreakOnly(_)) => {
            let loser = 1 - winner;
            *set.tiebreak_score_mut(winner) = Some(set.tiebreak_score(winner).unwrap_or(0) + 1);
            *set.tiebreak_score_mut(loser) = Some(set.tiebreak_score(loser).unwrap_or(0));
        }
        Some(SetFormat::Timed(TimedSet {
            basis: TimedBasis::Points | TimedBasis::Aggregate,
            ..
        })) => {
            *set.score_mut(winner) += point_value(input, config.point_multipliers);
        }
        Some(SetFormat::Standard(standard)) => match standard.tiebreak {
            Some(tiebreak)
                if set.side1_score == standard.tiebreak_at()
                    && set.side2_score == standard.tiebreak_at() =>
            {
                play_tiebreak_point(set, winner, &tiebreak);
            }
            _ => play_game_point(set, winner, standard.no_ad),
        },
        Some(SetFormat::Timed(_)) | None => play_game_point(set, winner, false),
    }

    if check_set_completion(match_up, format).is_some() {
        check_match_completion(match_up, format, point.timestamp);
    }
}

fn play_game_point(set: &mut SetScore, winner: usize, no_ad: bool) {
    let loser = 1 - winner;
    let won = set.point_score(winner).unwrap_or(0) + 1;
    let lost = set.point_score(loser).unwrap_or(0);

    let game_over = won >= 4 && (won >= lost + 2 || (no_ad && won > lost));
    if game_over {
        *set.score_mut(winner) += 1;
        *set.point_score_mut(winner) = None;
        *set.point_score_mut(loser) = None;
    } else {
        *set.point_score_mut(winner) = Some(won);
        *set.point_score_mut(loser) = Some(lost);
    }
}

fn play_tiebreak_point(set: &mut SetScore, winner: usize, tiebreak: &TiebreakFormat) {
    let loser = 1 - winner;
    let won = set.tiebreak_score(winner).unwrap_or(0) + 1;
    let lost = set.tiebreak_score(loser).unwrap_or(0);
    *set.tiebreak_score_mut(winner) = Some(won);
    *set.tiebreak_score_mut(loser) = Some(lost);

    if won >= tiebreak.tiebreak_to && won >= lost + tiebreak.win_by() {
        *set.score_mut(winner) += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
