//! Forward scoring operations.
//!
//! Each operation applies its effect to the record and appends exactly one
//! [`ScoreEntry`] whose `data` reproduces the call (including inferred
//! fields). The `apply_*` functions hold the effect alone and are shared
//! with [`rebuild`](crate::rebuild), which replays entries without logging
//! them again.
//!
//! All operations except [`end_segment`](ScoringEngine::end_segment) clear
//! the redo stack.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rally_format::MatchFormat;
use rally_model::completion::{check_match_completion, check_set_completion};
use rally_model::matchup::{MatchUp, MatchUpStatus, SetScore};
use rally_model::point::{self, PointConfig, PointInput};
use rally_model::timeline::{EndSegment, GameInput, InitialScore, ScoreEntry, SetScoreInput};

use crate::engine::ScoringEngine;

// ---------------------------------------------------------------------------
// Apply functions
// ---------------------------------------------------------------------------

fn set_from_input(set_number: u32, input: &SetScoreInput, winning_side: Option<u8>) -> SetScore {
    SetScore {
        side1_score: input.side1_score,
        side2_score: input.side2_score,
        side1_tiebreak_score: input.side1_tiebreak_score,
        side2_tiebreak_score: input.side2_tiebreak_score,
        winning_side,
        ..SetScore::new(set_number)
    }
}

/// Append a whole set. Returns the set's winning side.
pub fn apply_set(
    match_up: &mut MatchUp,
    format: Option<&MatchFormat>,
    data: &SetScoreInput,
    at: DateTime<Utc>,
) -> Option<u8> {
    let winning_side = data.inferred_winning_side();
    let set_number = match_up.score.sets.len() as u32 + 1;
    match_up
        .score
        .sets
        .push(set_from_input(set_number, data, winning_side));
    match_up.mark_in_progress();

    if winning_side.is_some() {
        check_match_completion(match_up, format, at);
    }
    winning_side
}

/// Award one game to `data.winner` in the open set.
///
/// Ignored when the match is completed or the winner index is invalid.
pub fn apply_game(
    match_up: &mut MatchUp,
    format: Option<&MatchFormat>,
    data: &GameInput,
    at: DateTime<Utc>,
) -> bool {
    if match_up.match_up_status == MatchUpStatus::Completed || data.winner > 1 {
        return false;
    }

    let index = match_up.open_set();
    let set = &mut match_up.score.sets[index];
    *set.score_mut(usize::from(data.winner)) += 1;
    if data.side1_tiebreak_score.is_some() || data.side2_tiebreak_score.is_some() {
        set.side1_tiebreak_score = data.side1_tiebreak_score;
        set.side2_tiebreak_score = data.side2_tiebreak_score;
    }
    set.side1_point_score = None;
    set.side2_point_score = None;
    match_up.mark_in_progress();

    if check_set_completion(match_up, format).is_some() {
        check_match_completion(match_up, format, at);
    }
    true
}

/// Finalize a timed segment: the set numbered `set_number`, else the last
/// set. Strictly greater score wins; a tie leaves the set undecided.
///
/// Returns the resolved set number, `None` when there is no such set.
pub fn apply_end_segment(
    match_up: &mut MatchUp,
    format: Option<&MatchFormat>,
    set_number: Option<u32>,
    at: DateTime<Utc>,
) -> Option<u32> {
    let sets = &mut match_up.score.sets;
    let set = match set_number {
        Some(n) => sets.iter_mut().find(|s| s.set_number == n),
        None => sets.last_mut(),
    }?;

    if !set.is_decided() {
        set.winning_side = match set.side1_score.cmp(&set.side2_score) {
            Ordering::Greater => Some(1),
            Ordering::Less => Some(2),
            Ordering::Equal => None,
        };
    }
    let resolved = set.set_number;

    check_match_completion(match_up, format, at);
    Some(resolved)
}

/// Overwrite the score with sets already played before scoring began.
pub fn apply_initial_score(match_up: &mut MatchUp, data: &InitialScore) {
    let mut sets: Vec<SetScore> = data
        .sets
        .iter()
        .enumerate()
        .map(|(i, input)| set_from_input(i as u32 + 1, input, input.inferred_winning_side()))
        .collect();
    if let Some(current) = &data.current_set_score {
        sets.push(set_from_input(sets.len() as u32 + 1, current, None));
    }
    match_up.score.sets = sets;
    match_up.mark_in_progress();
}

// ---------------------------------------------------------------------------
// ScoringEngine operations
// ---------------------------------------------------------------------------

impl ScoringEngine {
    /// Score one point.
    ///
    /// The active players are captured from the lineups before the point is
    /// played and attached to the recorded point along with its penalty type.
    /// Ignored when the match is completed or `winner` is not 0 or 1.
    pub fn add_point(&mut self, input: PointInput) {
        if self.match_up.match_up_status == MatchUpStatus::Completed || input.winner > 1 {
            tracing::debug!(
                winner = input.winner,
                status = ?self.match_up.match_up_status,
                "add_point: ignored"
            );
            return;
        }
        self.ensure_timeline();

        let timestamp = input.timestamp.unwrap_or_else(Utc::now);
        let input = PointInput {
            timestamp: Some(timestamp),
            ..input
        };
        let active_players = self.active_players_snapshot();
        let point_index = self.match_up.point_count();

        let config = PointConfig {
            point_multipliers: &self.point_multipliers,
        };
        self.match_up = point::add_point(std::mem::take(&mut self.match_up), &input, &config);

        let history = self.match_up.ensure_history();
        if let Some(recorded) = history.points.last_mut() {
            recorded.active_players = active_players;
            recorded.penalty_type = input.penalty_type.clone();
            let data = recorded.clone();
            history.entries.push(ScoreEntry::Point {
                data,
                point_index,
                timestamp,
            });
        }
        self.clear_redo();
    }

    /// Record a whole set. The winning side is inferred from the scores when
    /// not given, and logged in its resolved form.
    pub fn add_set(&mut self, input: SetScoreInput, timestamp: Option<DateTime<Utc>>) {
        self.ensure_timeline();
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let data = SetScoreInput {
            winning_side: input.inferred_winning_side(),
            ..input
        };

        apply_set(&mut self.match_up, self.format.as_ref(), &data, timestamp);
        self.match_up
            .ensure_history()
            .entries
            .push(ScoreEntry::Set { data, timestamp });
        self.clear_redo();
    }

    /// Record one whole game.
    pub fn add_game(&mut self, input: GameInput, timestamp: Option<DateTime<Utc>>) {
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        self.ensure_timeline();
        if !apply_game(&mut self.match_up, self.format.as_ref(), &input, timestamp) {
            tracing::debug!(winner = input.winner, "add_game: ignored");
            return;
        }
        self.match_up.ensure_history().entries.push(ScoreEntry::Game {
            data: input,
            timestamp,
        });
        self.clear_redo();
    }

    /// End the timed segment for `set_number`, or the last set.
    ///
    /// Leaves the redo stack alone: segment ends come from the clock rather
    /// than from the scorer.
    pub fn end_segment(&mut self, set_number: Option<u32>, timestamp: Option<DateTime<Utc>>) {
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        self.ensure_timeline();
        let Some(set_number) =
            apply_end_segment(&mut self.match_up, self.format.as_ref(), set_number, timestamp)
        else {
            tracing::debug!(?set_number, "end_segment: no such set");
            return;
        };
        self.match_up.ensure_history().entries.push(ScoreEntry::EndSegment {
            data: EndSegment { set_number },
            timestamp,
        });
    }

    /// Load the score of a match joined mid-way.
    ///
    /// Only accepted before anything else has been recorded, which keeps the
    /// entry first in the timeline.
    pub fn set_initial_score(&mut self, data: InitialScore, timestamp: Option<DateTime<Utc>>) {
        if !self.match_up.entries().is_empty() || self.match_up.point_count() > 0 {
            tracing::warn!(
                entries = self.match_up.entries().len(),
                "set_initial_score: timeline already started -- ignored"
            );
            return;
        }
        let timestamp = timestamp.unwrap_or_else(Utc::now);

        apply_initial_score(&mut self.match_up, &data);
        self.match_up
            .ensure_history()
            .entries
            .push(ScoreEntry::SetInitialScore { data, timestamp });
        self.clear_redo();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
