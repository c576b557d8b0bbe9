//! Read-only views over a [`MatchUp`].
//!
//! Nothing here mutates the record. Side 1 is the default perspective;
//! [`ScoreboardOptions::perspective`] flips every pair for side 2.

use serde::{Deserialize, Serialize};

use crate::matchup::{MatchUp, MatchUpStatus, SetScore};

/// Derived score of a matchUp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub sets: Vec<SetScore>,
    /// e.g. `6-3 4-6 7-6(5)`; tiebreak-only sets render as `[10-8]`.
    pub score_string: String,
    /// Current game, e.g. `30-15`, `A-40`, or tiebreak digits `5-4`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_score: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreboardOptions {
    /// Side whose score is written first (1 or 2).
    pub perspective: u8,
    pub include_points: bool,
}

impl Default for ScoreboardOptions {
    fn default() -> Self {
        Self {
            perspective: 1,
            include_points: true,
        }
    }
}

pub fn get_score(match_up: &MatchUp) -> Score {
    let sets = &match_up.score.sets;
    Score {
        sets: sets.clone(),
        score_string: score_string(sets, false),
        point_score: current_point_score(match_up, false),
    }
}

/// One-line scoreboard, e.g. `6-3 2-1 30-15`.
pub fn get_scoreboard(match_up: &MatchUp, options: &ScoreboardOptions) -> String {
    let flip = options.perspective == 2;
    let mut board = score_string(&match_up.score.sets, flip);
    if options.include_points {
        if let Some(points) = current_point_score(match_up, flip) {
            if !board.is_empty() {
                board.push(' ');
            }
            board.push_str(&points);
        }
    }
    board
}

pub fn get_winner(match_up: &MatchUp) -> Option<u8> {
    match_up.winning_side
}

pub fn is_complete(match_up: &MatchUp) -> bool {
    match_up.match_up_status == MatchUpStatus::Completed
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn ordered(pair: (u32, u32), flip: bool) -> (u32, u32) {
    if flip {
        (pair.1, pair.0)
    } else {
        pair
    }
}

/// A set with tiebreak points but no games is a match tiebreak.
fn is_tiebreak_only(set: &SetScore) -> bool {
    set.side1_score == 0
        && set.side2_score == 0
        && (set.side1_tiebreak_score.is_some() || set.side2_tiebreak_score.is_some())
}

fn format_set(set: &SetScore, flip: bool) -> String {
    if is_tiebreak_only(set) {
        let (a, b) = ordered((set.total(0), set.total(1)), flip);
        return format!("[{a}-{b}]");
    }

    let (a, b) = ordered((set.side1_score, set.side2_score), flip);
    let loser_tiebreak = match set.winning_side {
        Some(1) => set.side2_tiebreak_score,
        Some(2) => set.side1_tiebreak_score,
        _ => None,
    };
    match loser_tiebreak {
        Some(tiebreak) => format!("{a}-{b}({tiebreak})"),
        None => format!("{a}-{b}"),
    }
}

fn score_string(sets: &[SetScore], flip: bool) -> String {
    sets.iter()
        .map(|set| format_set(set, flip))
        .collect::<Vec<_>>()
        .join(" ")
}

fn game_label(points: u32) -> &'static str {
    match points {
        0 => "0",
        1 => "15",
        2 => "30",
        _ => "40",
    }
}

fn current_point_score(match_up: &MatchUp, flip: bool) -> Option<String> {
    if is_complete(match_up) {
        return None;
    }
    let set = match_up.score.sets.last().filter(|s| !s.is_decided())?;

    if set.side1_point_score.is_some() || set.side2_point_score.is_some() {
        let pair = (
            set.side1_point_score.unwrap_or(0),
            set.side2_point_score.unwrap_or(0),
        );
        let (a, b) = ordered(pair, flip);
        let label = if a >= 3 && b >= 3 {
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => "40-40".to_owned(),
                std::cmp::Ordering::Greater => "A-40".to_owned(),
                std::cmp::Ordering::Less => "40-A".to_owned(),
            }
        } else {
            format!("{}-{}", game_label(a), game_label(b))
        };
        return Some(label);
    }

    if set.side1_tiebreak_score.is_some() || set.side2_tiebreak_score.is_some() {
        let (a, b) = ordered((set.total(0), set.total(1)), flip);
        return Some(format!("{a}-{b}"));
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
