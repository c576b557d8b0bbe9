//! Set and match completion rules.
//!
//! Both checks are idempotent and only ever *add* a decision: a set or match
//! that already has a winner is left as it is. When the format could not be
//! parsed (`format` is `None`) both are no-ops, so scores keep accumulating
//! but nothing completes.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rally_format::{MatchFormat, SetFormat, StandardSet, TiebreakFormat};

use crate::matchup::{MatchUp, MatchUpStatus, SetScore};

/// Sets won by side 1 and side 2.
pub fn sets_won(sets: &[SetScore]) -> [u32; 2] {
    sets.iter().fold([0, 0], |mut won, set| {
        match set.winning_side {
            Some(1) => won[0] += 1,
            Some(2) => won[1] += 1,
            _ => {}
        }
        won
    })
}

/// Whether the set played after `prior_sets` is the deciding set: both
/// sides are one set short of winning. Exactly-N formats follow the same
/// rule, so a 2-0 lead in `SET3X` plays an ordinary third set.
pub fn is_deciding_set(format: &MatchFormat, prior_sets: &[SetScore]) -> bool {
    let needed = format.sets_to_win().saturating_sub(1);
    let won = sets_won(prior_sets);
    won[0] == needed && won[1] == needed
}

/// The set format in force for the set played after `prior_sets`.
pub fn active_set_format(format: &MatchFormat, prior_sets: &[SetScore]) -> SetFormat {
    match format.final_set_format {
        Some(final_set) if is_deciding_set(format, prior_sets) => final_set,
        _ => format.set_format,
    }
}

/// Decide the last set if its score now satisfies the active set format.
///
/// Returns the set's winning side, whether it was decided just now or
/// earlier. Timed sets are never decided here.
pub fn check_set_completion(match_up: &mut MatchUp, format: Option<&MatchFormat>) -> Option<u8> {
    let format = format?;
    let (current, prior) = match_up.score.sets.split_last_mut()?;
    if current.is_decided() {
        return current.winning_side;
    }

    let winner = match active_set_format(format, prior) {
        SetFormat::TiebreakOnly(tiebreak) => tiebreak_winner(&tiebreak, current),
        SetFormat::Standard(standard) => standard_set_winner(&standard, current),
        SetFormat::Timed(_) => None,
    };

    if winner.is_some() {
        current.winning_side = winner;
    }
    winner
}

/// Complete the match if the decided sets now produce a winner.
///
/// On completion sets `matchUpStatus`, `winningSide`, and `endTime = at`.
/// Returns the winning side, whether decided now or earlier.
pub fn check_match_completion(
    match_up: &mut MatchUp,
    format: Option<&MatchFormat>,
    at: DateTime<Utc>,
) -> Option<u8> {
    let format = format?;
    if match_up.match_up_status == MatchUpStatus::Completed {
        return match_up.winning_side;
    }

    let sets = &match_up.score.sets;
    let winner = if format.is_aggregate() {
        aggregate_winner(format, sets)
    } else {
        sets_winner(format, sets)
    }?;

    match_up.match_up_status = MatchUpStatus::Completed;
    match_up.winning_side = Some(winner);
    match_up.end_time = Some(at);
    Some(winner)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn side_for(ordering: Ordering) -> Option<u8> {
    match ordering {
        Ordering::Greater => Some(1),
        Ordering::Less => Some(2),
        Ordering::Equal => None,
    }
}

fn tiebreak_winner(tiebreak: &TiebreakFormat, set: &SetScore) -> Option<u8> {
    let (a, b) = (set.total(0), set.total(1));
    let (high, low) = (a.max(b), a.min(b));
    if high >= tiebreak.tiebreak_to && high >= low + tiebreak.win_by() {
        side_for(a.cmp(&b))
    } else {
        None
    }
}

fn standard_set_winner(standard: &StandardSet, set: &SetScore) -> Option<u8> {
    let (a, b) = (set.side1_score, set.side2_score);
    let (high, low) = (a.max(b), a.min(b));

    let by_margin = high >= standard.set_to && high >= low + 2;
    let by_tiebreak = standard.tiebreak.is_some()
        && high == standard.tiebreak_at() + 1
        && low == standard.tiebreak_at();

    if by_margin || by_tiebreak {
        side_for(a.cmp(&b))
    } else {
        None
    }
}

fn sets_winner(format: &MatchFormat, sets: &[SetScore]) -> Option<u8> {
    let won = sets_won(sets);
    if won[0].max(won[1]) < format.sets_to_win() {
        return None;
    }
    if let Some(exactly) = format.exactly {
        if won[0] + won[1] != exactly {
            return None;
        }
    }
    side_for(won[0].cmp(&won[1]))
}

/// Totals across all sets once the required number of sets is decided.
/// Equal totals leave the match undecided.
fn aggregate_winner(format: &MatchFormat, sets: &[SetScore]) -> Option<u8> {
    let decided = sets.iter().filter(|s| s.is_decided()).count() as u32;
    if decided < format.set_count() {
        return None;
    }
    let totals = sets
        .iter()
        .fold([0u32, 0u32], |t, s| [t[0] + s.total(0), t[1] + s.total(1)]);
    side_for(totals[0].cmp(&totals[1]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
