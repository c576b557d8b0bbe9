//! Rebuild: regenerate a record by folding its timeline over a baseline.
//!
//! ```text
//! rebuild(baseline, entries) = entries.fold(baseline + initial score, apply_entry)
//! ```
//!
//! The fold is pure. The timeline is copied into the new record verbatim;
//! only its effects are recomputed. Recorded points replace the ones the
//! point mutator produces, so edit annotations and active players survive.
//! Completion times come from entry timestamps, so two rebuilds of the same
//! timeline are deep-equal.

use rally_format::MatchFormat;
use rally_model::matchup::{create_match_up, CreateMatchUp, LineUpMember, MatchUp};
use rally_model::point::{self, Point, PointConfig};
use rally_model::timeline::{History, ScoreEntry, SubstitutionEvent};

use crate::mutation::{apply_end_segment, apply_game, apply_initial_score, apply_set};

/// A fresh record with the same identity, format, participants, and the
/// initial lineups of `template`.
pub fn baseline(template: &MatchUp, initial_line_ups: &[Option<Vec<LineUpMember>>; 2]) -> MatchUp {
    let mut fresh = create_match_up(&CreateMatchUp {
        match_up_format: template.match_up_format.clone(),
        match_up_id: Some(template.match_up_id.clone()),
        is_doubles: template.is_doubles(),
    });
    for ((side, source), line_up) in fresh
        .sides
        .iter_mut()
        .zip(&template.sides)
        .zip(initial_line_ups)
    {
        side.participant_id = source.participant_id.clone();
        side.line_up = line_up.clone();
    }
    fresh
}

/// Fold `entries` over `baseline`.
///
/// The latest `setInitialScore` entry is applied before anything else.
pub fn rebuild(
    mut baseline: MatchUp,
    entries: &[ScoreEntry],
    format: Option<&MatchFormat>,
    config: &PointConfig<'_>,
) -> MatchUp {
    let initial = entries.iter().rev().find_map(|e| match e {
        ScoreEntry::SetInitialScore { data, .. } => Some(data),
        _ => None,
    });
    if let Some(initial) = initial {
        apply_initial_score(&mut baseline, initial);
    }

    baseline.history = Some(History {
        points: Vec::new(),
        entries: entries.to_vec(),
        substitutions: None,
    });

    let rebuilt = entries
        .iter()
        .fold(baseline, |match_up, entry| apply_entry(match_up, entry, format, config));

    tracing::debug!(
        entries = entries.len(),
        points = rebuilt.point_count(),
        status = ?rebuilt.match_up_status,
        "rebuild: replayed timeline"
    );
    rebuilt
}

/// Fold a legacy points-only history. The result has no entries.
pub fn rebuild_from_points(baseline: MatchUp, points: &[Point], config: &PointConfig<'_>) -> MatchUp {
    let rebuilt = points
        .iter()
        .fold(baseline, |match_up, recorded| replay_point(match_up, recorded, config));

    tracing::debug!(points = points.len(), "rebuild: replayed legacy points");
    rebuilt
}

/// Apply the effect of one entry without logging it.
pub fn apply_entry(
    mut match_up: MatchUp,
    entry: &ScoreEntry,
    format: Option<&MatchFormat>,
    config: &PointConfig<'_>,
) -> MatchUp {
    match entry {
        ScoreEntry::Point { data, .. } => return replay_point(match_up, data, config),
        ScoreEntry::Set { data, timestamp } => {
            apply_set(&mut match_up, format, data, *timestamp);
        }
        ScoreEntry::Game { data, timestamp } => {
            apply_game(&mut match_up, format, data, *timestamp);
        }
        ScoreEntry::EndSegment { data, timestamp } => {
            apply_end_segment(&mut match_up, format, Some(data.set_number), *timestamp);
        }
        ScoreEntry::Substitution { data, .. } => {
            apply_substitution(&mut match_up, data);
        }
        // Applied up front.
        ScoreEntry::SetInitialScore { .. } => {}
    }
    match_up
}

fn replay_point(match_up: MatchUp, recorded: &Point, config: &PointConfig<'_>) -> MatchUp {
    let mut match_up = point::add_point(match_up, &recorded.to_input(), config);
    if let Some(last) = match_up.history.as_mut().and_then(|h| h.points.last_mut()) {
        *last = recorded.clone();
    }
    match_up
}

/// Swap the outgoing participant for the incoming one in place and record
/// the event. Returns `false` when the side has no lineup or the outgoing
/// participant is not in it.
pub fn apply_substitution(match_up: &mut MatchUp, event: &SubstitutionEvent) -> bool {
    let member = match_up
        .side_mut(event.side_number)
        .and_then(|side| side.line_up.as_mut())
        .and_then(|line_up| {
            line_up
                .iter_mut()
                .find(|m| m.participant_id == event.out_participant_id)
        });
    let Some(member) = member else {
        return false;
    };
    member.participant_id = event.in_participant_id.clone();

    match_up
        .ensure_history()
        .substitutions
        .get_or_insert_with(Vec::new)
        .push(event.clone());
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rally_model::matchup::MatchUpStatus;
    use rally_model::point::PointInput;
    use rally_model::timeline::{EndSegment, GameInput, InitialScore, SetScoreInput};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn fresh(format: &str) -> MatchUp {
        create_match_up(&CreateMatchUp {
            match_up_format: format.to_owned(),
            match_up_id: Some("r".to_owned()),
            is_doubles: false,
        })
    }

    fn point_entry(winner: u8, index: usize) -> ScoreEntry {
        let point = Point::from_input(&PointInput::won_by(winner), at(index as i64));
        ScoreEntry::from_point(point, index)
    }

    fn run(format: &str, entries: &[ScoreEntry]) -> MatchUp {
        let parsed = rally_format::parse_format(format).ok();
        rebuild(fresh(format), entries, parsed.as_ref(), &PointConfig::default())
    }

    // -- 1. Fold --------------------------------------------------------------

    #[test]
    fn rebuild_is_idempotent() {
        let entries: Vec<ScoreEntry> = (0..9).map(|i| point_entry((i % 3 == 0) as u8, i)).collect();
        let first = run("SET3-S:6/TB7", &entries);
        let second = run("SET3-S:6/TB7", first.entries());
        assert_eq!(first, second);
        assert_eq!(first.point_count(), 9);
        assert_eq!(first.entries(), entries.as_slice());
    }

    #[test]
    fn mixed_granularity_replays_in_order() {
        let entries = vec![
            ScoreEntry::Set {
                data: SetScoreInput {
                    winning_side: Some(1),
                    ..SetScoreInput::new(6, 2)
                },
                timestamp: at(1),
            },
            ScoreEntry::Game {
                data: GameInput::won_by(1),
                timestamp: at(2),
            },
            point_entry(0, 0),
        ];
        let rebuilt = run("SET3-S:6/TB7", &entries);
        let sets = &rebuilt.score.sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].winning_side, Some(1));
        assert_eq!(sets[1].side2_score, 1);
        assert_eq!(sets[1].side1_point_score, Some(1));
    }

    // -- 2. Initial score -----------------------------------------------------

    #[test]
    fn initial_score_applies_before_other_entries() {
        let entries = vec![
            ScoreEntry::SetInitialScore {
                data: InitialScore {
                    sets: vec![SetScoreInput::new(6, 4)],
                    current_set_score: Some(SetScoreInput::new(5, 0)),
                },
                timestamp: at(0),
            },
            ScoreEntry::Game {
                data: GameInput::won_by(0),
                timestamp: at(9),
            },
        ];
        let rebuilt = run("SET3-S:6/TB7", &entries);
        assert_eq!(rebuilt.match_up_status, MatchUpStatus::Completed);
        assert_eq!(rebuilt.winning_side, Some(1));
        assert_eq!(rebuilt.end_time, Some(at(9)));
    }

    // -- 3. Timed segments ----------------------------------------------------

    #[test]
    fn end_segment_entries_close_timed_sets() {
        let entries = vec![
            point_entry(1, 0),
            ScoreEntry::EndSegment {
                data: EndSegment { set_number: 1 },
                timestamp: at(5),
            },
        ];
        let rebuilt = run("SET1-S:T10P", &entries);
        assert_eq!(rebuilt.score.sets[0].winning_side, Some(2));
        assert_eq!(rebuilt.winning_side, Some(2));
    }

    // -- 4. Recorded points survive -------------------------------------------

    #[test]
    fn recorded_point_annotations_are_preserved() {
        let mut point = Point::from_input(&PointInput::won_by(0), at(0));
        point.wrong_server = Some(true);
        point.active_players = Some([vec!["a".to_owned()], vec!["b".to_owned()]]);
        let rebuilt = run("SET3-S:6/TB7", &[ScoreEntry::from_point(point.clone(), 0)]);
        assert_eq!(rebuilt.points()[0], point);
    }

    // -- 5. Legacy points -----------------------------------------------------

    #[test]
    fn legacy_points_rebuild_without_entries() {
        let points: Vec<Point> = (0..4)
            .map(|i| Point::from_input(&PointInput::won_by(1), at(i)))
            .collect();
        let rebuilt = rebuild_from_points(fresh("SET3-S:6/TB7"), &points, &PointConfig::default());
        assert!(rebuilt.entries().is_empty());
        assert_eq!(rebuilt.points(), points.as_slice());
        assert_eq!(rebuilt.score.sets[0].side2_score, 1);
    }

    // -- 6. Substitutions -----------------------------------------------------

    #[test]
    fn substitution_requires_member_in_line_up() {
        let mut match_up = fresh("SET1-S:6");
        let event = SubstitutionEvent {
            side_number: 1,
            out_participant_id: "a".to_owned(),
            in_participant_id: "c".to_owned(),
            before_point_index: 0,
            timestamp: at(0),
        };
        assert!(!apply_substitution(&mut match_up, &event));
        assert!(match_up.substitutions().is_none());

        match_up.sides[0].line_up = Some(vec![LineUpMember::new("a")]);
        assert!(apply_substitution(&mut match_up, &event));
        assert_eq!(match_up.sides[0].line_up.as_ref().unwrap()[0].participant_id, "c");
        assert_eq!(match_up.substitutions().map(<[_]>::len), Some(1));
    }
}
