//! End-to-end scoring scenarios driven through the public engine API.

use chrono::{DateTime, Utc};
use rally_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn engine(format: &str) -> ScoringEngine {
    ScoringEngine::new(EngineConfig {
        match_up_format: Some(format.to_owned()),
        match_up_id: Some("scenario".to_owned()),
        ..Default::default()
    })
}

/// Points for one side with alternating servers, stamped from `clock`.
fn feed(engine: &mut ScoringEngine, winner: u8, count: usize, clock: &mut i64) {
    for i in 0..count {
        *clock += 1;
        engine.add_point(
            PointInput::won_by(winner)
                .with_server((i % 2) as u8)
                .at(at(*clock)),
        );
    }
}

// ---------------------------------------------------------------------------
// Scenario A: straight-sets win on points
// ---------------------------------------------------------------------------

#[test]
fn straight_sets_on_points_complete_the_match() {
    let mut e = engine("SET3-S:6/TB7");
    let mut clock = 0;

    // 6 games of 4 points each per set, two sets.
    feed(&mut e, 0, 4 * 6, &mut clock);
    {
        let sets = &e.get_state().score.sets;
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].winning_side, Some(1));
        assert!(!e.is_complete());
    }

    feed(&mut e, 0, 4 * 6, &mut clock);
    assert!(e.is_complete());
    assert_eq!(e.get_winner(), Some(1));
    assert_eq!(e.get_state().match_up_status, MatchUpStatus::Completed);
    assert_eq!(e.get_state().end_time, Some(at(clock)));
    assert_eq!(e.get_score().score_string, "6-0 6-0");
    assert_eq!(e.get_point_count(), 48);
}

// ---------------------------------------------------------------------------
// Scenario B: sets entered whole
// ---------------------------------------------------------------------------

#[test]
fn three_whole_sets_decide_the_match() {
    let mut e = engine("SET3-S:6/TB7");
    e.add_set(SetScoreInput::new(6, 3), Some(at(1)));
    e.add_set(SetScoreInput::new(4, 6), Some(at(2)));
    assert!(!e.is_complete());

    e.add_set(SetScoreInput::new(7, 5), Some(at(3)));
    assert!(e.is_complete());
    assert_eq!(e.get_state().winning_side, Some(1));
    assert_eq!(e.get_input_mode(), InputMode::Sets);
    assert_eq!(e.get_state().end_time, Some(at(3)));
}

// ---------------------------------------------------------------------------
// Scenario C: undo and redo several points
// ---------------------------------------------------------------------------

#[test]
fn undo_two_then_redo_two_restores_score() {
    let mut e = engine("SET3-S:6/TB7");
    let mut clock = 0;
    feed(&mut e, 0, 3, &mut clock);
    feed(&mut e, 1, 2, &mut clock);
    let before = e.get_score();

    assert!(e.undo(2));
    assert_eq!(e.get_point_count(), 3);
    assert_eq!(e.get_redo_depth(), 2);

    assert!(e.redo(2));
    assert_eq!(e.get_point_count(), 5);
    assert_eq!(e.get_score(), before);
}

// ---------------------------------------------------------------------------
// Scenario D: substitution without a lineup
// ---------------------------------------------------------------------------

#[test]
fn substitution_without_line_up_is_a_no_op() {
    let mut e = engine("SET3-S:6/TB7");
    e.substitute(SubstituteOptions::new(1, "X", "Y"));
    assert!(e.get_state().substitutions().is_none());
    assert!(e.get_state().entries().is_empty());
    assert!(!e.can_undo());
}

// ---------------------------------------------------------------------------
// Scenario E: joining mid-match
// ---------------------------------------------------------------------------

#[test]
fn initial_score_starts_match_in_progress() {
    let mut e = engine("SET3-S:6/TB7");
    e.set_initial_score(
        InitialScore {
            sets: vec![SetScoreInput::new(6, 4)],
            current_set_score: Some(SetScoreInput::new(2, 1)),
        },
        None,
    );

    let state = e.get_state();
    assert_eq!(state.match_up_status, MatchUpStatus::InProgress);
    assert_eq!(state.score.sets.len(), 2);
    assert_eq!(state.score.sets[0].winning_side, Some(1));
    assert_eq!(state.score.sets[1].winning_side, None);
    assert_eq!(e.get_score().score_string, "6-4 2-1");

    // Games continue in the open set and survive a rebuild.
    e.add_game(GameInput::won_by(1), None);
    e.undo(1);
    e.redo(1);
    assert_eq!(e.get_state().score.sets[1].side2_score, 2);
    assert_eq!(e.get_state().score.sets.len(), 2);
}

// ---------------------------------------------------------------------------
// Format variations
// ---------------------------------------------------------------------------

#[test]
fn final_set_match_tiebreak() {
    let mut e = engine("SET3-S:6/TB7-F:TB10");
    e.add_set(SetScoreInput::new(6, 4), None);
    e.add_set(SetScoreInput::new(3, 6), None);

    let mut clock = 0;
    feed(&mut e, 1, 9, &mut clock);
    feed(&mut e, 0, 9, &mut clock);
    assert!(!e.is_complete());
    assert_eq!(e.get_score().point_score.as_deref(), Some("9-9"));

    feed(&mut e, 0, 2, &mut clock);
    assert!(e.is_complete());
    assert_eq!(e.get_winner(), Some(1));
    assert_eq!(e.get_score().score_string, "6-4 3-6 [11-9]");
}

#[test]
fn exactly_three_sets_after_two_nil_plays_ordinary_third_set() {
    let mut e = engine("SET3X-S:6/TB7-F:TB10");
    e.add_set(SetScoreInput::new(6, 0), Some(at(1)));
    e.add_set(SetScoreInput::new(6, 0), Some(at(2)));
    assert!(!e.is_complete());

    let mut clock = 10;
    feed(&mut e, 0, 4, &mut clock);
    let third = &e.get_state().score.sets[2];
    assert_eq!((third.side1_score, third.side2_score), (1, 0));
    assert_eq!(third.side1_tiebreak_score, None);
    assert!(!e.is_complete());
}

#[test]
fn aggregate_timed_segments_sum_points() {
    let mut e = engine("SET2X-S:T10A");
    let mut clock = 0;
    feed(&mut e, 0, 5, &mut clock);
    feed(&mut e, 1, 2, &mut clock);
    e.end_segment(None, Some(at(100)));
    assert!(!e.is_complete());

    feed(&mut e, 1, 4, &mut clock);
    e.end_segment(None, Some(at(200)));

    // 5-2 then 0-4: totals are 5 against 6.
    assert!(e.is_complete());
    assert_eq!(e.get_winner(), Some(2));
    assert_eq!(e.get_state().end_time, Some(at(200)));
}

#[test]
fn point_multipliers_from_competition_format() {
    let mut e = ScoringEngine::new(EngineConfig {
        competition_format: Some(CompetitionFormat {
            match_up_format: Some("SET1-S:T20P".to_owned()),
            point_multipliers: Some(vec![PointMultiplier {
                results: vec!["Ace".to_owned()],
                penalty_types: vec!["DELAY".to_owned()],
                value: 3,
            }]),
            ..Default::default()
        }),
        ..Default::default()
    });
    assert_eq!(e.get_format(), "SET1-S:T20P");
    assert!(e.get_competition_format().is_some());

    e.add_point(PointInput {
        result: Some("Ace".to_owned()),
        ..PointInput::won_by(0)
    });
    e.add_point(PointInput {
        penalty_type: Some("DELAY".to_owned()),
        ..PointInput::won_by(1)
    });
    e.add_point(PointInput::won_by(1));
    let set = &e.get_state().score.sets[0];
    assert_eq!((set.side1_score, set.side2_score), (3, 4));

    // Multipliers apply again on rebuild.
    e.undo(1);
    let set = &e.get_state().score.sets[0];
    assert_eq!((set.side1_score, set.side2_score), (3, 3));
}

#[test]
fn invalid_format_never_completes() {
    let mut e = engine("garbage");
    let mut clock = 0;
    feed(&mut e, 0, 4 * 30, &mut clock);
    assert!(!e.is_complete());
    assert_eq!(e.get_state().score.sets[0].side1_score, 30);
    assert_eq!(e.get_state().match_up_status, MatchUpStatus::InProgress);
}

#[test]
fn scoreboard_from_either_side() {
    let mut e = engine("SET3-S:6/TB7");
    e.add_set(SetScoreInput::new(6, 2), None);
    e.add_game(GameInput::won_by(1), None);
    let mut clock = 0;
    feed(&mut e, 1, 2, &mut clock);

    assert_eq!(e.get_scoreboard(&ScoreboardOptions::default()), "6-2 0-1 0-30");
    let flipped = ScoreboardOptions {
        perspective: 2,
        include_points: true,
    };
    assert_eq!(e.get_scoreboard(&flipped), "2-6 1-0 30-0");
}
