//! Undo and redo.
//!
//! The timeline acts as the undo stack and [`ScoringEngine::redo_stack`]
//! holds what was undone, most recent last. Both directions move entries
//! between the two stacks and then rebuild the record from the timeline.
//!
//! Legacy records with points but no entries are undone point by point;
//! the popped points go onto the redo stack as `point` entries. Redoing
//! upgrades such a record to a full timeline first.

use rally_model::timeline::ScoreEntry;

use crate::engine::ScoringEngine;

impl ScoringEngine {
    /// Undo up to `count` entries. Returns `false` when there was nothing
    /// to undo.
    pub fn undo(&mut self, count: usize) -> bool {
        if !self.can_undo() || count == 0 {
            return false;
        }

        let history = self.match_up.ensure_history();
        if history.entries.is_empty() {
            for _ in 0..count {
                let Some(point) = history.points.pop() else {
                    break;
                };
                let point_index = history.points.len();
                self.redo_stack.push(ScoreEntry::from_point(point, point_index));
            }
        } else {
            for _ in 0..count {
                let Some(entry) = history.entries.pop() else {
                    break;
                };
                if entry.is_point() {
                    history.points.pop();
                }
                self.redo_stack.push(entry);
            }
        }

        self.rebuild();
        tracing::debug!(
            undo_depth = self.get_undo_depth(),
            redo_depth = self.redo_stack.len(),
            "undo"
        );
        true
    }

    /// Reapply up to `count` undone entries. Returns `false` when the redo
    /// stack is empty.
    pub fn redo(&mut self, count: usize) -> bool {
        if self.redo_stack.is_empty() || count == 0 {
            return false;
        }

        self.ensure_timeline();
        let history = self.match_up.ensure_history();
        for _ in 0..count {
            let Some(entry) = self.redo_stack.pop() else {
                break;
            };
            history.entries.push(entry);
        }

        self.rebuild();
        tracing::debug!(
            undo_depth = self.get_undo_depth(),
            redo_depth = self.redo_stack.len(),
            "redo"
        );
        true
    }

    /// `true` when the timeline, or a legacy record's points, is non-empty.
    pub fn can_undo(&self) -> bool {
        self.get_undo_depth() > 0
    }

    /// `true` while undone entries are waiting on the redo stack.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Entries on the timeline, or points for a legacy record.
    pub fn get_undo_depth(&self) -> usize {
        match self.match_up.entries().len() {
            0 => self.match_up.point_count(),
            n => n,
        }
    }

    /// Entries on the redo stack.
    pub fn get_redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use rally_model::matchup::MatchUp;
    use rally_model::point::{add_point, PointConfig, PointInput};

    use super::*;
    use crate::config::EngineConfig;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(EngineConfig {
            match_up_id: Some("h".to_owned()),
            ..Default::default()
        })
    }

    fn point(winner: u8, secs: i64) -> PointInput {
        PointInput::won_by(winner).at(DateTime::from_timestamp(secs, 0).unwrap())
    }

    // -- 1. Exhaustion --------------------------------------------------------

    #[test]
    fn nothing_to_undo_or_redo_on_fresh_engine() {
        let mut e = engine();
        assert!(!e.can_undo());
        assert!(!e.undo(1));
        assert!(!e.redo(1));
        assert_eq!(e.get_undo_depth(), 0);
    }

    // -- 2. Counts ------------------------------------------------------------

    #[test]
    fn undo_more_than_available_stops_at_empty() {
        let mut e = engine();
        e.add_point(point(0, 1));
        e.add_point(point(1, 2));
        assert!(e.undo(10));
        assert_eq!(e.get_point_count(), 0);
        assert_eq!(e.get_redo_depth(), 2);

        assert!(e.redo(1));
        assert_eq!(e.get_point_count(), 1);
        assert_eq!(e.get_state().points()[0].winner, 0);
    }

    // -- 3. Legacy records ----------------------------------------------------

    #[test]
    fn legacy_points_are_undone_and_redone() {
        let mut legacy = MatchUp {
            match_up_id: "legacy".to_owned(),
            match_up_format: "SET3-S:6/TB7".to_owned(),
            ..MatchUp::default()
        };
        legacy.sides[0].side_number = 1;
        legacy.sides[1].side_number = 2;
        for i in 0..5 {
            legacy = add_point(legacy, &point(0, i), &PointConfig::default());
        }
        assert!(legacy.entries().is_empty());

        let mut e = engine();
        e.set_state(legacy);
        assert_eq!(e.get_undo_depth(), 5);

        assert!(e.undo(2));
        assert_eq!(e.get_point_count(), 3);
        assert!(e.get_state().entries().is_empty());
        assert_eq!(e.get_redo_depth(), 2);

        assert!(e.redo(2));
        assert_eq!(e.get_point_count(), 5);
        assert_eq!(e.get_state().entries().len(), 5);
        assert_eq!(e.get_state().entries()[4].point_index(), Some(4));
        assert_eq!(e.get_state().score.sets[0].side1_score, 1);
    }
}
