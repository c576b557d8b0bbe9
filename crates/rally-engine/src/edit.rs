//! Targeted changes to points already recorded.
//!
//! [`decorate_point`](ScoringEngine::decorate_point) only annotates.
//! [`edit_point`](ScoringEngine::edit_point) may change who won or served
//! and then rebuilds the record, unless told not to. Skipping the rebuild
//! leaves the score out of step with the edited points until the next
//! rebuild; that is the caller's call to make.
//!
//! Out-of-range indices are ignored.

use rally_model::point::Point;
use rally_model::timeline::ScoreEntry;
use serde::{Deserialize, Serialize};

use crate::engine::ScoringEngine;

/// Annotations for [`ScoringEngine::decorate_point`]. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointDecoration {
    pub rally_length: Option<u32>,
    pub result: Option<String>,
    pub penalty_type: Option<String>,
    pub wrong_side: Option<bool>,
    pub wrong_server: Option<bool>,
    pub penalty_point: Option<bool>,
}

/// New data for [`ScoringEngine::edit_point`]. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointEdit {
    pub winner: Option<u8>,
    pub server: Option<u8>,
    #[serde(flatten)]
    pub decoration: PointDecoration,
}

/// Target of [`ScoringEngine::mark_hard_boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkHardBoundary {
    /// Zero-based index into `score.sets`.
    pub set_index: usize,
    pub game_index: u32,
}

impl PointDecoration {
    fn apply_to(&self, point: &mut Point) {
        if let Some(rally_length) = self.rally_length {
            point.rally_length = Some(rally_length);
        }
        if let Some(result) = &self.result {
            point.result = Some(result.clone());
        }
        if let Some(penalty_type) = &self.penalty_type {
            point.penalty_type = Some(penalty_type.clone());
        }
        if let Some(wrong_side) = self.wrong_side {
            point.wrong_side = Some(wrong_side);
        }
        if let Some(wrong_server) = self.wrong_server {
            point.wrong_server = Some(wrong_server);
        }
        if let Some(penalty_point) = self.penalty_point {
            point.penalty_point = Some(penalty_point);
        }
    }
}

impl ScoringEngine {
    /// Annotate the point at `index`. The score is not recomputed.
    pub fn decorate_point(&mut self, index: usize, decoration: &PointDecoration) {
        self.update_point(index, |point| decoration.apply_to(point));
    }

    /// Change the point at `index`, then rebuild when `recalculate` is set.
    ///
    /// A rebuild also clears the redo stack.
    pub fn edit_point(&mut self, index: usize, edit: &PointEdit, recalculate: bool) {
        let found = self.update_point(index, |point| {
            if let Some(winner) = edit.winner {
                point.winner = winner;
            }
            if let Some(server) = edit.server {
                point.server = Some(server);
            }
            edit.decoration.apply_to(point);
        });

        if found && recalculate {
            self.rebuild();
            self.clear_redo();
        }
    }

    /// Stop recalculation from cascading past `game_index` of a set.
    ///
    /// The mark is kept by the engine as well, so it comes back when the set
    /// is undone and then redone.
    pub fn mark_hard_boundary(&mut self, mark: MarkHardBoundary) {
        match self.match_up.score.sets.get_mut(mark.set_index) {
            Some(set) => {
                set.hard_boundaries.insert(mark.game_index);
                self.marked_boundaries
                    .entry(mark.set_index)
                    .or_default()
                    .insert(mark.game_index);
            }
            None => tracing::debug!(set_index = mark.set_index, "mark_hard_boundary: no such set"),
        }
    }

    /// Apply `change` to the point and mirror it into its `point` entry.
    fn update_point(&mut self, index: usize, change: impl FnOnce(&mut Point)) -> bool {
        let Some(history) = self.match_up.history.as_mut() else {
            return false;
        };
        let Some(point) = history.points.get_mut(index) else {
            tracing::debug!(index, "update_point: index out of range");
            return false;
        };
        change(point);

        let updated = point.clone();
        let entry = history
            .entries
            .iter_mut()
            .find(|e| e.point_index() == Some(index));
        if let Some(ScoreEntry::Point { data, .. }) = entry {
            *data = updated;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rally_model::point::PointInput;

    fn engine_with_points(winners: &[u8]) -> ScoringEngine {
        let mut e = ScoringEngine::new(EngineConfig {
            match_up_format: Some("SET3-S:6/TB7".to_owned()),
            ..Default::default()
        });
        for w in winners {
            e.add_point(PointInput::won_by(*w));
        }
        e
    }

    #[test]
    fn decorate_annotates_point_and_entry() {
        let mut e = engine_with_points(&[0, 1]);
        let decoration = PointDecoration {
            rally_length: Some(12),
            wrong_side: Some(true),
            ..Default::default()
        };
        e.decorate_point(1, &decoration);

        assert_eq!(e.get_state().points()[1].rally_length, Some(12));
        match &e.get_state().entries()[1] {
            ScoreEntry::Point { data, .. } => assert_eq!(data.wrong_side, Some(true)),
            other => panic!("unexpected entry {other:?}"),
        }
        e.decorate_point(9, &decoration);
    }

    #[test]
    fn edit_point_rebuilds_score() {
        let mut e = engine_with_points(&[0, 0, 0, 1]);
        assert_eq!(e.get_score().point_score.as_deref(), Some("40-15"));

        let edit = PointEdit {
            winner: Some(0),
            ..Default::default()
        };
        e.edit_point(3, &edit, true);
        let set = &e.get_state().score.sets[0];
        assert_eq!(set.side1_score, 1);
        assert_eq!(e.get_state().points().len(), 4);
    }

    #[test]
    fn edit_without_recalculation_leaves_score() {
        let mut e = engine_with_points(&[0, 0, 0, 1]);
        e.undo(1);
        e.redo(1);
        e.undo(1);
        let edit = PointEdit {
            winner: Some(1),
            ..Default::default()
        };
        e.edit_point(0, &edit, false);
        assert_eq!(e.get_state().points()[0].winner, 1);
        assert_eq!(e.get_state().score.sets[0].side1_point_score, Some(3));
        assert_eq!(e.get_redo_depth(), 1);

        e.edit_point(0, &edit, true);
        assert_eq!(e.get_redo_depth(), 0);
        assert_eq!(e.get_state().score.sets[0].side1_point_score, Some(2));
    }

    #[test]
    fn hard_boundaries_survive_rebuild() {
        let mut e = engine_with_points(&[0, 0, 0, 0, 1]);
        e.mark_hard_boundary(MarkHardBoundary {
            set_index: 0,
            game_index: 1,
        });
        e.mark_hard_boundary(MarkHardBoundary {
            set_index: 4,
            game_index: 1,
        });
        e.undo(1);
        assert!(e.hard_boundaries(0).unwrap().contains(&1));
        assert!(e.hard_boundaries(1).is_none());
    }
}
