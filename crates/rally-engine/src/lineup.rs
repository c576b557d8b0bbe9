//! Lineups and substitutions.
//!
//! The first lineup set on a side (before any substitution on it) is kept
//! as that side's rebuild baseline. Substitutions are logged in the timeline
//! and replayed on top of the baseline, so undoing one restores the player
//! it replaced.

use chrono::{DateTime, Utc};
use rally_model::matchup::{LineUpMember, Side};
use rally_model::timeline::{ScoreEntry, SubstitutionEvent};

use crate::engine::ScoringEngine;
use crate::rebuild::apply_substitution;

/// Arguments for [`ScoringEngine::substitute`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubstituteOptions {
    /// 1 or 2.
    pub side_number: u8,
    /// Participant leaving the court. Must be in the side's lineup.
    pub out_participant_id: String,
    pub in_participant_id: String,
    /// Defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

impl SubstituteOptions {
    /// A substitution stamped when it is applied.
    pub fn new(side_number: u8, out_id: impl Into<String>, in_id: impl Into<String>) -> Self {
        Self {
            side_number,
            out_participant_id: out_id.into(),
            in_participant_id: in_id.into(),
            timestamp: None,
        }
    }
}

impl ScoringEngine {
    /// Set the lineup of side 1 or 2.
    ///
    /// Until the side's first substitution this also replaces the lineup
    /// that rebuilds start from.
    pub fn set_line_up(&mut self, side_number: u8, line_up: Vec<LineUpMember>) {
        let substituted = self
            .match_up
            .substitutions()
            .is_some_and(|subs| subs.iter().any(|s| s.side_number == side_number));

        let Some(side) = self.match_up.side_mut(side_number) else {
            tracing::debug!(side_number, "set_line_up: no such side");
            return;
        };
        side.line_up = Some(line_up.clone());

        if !substituted {
            let slot = usize::from(side_number).checked_sub(1);
            if let Some(baseline) = slot.and_then(|i| self.initial_line_ups.get_mut(i)) {
                *baseline = Some(line_up);
            }
        }
    }

    /// Replace one participant in a side's lineup.
    ///
    /// Ignored when the side has no lineup, the outgoing participant is not
    /// in it, or the competition's substitution rules forbid another change.
    pub fn substitute(&mut self, options: SubstituteOptions) {
        let made = self.match_up.substitutions().map_or(0, |subs| {
            subs.iter()
                .filter(|s| s.side_number == options.side_number)
                .count()
        });
        let rules = self
            .competition_format
            .as_ref()
            .and_then(|c| c.substitution_rules);
        if let Some(rules) = rules {
            if !rules.permits(made) {
                tracing::debug!(
                    side_number = options.side_number,
                    made,
                    "substitute: not permitted by substitution rules"
                );
                return;
            }
        }

        let timestamp = options.timestamp.unwrap_or_else(Utc::now);
        let event = SubstitutionEvent {
            side_number: options.side_number,
            out_participant_id: options.out_participant_id,
            in_participant_id: options.in_participant_id,
            before_point_index: self.match_up.point_count(),
            timestamp,
        };

        if !apply_substitution(&mut self.match_up, &event) {
            tracing::debug!(
                side_number = event.side_number,
                participant = %event.out_participant_id,
                "substitute: participant not in line-up"
            );
            return;
        }
        self.ensure_timeline();
        self.match_up.ensure_history().entries.push(ScoreEntry::Substitution {
            data: event,
            timestamp,
        });
        self.clear_redo();
    }

    /// Participants on court per side: the whole lineup in doubles, its
    /// first member in singles, else the side's own participant.
    pub fn get_active_players(&self) -> [Vec<String>; 2] {
        let doubles = self.match_up.is_doubles();
        self.match_up
            .sides
            .each_ref()
            .map(|side| active_on_side(side, doubles))
    }

    /// Active players to attach to a new point, `None` when no side has a
    /// lineup.
    pub(crate) fn active_players_snapshot(&self) -> Option<[Vec<String>; 2]> {
        let any_line_up = self.match_up.sides.iter().any(|s| s.line_up.is_some());
        any_line_up.then(|| self.get_active_players())
    }
}

fn active_on_side(side: &Side, doubles: bool) -> Vec<String> {
    match &side.line_up {
        Some(line_up) => {
            let take = if doubles { line_up.len() } else { 1 };
            line_up
                .iter()
                .take(take)
                .map(|m| m.participant_id.clone())
                .collect()
        }
        None => side.participant_id.iter().cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompetitionFormat, EngineConfig, SubstitutionRules};
    use rally_model::point::PointInput;

    fn doubles() -> ScoringEngine {
        let mut e = ScoringEngine::new(EngineConfig {
            match_up_id: Some("d".to_owned()),
            is_doubles: true,
            ..Default::default()
        });
        e.set_line_up(1, vec![LineUpMember::new("a1"), LineUpMember::new("a2")]);
        e.set_line_up(2, vec![LineUpMember::new("b1"), LineUpMember::new("b2")]);
        e
    }

    #[test]
    fn doubles_points_carry_both_full_sides() {
        let mut e = doubles();
        e.add_point(PointInput::won_by(0));
        let players = e.get_state().points()[0].active_players.clone().unwrap();
        assert_eq!(players[0], vec!["a1", "a2"]);
        assert_eq!(players[1], vec!["b1", "b2"]);
    }

    #[test]
    fn substitution_changes_players_for_later_points() {
        let mut e = doubles();
        e.add_point(PointInput::won_by(0));
        e.substitute(SubstituteOptions::new(1, "a2", "a3"));
        e.add_point(PointInput::won_by(1));

        let subs = e.get_state().substitutions().unwrap();
        assert_eq!(subs[0].before_point_index, 1);
        assert_eq!(e.get_active_players()[0], vec!["a1", "a3"]);
        let points = e.get_state().points();
        assert_eq!(points[0].active_players.as_ref().unwrap()[0], vec!["a1", "a2"]);
        assert_eq!(points[1].active_players.as_ref().unwrap()[0], vec!["a1", "a3"]);
    }

    #[test]
    fn unknown_participant_is_ignored() {
        let mut e = doubles();
        e.substitute(SubstituteOptions::new(2, "zz", "b3"));
        assert!(e.get_state().substitutions().is_none());
        assert!(e.get_state().entries().is_empty());
    }

    #[test]
    fn rules_cap_substitutions_per_side() {
        let mut e = ScoringEngine::new(EngineConfig {
            competition_format: Some(CompetitionFormat {
                substitution_rules: Some(SubstitutionRules {
                    allowed: true,
                    max_per_side: Some(1),
                }),
                ..Default::default()
            }),
            ..Default::default()
        });
        e.set_line_up(1, vec![LineUpMember::new("a")]);
        e.substitute(SubstituteOptions::new(1, "a", "b"));
        e.substitute(SubstituteOptions::new(1, "b", "c"));
        assert_eq!(e.get_state().substitutions().map(<[_]>::len), Some(1));
        assert_eq!(e.get_active_players()[0], vec!["b"]);
    }

    #[test]
    fn singles_uses_first_member_or_participant() {
        let mut e = ScoringEngine::default();
        e.set_line_up(1, vec![LineUpMember::new("p1"), LineUpMember::new("p2")]);
        e.match_up.sides[1].participant_id = Some("q".to_owned());
        assert_eq!(e.get_active_players(), [vec!["p1".to_owned()], vec!["q".to_owned()]]);
        assert!(e.active_players_snapshot().is_some());
    }
}
