//! The [`ScoringEngine`] facade.
//!
//! The engine exclusively owns one [`MatchUp`] together with the state that
//! is not part of the canonical record: the parsed format, the point
//! multipliers, the redo stack, the marked hard boundaries and the initial
//! lineup snapshot used as the rebuild baseline.
//!
//! Operations are spread over several modules, each adding an `impl
//! ScoringEngine` block:
//!
//! - [`mutation`](crate::mutation): points, games, sets, segment ends, initial score.
//! - [`lineup`](crate::lineup): lineups and substitutions.
//! - [`history`](crate::history): undo and redo.
//! - [`edit`](crate::edit): decorating and editing recorded points.
//! - [`snapshot`](crate::snapshot): supplementary state, JSON, state hash.

use std::collections::{BTreeMap, BTreeSet};

use rally_format::{parse_format, MatchFormat};
use rally_model::matchup::{create_match_up, CreateMatchUp, LineUpMember, MatchUp};
use rally_model::point::{PointConfig, PointMultiplier};
use rally_model::timeline::{EntryKind, ScoreEntry};
use rally_model::view::{self, Score, ScoreboardOptions};
use serde::{Deserialize, Serialize};

use crate::config::{CompetitionFormat, EngineConfig};
use crate::rebuild;

// ---------------------------------------------------------------------------
// InputMode
// ---------------------------------------------------------------------------

/// Granularity of the input recorded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    /// Nothing that defines a mode has been recorded.
    None,
    /// Point-by-point scoring only.
    Points,
    /// Whole games only.
    Games,
    /// Whole sets only.
    Sets,
    /// More than one kind of entry, substitutions included.
    Mixed,
}

// ---------------------------------------------------------------------------
// ScoringEngine
// ---------------------------------------------------------------------------

/// Stateful scorer for one matchUp.
///
/// # Determinism
///
/// Given the same baseline (format, id, sides, initial lineups) and the same
/// timeline, [`rebuild`](crate::rebuild::rebuild) always yields the same
/// record. Completion times come from entry timestamps, never the clock, so
/// undo followed by redo restores a deep-equal record.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    pub(crate) match_up: MatchUp,
    /// Arguments used for the initial record, reused by [`reset`](Self::reset).
    pub(crate) origin: CreateMatchUp,
    pub(crate) competition_format: Option<CompetitionFormat>,
    /// `None` when the record's format code does not parse.
    pub(crate) format: Option<MatchFormat>,
    pub(crate) point_multipliers: Vec<PointMultiplier>,
    /// Undone entries, most recent last.
    pub(crate) redo_stack: Vec<ScoreEntry>,
    /// Lineups as first set, per side. Substitutions replay on top.
    pub(crate) initial_line_ups: [Option<Vec<LineUpMember>>; 2],
    /// Hard boundaries by set index, including sets currently undone.
    /// Reapplied after every rebuild.
    pub(crate) marked_boundaries: BTreeMap<usize, BTreeSet<u32>>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ScoringEngine {
    /// Create an engine with a fresh, unplayed matchUp.
    pub fn new(config: EngineConfig) -> Self {
        let mut origin = CreateMatchUp {
            match_up_format: config.resolved_format().to_owned(),
            match_up_id: config.match_up_id.clone(),
            is_doubles: config.is_doubles,
        };
        let match_up = create_match_up(&origin);
        // Pin a generated id so reset() keeps it.
        origin.match_up_id = Some(match_up.match_up_id.clone());
        let format = parse_or_warn(&match_up.match_up_format);

        Self {
            match_up,
            origin,
            point_multipliers: config.resolved_point_multipliers(),
            competition_format: config.competition_format,
            format,
            redo_stack: Vec::new(),
            initial_line_ups: [None, None],
            marked_boundaries: BTreeMap::new(),
        }
    }

    // -- state -------------------------------------------------------------

    /// Replace the record wholesale.
    ///
    /// Clears the redo stack and derives the lineup baseline by reversing the
    /// record's substitutions. Call
    /// [`load_supplementary_state`](Self::load_supplementary_state) afterwards
    /// to restore the exact engine-private state.
    pub fn set_state(&mut self, match_up: MatchUp) {
        self.format = parse_or_warn(&match_up.match_up_format);
        self.initial_line_ups = derive_initial_line_ups(&match_up);
        self.marked_boundaries = boundaries_in(&match_up);
        self.match_up = match_up;
        self.redo_stack.clear();
    }

    /// The canonical record, including its timeline.
    pub fn get_state(&self) -> &MatchUp {
        &self.match_up
    }

    /// Discard everything and start again from the constructor's format, id
    /// and doubles flag.
    pub fn reset(&mut self) {
        self.match_up = create_match_up(&self.origin);
        self.format = parse_or_warn(&self.match_up.match_up_format);
        self.redo_stack.clear();
        self.initial_line_ups = [None, None];
        self.marked_boundaries.clear();
    }

    // -- queries -----------------------------------------------------------

    /// Per-set scores, the score string and the current game score.
    pub fn get_score(&self) -> Score {
        view::get_score(&self.match_up)
    }

    /// One-line scoreboard, see [`view::get_scoreboard`].
    pub fn get_scoreboard(&self, options: &ScoreboardOptions) -> String {
        view::get_scoreboard(&self.match_up, options)
    }

    /// The winning side (1 or 2) once the match is decided.
    pub fn get_winner(&self) -> Option<u8> {
        view::get_winner(&self.match_up)
    }

    /// `true` once the match status is `Completed`.
    pub fn is_complete(&self) -> bool {
        view::is_complete(&self.match_up)
    }

    /// Points recorded in the history.
    pub fn get_point_count(&self) -> usize {
        self.match_up.point_count()
    }

    /// The record's match-format code.
    pub fn get_format(&self) -> &str {
        &self.match_up.match_up_format
    }

    /// The parsed format, `None` if the code is invalid.
    pub fn parsed_format(&self) -> Option<&MatchFormat> {
        self.format.as_ref()
    }

    /// The competition format given at construction, if any.
    pub fn get_competition_format(&self) -> Option<&CompetitionFormat> {
        self.competition_format.as_ref()
    }

    /// Classify the timeline by the distinct kinds of scoring entries in it.
    ///
    /// Initial scores and segment ends do not define a mode. A legacy
    /// record with points but no entries counts as `Points`.
    pub fn get_input_mode(&self) -> InputMode {
        let entries = self.match_up.entries();
        if entries.is_empty() {
            return if self.match_up.point_count() > 0 {
                InputMode::Points
            } else {
                InputMode::None
            };
        }

        let kinds: BTreeSet<EntryKind> = entries
            .iter()
            .map(|e| e.kind())
            .filter(|k| !matches!(k, EntryKind::SetInitialScore | EntryKind::EndSegment))
            .collect();

        let mut iter = kinds.iter();
        match (iter.next(), iter.next()) {
            (None, _) => InputMode::None,
            (Some(EntryKind::Point), None) => InputMode::Points,
            (Some(EntryKind::Game), None) => InputMode::Games,
            (Some(EntryKind::Set), None) => InputMode::Sets,
            _ => InputMode::Mixed,
        }
    }

    /// Hard boundaries marked on the set at `set_index`.
    pub fn hard_boundaries(&self, set_index: usize) -> Option<&BTreeSet<u32>> {
        self.match_up
            .score
            .sets
            .get(set_index)
            .map(|s| &s.hard_boundaries)
    }

    // -- configuration -----------------------------------------------------

    /// Takes effect for points scored from now on and for any later rebuild.
    pub fn set_point_multipliers(&mut self, multipliers: Vec<PointMultiplier>) {
        self.point_multipliers = multipliers;
    }

    /// Multipliers in force for new points and rebuilds.
    pub fn get_point_multipliers(&self) -> &[PointMultiplier] {
        &self.point_multipliers
    }

    // -- internals ---------------------------------------------------------

    /// Upgrade a legacy points-only record before anything is logged, so
    /// the point entries stay aligned with `history.points`.
    pub(crate) fn ensure_timeline(&mut self) {
        let history = self.match_up.ensure_history();
        if history.entries.is_empty() && !history.points.is_empty() {
            tracing::debug!(
                points = history.points.len(),
                "ensure_timeline: migrating legacy points to entries"
            );
            history.migrate_legacy_points();
        }
    }

    /// Regenerate the record from its timeline (or, for legacy records,
    /// its points), then put marked hard boundaries back on the sets that
    /// exist.
    pub(crate) fn rebuild(&mut self) {
        let previous = std::mem::take(&mut self.match_up);
        let baseline = rebuild::baseline(&previous, &self.initial_line_ups);
        let config = PointConfig {
            point_multipliers: &self.point_multipliers,
        };

        let mut next = if previous.entries().is_empty() {
            rebuild::rebuild_from_points(baseline, previous.points(), &config)
        } else {
            rebuild::rebuild(baseline, previous.entries(), self.format.as_ref(), &config)
        };

        for (&index, games) in &self.marked_boundaries {
            if let Some(set) = next.score.sets.get_mut(index) {
                set.hard_boundaries.extend(games.iter().copied());
            }
        }
        self.match_up = next;
    }

    /// Drop the redo stack after a new action. Undone sets can no longer
    /// come back, so only boundaries on the current record are kept.
    pub(crate) fn clear_redo(&mut self) {
        self.redo_stack.clear();
        self.marked_boundaries = boundaries_in(&self.match_up);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_or_warn(code: &str) -> Option<MatchFormat> {
    match parse_format(code) {
        Ok(format) => Some(format),
        Err(e) => {
            tracing::warn!(
                format = code,
                error = %e,
                "invalid match format -- completion rules disabled"
            );
            None
        }
    }
}

fn boundaries_in(match_up: &MatchUp) -> BTreeMap<usize, BTreeSet<u32>> {
    match_up
        .score
        .sets
        .iter()
        .enumerate()
        .filter(|(_, set)| !set.hard_boundaries.is_empty())
        .map(|(index, set)| (index, set.hard_boundaries.clone()))
        .collect()
}

/// Recover each side's lineup as it was before any substitution.
fn derive_initial_line_ups(match_up: &MatchUp) -> [Option<Vec<LineUpMember>>; 2] {
    let substitutions = match_up.substitutions().unwrap_or(&[]);
    match_up.sides.each_ref().map(|side| {
        let mut line_up = side.line_up.clone()?;
        for sub in substitutions
            .iter()
            .rev()
            .filter(|s| s.side_number == side.side_number)
        {
            if let Some(member) = line_up
                .iter_mut()
                .find(|m| m.participant_id == sub.in_participant_id)
            {
                member.participant_id = sub.out_participant_id.clone();
            }
        }
        Some(line_up)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
