//! This module implements grid-filling as a classic constraint-satisfaction search. Every slot's
//! domain starts out as the whole vocabulary; we then enforce node consistency (word length) and
//! arc consistency (AC-3) once, and finally run a depth-first backtracking search over partial
//! assignments, ordering slots by minimum remaining values (ties broken by degree) and words by
//! the least-constraining-value heuristic.

use log::{debug, trace};
use std::fmt;
use std::time::{Duration, Instant};

use crate::arc_consistency::{
    establish_arc_consistency, revise, ArcConsistencyFailure, ArcConsistencyResult,
};
use crate::assignment::{is_consistent, Assignment, AssignmentError};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotSpec};
use crate::ordering::{order_domain_values, select_unassigned_slot};
use crate::types::{DirectedArc, SlotId, WordId};

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Search nodes visited.
    pub states: usize,
    /// Times a slot ran out of candidates and we had to undo the previous choice.
    pub backtracks: usize,
    /// Arcs revised while establishing arc consistency.
    pub revisions: usize,
    pub node_consistency_eliminations: usize,
    pub arc_consistency_eliminations: usize,
    pub node_consistency_time: Duration,
    pub arc_consistency_time: Duration,
    pub search_time: Duration,
    pub total_time: Duration,
}

/// A struct representing the results of a successful fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

impl FillSuccess {
    /// The chosen word for each slot, in slot order.
    #[must_use]
    pub fn words<'w>(&self, config: &GridConfig<'w>) -> Vec<(SlotSpec, &'w str)> {
        let word_list = config.word_list;
        self.assignment
            .iter()
            .map(|(slot_id, word_id)| {
                (
                    config.slot_configs[slot_id].slot_spec(),
                    word_list.word(word_id).string.as_str(),
                )
            })
            .collect()
    }
}

/// Why a fill operation didn't produce an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// No word in the vocabulary has the right length for this slot.
    EmptyDomain(SlotId),

    /// Arc consistency removed every option for this slot.
    DomainWipeout(SlotId),

    /// The search tried every combination without finding a fill.
    Exhausted,

    /// The search misused its assignment; this is a bug, not a property of the grid.
    InvalidAssignment(AssignmentError),
}

impl FillFailure {
    /// Does this failure mean the grid has no fill (as opposed to an internal error)?
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        !matches!(self, FillFailure::InvalidAssignment(_))
    }
}

impl fmt::Display for FillFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillFailure::EmptyDomain(slot_id) => {
                write!(f, "no word fits slot {slot_id}")
            }
            FillFailure::DomainWipeout(slot_id) => {
                write!(f, "crossing constraints rule out every word for slot {slot_id}")
            }
            FillFailure::Exhausted => write!(f, "no combination of words fills the grid"),
            FillFailure::InvalidAssignment(error) => write!(f, "internal search error: {error}"),
        }
    }
}

impl std::error::Error for FillFailure {}

impl From<AssignmentError> for FillFailure {
    fn from(error: AssignmentError) -> Self {
        FillFailure::InvalidAssignment(error)
    }
}

/// One level of the search: the slot being filled and the candidates left to try for it.
#[derive(Debug)]
struct SearchFrame {
    slot_id: SlotId,
    candidates: Vec<WordId>,
    next_candidate_idx: usize,
}

/// The constraint engine for a single grid. It owns the live domain of every slot; the grid
/// config and word list are only read.
pub struct Solver<'a> {
    config: GridConfig<'a>,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    /// Create a solver whose domains hold the full vocabulary for every slot.
    #[must_use]
    pub fn new(config: &GridConfig<'a>) -> Solver<'a> {
        Solver {
            config: *config,
            domains: Domains::full(config),
            statistics: Statistics::default(),
        }
    }

    #[must_use]
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Remove every option whose length doesn't match its slot; see `Domains`.
    pub fn enforce_node_consistency(&mut self) -> usize {
        self.domains.enforce_node_consistency(&self.config)
    }

    /// Make `x` arc-consistent with `y`; see `arc_consistency::revise`.
    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        revise(&self.config, &mut self.domains, x, y)
    }

    /// Run AC-3, starting from every arc if `initial_arcs` is `None`.
    pub fn ac3(&mut self, initial_arcs: Option<Vec<DirectedArc>>) -> ArcConsistencyResult {
        establish_arc_consistency(&self.config, &mut self.domains, initial_arcs)
    }

    #[must_use]
    pub fn is_consistent(&self, assignment: &Assignment) -> bool {
        is_consistent(&self.config, assignment)
    }

    #[must_use]
    pub fn select_unassigned_slot(&self, assignment: &Assignment) -> Option<SlotId> {
        select_unassigned_slot(&self.config, &self.domains, assignment)
    }

    #[must_use]
    pub fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        order_domain_values(&self.config, &self.domains, slot_id)
    }

    /// Extend `assignment` depth-first until it's complete and consistent. Returns `Ok(true)` with
    /// the completed assignment left in place, or `Ok(false)` with `assignment` restored to its
    /// original state if no completion exists. Choices already present when this is called are
    /// never undone. Domains aren't modified.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, AssignmentError> {
        let mut stack: Vec<SearchFrame> = Vec::with_capacity(self.config.slot_count());

        loop {
            self.statistics.states += 1;

            if assignment.is_complete() {
                return Ok(self.is_consistent(assignment));
            }

            // There's always an unassigned slot here, since the assignment isn't complete.
            if let Some(slot_id) = self.select_unassigned_slot(assignment) {
                let candidates = self.order_domain_values(slot_id);
                trace!("slot {slot_id}: {} candidates", candidates.len());
                stack.push(SearchFrame {
                    slot_id,
                    candidates,
                    next_candidate_idx: 0,
                });
            }

            // Find the next candidate that keeps the assignment consistent, unwinding exhausted
            // frames (and the parent choices that led to them) as we go.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(false);
                };

                let mut found = false;
                while let Some(&word_id) = frame.candidates.get(frame.next_candidate_idx) {
                    frame.next_candidate_idx += 1;
                    assignment.assign(frame.slot_id, word_id)?;
                    if is_consistent(&self.config, assignment) {
                        found = true;
                        break;
                    }
                    assignment.unassign_last()?;
                }

                if found {
                    break;
                }

                stack.pop();
                self.statistics.backtracks += 1;
                if stack.is_empty() {
                    return Ok(false);
                }
                let undone = assignment.unassign_last()?;
                trace!("backtracking from slot {}", undone.slot_id);
            }
        }
    }

    /// Enforce node consistency, then arc consistency, then search for a complete assignment.
    pub fn solve(&mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.statistics.node_consistency_eliminations = self.enforce_node_consistency();
        self.statistics.node_consistency_time = start.elapsed();

        // A slot with nothing of the right length can never be filled; don't bother searching.
        if let Some(slot_id) = self.domains.first_empty_slot() {
            debug!("slot {slot_id} has no options of the right length");
            return Err(FillFailure::EmptyDomain(slot_id));
        }

        let arc_consistency_start = Instant::now();
        let arc_consistency_result = self.ac3(None);
        self.statistics.arc_consistency_time = arc_consistency_start.elapsed();

        match arc_consistency_result {
            Ok(success) => {
                self.statistics.revisions = success.revisions;
                self.statistics.arc_consistency_eliminations = success.eliminations;
            }
            Err(ArcConsistencyFailure { slot_id, revisions }) => {
                self.statistics.revisions = revisions;
                return Err(FillFailure::DomainWipeout(slot_id));
            }
        }

        let search_start = Instant::now();
        let mut assignment = Assignment::new(self.config.slot_count());
        let found = self.backtrack(&mut assignment)?;
        self.statistics.search_time = search_start.elapsed();
        self.statistics.total_time = start.elapsed();

        debug!("{:?}", self.statistics);

        if found {
            Ok(FillSuccess {
                statistics: self.statistics.clone(),
                assignment,
            })
        } else {
            Err(FillFailure::Exhausted)
        }
    }
}

/// Search for a valid fill for the given grid.
pub fn find_fill(config: &GridConfig) -> Result<FillSuccess, FillFailure> {
    Solver::new(config).solve()
}
