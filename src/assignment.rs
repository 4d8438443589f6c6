//! Partial assignments built up during search, and the check that decides whether one is still
//! admissible.

use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};
use crate::MAX_SLOT_COUNT;

/// A struct recording a slot assignment made during a fill process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// Misuse of an `Assignment` by its caller. These indicate a bug in the search rather than
/// anything about the puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    SlotOutOfRange { slot_id: SlotId, slot_count: usize },
    AlreadyAssigned { slot_id: SlotId, word_id: WordId },
    NothingToUnassign,
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::SlotOutOfRange {
                slot_id,
                slot_count,
            } => write!(f, "slot {slot_id} is out of range (grid has {slot_count})"),
            AssignmentError::AlreadyAssigned { slot_id, word_id } => {
                write!(f, "slot {slot_id} is already assigned word {word_id}")
            }
            AssignmentError::NothingToUnassign => write!(f, "assignment is already empty"),
        }
    }
}

impl std::error::Error for AssignmentError {}

/// A partial mapping from slots to words. Choices are kept as a stack, so the only slot that can
/// be unassigned is the one assigned most recently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: SmallVec<[Choice; MAX_SLOT_COUNT]>,
    word_id_by_slot: Vec<Option<WordId>>,
}

impl Assignment {
    /// Create an empty assignment for a grid with `slot_count` slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: SmallVec::with_capacity(slot_count),
            word_id_by_slot: vec![None; slot_count],
        }
    }

    /// Assign a word to a slot that doesn't have one yet.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Result<(), AssignmentError> {
        let slot_count = self.word_id_by_slot.len();
        let entry = self
            .word_id_by_slot
            .get_mut(slot_id)
            .ok_or(AssignmentError::SlotOutOfRange {
                slot_id,
                slot_count,
            })?;

        if let Some(existing) = *entry {
            return Err(AssignmentError::AlreadyAssigned {
                slot_id,
                word_id: existing,
            });
        }

        *entry = Some(word_id);
        self.choices.push(Choice { slot_id, word_id });

        Ok(())
    }

    /// Undo the most recent choice and return it.
    pub fn unassign_last(&mut self) -> Result<Choice, AssignmentError> {
        let choice = self
            .choices
            .pop()
            .ok_or(AssignmentError::NothingToUnassign)?;
        self.word_id_by_slot[choice.slot_id] = None;

        Ok(choice)
    }

    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_id_by_slot.get(slot_id).copied().flatten()
    }

    #[must_use]
    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// The number of slots with a word.
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.word_id_by_slot.len()
    }

    /// Does every slot have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.choices.len() == self.word_id_by_slot.len()
    }

    /// The choices made so far, oldest first.
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Iterate over `(SlotId, WordId)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.word_id_by_slot
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }
}

/// Is the given (possibly partial) assignment admissible? This requires that no word is used
/// twice, that every word fits its slot, and that every pair of assigned crossing slots agrees on
/// the letter in their shared cell. Only the assignment is examined, never the domains.
#[must_use]
pub fn is_consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    let mut used_word_ids: HashSet<WordId> = HashSet::with_capacity(assignment.len());
    if !assignment
        .choices()
        .iter()
        .all(|choice| used_word_ids.insert(choice.word_id))
    {
        return false;
    }

    assignment.choices().iter().all(|&Choice { slot_id, word_id }| {
        let slot_config = &config.slot_configs[slot_id];
        let word = config.word_list.word(word_id);

        if word.len() != slot_config.length {
            return false;
        }

        // Each crossing is checked from both sides, which is redundant but keeps this simple.
        slot_config
            .crossings
            .iter()
            .enumerate()
            .all(|(cell_idx, crossing)| {
                let Some(crossing) = crossing else {
                    return true;
                };
                let Some(other_word_id) = assignment.get(crossing.other_slot_id) else {
                    return true;
                };
                let other_word = config.word_list.word(other_word_id);

                other_word.chars.get(crossing.other_slot_cell) == Some(&word.chars[cell_idx])
            })
    })
}
