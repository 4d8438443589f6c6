use log::debug;

use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};
use crate::CHECK_INVARIANTS;

/// The candidate words still considered possible for each slot. Each slot's options are kept in
/// ascending `WordId` order, and options are only ever removed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<Vec<WordId>>,
}

impl Domains {
    /// Give every slot the full vocabulary as its initial domain.
    #[must_use]
    pub fn full(config: &GridConfig) -> Domains {
        let all_word_ids: Vec<WordId> = (0..config.word_list.len()).collect();

        Domains {
            options: vec![all_word_ids; config.slot_count()],
        }
    }

    /// Remove every option whose length doesn't match its slot. Returns the number of options
    /// removed across all slots.
    pub fn enforce_node_consistency(&mut self, config: &GridConfig) -> usize {
        let mut removed = 0;

        for (slot_id, options) in self.options.iter_mut().enumerate() {
            let length = config.slot_configs[slot_id].length;
            let before = options.len();
            options.retain(|&word_id| config.word_list.word(word_id).len() == length);
            removed += before - options.len();
        }

        if CHECK_INVARIANTS {
            for (slot_id, options) in self.options.iter().enumerate() {
                let length = config.slot_configs[slot_id].length;
                if let Some(&word_id) = options
                    .iter()
                    .find(|&&word_id| config.word_list.word(word_id).len() != length)
                {
                    panic!("Word {word_id} survived node consistency for slot {slot_id}?");
                }
            }
        }

        debug!("node consistency removed {removed} options");

        removed
    }

    /// The current options for a slot, in ascending `WordId` order.
    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> &[WordId] {
        &self.options[slot_id]
    }

    #[must_use]
    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.options[slot_id].len()
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].binary_search(&word_id).is_ok()
    }

    /// Keep only the options for which `keep` returns true, returning how many were removed.
    pub fn retain(&mut self, slot_id: SlotId, keep: impl FnMut(&WordId) -> bool) -> usize {
        let options = &mut self.options[slot_id];
        let before = options.len();
        options.retain(keep);
        before - options.len()
    }

    /// The first slot (by id) that has no options left, if any.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.options.iter().position(Vec::is_empty)
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.options.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::Domains;
    use crate::grid_config::{Direction, OwnedGridConfig, SlotSpec};
    use crate::word_list::WordList;

    #[test]
    fn test_node_consistency_keeps_only_matching_lengths() {
        let grid_config = OwnedGridConfig::new(
            WordList::from_words(["a", "to", "cat", "dog", "bird", "horse"]),
            &[
                SlotSpec::new(0, 0, Direction::Across, 3),
                SlotSpec::new(1, 0, Direction::Across, 4),
                SlotSpec::new(2, 0, Direction::Across, 5),
            ],
            5,
            3,
        )
        .unwrap();
        let config = grid_config.to_config_ref();

        let mut domains = Domains::full(&config);
        assert_eq!(domains.option_count(0), 6);

        let removed = domains.enforce_node_consistency(&config);

        assert_eq!(removed, 4 + 5 + 5);
        assert_eq!(domains.get(0), &[2, 3]);
        assert_eq!(domains.get(1), &[4]);
        assert_eq!(domains.get(2), &[5]);
        for slot_id in 0..domains.slot_count() {
            for &word_id in domains.get(slot_id) {
                assert_eq!(
                    config.word_list.word(word_id).len(),
                    config.slot_configs[slot_id].length
                );
            }
        }
        assert_eq!(domains.first_empty_slot(), None);
    }

    #[test]
    fn test_node_consistency_can_empty_a_domain() {
        let grid_config = OwnedGridConfig::new(
            WordList::from_words(["cat", "dog"]),
            &[SlotSpec::new(0, 0, Direction::Across, 5)],
            5,
            1,
        )
        .unwrap();
        let config = grid_config.to_config_ref();

        let mut domains = Domains::full(&config);
        domains.enforce_node_consistency(&config);

        assert_eq!(domains.option_count(0), 0);
        assert_eq!(domains.first_empty_slot(), Some(0));
    }

    #[test]
    fn test_retain_and_contains() {
        let grid_config = OwnedGridConfig::new(
            WordList::from_words(["cat", "dog", "car"]),
            &[SlotSpec::new(0, 0, Direction::Across, 3)],
            3,
            1,
        )
        .unwrap();
        let config = grid_config.to_config_ref();
        let mut domains = Domains::full(&config);

        assert_eq!(domains.retain(0, |&word_id| word_id != 1), 1);
        assert!(domains.contains(0, 0));
        assert!(!domains.contains(0, 1));
        assert!(domains.contains(0, 2));
    }
}
