//! Variable- and value-ordering heuristics for the backtracking search.

use std::cmp::Reverse;

use crate::assignment::Assignment;
use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};

/// Choose the next slot to fill: the unassigned slot with the fewest remaining options, breaking
/// ties by the number of crossing slots (more is better) and then by lowest id. Returns `None` if
/// every slot is assigned.
#[must_use]
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..config.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (
                domains.option_count(slot_id),
                Reverse(config.slot_configs[slot_id].degree()),
                slot_id,
            )
        })
}

/// Order a slot's options by how many crossing slots also have the same word as an option, fewest
/// first. Equal counts keep their `WordId` order.
#[must_use]
pub fn order_domain_values(config: &GridConfig, domains: &Domains, slot_id: SlotId) -> Vec<WordId> {
    let neighbors = config.neighbors(slot_id);

    let mut values = domains.get(slot_id).to_vec();
    values.sort_by_cached_key(|&word_id| {
        neighbors
            .iter()
            .filter(|&&neighbor| domains.contains(neighbor, word_id))
            .count()
    });

    values
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::domains::Domains;
    use crate::grid_config::{Direction, OwnedGridConfig, SlotSpec};
    use crate::ordering::{order_domain_values, select_unassigned_slot};
    use crate::word_list::WordList;

    /// Three 3-letter slots: an across at the top, a down crossing its first cell, and a down
    /// crossing its last cell.
    fn u_shape(words: &[&str]) -> OwnedGridConfig {
        OwnedGridConfig::new(
            WordList::from_words(words),
            &[
                SlotSpec::new(0, 0, Direction::Down, 3),
                SlotSpec::new(0, 0, Direction::Across, 3),
                SlotSpec::new(0, 2, Direction::Down, 3),
            ],
            3,
            3,
        )
        .unwrap()
    }

    fn node_consistent_domains(grid_config: &OwnedGridConfig) -> Domains {
        let config = grid_config.to_config_ref();
        let mut domains = Domains::full(&config);
        domains.enforce_node_consistency(&config);
        domains
    }

    #[test]
    fn test_select_prefers_fewest_options() {
        let grid_config = u_shape(&["cat", "dog", "car", "tan"]);
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);
        domains.retain(2, |&word_id| word_id < 2);

        let assignment = Assignment::new(3);
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(2));
    }

    #[test]
    fn test_select_breaks_ties_by_degree_then_id() {
        let grid_config = u_shape(&["cat", "dog", "car", "tan"]);
        let config = grid_config.to_config_ref();
        let domains = node_consistent_domains(&grid_config);

        // All domains are the same size; the across slot crosses both downs.
        let mut assignment = Assignment::new(3);
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(1));

        assignment.assign(1, 0).unwrap();
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(0));

        assignment.assign(0, 1).unwrap();
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(2));

        assignment.assign(2, 2).unwrap();
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), None);
    }

    #[test]
    fn test_order_domain_values_counts_neighbor_domains() {
        let grid_config = u_shape(&["cat", "dog", "car", "tan"]);
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        // cat appears in neither down domain, car in one, dog and tan in both.
        domains.retain(0, |&word_id| word_id != 0);
        domains.retain(2, |&word_id| word_id != 0 && word_id != 2);

        assert_eq!(order_domain_values(&config, &domains, 1), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_order_domain_values_keeps_id_order_on_ties() {
        let grid_config = u_shape(&["cat", "dog", "car", "tan"]);
        let config = grid_config.to_config_ref();
        let domains = node_consistent_domains(&grid_config);

        assert_eq!(order_domain_values(&config, &domains, 0), vec![0, 1, 2, 3]);
    }
}
