//! This module contains a crossword-specific implementation of the AC-3 algorithm for establishing
//! arc consistency. For our purposes, a grid is arc-consistent when every option left for a slot
//! has at least one compatible option in each crossing slot. For example, if 1D doesn't have any
//! options starting with the letter A, we want to remove any options for 1A that start with the
//! letter A.
//!
//! We keep revising arcs until no more eliminations are possible, or until some slot runs out of
//! options entirely (a "domain wipeout"), which proves the grid can't be filled.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{DirectedArc, SlotId};
use crate::CHECK_INVARIANTS;

/// Result from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,

    /// How many options were removed across all slots.
    pub eliminations: usize,
}

/// Result from a failed call to `establish_arc_consistency`, identifying the slot whose domain was
/// wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    pub revisions: usize,
}

/// Result from a call to `establish_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make slot `x` consistent with slot `y` by removing every option for `x` that has no option in
/// `y` with the same letter in their shared cell. Returns whether any option was removed; slots
/// that don't cross are left alone.
pub fn revise(config: &GridConfig, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    let word_list = config.word_list;
    let supported_chars: HashSet<char> = domains
        .get(y)
        .iter()
        .filter_map(|&word_id| word_list.word(word_id).chars.get(y_cell).copied())
        .collect();

    let removed = domains.retain(x, |&word_id| {
        word_list
            .word(word_id)
            .chars
            .get(x_cell)
            .map_or(false, |c| supported_chars.contains(c))
    });

    if removed > 0 {
        trace!("revise({x}, {y}) removed {removed} options");
    }

    removed > 0
}

/// Every ordered pair of distinct slots, in slot order.
#[must_use]
pub fn all_arcs(config: &GridConfig) -> Vec<DirectedArc> {
    let slot_count = config.slot_count();
    (0..slot_count)
        .flat_map(|x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y)))
        .collect()
}

/// Run AC-3 over `domains`. If `initial_arcs` is `None`, every ordered pair of distinct slots is
/// examined; otherwise only the given arcs are, plus whatever their eliminations make it necessary
/// to recheck. Arcs are processed first-in, first-out.
pub fn establish_arc_consistency(
    config: &GridConfig,
    domains: &mut Domains,
    initial_arcs: Option<Vec<DirectedArc>>,
) -> ArcConsistencyResult {
    let mut queue: VecDeque<DirectedArc> = initial_arcs
        .unwrap_or_else(|| all_arcs(config))
        .into_iter()
        .collect();

    // Arcs currently waiting in `queue`, so that we never hold the same arc twice.
    let mut queued: HashSet<DirectedArc> = queue.iter().copied().collect();

    let mut result = ArcConsistencySuccess::default();

    while let Some(arc) = queue.pop_front() {
        queued.remove(&arc);
        let (x, y) = arc;

        result.revisions += 1;
        let before = domains.option_count(x);
        if !revise(config, domains, x, y) {
            continue;
        }
        result.eliminations += before - domains.option_count(x);

        if domains.option_count(x) == 0 {
            debug!(
                "arc consistency wiped out slot {x} after {} revisions",
                result.revisions
            );
            return Err(ArcConsistencyFailure {
                slot_id: x,
                revisions: result.revisions,
            });
        }

        // Since `x` lost options, any slot crossing it may now have options that relied on them.
        for z in config.neighbors(x) {
            if z != y && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    if CHECK_INVARIANTS && !is_arc_consistent(config, domains) {
        panic!("AC-3 finished but the grid isn't arc-consistent?");
    }

    debug!(
        "arc consistency removed {} options in {} revisions",
        result.eliminations, result.revisions
    );

    Ok(result)
}

/// Check whether every option of every slot has a compatible option in each crossing slot.
#[must_use]
pub fn is_arc_consistent(config: &GridConfig, domains: &Domains) -> bool {
    let word_list = config.word_list;

    (0..config.slot_count()).all(|x| {
        config.neighbors(x).into_iter().all(|y| {
            let Some((x_cell, y_cell)) = config.overlap(x, y) else {
                return true;
            };
            domains.get(x).iter().all(|&word_id| {
                let letter = word_list.word(word_id).chars.get(x_cell);
                letter.is_some()
                    && domains
                        .get(y)
                        .iter()
                        .any(|&other_id| word_list.word(other_id).chars.get(y_cell) == letter)
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{
        all_arcs, establish_arc_consistency, is_arc_consistent, revise, ArcConsistencyFailure,
    };
    use crate::domains::Domains;
    use crate::grid_config::{Direction, OwnedGridConfig, SlotSpec};
    use crate::word_list::tests::resource_path;
    use crate::word_list::WordList;
    use std::fs;

    fn corner_config(words: &[&str], down_length: usize) -> OwnedGridConfig {
        OwnedGridConfig::new(
            WordList::from_words(words),
            &[
                SlotSpec::new(0, 0, Direction::Across, 3),
                SlotSpec::new(0, 0, Direction::Down, down_length),
            ],
            3,
            down_length.max(3),
        )
        .unwrap()
    }

    fn structure0() -> OwnedGridConfig {
        let template = fs::read_to_string(resource_path("structure0.txt")).unwrap();
        let word_list = WordList::from_file(resource_path("words0.txt")).unwrap();
        OwnedGridConfig::from_template(word_list, &template).unwrap()
    }

    fn node_consistent_domains(grid_config: &OwnedGridConfig) -> Domains {
        let config = grid_config.to_config_ref();
        let mut domains = Domains::full(&config);
        domains.enforce_node_consistency(&config);
        domains
    }

    #[test]
    fn test_revise_without_overlap_is_a_no_op() {
        let grid_config = OwnedGridConfig::new(
            WordList::from_words(["word", "wolf"]),
            &[
                SlotSpec::new(0, 0, Direction::Across, 4),
                SlotSpec::new(2, 0, Direction::Across, 4),
            ],
            4,
            3,
        )
        .unwrap();
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);
        domains.retain(1, |&word_id| word_id == 0);

        assert!(!revise(&config, &mut domains, 0, 1));
        assert_eq!(domains.get(0), &[0, 1]);
    }

    #[test]
    fn test_revise_removes_unsupported_options() {
        let grid_config = corner_config(&["cat", "dog", "car"], 3);
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        // Every option for the across slot starts with a letter some down option starts with.
        assert!(!revise(&config, &mut domains, 0, 1));
        assert_eq!(domains.get(0), &[0, 1, 2]);

        domains.retain(1, |&word_id| word_id == 1); // dog
        assert!(revise(&config, &mut domains, 0, 1));
        assert_eq!(domains.get(0), &[1]);
        assert!(!revise(&config, &mut domains, 0, 1));
    }

    #[test]
    fn test_all_arcs() {
        let grid_config = corner_config(&["cat"], 3);

        assert_eq!(all_arcs(&grid_config.to_config_ref()), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_establish_arc_consistency_prunes_to_fixpoint() {
        let grid_config = structure0();
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        let success = establish_arc_consistency(&config, &mut domains, None)
            .expect("structure0 should be arc-consistent");

        let words = |slot_id: usize| {
            domains
                .get(slot_id)
                .iter()
                .map(|&word_id| config.word_list.word(word_id).string.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(words(0), vec!["six"]);
        assert_eq!(words(1), vec!["nine"]);
        assert_eq!(words(2), vec!["seven"]);
        assert_eq!(words(3), vec!["five", "nine"]);
        assert!(success.eliminations > 0);
        assert!(success.revisions >= all_arcs(&config).len());
        assert!(is_arc_consistent(&config, &domains));
    }

    #[test]
    fn test_establish_arc_consistency_from_given_arcs() {
        let grid_config = structure0();
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        establish_arc_consistency(&config, &mut domains, Some(vec![(0, 2)])).unwrap();

        let two = config.word_list.get_word_id("two").unwrap();
        let six = config.word_list.get_word_id("six").unwrap();
        let ten = config.word_list.get_word_id("ten").unwrap();
        assert_eq!(domains.get(0), &[two, six, ten]);
        assert_eq!(domains.option_count(2), 3, "nothing propagates back to 2D");
    }

    #[test]
    fn test_establish_arc_consistency_detects_wipeout() {
        let grid_config = corner_config(&["cat", "dog", "bird"], 4);
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        let failure = establish_arc_consistency(&config, &mut domains, None).unwrap_err();

        assert_eq!(
            failure,
            ArcConsistencyFailure {
                slot_id: 0,
                revisions: 1
            }
        );
        assert_eq!(domains.option_count(0), 0);
    }

    #[test]
    fn test_arc_consistency_ignores_word_reuse() {
        // Uniqueness is only enforced during search, so a single word can support itself here.
        let grid_config = corner_config(&["cat"], 3);
        let config = grid_config.to_config_ref();
        let mut domains = node_consistent_domains(&grid_config);

        assert!(establish_arc_consistency(&config, &mut domains, None).is_ok());
        assert_eq!(domains.get(0), &[0]);
        assert_eq!(domains.get(1), &[0]);
    }
}
