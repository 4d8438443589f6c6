//! This module implements the static description of a crossword grid: which slots exist, where they
//! are, and how they cross each other. Nothing here changes once a fill starts.

use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assignment::Assignment;
use crate::types::{GridCoord, SlotId};
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// The coords of the cell `offset` steps along a slot starting at `start_cell`.
    #[must_use]
    pub fn step(self, start_cell: GridCoord, offset: usize) -> GridCoord {
        match self {
            Direction::Across => (start_cell.0, start_cell.1 + offset),
            Direction::Down => (start_cell.0 + offset, start_cell.1),
        }
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of this slot, the slot crossing it there, if any.
    pub crossings: Vec<Option<Crossing>>,
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        self.slot_spec().cell_coords()
    }

    /// The ids of the slots crossing this one, in cell order.
    #[must_use]
    pub fn neighbors(&self) -> SmallVec<[SlotId; MAX_SLOT_LENGTH]> {
        self.crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    /// The number of slots crossing this one.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.crossings.iter().flatten().count()
    }

    /// Generate a `SlotSpec` identifying this slot.
    #[must_use]
    pub fn slot_spec(&self) -> SlotSpec {
        SlotSpec {
            start_cell: self.start_cell,
            direction: self.direction,
            length: self.length,
        }
    }
}

/// A struct identifying a specific slot in the grid. Two specs are the same slot iff all of their
/// fields match.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct SlotSpec {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl SlotSpec {
    #[must_use]
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> SlotSpec {
        SlotSpec {
            start_cell: (row, col),
            direction,
            length,
        }
    }

    /// Parse a string like "1,2,down,5" (row, column, direction, length) into a `SlotSpec`.
    pub fn from_key(key: &str) -> Result<SlotSpec, String> {
        let key_parts: Vec<&str> = key.split(',').map(str::trim).collect();
        if key_parts.len() != 4 {
            return Err(format!("invalid slot key: {key}"));
        }

        let row: Result<usize, _> = key_parts[0].parse();
        let col: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(row), Ok(col), Some(direction), Ok(length)) = (row, col, direction, length) {
            Ok(SlotSpec::new(row, col, direction, length))
        } else {
            Err(format!("invalid slot key: {key:?}"))
        }
    }

    /// Represent this slot as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }

    /// Generate the coords for each cell of this entry.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| self.direction.step(self.start_cell, cell_idx))
            .collect()
    }
}

impl fmt::Display for SlotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

/// Serialize a `SlotSpec` into a string key.
#[cfg(feature = "serde")]
impl Serialize for SlotSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `SlotSpec` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SlotSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        SlotSpec::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

/// Reasons a grid description can be rejected before filling starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridConfigError {
    EmptyTemplate,
    RaggedTemplate { row: usize },
    InvalidCharacter { row: usize, col: usize, found: char },
    ZeroLengthSlot(SlotSpec),
    DuplicateSlot(SlotSpec),
    SlotOutOfBounds(SlotSpec),
    TooManyCrossings(GridCoord),
    MultipleOverlaps(SlotSpec, SlotSpec),
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridConfigError::EmptyTemplate => write!(f, "Grid must have at least one row"),
            GridConfigError::RaggedTemplate { row } => {
                write!(f, "Rows in grid must all be the same length (row {row} differs)")
            }
            GridConfigError::InvalidCharacter { row, col, found } => {
                write!(f, "Unexpected character {found:?} at row {row}, column {col}")
            }
            GridConfigError::ZeroLengthSlot(spec) => write!(f, "Slot {spec} has no cells"),
            GridConfigError::DuplicateSlot(spec) => write!(f, "Slot {spec} appears twice"),
            GridConfigError::SlotOutOfBounds(spec) => {
                write!(f, "Slot {spec} extends outside the grid")
            }
            GridConfigError::TooManyCrossings((row, col)) => {
                write!(f, "More than two slots cross at row {row}, column {col}")
            }
            GridConfigError::MultipleOverlaps(a, b) => {
                write!(f, "Slots {a} and {b} share more than one cell")
            }
        }
    }
}

impl std::error::Error for GridConfigError {}

/// A struct holding references to all of the information needed as input to a fill operation.
#[derive(Clone, Copy)]
pub struct GridConfig<'a> {
    /// The vocabulary used to fill the grid; see `word_list.rs`.
    pub word_list: &'a WordList,

    /// Config representing all of the slots in the grid and their crossings.
    pub slot_configs: &'a [SlotConfig],

    /// A flat array, in order of row and then column, that's true for every cell that can hold a
    /// letter. Only used for rendering.
    pub open_cells: &'a [bool],

    /// The width and height of the grid.
    pub width: usize,
    pub height: usize,
}

impl<'a> GridConfig<'a> {
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// Where do slots `x` and `y` share a cell? The result is `(index in x, index in y)`.
    #[must_use]
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        if x == y {
            return None;
        }

        self.slot_configs[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == y => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// The ids of the slots crossing `slot_id`.
    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> SmallVec<[SlotId; MAX_SLOT_LENGTH]> {
        self.slot_configs[slot_id].neighbors()
    }

    /// Find the id of the slot matching the given spec.
    #[must_use]
    pub fn slot_id(&self, spec: &SlotSpec) -> Option<SlotId> {
        self.slot_configs
            .iter()
            .find(|slot_config| slot_config.slot_spec() == *spec)
            .map(|slot_config| slot_config.id)
    }
}

/// A struct that owns a copy of each piece of information needed by `GridConfig`.
#[derive(Debug, Clone)]
pub struct OwnedGridConfig {
    pub word_list: WordList,
    pub slot_configs: Vec<SlotConfig>,
    pub open_cells: Vec<bool>,
    pub width: usize,
    pub height: usize,
}

impl OwnedGridConfig {
    /// Build a config from explicit slot specs. Cells not covered by any slot are treated as blocks.
    pub fn new(
        word_list: WordList,
        entries: &[SlotSpec],
        width: usize,
        height: usize,
    ) -> Result<OwnedGridConfig, GridConfigError> {
        let mut open_cells = vec![false; width * height];

        for entry in entries {
            for (row, col) in entry.cell_coords() {
                if row >= height || col >= width {
                    return Err(GridConfigError::SlotOutOfBounds(entry.clone()));
                }
                open_cells[row * width + col] = true;
            }
        }

        Ok(OwnedGridConfig {
            word_list,
            slot_configs: generate_slot_configs(entries)?,
            open_cells,
            width,
            height,
        })
    }

    /// Build a config from a template string with `.` or `_` representing open cells and `#` or `█`
    /// representing blocks.
    pub fn from_template(
        word_list: WordList,
        template: &str,
    ) -> Result<OwnedGridConfig, GridConfigError> {
        let ParsedTemplate {
            slot_specs,
            open_cells,
            width,
            height,
        } = parse_template(template)?;

        Ok(OwnedGridConfig {
            word_list,
            slot_configs: generate_slot_configs(&slot_specs)?,
            open_cells,
            width,
            height,
        })
    }

    #[must_use]
    pub fn to_config_ref(&self) -> GridConfig {
        GridConfig {
            word_list: &self.word_list,
            slot_configs: &self.slot_configs,
            open_cells: &self.open_cells,
            width: self.width,
            height: self.height,
        }
    }
}

/// Given `SlotSpec`s specifying the positions of the slots in a grid, generate `SlotConfig`s
/// containing derived information about crossings.
pub fn generate_slot_configs(entries: &[SlotSpec]) -> Result<Vec<SlotConfig>, GridConfigError> {
    let mut seen_entries: HashSet<&SlotSpec> = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.length == 0 {
            return Err(GridConfigError::ZeroLengthSlot(entry.clone()));
        }
        if !seen_entries.insert(entry) {
            return Err(GridConfigError::DuplicateSlot(entry.clone()));
        }
    }

    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings. Each value is a list of (entry index, cell index within entry).
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().into_iter().enumerate() {
            let cell_entries = entries_by_loc.entry(loc).or_default();
            cell_entries.push((entry_idx, cell_idx));
            if cell_entries.len() > 2 {
                return Err(GridConfigError::TooManyCrossings(loc));
            }
        }
    }

    let mut slot_configs: Vec<SlotConfig> = Vec::with_capacity(entries.len());

    for (entry_idx, entry) in entries.iter().enumerate() {
        let crossings: Vec<Option<Crossing>> = entry
            .cell_coords()
            .iter()
            .map(|loc| {
                entries_by_loc[loc]
                    .iter()
                    .find(|&&(other_idx, _)| other_idx != entry_idx)
                    .map(|&(other_slot_id, other_slot_cell)| Crossing {
                        other_slot_id,
                        other_slot_cell,
                    })
            })
            .collect();

        // A pair of slots may only share a single cell; otherwise there's no single overlap to
        // speak of (e.g. two across slots running over the same cells).
        let mut crossed_slot_ids: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = SmallVec::new();
        for crossing in crossings.iter().flatten() {
            if crossed_slot_ids.contains(&crossing.other_slot_id) {
                return Err(GridConfigError::MultipleOverlaps(
                    entry.clone(),
                    entries[crossing.other_slot_id].clone(),
                ));
            }
            crossed_slot_ids.push(crossing.other_slot_id);
        }

        slot_configs.push(SlotConfig {
            id: entry_idx,
            start_cell: entry.start_cell,
            direction: entry.direction,
            length: entry.length,
            crossings,
        });
    }

    Ok(slot_configs)
}

/// The result of reading a template string: the slots it contains and which cells are open.
#[derive(Debug)]
pub struct ParsedTemplate {
    pub slot_specs: Vec<SlotSpec>,
    pub open_cells: Vec<bool>,
    pub width: usize,
    pub height: usize,
}

/// Read a template string with `.` or `_` representing open cells and `#` or `█` representing
/// blocks. Every horizontal or vertical run of two or more open cells becomes a slot; across slots
/// come first, then down slots, each in reading order.
pub fn parse_template(template: &str) -> Result<ParsedTemplate, GridConfigError> {
    let lines: Vec<Vec<char>> = template
        .lines()
        .map(|line| line.trim().nfc().collect::<Vec<char>>())
        .collect();

    // Blank lines around the grid are ignored; a blank line inside it is a ragged row.
    let (Some(first), Some(last)) = (
        lines.iter().position(|line| !line.is_empty()),
        lines.iter().rposition(|line| !line.is_empty()),
    ) else {
        return Err(GridConfigError::EmptyTemplate);
    };
    let rows = &lines[first..=last];
    let first_row = &rows[0];
    let width = first_row.len();
    let height = rows.len();

    let mut open_cells: Vec<bool> = Vec::with_capacity(width * height);
    for (row, line) in rows.iter().enumerate() {
        if line.len() != width {
            return Err(GridConfigError::RaggedTemplate { row });
        }
        for (col, &found) in line.iter().enumerate() {
            open_cells.push(match found {
                '.' | '_' => true,
                '#' | '█' => false,
                _ => return Err(GridConfigError::InvalidCharacter { row, col, found }),
            });
        }
    }

    // Collect runs of open cells along one axis, yielding (start, length) pairs in the order the
    // cells are visited.
    fn runs(cells: impl Iterator<Item = (GridCoord, bool)>) -> Vec<(GridCoord, usize)> {
        let mut result = vec![];
        let mut current: Option<(GridCoord, usize)> = None;

        for (loc, open) in cells {
            if open {
                match current.as_mut() {
                    Some((_, length)) => *length += 1,
                    None => current = Some((loc, 1)),
                }
            } else if let Some(run) = current.take().filter(|&(_, length)| length > 1) {
                result.push(run);
            }
        }
        if let Some(run) = current.filter(|&(_, length)| length > 1) {
            result.push(run);
        }

        result
    }

    let is_open = |row: usize, col: usize| open_cells[row * width + col];
    let mut slot_specs: Vec<SlotSpec> = vec![];

    for row in 0..height {
        let cells = (0..width).map(|col| ((row, col), is_open(row, col)));
        for (start_cell, length) in runs(cells) {
            slot_specs.push(SlotSpec {
                start_cell,
                direction: Direction::Across,
                length,
            });
        }
    }

    let mut down_specs: Vec<SlotSpec> = vec![];
    for col in 0..width {
        let cells = (0..height).map(|row| ((row, col), is_open(row, col)));
        for (start_cell, length) in runs(cells) {
            down_specs.push(SlotSpec {
                start_cell,
                direction: Direction::Down,
                length,
            });
        }
    }
    down_specs.sort_by_key(|spec| spec.start_cell);
    slot_specs.extend(down_specs);

    Ok(ParsedTemplate {
        slot_specs,
        open_cells,
        width,
        height,
    })
}

/// Lay the given assignment out on the grid. Cells that aren't covered by an assigned slot are
/// `None`.
#[must_use]
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; config.width]; config.height];

    for (slot_id, word_id) in assignment.iter() {
        let slot_config = &config.slot_configs[slot_id];
        let word = config.word_list.word(word_id);

        for (&(row, col), &letter) in slot_config.cell_coords().iter().zip(&word.chars) {
            letters[row][col] = Some(letter);
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, with `#` for blocks and `.`
/// for open cells that have no letter.
#[must_use]
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    letter_grid(config, assignment)
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Some(letter) => *letter,
                    None if config.open_cells[row * config.width + col] => '.',
                    None => '#',
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::grid_config::{Direction, SlotSpec};

    #[test]
    fn test_slot_spec_serialization() {
        let slot_spec = SlotSpec::new(1, 2, Direction::Across, 5);

        let slot_key = serde_json::to_string(&slot_spec).unwrap();

        assert_eq!(slot_key, "\"1,2,across,5\"");
    }

    #[test]
    fn test_slot_spec_deserialization() {
        let slot_spec: SlotSpec = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(slot_spec, SlotSpec::new(3, 4, Direction::Down, 12));
    }
}
