use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use std::{fmt, fs};
use unicode_normalization::UnicodeNormalization;

use crate::types::WordId;
use crate::MAX_SLOT_LENGTH;

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word exactly as it will appear in the grid.
    pub string: String,

    /// The characters making up `string`, so that the engine can compare letters by cell index
    /// without re-walking the string.
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The number of cells this word occupies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Given a word as it appears in a word list file, turn it into the form we'll put in the grid:
/// lowercased, NFC-normalized, with whitespace removed.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    InvalidPath(String),
    InvalidWord(String),
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordListError::InvalidPath(path) => write!(f, "Can’t read file: “{path}”"),
            WordListError::InvalidWord(word) => {
                write!(f, "Word list contains invalid word: “{word}”")
            }
        }
    }
}

impl std::error::Error for WordListError {}

/// The vocabulary available to a fill. Words are interned in the order they're first seen, so a
/// `WordId` is stable for the lifetime of the list and iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// All loaded words, indexed by `WordId`.
    pub words: Vec<Word>,

    /// A map from a word's string to the id of the `Word` representing it.
    pub word_id_by_string: HashMap<String, WordId>,

    /// Entries that were skipped while loading, e.g. because they were empty.
    pub errors: Vec<WordListError>,
}

impl WordList {
    /// Build a word list from in-memory entries, taking each one verbatim. Exact duplicates are
    /// skipped.
    pub fn from_words<I, S>(entries: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut instance = WordList::default();
        for entry in entries {
            instance.add_word(entry.as_ref());
        }
        instance
    }

    /// Load a word list file with one entry per line. Anything after a `;` on a line (such as the
    /// score column of a scored list) is ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;

        Ok(WordList::from_file_contents(&contents))
    }

    /// Parse the contents of a word list file; see `from_file`. Unlike `from_words`, each entry
    /// goes through `normalize_word`, so `Ice Cream` and `icecream` are the same word.
    #[must_use]
    pub fn from_file_contents(contents: &str) -> WordList {
        let mut instance = WordList::default();

        for line in contents.lines() {
            let normalized = normalize_word(line.split(';').next().unwrap_or_default());
            if !normalized.is_empty() {
                instance.add_word(&normalized);
            }
        }

        instance
    }

    /// Add a single entry as-is, returning its id. If the exact string is already present, the
    /// existing id is returned; an empty entry is recorded as an error and `None` is returned.
    pub fn add_word(&mut self, word: &str) -> Option<WordId> {
        if word.is_empty() {
            self.errors.push(WordListError::InvalidWord(String::new()));
            return None;
        }

        if let Some(&word_id) = self.word_id_by_string.get(word) {
            return Some(word_id);
        }

        let word_id = self.words.len();
        self.words.push(Word {
            string: word.to_string(),
            chars: word.chars().collect(),
        });
        self.word_id_by_string.insert(word.to_string(), word_id);

        Some(word_id)
    }

    #[must_use]
    pub fn get_word_id(&self, word: &str) -> Option<WordId> {
        self.word_id_by_string.get(word).copied()
    }

    /// Borrow an existing word using its id.
    #[must_use]
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The length of the longest word in the list, if any.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.words.iter().map(Word::len).max()
    }

    /// Iterate over `(WordId, &Word)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}
