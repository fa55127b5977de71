//! Stop-word filtering for the indexer and the searcher.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A set of common words excluded from both indexing and querying.
///
/// Always a valid (possibly empty) set: loading from a missing or
/// unreadable file degrades to the empty set instead of failing the
/// caller. Words that are entirely numeric are also treated as stop
/// words.
pub struct StopList {
    words: HashSet<String>,
    stop_numerics: bool,
}

impl StopList {
    /// The empty stop list. All-numeric words are still rejected.
    pub fn empty() -> Self {
        StopList {
            words: HashSet::new(),
            stop_numerics: true,
        }
    }

    /// Load a stop list from a word-list file: one word per line; blank
    /// lines and lines starting with ';' are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mut list = Self::empty();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "no such stop list file; ignoring stop list");
                return list;
            }
        };
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            let word = line.trim();
            if word.is_empty() || word.starts_with(';') {
                continue;
            }
            list.words.insert(word.to_string());
        }
        tracing::debug!(words = list.words.len(), path = %path.display(), "read stop list");
        list
    }

    /// True if `word` should be dropped: on the list, or all-numeric.
    pub fn is_stop_word(&self, word: &str) -> bool {
        (self.stop_numerics && all_numeric(word)) || self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn all_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_numeric())
}
