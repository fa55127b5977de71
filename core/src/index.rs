//! The in-memory word/doc inverted index, used only while BUILDING a
//! database. Searches never touch this type: the searcher reads the
//! on-disk `.index`/`.qindex` pair directly.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::db::Database;
use crate::doc::Doc;
use crate::error::{Result, SearchError};
use crate::postings::PostingList;
use crate::stoplist::StopList;

/// Header ('magic number') line at the top of `.index` files.
pub const INDEX_FILE_HEADER: &str = "JavaSearch-index";

/// Shortest word that gets indexed, unless overridden.
pub const DEFAULT_MIN_WORD_LEN: usize = 2;

/// One index entry: a word and the documents it appears in.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub postings: PostingList,
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word '{}'\tdocs", self.text)?;
        for id in self.postings.ids() {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}

/// Accumulates word -> posting-list mappings while scanning documents,
/// then serializes itself to a database's `.index`/`.qindex` files.
///
/// Entries live in a `BTreeMap`, so they are always in the ascending
/// lexicographic order the on-disk format requires; there is no separate
/// sort pass.
pub struct Index {
    entries: BTreeMap<String, PostingList>,
    stop_list: StopList,
    min_word_len: usize,
}

impl Index {
    /// Create a new, empty index.
    pub fn new(stop_list: StopList) -> Self {
        Index {
            entries: BTreeMap::new(),
            stop_list,
            min_word_len: DEFAULT_MIN_WORD_LEN,
        }
    }

    pub fn with_min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len;
        self
    }

    /// Associate every acceptable word produced by `words` with `doc`.
    ///
    /// Words shorter than the minimum length and stop words are dropped,
    /// and a word is indexed at most once per document, enforced by a
    /// per-document seen-set.
    pub fn add_document<I>(&mut self, doc: &Doc, words: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen_in_doc: HashSet<String> = HashSet::new();
        for word in words {
            if word.chars().count() < self.min_word_len || self.stop_list.is_stop_word(&word) {
                continue;
            }
            if !seen_in_doc.insert(word.clone()) {
                continue;
            }
            self.entries.entry(word).or_default().append(doc.id);
        }
    }

    /// Number of distinct words in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the `.index` and `.qindex` files for database `db`.
    ///
    /// The `.index` file holds the header line, then one record per word
    /// in ascending order: the word as a text line followed by its
    /// posting list. The `.qindex` file gets one 4-byte big-endian
    /// offset per record, pointing at the record's start in `.index`.
    ///
    /// Returns the size in bytes of the `.index` file.
    pub fn save_as(&self, db: &Database) -> Result<u64> {
        let mut out = BufWriter::new(File::create(&db.index_file)?);
        let mut qout = BufWriter::new(File::create(&db.qindex_file)?);

        out.write_all(INDEX_FILE_HEADER.as_bytes())?;
        out.write_all(b"\n")?;
        let mut out_pos = INDEX_FILE_HEADER.len() as u64 + 1;

        for (text, postings) in &self.entries {
            qout.write_u32::<BigEndian>(out_pos as u32)?;
            out.write_all(text.as_bytes())?;
            out.write_all(b"\n")?;
            postings.write_to(&mut out)?;
            out_pos += text.len() as u64 + 1 + postings.encoded_len();
        }

        out.flush()?;
        qout.flush()?;
        tracing::info!(bytes = out_pos, words = self.entries.len(), "wrote index file");
        Ok(out_pos)
    }
}

/// Read and validate the magic header line of an `.index` file.
pub fn read_index_header<R: BufRead>(input: &mut R, file: &str) -> Result<()> {
    let header = read_line_trimmed(input)?;
    if header != INDEX_FILE_HEADER {
        return Err(SearchError::BadFileHeader {
            file: file.to_string(),
            expected: INDEX_FILE_HEADER,
        });
    }
    Ok(())
}

/// Read one word entry from a reader positioned at the start of an
/// entry. Returns `None` at end of file. Used for sequential dumps; the
/// searcher seeks records through `.qindex` instead.
pub fn read_entry<R: BufRead>(input: &mut R) -> Result<Option<Word>> {
    let mut text = String::new();
    if input.read_line(&mut text)? == 0 {
        return Ok(None);
    }
    if text.ends_with('\n') {
        text.pop();
    }
    let postings = PostingList::read_from(input)?;
    Ok(Some(Word { text, postings }))
}

/// Read one newline-terminated line, without the terminator.
pub(crate) fn read_line_trimmed<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u32) -> Doc {
        Doc {
            id,
            filename: format!("doc{id}.txt"),
            headline: format!("doc{id}.txt"),
        }
    }

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn rejects_short_and_stop_words() {
        let dir = tempfile::tempdir().unwrap();
        let stop = dir.path().join("stop.txt");
        std::fs::write(&stop, "the\n").unwrap();

        let mut index = Index::new(StopList::from_file(&stop));
        index.add_document(&doc(0), words(&["a", "the", "ox", "database"]));
        assert_eq!(index.len(), 2); // "ox" and "database"
    }

    #[test]
    fn indexes_a_word_once_per_document() {
        let mut index = Index::new(StopList::empty());
        index.add_document(&doc(0), words(&["rust", "rust", "rust"]));
        index.add_document(&doc(1), words(&["rust"]));

        let dir = tempfile::tempdir().unwrap();
        let db = Database::create_new(&dir.path().join("db").to_string_lossy());
        index.save_as(&db).unwrap();

        let mut reader = std::io::BufReader::new(File::open(&db.index_file).unwrap());
        read_index_header(&mut reader, "test").unwrap();
        let entry = read_entry(&mut reader).unwrap().unwrap();
        assert_eq!(entry.text, "rust");
        assert_eq!(entry.postings.ids(), &[0, 1]);
        assert!(read_entry(&mut reader).unwrap().is_none());
    }

    #[test]
    fn entries_are_written_in_lexicographic_order() {
        let mut index = Index::new(StopList::empty());
        index.add_document(&doc(0), words(&["zebra", "apple", "mango"]));

        let dir = tempfile::tempdir().unwrap();
        let db = Database::create_new(&dir.path().join("db").to_string_lossy());
        index.save_as(&db).unwrap();

        let mut reader = std::io::BufReader::new(File::open(&db.index_file).unwrap());
        read_index_header(&mut reader, "test").unwrap();
        let mut seen = Vec::new();
        while let Some(entry) = read_entry(&mut reader).unwrap() {
            seen.push(entry.text);
        }
        assert_eq!(seen, vec!["apple", "mango", "zebra"]);
    }
}
