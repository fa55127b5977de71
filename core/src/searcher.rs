//! The query engine: evaluates boolean keyword queries against the
//! on-disk `.index`/`.qindex` pair via binary search, without ever
//! loading the index into memory.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use byteorder::{BigEndian, ReadBytesExt};
use parking_lot::Mutex;

use crate::db::Database;
use crate::doc::{Doc, DocCatalog};
use crate::error::Result;
use crate::index::{read_index_header, read_line_trimmed, Word};
use crate::postings::PostingList;
use crate::stoplist::StopList;

/// How the next query word's documents get merged into the result.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BooleanMode {
    Or,
    And,
    Not,
}

/// Searches an already-built database.
///
/// A searcher is cheap to share: `search` takes `&self`, and concurrent
/// queries each open their own read-only handles to the index files.
pub struct Searcher {
    db: Database,
    stop_list: StopList,
    stopped_words: Mutex<Vec<String>>,
    index_reads: AtomicU64,
}

impl Searcher {
    /// Open a searcher over `db` with no stop list.
    pub fn new(db: Database) -> Result<Searcher> {
        Self::with_stop_list(db, StopList::empty())
    }

    /// Open a searcher over `db`, dropping query words on `stop_list`.
    ///
    /// The `.index` file's magic header is verified up front, so a
    /// database pointed at the wrong files fails here rather than
    /// mid-query.
    pub fn with_stop_list(db: Database, stop_list: StopList) -> Result<Searcher> {
        let mut index = BufReader::new(File::open(&db.index_file)?);
        read_index_header(&mut index, &db.index_file.display().to_string())?;
        Ok(Searcher {
            db,
            stop_list,
            stopped_words: Mutex::new(Vec::new()),
            index_reads: AtomicU64::new(0),
        })
    }

    /// Evaluate a boolean keyword query.
    ///
    /// The query is words separated by spaces, optionally joined by the
    /// control keywords `and`, `or` and `not` (`not` means "and not").
    /// Words are processed left to right: a control keyword sets the
    /// mode used to merge the *next* word's documents into the running
    /// result, and the mode resets to OR after every ordinary word. So
    /// `foo and bar or baz not mumble` finds the documents containing
    /// "foo", intersects with those containing "bar", adds those
    /// containing "baz", then removes those containing "mumble".
    ///
    /// Because `not` means "and not", a query that *starts* with `not`
    /// subtracts from a still-empty result and so matches nothing:
    /// `not foo` alone returns no documents. Inherited behavior, kept
    /// as documented.
    ///
    /// Returns the matching documents in ascending ID order, or
    /// `Ok(None)` when nothing matched (including an empty query).
    /// Query words dropped as stop words are reported through
    /// [`Searcher::stopped_words`].
    pub fn search(&self, query: &str) -> Result<Option<Vec<Doc>>> {
        let mut stopped = Vec::new();
        let result = self.eval(query, &mut stopped)?;
        if !stopped.is_empty() {
            tracing::debug!(words = ?stopped, "discarded stop words from query");
        }
        *self.stopped_words.lock() = stopped;

        if result.is_empty() {
            return Ok(None);
        }
        Ok(Some(DocCatalog::fetch(&self.db, &result)?))
    }

    /// Stop words dropped from the most recent search on this handle.
    pub fn stopped_words(&self) -> Vec<String> {
        self.stopped_words.lock().clone()
    }

    /// Total number of index probes this searcher has performed. One
    /// probe is one `.qindex` offset plus one `.index` line. Diagnostic
    /// instrumentation only.
    pub fn index_reads(&self) -> u64 {
        self.index_reads.load(AtomicOrdering::Relaxed)
    }

    /// The database this searcher reads.
    pub fn db(&self) -> &Database {
        &self.db
    }

    fn eval(&self, query: &str, stopped: &mut Vec<String>) -> Result<PostingList> {
        let mut result = PostingList::new();
        if query.trim().is_empty() {
            return Ok(result);
        }

        // One reader pair serves the whole query and is released on
        // every exit path, success or error.
        let mut reader = IndexReader::open(&self.db)?;

        let mut mode = BooleanMode::Or;
        let mut only_stop_words = true; // no ordinary word processed yet

        for keyword in query.split_whitespace() {
            let keyword = keyword.to_lowercase();

            // Control keywords set the mode and consume the token.
            match keyword.as_str() {
                "or" => {
                    mode = BooleanMode::Or;
                    continue;
                }
                "and" => {
                    mode = BooleanMode::And;
                    continue;
                }
                "not" => {
                    mode = BooleanMode::Not;
                    continue;
                }
                _ => {}
            }

            if self.stop_list.is_stop_word(&keyword) {
                stopped.push(keyword);
                continue;
            }

            let word = self.lookup(&mut reader, &keyword)?;

            match mode {
                BooleanMode::And => match word {
                    None => {
                        // ANDing with an absent word leaves nothing.
                        tracing::debug!(%keyword, "AND with an absent word; clearing result");
                        result.clear();
                    }
                    Some(w) => {
                        if only_stop_words {
                            // Nothing real accumulated yet; intersecting
                            // against the empty set would lose these hits.
                            result = w.postings;
                        } else {
                            result.intersect_with(&w.postings);
                        }
                    }
                },
                BooleanMode::Not => {
                    if let Some(w) = word {
                        result.intersect_with_not(&w.postings);
                    }
                }
                BooleanMode::Or => {
                    if let Some(w) = word {
                        result.union_with(&w.postings);
                    }
                }
            }

            // OR is implied when no control keyword precedes a word.
            mode = BooleanMode::Or;
            only_stop_words = false;
        }

        Ok(result)
    }

    /// Binary-search the on-disk index for `keyword`. Each probe costs
    /// one `.qindex` read and one `.index` line; at most
    /// ceil(log2 n) + 1 probes over n words. An exact match reads the
    /// posting list in place and returns the loaded [`Word`].
    fn lookup(&self, reader: &mut IndexReader, keyword: &str) -> Result<Option<Word>> {
        let mut probes: u64 = 0;
        let mut found = None;

        if reader.num_words > 0 {
            let mut lo: i64 = 0;
            let mut hi: i64 = reader.num_words as i64 - 1;
            while lo <= hi {
                let mid = (lo + hi) / 2;
                let mid_word = reader.word_at(mid as u64)?;
                probes += 1;
                match keyword.cmp(mid_word.as_str()) {
                    Ordering::Equal => {
                        // The index reader is already positioned at this
                        // word's posting list.
                        let postings = PostingList::read_from(&mut reader.index)?;
                        found = Some(Word {
                            text: keyword.to_string(),
                            postings,
                        });
                        break;
                    }
                    Ordering::Less => hi = mid - 1,
                    Ordering::Greater => lo = mid + 1,
                }
            }
        }

        self.index_reads.fetch_add(probes, AtomicOrdering::Relaxed);
        tracing::debug!(%keyword, probes, found = found.is_some(), "index lookup");
        Ok(found)
    }
}

/// Read-only handles to one database's `.index`/`.qindex` pair, scoped
/// to a single query.
struct IndexReader {
    index: BufReader<File>,
    qindex: File,
    num_words: u64,
}

impl IndexReader {
    fn open(db: &Database) -> Result<IndexReader> {
        let index = BufReader::new(File::open(&db.index_file)?);
        let qindex = File::open(&db.qindex_file)?;
        let num_words = qindex.metadata()?.len() / 4;
        Ok(IndexReader {
            index,
            qindex,
            num_words,
        })
    }

    /// The word at the Nth index position: one 4-byte read from the
    /// qindex file, one line from the index file. Leaves the index
    /// reader positioned at the word's posting list.
    fn word_at(&mut self, n: u64) -> Result<String> {
        self.qindex.seek(SeekFrom::Start(n * 4))?;
        let index_pos = self.qindex.read_u32::<BigEndian>()?;
        self.index.seek(SeekFrom::Start(u64::from(index_pos)))?;
        read_line_trimmed(&mut self.index)
    }
}
