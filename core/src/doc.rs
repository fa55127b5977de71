//! Documents and the document catalog: the ordered store of document
//! metadata behind the `.docs`/`.docindex` pair.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Result, SearchError};
use crate::index::read_line_trimmed;
use crate::postings::PostingList;
use crate::{DocId, MAX_DOC_ID};

/// Header ('magic number') line at the top of `.docs` files.
pub const DOCS_FILE_HEADER: &str = "JavaSearch-docs";

/// Longest headline we will store.
const HEADLINE_MAX_LEN: usize = 80;

/// One document in a database.
///
/// `filename` is not a full pathname: combine it with the database's
/// `doc_path_prefix` or `doc_url_prefix` for a fully-qualified path or
/// URL. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doc {
    pub id: DocId,
    pub filename: String,
    pub headline: String,
}

/// The ordered collection of indexed documents.
///
/// IDs are dense array indices assigned sequentially from zero, so
/// lookup by ID is O(1) on disk and in memory; no searching is ever
/// needed.
#[derive(Default)]
pub struct DocCatalog {
    docs: Vec<Doc>,
}

impl DocCatalog {
    pub fn new() -> Self {
        DocCatalog { docs: Vec::new() }
    }

    /// Add a document, assigning it the next sequential ID.
    ///
    /// The headline is flattened to a single line and capped at 80
    /// characters; an empty headline becomes `[No Headline]`. Fails
    /// once the on-disk ID space is exhausted.
    pub fn add(&mut self, filename: &str, headline: &str) -> Result<&Doc> {
        let id = self.docs.len() as DocId;
        if id > MAX_DOC_ID {
            return Err(SearchError::DocIdSpaceExhausted(MAX_DOC_ID + 1));
        }

        let mut headline: String = headline
            .chars()
            .filter(|&c| c != '\n' && c != '\r')
            .take(HEADLINE_MAX_LEN)
            .collect();
        if headline.is_empty() {
            headline = "[No Headline]".to_string();
        }
        let filename: String = filename.chars().filter(|&c| c != '\n' && c != '\r').collect();

        self.docs.push(Doc { id, filename, headline });
        Ok(&self.docs[id as usize])
    }

    /// Direct lookup by ID.
    pub fn get(&self, id: DocId) -> Option<&Doc> {
        self.docs.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Doc> {
        self.docs.iter()
    }

    /// Write the `.docs` and `.docindex` files for database `db`.
    ///
    /// Each `.docs` record is a 1-byte ID tag (the low byte of the ID,
    /// redundant but checked when reading), the filename line and the
    /// headline line; `.docindex` gets one 4-byte big-endian offset per
    /// document, indexed directly by doc ID.
    pub fn save_as(&self, db: &Database) -> Result<u64> {
        let mut out = BufWriter::new(File::create(&db.docs_file)?);
        let mut dout = BufWriter::new(File::create(&db.docindex_file)?);

        out.write_all(DOCS_FILE_HEADER.as_bytes())?;
        out.write_all(b"\n")?;
        let mut out_pos = DOCS_FILE_HEADER.len() as u64 + 1;

        for doc in &self.docs {
            dout.write_u32::<BigEndian>(out_pos as u32)?;
            out.write_u8(doc.id as u8)?;
            out.write_all(doc.filename.as_bytes())?;
            out.write_all(b"\n")?;
            out.write_all(doc.headline.as_bytes())?;
            out.write_all(b"\n")?;
            out_pos += 1 + doc.filename.len() as u64 + 1 + doc.headline.len() as u64 + 1;
        }

        out.flush()?;
        dout.flush()?;
        tracing::info!(bytes = out_pos, docs = self.docs.len(), "wrote docs file");
        Ok(out_pos)
    }

    /// Materialize the documents for every ID in `ids`, in ascending ID
    /// order, by direct lookup through the `.docindex` offset array.
    ///
    /// Both files are opened for the duration of this call only and are
    /// released on every exit path.
    pub fn fetch(db: &Database, ids: &PostingList) -> Result<Vec<Doc>> {
        let mut docs_file = BufReader::new(File::open(&db.docs_file)?);
        let mut docindex_file = File::open(&db.docindex_file)?;

        let mut docs = Vec::with_capacity(ids.count());
        for &id in ids.ids() {
            docs.push(fetch_at(&mut docs_file, &mut docindex_file, id)?);
        }
        Ok(docs)
    }

    /// Look up one document by ID, straight from the on-disk files.
    pub fn fetch_one(db: &Database, id: DocId) -> Result<Doc> {
        let mut docs_file = BufReader::new(File::open(&db.docs_file)?);
        let mut docindex_file = File::open(&db.docindex_file)?;
        fetch_at(&mut docs_file, &mut docindex_file, id)
    }
}

/// Resolve one ID through `.docindex` and read its `.docs` record:
/// `docindex[id]` lives at byte offset `4 * id` because IDs are dense
/// array indices.
fn fetch_at(docs_file: &mut BufReader<File>, docindex_file: &mut File, id: DocId) -> Result<Doc> {
    docindex_file.seek(SeekFrom::Start(4 * u64::from(id)))?;
    let docs_pos = docindex_file.read_u32::<BigEndian>()?;
    docs_file.seek(SeekFrom::Start(u64::from(docs_pos)))?;
    read_doc_record(docs_file, id)
}

/// Read one document record; the reader must be positioned at its start.
/// The record's ID tag must agree with the ID it was looked up under.
fn read_doc_record(input: &mut BufReader<File>, id: DocId) -> Result<Doc> {
    let tag = input.read_u8()?;
    if tag != id as u8 {
        return Err(SearchError::DocIdMismatch { looked_up: id, found: tag });
    }
    let filename = read_line_trimmed(input)?;
    let headline = read_line_trimmed(input)?;
    Ok(Doc { id, filename, headline })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_sequential_ids() {
        let mut catalog = DocCatalog::new();
        assert_eq!(catalog.add("a.txt", "A").unwrap().id, 0);
        assert_eq!(catalog.add("b.txt", "B").unwrap().id, 1);
        assert_eq!(catalog.get(1).unwrap().filename, "b.txt");
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn headlines_are_flattened_and_capped() {
        let mut catalog = DocCatalog::new();
        let long = "x".repeat(200);
        assert_eq!(catalog.add("a.txt", &long).unwrap().headline.len(), 80);
        assert_eq!(catalog.add("b.txt", "two\nlines").unwrap().headline, "twolines");
        assert_eq!(catalog.add("c.txt", "").unwrap().headline, "[No Headline]");
    }

    #[test]
    fn fetch_round_trips_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create_new(&dir.path().join("db").to_string_lossy());

        let mut catalog = DocCatalog::new();
        catalog.add("a.txt", "First doc").unwrap();
        catalog.add("b.txt", "Second doc").unwrap();
        catalog.add("c.txt", "Third doc").unwrap();
        catalog.save_as(&db).unwrap();

        let ids: PostingList = [0u32, 2].into_iter().collect();
        let docs = DocCatalog::fetch(&db, &ids).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].filename, "a.txt");
        assert_eq!(docs[0].headline, "First doc");
        assert_eq!(docs[1].filename, "c.txt");

        let one = DocCatalog::fetch_one(&db, 1).unwrap();
        assert_eq!(one.filename, "b.txt");
        assert_eq!(one.headline, "Second doc");
    }

    #[test]
    fn fetch_rejects_a_mismatched_id_tag() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create_new(&dir.path().join("db").to_string_lossy());

        let mut catalog = DocCatalog::new();
        catalog.add("a.txt", "A").unwrap();
        catalog.save_as(&db).unwrap();

        // Corrupt the ID tag of the first record.
        let mut bytes = std::fs::read(&db.docs_file).unwrap();
        let tag_at = DOCS_FILE_HEADER.len() + 1;
        bytes[tag_at] = 9;
        std::fs::write(&db.docs_file, bytes).unwrap();

        let ids: PostingList = [0u32].into_iter().collect();
        match DocCatalog::fetch(&db, &ids) {
            Err(SearchError::DocIdMismatch { looked_up: 0, found: 9 }) => {}
            other => panic!("expected DocIdMismatch, got {other:?}"),
        }
    }
}
