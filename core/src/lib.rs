//! Library for building and searching JavaSearch databases: an on-disk
//! inverted index made of five files sharing a base name. Indexing is an
//! offline batch job; searching binary-searches the index files directly
//! and never reconstructs the index in memory.

pub mod db;
pub mod doc;
pub mod error;
pub mod index;
pub mod postings;
pub mod searcher;
pub mod stoplist;
pub mod tokenizer;

pub use db::Database;
pub use doc::{Doc, DocCatalog};
pub use error::{Result, SearchError};
pub use index::{Index, Word};
pub use postings::PostingList;
pub use searcher::Searcher;
pub use stoplist::StopList;

/// Document ID, assigned sequentially from zero while indexing.
pub type DocId = u32;

/// Largest document ID the on-disk posting encoding can address: IDs are
/// stored as `id + 1` in a 2-byte code unit, with zero as the terminator.
pub(crate) const MAX_DOC_ID: DocId = (u16::MAX as DocId) - 1;

/// Create a brand-new database with the given name.
pub fn create_database(name: &str) -> Database {
    Database::create_new(name)
}

/// Open an already-existing database by reading its `.dbinfo` file.
pub fn open_database(name: &str) -> Result<Database> {
    Database::open(name)
}
