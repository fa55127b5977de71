//! Database metadata and the on-disk file layout.
//!
//! A JavaSearch database is five files sharing a base name:
//!
//! | file              | contents                                   |
//! |-------------------|--------------------------------------------|
//! | `<name>.dbinfo`   | human-readable database description        |
//! | `<name>.index`    | inverted word index                        |
//! | `<name>.qindex`   | 4-byte offsets into the `.index` file      |
//! | `<name>.docs`     | the document records                       |
//! | `<name>.docindex` | 4-byte offsets into the `.docs` file       |
//!
//! The `.qindex`/`.docindex` offset arrays make the Nth variable-length
//! record of their partner file reachable in one seek, which is what
//! lets the searcher binary-search the `.index` file directly on disk.

use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::doc::Doc;
use crate::error::{Result, SearchError};

const DBINFO_HEADER: &str = "JavaSearch Database info file";

/// Names and owns the five on-disk files of one database, plus the
/// metadata stored in its `.dbinfo` file.
pub struct Database {
    /// Name of this database; also the file-name prefix.
    pub name: String,
    /// Pathname prefix for document files. A document's absolute path
    /// is this prefix followed by the doc's filename. May be empty,
    /// never absent.
    pub doc_path_prefix: String,
    /// URL prefix for documents. `None` means documents in this
    /// database have no meaningful URLs.
    pub doc_url_prefix: Option<String>,
    /// Human-readable description of this database.
    pub description: String,

    pub dbinfo_file: PathBuf,
    pub index_file: PathBuf,
    pub qindex_file: PathBuf,
    pub docs_file: PathBuf,
    pub docindex_file: PathBuf,
}

impl Database {
    fn named(name: &str) -> Database {
        Database {
            name: name.to_string(),
            doc_path_prefix: String::new(),
            doc_url_prefix: None,
            description: String::new(),
            dbinfo_file: PathBuf::from(format!("{name}.dbinfo")),
            index_file: PathBuf::from(format!("{name}.index")),
            qindex_file: PathBuf::from(format!("{name}.qindex")),
            docs_file: PathBuf::from(format!("{name}.docs")),
            docindex_file: PathBuf::from(format!("{name}.docindex")),
        }
    }

    /// Create a brand-new database. Only derives the file names; nothing
    /// is written until `save_info_file` and the index/catalog writers
    /// run.
    pub fn create_new(name: &str) -> Database {
        tracing::info!(name, "creating a new database");
        Self::named(name)
    }

    /// Open an already-existing database by reading its `.dbinfo` file.
    pub fn open(name: &str) -> Result<Database> {
        let mut db = Self::named(name);
        db.read_info_file()?;
        Ok(db)
    }

    /// Write the `.dbinfo` file: five physical lines in fixed order.
    pub fn save_info_file(&self) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.dbinfo_file)?);
        writeln!(out, "{DBINFO_HEADER}")?;
        writeln!(out, "dbName:{}", self.name)?;
        writeln!(out, "docPathPrefix:{}", self.doc_path_prefix)?;
        writeln!(out, "docURLPrefix:{}", self.doc_url_prefix.as_deref().unwrap_or(""))?;
        writeln!(out, "description:{}", self.description)?;
        out.flush()?;
        Ok(())
    }

    /// Read the `.dbinfo` file.
    ///
    /// The format is positional: the header line is skipped and the next
    /// four lines are parsed by stripping everything up to and including
    /// the first ':'. A file with fewer than five lines is rejected as
    /// corrupt. An empty `docURLPrefix` value means "absent".
    fn read_info_file(&mut self) -> Result<()> {
        let label = self.dbinfo_file.display().to_string();
        let mut lines = BufReader::new(File::open(&self.dbinfo_file)?).lines();
        let mut next_line = move || -> Result<String> {
            match lines.next() {
                Some(line) => Ok(line?),
                None => Err(SearchError::CorruptMetadata(label.clone())),
            }
        };

        next_line()?; // header line
        next_line()?; // dbName line; informational only, the opened name wins

        self.doc_path_prefix = strip_field(&next_line()?);

        let url_prefix = strip_field(&next_line()?);
        self.doc_url_prefix = if url_prefix.is_empty() { None } else { Some(url_prefix) };

        self.description = strip_field(&next_line()?);
        Ok(())
    }

    /// Size in bytes of this database's on-disk index
    /// (`.index` + `.qindex`).
    pub fn index_size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.index_file)?.len() + fs::metadata(&self.qindex_file)?.len())
    }

    /// Total size in bytes of all five database files.
    pub fn total_size(&self) -> Result<u64> {
        Ok(self.index_size()?
            + fs::metadata(&self.dbinfo_file)?.len()
            + fs::metadata(&self.docs_file)?.len()
            + fs::metadata(&self.docindex_file)?.len())
    }

    /// Absolute pathname of `doc`: the path prefix plus the filename.
    pub fn doc_path(&self, doc: &Doc) -> String {
        format!("{}{}", self.doc_path_prefix, doc.filename)
    }

    /// Absolute URL of `doc`, if this database carries URL information.
    pub fn doc_url(&self, doc: &Doc) -> Option<String> {
        self.doc_url_prefix
            .as_ref()
            .map(|prefix| format!("{prefix}{}", doc.filename))
    }
}

/// Everything after the first ':' of a `.dbinfo` line; lines without a
/// ':' pass through whole.
fn strip_field(line: &str) -> String {
    match line.find(':') {
        Some(i) => line[i + 1..].to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("docs-db").to_string_lossy().into_owned();

        let mut db = Database::create_new(&name);
        db.doc_path_prefix = "/usr/doc/".to_string();
        db.doc_url_prefix = Some("http://example.com/doc/".to_string());
        db.description = "All the documentation".to_string();
        db.save_info_file().unwrap();

        let back = Database::open(&name).unwrap();
        assert_eq!(back.name, name);
        assert_eq!(back.doc_path_prefix, "/usr/doc/");
        assert_eq!(back.doc_url_prefix.as_deref(), Some("http://example.com/doc/"));
        assert_eq!(back.description, "All the documentation");
    }

    #[test]
    fn empty_url_prefix_reads_back_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("nourl-db").to_string_lossy().into_owned();

        let mut db = Database::create_new(&name);
        db.doc_path_prefix = "".to_string();
        db.description = "No URLs here".to_string();
        db.save_info_file().unwrap();

        let back = Database::open(&name).unwrap();
        assert_eq!(back.doc_path_prefix, "");
        assert!(back.doc_url_prefix.is_none());
    }

    #[test]
    fn truncated_info_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("bad-db").to_string_lossy().into_owned();
        std::fs::write(
            format!("{name}.dbinfo"),
            "JavaSearch Database info file\ndbName:bad-db\n",
        )
        .unwrap();

        match Database::open(&name) {
            Err(SearchError::CorruptMetadata(_)) => {}
            other => panic!("expected CorruptMetadata, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_info_file_is_an_io_error() {
        match Database::open("/no/such/database") {
            Err(SearchError::Io(_)) => {}
            other => panic!("expected Io, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn prefixes_resolve_document_locations() {
        let mut db = Database::create_new("db");
        db.doc_path_prefix = "/docs/".to_string();
        let doc = Doc {
            id: 0,
            filename: "guide.txt".to_string(),
            headline: "Guide".to_string(),
        };
        assert_eq!(db.doc_path(&doc), "/docs/guide.txt");
        assert_eq!(db.doc_url(&doc), None);

        db.doc_url_prefix = Some("http://example.com/".to_string());
        assert_eq!(db.doc_url(&doc).as_deref(), Some("http://example.com/guide.txt"));
    }
}
