//! Byte-exact checks of the five on-disk file formats over a tiny,
//! hand-computed corpus.

use javasearch::index::Index;
use javasearch::tokenizer::WordStream;
use javasearch::{Database, DocCatalog, StopList};
use tempfile::TempDir;

/// doc 0: "The quick brown fox" in fox.txt
/// doc 1: "The lazy dog" in dog.txt
/// stop word: "the"
///
/// Indexed words, in order: brown, dog, fox, lazy, quick.
fn build_db(dir: &TempDir) -> Database {
    let name = dir.path().join("golden").to_string_lossy().into_owned();

    let mut db = Database::create_new(&name);
    db.doc_path_prefix = "/docs/".to_string();
    db.doc_url_prefix = Some("http://example.com/docs/".to_string());
    db.description = "golden corpus".to_string();

    let stop_path = dir.path().join("stop.txt");
    std::fs::write(&stop_path, "the\n").unwrap();

    let mut index = Index::new(StopList::from_file(&stop_path));
    let mut catalog = DocCatalog::new();
    for (filename, text) in [
        ("fox.txt", "The quick brown fox"),
        ("dog.txt", "The lazy dog"),
    ] {
        let doc = catalog.add(filename, filename).unwrap().clone();
        index.add_document(&doc, WordStream::new(text));
    }

    let index_bytes = index.save_as(&db).unwrap();
    assert_eq!(index_bytes, 62);
    catalog.save_as(&db).unwrap();
    db.save_info_file().unwrap();
    db
}

#[test]
fn index_file_bytes_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    // Header line, then per word: the word line followed by its posting
    // list as big-endian 2-byte code units (id + 1), zero-terminated.
    let expected: &[u8] = b"JavaSearch-index\n\
        brown\n\x00\x01\x00\x00\
        dog\n\x00\x02\x00\x00\
        fox\n\x00\x01\x00\x00\
        lazy\n\x00\x02\x00\x00\
        quick\n\x00\x01\x00\x00";
    assert_eq!(std::fs::read(&db.index_file).unwrap(), expected);
}

#[test]
fn qindex_file_bytes_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    // One 4-byte big-endian offset per word record: 17, 27, 35, 43, 52.
    let expected: &[u8] = b"\x00\x00\x00\x11\x00\x00\x00\x1b\x00\x00\x00\x23\x00\x00\x00\x2b\x00\x00\x00\x34";
    assert_eq!(std::fs::read(&db.qindex_file).unwrap(), expected);
}

#[test]
fn docs_file_bytes_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    // Header line, then per document: 1-byte ID tag, filename line,
    // headline line.
    let expected: &[u8] = b"JavaSearch-docs\n\
        \x00fox.txt\nfox.txt\n\
        \x01dog.txt\ndog.txt\n";
    assert_eq!(std::fs::read(&db.docs_file).unwrap(), expected);
}

#[test]
fn docindex_file_bytes_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    // One 4-byte big-endian offset per document, dense from ID 0:
    // 16 and 33.
    let expected: &[u8] = b"\x00\x00\x00\x10\x00\x00\x00\x21";
    assert_eq!(std::fs::read(&db.docindex_file).unwrap(), expected);
}

#[test]
fn dbinfo_file_lines_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    let expected = format!(
        "JavaSearch Database info file\n\
         dbName:{}\n\
         docPathPrefix:/docs/\n\
         docURLPrefix:http://example.com/docs/\n\
         description:golden corpus\n",
        db.name
    );
    assert_eq!(std::fs::read_to_string(&db.dbinfo_file).unwrap(), expected);
}

#[test]
fn size_queries_add_up() {
    let dir = tempfile::tempdir().unwrap();
    let db = build_db(&dir);

    // .index is 62 bytes and .qindex is 5 offsets.
    assert_eq!(db.index_size().unwrap(), 62 + 20);

    let docs_len = std::fs::metadata(&db.docs_file).unwrap().len();
    let docindex_len = std::fs::metadata(&db.docindex_file).unwrap().len();
    let dbinfo_len = std::fs::metadata(&db.dbinfo_file).unwrap().len();
    assert_eq!(docs_len, 50);
    assert_eq!(docindex_len, 8);
    assert_eq!(
        db.total_size().unwrap(),
        db.index_size().unwrap() + docs_len + docindex_len + dbinfo_len
    );
}
