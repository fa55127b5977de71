use std::io;

use thiserror::Error;

/// Errors produced while building or searching a database.
#[derive(Error, Debug)]
pub enum SearchError {
    /// I/O failure on one of the database files. Fatal for the operation
    /// in progress; never retried.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A `.dbinfo` file without the expected five-line shape.
    #[error("corrupt database metadata in '{0}'")]
    CorruptMetadata(String),

    /// A file whose magic header line does not match its format.
    #[error("'{file}' is not a {expected} file")]
    BadFileHeader { file: String, expected: &'static str },

    /// The ID tag of a `.docs` record disagrees with the ID it was
    /// looked up under.
    #[error("doc ID mismatch in docs file: looked up {looked_up}, record is tagged {found}")]
    DocIdMismatch { looked_up: u32, found: u8 },

    /// More documents than the on-disk posting encoding can address.
    #[error("too many documents for one index (max {0})")]
    DocIdSpaceExhausted(u32),
}

pub type Result<T> = std::result::Result<T, SearchError>;
