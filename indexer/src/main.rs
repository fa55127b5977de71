use anyhow::{bail, Context, Result};
use byteorder::{BigEndian, ReadBytesExt};
use clap::{Parser, Subcommand};
use javasearch::index::{read_entry, read_index_header, Index, DEFAULT_MIN_WORD_LEN};
use javasearch::tokenizer::WordStream;
use javasearch::{Database, DocCatalog, StopList};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "javaindex")]
#[command(about = "Build and inspect JavaSearch databases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a database from document files or directories
    Build {
        /// Database name; also the file-name prefix of the output files
        #[arg(long)]
        db: String,
        /// Prefix to strip from stored document filenames
        #[arg(long)]
        trim_prefix: Option<String>,
        /// Pathname prefix recorded for document files
        #[arg(long, default_value = "")]
        file_prefix: String,
        /// URL prefix recorded for documents, if they have URLs
        #[arg(long)]
        url_prefix: Option<String>,
        /// Human-readable database description
        #[arg(long, default_value = "JavaSearch database created with javaindex")]
        description: String,
        /// Stop-list file: one word per line, ';' starts a comment
        #[arg(long)]
        stoplist: Option<PathBuf>,
        /// Shortest word to index
        #[arg(long, default_value_t = DEFAULT_MIN_WORD_LEN)]
        min_word_len: usize,
        /// Files or directories to index (directories are walked)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Dump every entry of a database's index, with its qindex offset
    Dump {
        /// Database name
        #[arg(long)]
        db: String,
    },
    /// Show a database's metadata and file sizes
    Info {
        /// Database name
        #[arg(long)]
        db: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            db,
            trim_prefix,
            file_prefix,
            url_prefix,
            description,
            stoplist,
            min_word_len,
            paths,
        } => build(
            &db,
            trim_prefix.as_deref(),
            file_prefix,
            url_prefix,
            description,
            stoplist.as_deref(),
            min_word_len,
            &paths,
        ),
        Commands::Dump { db } => dump(&db),
        Commands::Info { db } => info(&db),
    }
}

fn build(
    name: &str,
    trim_prefix: Option<&str>,
    file_prefix: String,
    url_prefix: Option<String>,
    description: String,
    stoplist: Option<&Path>,
    min_word_len: usize,
    paths: &[PathBuf],
) -> Result<()> {
    let started = Instant::now();

    let mut db = Database::create_new(name);
    db.doc_path_prefix = file_prefix;
    db.doc_url_prefix = url_prefix;
    db.description = description;

    let stop_list = match stoplist {
        Some(path) => StopList::from_file(path),
        None => StopList::empty(),
    };
    let mut index = Index::new(stop_list).with_min_word_len(min_word_len);
    let mut catalog = DocCatalog::new();

    // Expand directories into the files beneath them.
    let mut files: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.path().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    if files.is_empty() {
        bail!("no files to index");
    }

    let mut documents_size: u64 = 0;
    for file in &files {
        let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        documents_size += bytes.len() as u64;
        let text = String::from_utf8_lossy(&bytes);

        let stored_name = stored_filename(file, trim_prefix);
        // Plain-text documents: the headline is the stored filename.
        let doc = catalog.add(&stored_name, &stored_name)?.clone();
        tracing::info!(file = %file.display(), id = doc.id, headline = %doc.headline, "indexing file");
        index.add_document(&doc, WordStream::new(&text));
    }

    index.save_as(&db)?;
    catalog.save_as(&db)?;
    db.save_info_file()?;

    let index_size = db.index_size()?;
    let total_size = db.total_size()?;
    tracing::info!(
        docs = catalog.len(),
        words = index.len(),
        documents_size,
        index_size,
        total_size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "javaindex finished"
    );
    Ok(())
}

/// The filename a document is stored under: the path itself, minus the
/// trim prefix when it applies.
fn stored_filename(path: &Path, trim_prefix: Option<&str>) -> String {
    let name = path.to_string_lossy().into_owned();
    if let Some(prefix) = trim_prefix {
        if let Some(trimmed) = name.strip_prefix(prefix) {
            return trimmed.to_string();
        }
    }
    name
}

fn dump(name: &str) -> Result<()> {
    let db = Database::open(name)?;

    let mut index = BufReader::new(
        File::open(&db.index_file).with_context(|| format!("opening {}", db.index_file.display()))?,
    );
    read_index_header(&mut index, &db.index_file.display().to_string())?;
    let mut qindex = BufReader::new(File::open(&db.qindex_file)?);

    let mut entries = 0u64;
    while let Some(word) = read_entry(&mut index)? {
        // The qindex entry that should agree with this record.
        let pos = qindex.read_u32::<BigEndian>()?;
        println!("  {pos}:\t{word}");
        entries += 1;
    }
    println!("Total index entries: {entries}.");
    Ok(())
}

fn info(name: &str) -> Result<()> {
    let db = Database::open(name)?;

    println!("Database '{}'", db.name);
    println!("  description:    {}", db.description);
    println!("  docPathPrefix:  '{}'", db.doc_path_prefix);
    match &db.doc_url_prefix {
        Some(prefix) => println!("  docURLPrefix:   '{prefix}'"),
        None => println!("  docURLPrefix:   (none)"),
    }
    println!("  index size:     {} bytes", db.index_size()?);
    println!("  total DB size:  {} bytes", db.total_size()?);
    Ok(())
}
