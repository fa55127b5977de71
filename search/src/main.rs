use anyhow::Result;
use clap::Parser;
use javasearch::{Database, Searcher, StopList};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;
use std::time::Instant;

/// Command-line interface for searching a JavaSearch database.
#[derive(Parser)]
#[command(name = "javasearch")]
#[command(about = "Search a JavaSearch database", long_about = None)]
struct Args {
    /// Database name (file-name prefix of the five database files)
    #[arg(long)]
    db: String,
    /// Stop-list file; should match the one used when indexing
    #[arg(long)]
    stoplist: Option<PathBuf>,
    /// Emit results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Query words, including the optional keywords "and", "or", "not"
    #[arg(required = true)]
    words: Vec<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let db = Database::open(&args.db)?;
    let stop_list = match &args.stoplist {
        Some(path) => StopList::from_file(path),
        None => StopList::empty(),
    };
    let searcher = Searcher::with_stop_list(db, stop_list)?;

    let query = args.words.join(" ");
    let started = Instant::now();
    let results = searcher.search(&query)?;
    let stopped = searcher.stopped_words();
    tracing::info!(
        %query,
        hits = results.as_ref().map_or(0, |docs| docs.len()),
        probes = searcher.index_reads(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search finished"
    );

    if args.json {
        let hits = results.unwrap_or_default();
        let out = json!({
            "query": query,
            "total_hits": hits.len(),
            "stopped_words": stopped,
            "results": hits,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if !stopped.is_empty() {
        println!("Discarded common words: {}", stopped.join(" "));
    }

    match results {
        None => {
            if only_stop_words(&query, &stopped) {
                println!("The query consisted only of ignored common words.");
            } else {
                println!("No documents matched this query!");
            }
        }
        Some(docs) => {
            let db = searcher.db();
            println!(
                "{} matching document{}:",
                docs.len(),
                if docs.len() == 1 { "" } else { "s" }
            );
            for doc in &docs {
                println!("  [{}]\t{}", doc.id, doc.headline);
                println!("\tfile: {}", db.doc_path(doc));
                if let Some(url) = db.doc_url(doc) {
                    println!("\turl:  {url}");
                }
            }
        }
    }
    Ok(())
}

/// True if every non-control word of the query was dropped as a stop
/// word, so the caller can say why there are no results.
fn only_stop_words(query: &str, stopped: &[String]) -> bool {
    let real_words = query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| !matches!(w.as_str(), "and" | "or" | "not"))
        .count();
    real_words > 0 && real_words == stopped.len()
}
