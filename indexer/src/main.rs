use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cpsearch_core::corpus::load_corpus;
use cpsearch_core::tokenizer::tokenize;
use cpsearch_core::{IndexConfig, TfIdfIndex, DEFAULT_TITLE_BOOST, DEFAULT_TOP_K};
use tracing_subscriber::{fmt, EnvFilter};

use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cpsearch-indexer")]
#[command(about = "Build the TF-IDF index in memory and query or inspect it", long_about = None)]
struct Cli {
    /// Corpus file or directory of JSON/JSONL problem records
    #[arg(long, global = true, default_value = "./corpus/all_problems.json")]
    corpus: PathBuf,
    /// Only index the first N records (0 = all)
    #[arg(long, global = true, default_value_t = 0)]
    limit: usize,
    /// How many times a problem title is repeated when indexing
    #[arg(long, global = true, default_value_t = DEFAULT_TITLE_BOOST)]
    title_boost: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank problems against a query and print the top matches
    Query {
        /// Free-text query
        text: String,
        /// Number of results to print
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Print corpus statistics, a document's heaviest terms and term IDFs
    Inspect {
        /// Document whose terms are listed
        #[arg(long, default_value_t = 0)]
        doc: u32,
        /// Number of terms to list
        #[arg(long, default_value_t = 10)]
        terms: usize,
        /// Raw term to report the IDF of (repeatable)
        #[arg(long = "idf")]
        idf: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let index = build_index(&cli)?;

    let report = match cli.command {
        Commands::Query { text, top_k } => query_report(&index, &text, top_k)?,
        Commands::Inspect { doc, terms, idf } => inspect_report(&index, doc, terms, &idf)?,
    };
    print!("{report}");
    Ok(())
}

fn build_index(cli: &Cli) -> Result<TfIdfIndex> {
    let mut problems = load_corpus(&cli.corpus)?;
    if cli.limit > 0 {
        problems.truncate(cli.limit);
    }
    tracing::info!(corpus = %cli.corpus.display(), records = problems.len(), "indexing corpus");
    Ok(TfIdfIndex::build(problems, &IndexConfig { title_boost: cli.title_boost }))
}

fn query_report(index: &TfIdfIndex, text: &str, top_k: usize) -> Result<String> {
    let hits = index.search(text, top_k)?;
    let mut out = String::new();
    writeln!(out, "Query: {text}")?;
    if hits.is_empty() {
        writeln!(out, "No matches found.")?;
        return Ok(out);
    }
    writeln!(out, "Top results:")?;
    for (rank, hit) in hits.iter().enumerate() {
        let Some(doc) = index.document(hit.doc_id) else { continue };
        writeln!(out, "{}. ({:.4}) {} — {} [{}]", rank + 1, hit.score, doc.title(), doc.url(), doc.platform())?;
    }
    Ok(out)
}

fn inspect_report(index: &TfIdfIndex, doc_id: u32, n_terms: usize, idf_terms: &[String]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Documents: {}", index.num_docs())?;
    writeln!(out, "Distinct terms: {}", index.num_terms())?;

    if index.num_docs() > 0 {
        let Some(doc) = index.document(doc_id) else {
            bail!("document {doc_id} out of range (corpus has {} documents)", index.num_docs());
        };
        writeln!(out, "Document {}: {}", doc.id, doc.title())?;
        for (term, weight) in index.top_terms(doc_id, n_terms) {
            writeln!(out, "  {term:<20} {weight:.4}")?;
        }
    }

    for raw in idf_terms {
        let tokens = tokenize(raw);
        if tokens.is_empty() {
            writeln!(out, "IDF for {raw:?}: (stop word or empty)")?;
            continue;
        }
        for term in tokens {
            writeln!(out, "IDF for {raw:?} ({term}): {:.4} (df={})", index.idf(&term), index.doc_frequency(&term))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpsearch_core::Problem;

    fn index() -> TfIdfIndex {
        TfIdfIndex::build(
            vec![
                Problem::new("Binary Search Tree", Some("Find element"), "https://leetcode.com/x"),
                Problem::new("Graph Coloring", Some("Color graph"), "https://codeforces.com/y"),
            ],
            &IndexConfig::default(),
        )
    }

    #[test]
    fn query_report_lists_ranked_titles() {
        let report = query_report(&index(), "binary search", 10).unwrap();
        assert!(report.contains("1. ("));
        assert!(report.contains("Binary Search Tree — https://leetcode.com/x [LeetCode]"));
        assert!(!report.contains("Graph Coloring"));
    }

    #[test]
    fn query_report_without_matches() {
        assert!(query_report(&index(), "knapsack", 10).unwrap().contains("No matches found."));
        assert!(query_report(&index(), "", 10).is_err());
    }

    #[test]
    fn inspect_report_shows_terms_and_idf() {
        let report = inspect_report(&index(), 1, 2, &["Graphs".to_string(), "the".to_string()]).unwrap();
        assert!(report.contains("Documents: 2"));
        assert!(report.contains("Document 1: Graph Coloring"));
        assert!(report.contains("IDF for \"Graphs\" (graph): 0.6931 (df=1)"));
        assert!(report.contains("(stop word or empty)"));
        assert!(inspect_report(&index(), 5, 2, &[]).is_err());
    }
}
