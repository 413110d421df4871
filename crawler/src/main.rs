mod extract;

use anyhow::{bail, Result};
use clap::Parser;
use cpsearch_core::corpus::{load_corpus, save_corpus};
use cpsearch_core::Problem;
use reqwest::{header, Client};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::sleep;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::extract::{extract_statement, PageKind};

#[derive(Parser, Debug)]
#[command(name = "cpsearch-crawler")]
#[command(about = "Fill in missing problem descriptions by fetching each problem page")]
struct Cli {
    /// Problem list used when no corpus has been written yet
    #[arg(long, default_value = "./problems/problems_combined.json")]
    problems: PathBuf,
    /// Corpus file, read to resume and rewritten with fetched descriptions
    #[arg(long, default_value = "./corpus/all_problems.json")]
    output: PathBuf,
    /// Maximum number of pages to fetch (0 = all missing)
    #[arg(long, default_value_t = 0)]
    limit: usize,
    /// Pages fetched concurrently
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
    /// Pause after each fetch, per worker, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
    /// Request timeout seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Write the corpus after this many processed pages
    #[arg(long, default_value_t = 100)]
    save_every: usize,
    /// User-Agent header sent with every request
    #[arg(long, default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36")]
    user_agent: String,
}

type FetchResult = (usize, Result<Option<String>>);

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let mut corpus = load_starting_corpus(&args.output, &args.problems)?;
    let mut queue: VecDeque<usize> = pending(&corpus, args.limit).into();
    tracing::info!(total = corpus.len(), to_fetch = queue.len(), concurrency = args.concurrency, "crawler starting");

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let mut progress = Progress::new(queue.len(), args.save_every);
    let mut inflight: VecDeque<JoinHandle<FetchResult>> = VecDeque::new();

    while !queue.is_empty() || !inflight.is_empty() {
        // Fill workers
        while inflight.len() < args.concurrency.max(1) {
            let Some(idx) = queue.pop_front() else { break };
            let problem = &corpus[idx];
            let url = match Url::parse(&problem.url) {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(idx, url = %problem.url, error = %e, "skipping invalid url");
                    checkpoint(&mut progress, false, &args.output, &corpus)?;
                    continue;
                }
            };
            let kind = PageKind::of(problem);
            let client = client.clone();
            let delay = Duration::from_millis(args.delay_ms);
            inflight.push_back(tokio::spawn(async move {
                let result = fetch_statement(&client, url, kind).await;
                sleep(delay).await;
                (idx, result)
            }));
        }

        let Some(handle) = inflight.pop_front() else { continue };
        let filled = settle(&mut corpus, handle.await);
        checkpoint(&mut progress, filled, &args.output, &corpus)?;
    }

    save_corpus(&args.output, &corpus)?;
    tracing::info!(processed = progress.processed, filled = progress.filled, output = %args.output.display(), "done, corpus saved");
    Ok(())
}

/// Counters for one crawl run.
struct Progress {
    to_fetch: usize,
    processed: usize,
    filled: usize,
    save_every: usize,
}

impl Progress {
    fn new(to_fetch: usize, save_every: usize) -> Self { Self { to_fetch, processed: 0, filled: 0, save_every } }

    /// Count one finished record. Returns true when an interim save is due.
    fn record(&mut self, filled: bool) -> bool {
        self.processed += 1;
        if filled {
            self.filled += 1;
        }
        if self.processed % 10 == 0 {
            tracing::info!(processed = self.processed, to_fetch = self.to_fetch, filled = self.filled, "progress");
        }
        self.save_every > 0 && self.processed % self.save_every == 0
    }
}

/// Every record, fetched or skipped, passes through here.
fn checkpoint(progress: &mut Progress, filled: bool, output: &Path, corpus: &[Problem]) -> Result<()> {
    if progress.record(filled) {
        tracing::info!(output = %output.display(), "saving interim corpus");
        save_corpus(output, corpus)?;
    }
    Ok(())
}

/// Apply a finished fetch to the corpus. Returns whether a description was filled in.
/// A task that panicked is logged and skipped so the run still saves what it has.
fn settle(corpus: &mut [Problem], joined: Result<FetchResult, JoinError>) -> bool {
    let (idx, result) = match joined {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = %e, "fetch task failed");
            return false;
        }
    };
    match result {
        Ok(Some(description)) => {
            corpus[idx].description = Some(description);
            true
        }
        Ok(None) => {
            tracing::warn!(idx, url = %corpus[idx].url, "no statement found on page");
            false
        }
        Err(e) => {
            tracing::warn!(idx, url = %corpus[idx].url, error = %format!("{e:#}"), "failed to fetch");
            false
        }
    }
}

/// Resume from an earlier run's output when it exists, else start from the problem list.
fn load_starting_corpus(output: &Path, problems: &Path) -> Result<Vec<Problem>> {
    if output.is_file() {
        match load_corpus(output) {
            Ok(corpus) => return Ok(corpus),
            Err(e) => tracing::warn!(output = %output.display(), error = %format!("{e:#}"), "ignoring unreadable corpus"),
        }
    }
    load_corpus(problems)
}

/// Indices of records still lacking a description, capped at `limit` (0 = no cap).
fn pending(corpus: &[Problem], limit: usize) -> Vec<usize> {
    let missing = corpus.iter().enumerate().filter(|(_, p)| p.missing_description()).map(|(i, _)| i);
    if limit > 0 {
        missing.take(limit).collect()
    } else {
        missing.collect()
    }
}

async fn fetch_statement(client: &Client, url: Url, kind: PageKind) -> Result<Option<String>> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        bail!("unexpected status {}", resp.status());
    }
    if let Some(ct) = resp.headers().get(header::CONTENT_TYPE) {
        if let Ok(v) = ct.to_str() {
            if !v.starts_with("text/html") {
                bail!("not an html page ({v})");
            }
        }
    }
    let body = resp.text().await?;
    Ok(extract_statement(kind, &body))
}
