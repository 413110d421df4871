use anyhow::Result;
use clap::Parser;
use cpsearch_core::{IndexConfig, IndexHandle, DEFAULT_TITLE_BOOST, DEFAULT_TOP_K};
use cpsearch_server::{build_app, spawn_index_build, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "cpsearch-server", about = "Search competitive-programming problems over HTTP")]
struct Args {
    /// Corpus file or directory of JSON/JSONL problem records
    #[arg(long, env = "CPSEARCH_CORPUS", default_value = "./corpus/all_problems.json")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
    /// Directory served for paths that match no API route
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// Maximum results per query
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// How many times a problem title is repeated when indexing
    #[arg(long, default_value_t = DEFAULT_TITLE_BOOST)]
    title_boost: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let handle = Arc::new(IndexHandle::new());
    let app = build_app(AppState::new(handle.clone(), args.top_k), args.static_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, pid = std::process::id(), "server listening");

    // Serve immediately; search answers 503 until the build publishes the index.
    spawn_index_build(handle, args.corpus, IndexConfig { title_boost: args.title_boost });

    axum::serve(listener, app).await?;
    Ok(())
}
