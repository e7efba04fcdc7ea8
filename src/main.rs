//! Crypto news sentiment: binary entrypoint.
//!
//! Usage: `crypto-news-sentiment [ingest|status|serve]` (default `serve`).

use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_sentiment::{
    alerts::AlertLedger,
    api::{self, AppState},
    config::{AppConfig, ENV_MEDIASTACK_KEY},
    corpus::CorpusStore,
    feed::{DateRange, FeedProvider, FileFeed, MediastackFeed},
    metrics::Metrics,
    pipeline::{run_cycle, spawn_scheduler},
    snapshot::Snapshot,
};

/// Compact logs by default, JSON lines when `SENTIMENT_LOG_JSON=1`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_news_sentiment=info,warn"));
    let json = std::env::var("SENTIMENT_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn build_feed(cfg: &AppConfig) -> Result<Box<dyn FeedProvider>> {
    if let Some(path) = &cfg.feed_file {
        return Ok(Box::new(FileFeed::new(path.clone())));
    }
    let key = std::env::var(ENV_MEDIASTACK_KEY).with_context(|| {
        format!("{ENV_MEDIASTACK_KEY} is not set and no feed_file is configured")
    })?;
    Ok(Box::new(MediastackFeed::new(
        key,
        cfg.keywords.clone(),
        cfg.languages.clone(),
        cfg.fetch_limit,
    )?))
}

async fn ingest_once(cfg: &AppConfig) -> Result<()> {
    let lexicon = Arc::new(cfg.load_lexicon()?);
    let engine = cfg.build_engine(lexicon)?;
    let feed = build_feed(cfg)?;
    let store = CorpusStore::new(&cfg.corpus_path);

    let report = run_cycle(
        feed.as_ref(),
        &engine,
        &store,
        DateRange::last_day(),
        cfg.batch_cap,
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_status(cfg: &AppConfig) -> Result<()> {
    let store = CorpusStore::new(&cfg.corpus_path);
    let snap = Snapshot::load(&store, cfg.window_mode);
    println!("{}", serde_json::to_string_pretty(&snap)?);
    if let Snapshot::LoadFailed { reason } = snap {
        bail!("corpus unreadable: {reason}");
    }
    Ok(())
}

async fn serve(cfg: AppConfig) -> Result<()> {
    let metrics = Metrics::init()?;

    let lexicon = Arc::new(cfg.load_lexicon()?);
    let engine = cfg.build_engine(lexicon)?;
    let feed = build_feed(&cfg)?;
    let scheduler = spawn_scheduler(
        feed,
        engine,
        CorpusStore::new(&cfg.corpus_path),
        cfg.batch_cap,
        Duration::from_secs(cfg.interval_secs),
    );

    let ledger = AlertLedger::open(&cfg.alert_ack_path)?;
    let state = AppState::new(CorpusStore::new(&cfg.corpus_path), cfg.window_mode, ledger);
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");

    let served = axum::serve(listener, app).await;
    scheduler.abort();
    served.context("http server failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default()?;
    let command = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());

    match command.as_str() {
        "ingest" => ingest_once(&cfg).await,
        "status" => print_status(&cfg),
        "serve" => serve(cfg).await,
        other => bail!("unknown command `{other}` (expected ingest, status or serve)"),
    }
}
