//! Orchestrating binary: wires the feed ingestor, clusterer, event store,
//! extractor, and digest builder together and drives the two periodic
//! schedulers (spec §5/§9). No HTTP surface lives here — the API layer is
//! an out-of-scope collaborator (spec §1) that would read `EventStore` and
//! `PipelineCache` directly.

mod cache;
mod scheduler;
mod sources;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Utc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hornsignal_common::Config;
use hornsignal_digest::{build_digest, render_html, render_json, render_text, subject_line, DigestDispatcher, LoggingDispatcher};
use hornsignal_extractor::{Extractor, LlmClient};
use hornsignal_store::EventStore;

use cache::PipelineCache;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hornsignal=info".parse()?))
        .init();

    info!("hornsignal pipeline starting");

    let config = Config::from_env();
    config.log_redacted();

    let store = Arc::new(EventStore::open(&config.database_path).await?);
    let cache = Arc::new(PipelineCache::default());
    let extractor = config
        .anthropic_api_key
        .as_ref()
        .map(|key| Arc::new(Extractor::new(LlmClient::new(key.clone(), "claude-3-5-haiku-20241022"))));

    if extractor.is_none() {
        warn!("no ANTHROPIC_API_KEY configured: extraction disabled, serving article feed only");
    }

    let dispatcher: Arc<dyn DigestDispatcher> = Arc::new(LoggingDispatcher);
    if !config.digest_send_enabled() {
        warn!("no SMTP configuration present: weekly digest send disabled (rendered and logged only)");
    }

    let ingest_store = store.clone();
    let ingest_cache = cache.clone();
    let ingest_extractor = extractor.clone();
    let ingest_loop = tokio::spawn(async move {
        scheduler::run_ingest_loop(|| {
            let store = ingest_store.clone();
            let cache = ingest_cache.clone();
            let extractor = ingest_extractor.clone();
            async move {
                if let Err(err) = run_ingestion_cycle(&store, &cache, extractor.as_deref()).await {
                    warn!(%err, "pipeline: ingestion cycle failed");
                }
            }
        })
        .await;
    });

    let digest_store = store.clone();
    let digest_loop = tokio::spawn(async move {
        scheduler::run_digest_loop(|| {
            let store = digest_store.clone();
            let dispatcher = dispatcher.clone();
            async move {
                if let Err(err) = run_digest_cycle(&store, dispatcher.as_ref()).await {
                    warn!(%err, "pipeline: digest cycle failed");
                }
            }
        })
        .await;
    });

    let _ = tokio::join!(ingest_loop, digest_loop);
    Ok(())
}

/// One full ingest → cluster → image-enrich → extract cycle.
async fn run_ingestion_cycle(
    store: &EventStore,
    cache: &PipelineCache,
    extractor: Option<&Extractor>,
) -> Result<()> {
    let sources = sources::curated_sources();
    let mut articles = hornsignal_feed::run_ingestion_cycle(&sources).await;
    hornsignal_feed::enrich_missing_images(&mut articles).await;

    let clusters = hornsignal_cluster::cluster_articles(articles);
    info!(cluster_count = clusters.len(), "pipeline: clustered ingestion cycle");
    cache.clustered_feed.set(clusters.clone()).await;

    if let Some(extractor) = extractor {
        hornsignal_extractor::run_extraction_cycle(extractor, store, &clusters).await?;
    }

    Ok(())
}

/// Build, render, and dispatch the weekly Risk Delta digest.
async fn run_digest_cycle(store: &EventStore, dispatcher: &dyn DigestDispatcher) -> Result<()> {
    let digest = build_digest(store, Utc::now()).await?;
    let week_number = Utc::now().iso_week().week();

    let json = render_json(&digest)?;
    let html = render_html(&digest);
    let text = render_text(&digest);

    info!(
        week_number,
        this_week_total = digest.topline.this_week_total,
        high_severity = digest.high_severity_count(),
        subject = %subject_line(&digest, week_number),
        "pipeline: digest built"
    );
    tracing::debug!(json_len = json.len(), html_len = html.len(), text_len = text.len(), "pipeline: digest rendered");

    dispatcher.send(&digest, week_number).await?;
    Ok(())
}
