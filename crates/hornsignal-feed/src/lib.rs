pub mod image;
pub mod ingest;
pub mod relevance;
pub mod resolver;

use chrono::Utc;
use hornsignal_common::Article;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use image::{scrape_preview_image, MAX_CANDIDATES_PER_RUN, OG_BATCH_SIZE};
use resolver::{
    extract_article_id, needs_resolution, resolve_batch_via_api, resolve_offline,
    resolve_via_trampoline, ResolveInput,
};

/// Trampoline (strategy 4) concurrency cap, matching the image-scrape batch size.
const TRAMPOLINE_BATCH_SIZE: usize = 10;

/// Fetch every configured source, apply the relevance + recency filters, and
/// resolve aggregator URLs where possible. Returns the normalized, filtered
/// Article list ready for clustering.
pub async fn run_ingestion_cycle(sources: &[hornsignal_common::Source]) -> Vec<Article> {
    let articles = ingest::fetch_all(sources).await;
    let filtered = ingest::filter_relevant_and_recent(articles, Utc::now());
    resolve_aggregator_urls(filtered).await
}

/// Resolve aggregator (news.google.com) URLs in place, trying the two
/// offline strategies first (cheap, synchronous, per-article), then the
/// batch-execute API (strategy 3, ≤5 concurrent with a 200ms inter-batch
/// pause), then the HTML trampoline (strategy 4, batches of 10) for
/// whatever is still unresolved. Each strategy is best-effort; an article
/// that survives all four keeps its original aggregator URL.
async fn resolve_aggregator_urls(mut articles: Vec<Article>) -> Vec<Article> {
    let mut still_unresolved: Vec<usize> = Vec::new();

    for (idx, article) in articles.iter_mut().enumerate() {
        if !needs_resolution(&article.url) {
            continue;
        }

        let input = ResolveInput {
            url: &article.url,
            payload_fields: vec![article.description.as_str()],
        };

        match resolve_offline(&input) {
            Some(resolved) => {
                debug_resolved(&article.url, &resolved);
                article.url = resolved;
            }
            None => still_unresolved.push(idx),
        }
    }

    if still_unresolved.is_empty() {
        return articles;
    }

    let client = reqwest::Client::new();
    let ids: Vec<String> = still_unresolved
        .iter()
        .map(|&idx| extract_article_id(&articles[idx].url).unwrap_or_default())
        .collect();
    let batch_results = resolve_batch_via_api(&client, &ids).await;

    let mut remaining: Vec<usize> = Vec::new();
    for (&idx, resolved) in still_unresolved.iter().zip(batch_results) {
        match resolved {
            Some(resolved) => {
                debug_resolved(&articles[idx].url, &resolved);
                articles[idx].url = resolved;
            }
            None => remaining.push(idx),
        }
    }

    if remaining.is_empty() {
        return articles;
    }

    for chunk in remaining.chunks(TRAMPOLINE_BATCH_SIZE) {
        let futures = chunk.iter().map(|&idx| {
            let url = articles[idx].url.clone();
            async move { (idx, resolve_via_trampoline(&url).await) }
        });
        let results = futures::future::join_all(futures).await;
        for (idx, resolved) in results {
            match resolved {
                Some(resolved) => {
                    debug_resolved(&articles[idx].url, &resolved);
                    articles[idx].url = resolved;
                }
                None => {
                    warn!(url = %articles[idx].url, "resolver: all strategies failed, keeping aggregator URL");
                }
            }
        }
    }

    articles
}

fn debug_resolved(from: &str, to: &str) {
    tracing::debug!(from, to, "resolver: resolved aggregator URL");
}

/// Async og:image fallback for cluster members still imageless after URL
/// resolution. Bounded to `MAX_CANDIDATES_PER_RUN` candidates, processed in
/// batches of `OG_BATCH_SIZE` concurrently.
pub async fn enrich_missing_images(articles: &mut [Article]) {
    let candidate_indices: Vec<usize> = articles
        .iter()
        .enumerate()
        .filter(|(_, a)| a.image.is_none() && !needs_resolution(&a.url))
        .map(|(i, _)| i)
        .take(MAX_CANDIDATES_PER_RUN)
        .collect();

    if candidate_indices.is_empty() {
        return;
    }

    info!(count = candidate_indices.len(), "image: enriching candidates");

    let semaphore = std::sync::Arc::new(Semaphore::new(OG_BATCH_SIZE));
    let mut handles = Vec::with_capacity(candidate_indices.len());

    for &idx in &candidate_indices {
        let url = articles[idx].url.clone();
        let permit = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permit.acquire_owned().await.ok();
            (idx, scrape_preview_image(&url).await)
        }));
    }

    for handle in handles {
        if let Ok((idx, image)) = handle.await {
            if let Some(image) = image {
                articles[idx].image = Some(image);
            }
        }
    }
}
