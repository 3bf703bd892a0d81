//! Per-source fetch, feed parsing, normalization into Articles, and the
//! relevance + time-window filters applied after aggregation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hornsignal_common::text::{strip_html, truncate_chars};
use hornsignal_common::{Article, Source};
use tracing::{info, warn};

use crate::image::extract_rss_image;
use crate::relevance::is_relevant;

const FETCH_TIMEOUT_SECS: u64 = 10;
const DESCRIPTION_MAX_CHARS: usize = 500;
const WINDOW_DAYS: i64 = 7;
const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; HornSignalBot/1.0; +https://hornsignal.example/bot)";

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("failed to build feed HTTP client")
}

/// Strip any bytes preceding the first `<?xml`, `<rss`, or `<feed` token, and
/// a UTF-8 BOM if present. Tolerates malformed leading garbage some feeds emit.
fn sanitize_xml(raw: &[u8]) -> &[u8] {
    let bom = &[0xEF, 0xBB, 0xBF];
    let raw = if raw.starts_with(bom) { &raw[3..] } else { raw };

    let needles: [&[u8]; 3] = [b"<?xml", b"<rss", b"<feed"];
    let mut earliest: Option<usize> = None;
    for needle in needles {
        if let Some(pos) = find_subslice(raw, needle) {
            earliest = Some(match earliest {
                Some(e) if e <= pos => e,
                _ => pos,
            });
        }
    }
    match earliest {
        Some(pos) => &raw[pos..],
        None => raw,
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Fetch and parse one source. Never fails the batch: returns an empty list
/// and logs a warning on any network/parse error.
pub async fn fetch_source(client: &reqwest::Client, source: &Source) -> Vec<Article> {
    match fetch_source_inner(client, source).await {
        Ok(articles) => {
            info!(source = %source.name, count = articles.len(), "feed: fetched");
            articles
        }
        Err(err) => {
            warn!(source = %source.name, error = %err, "feed: fetch failed, skipping source");
            Vec::new()
        }
    }
}

async fn fetch_source_inner(client: &reqwest::Client, source: &Source) -> anyhow::Result<Vec<Article>> {
    let response = client
        .get(&source.url)
        .header(
            "Accept",
            "application/rss+xml, application/atom+xml, application/xml, text/xml, */*",
        )
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("non-2xx status {}", response.status());
    }

    let bytes = response.bytes().await?;
    let cleaned = sanitize_xml(&bytes);
    let feed = feed_rs::parser::parse(cleaned)?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| normalize_entry(entry, source))
        .collect())
}

fn normalize_entry(entry: feed_rs::model::Entry, source: &Source) -> Article {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();

    let content_snippet = entry.summary.as_ref().map(|t| t.content.clone()).unwrap_or_default();
    let content_body = entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .unwrap_or_default();

    let description_source = if !content_snippet.is_empty() {
        content_snippet.clone()
    } else if !content_body.is_empty() {
        content_body.clone()
    } else {
        String::new()
    };
    let description = truncate_chars(&strip_html(&description_source), DESCRIPTION_MAX_CHARS);

    let url = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() != Some("enclosure"))
        .map(|l| l.href.clone())
        .or_else(|| entry.links.first().map(|l| l.href.clone()))
        .unwrap_or_default();

    let published_at = entry
        .published
        .or(entry.updated)
        .unwrap_or_else(Utc::now);

    let id = if !entry.id.is_empty() {
        entry.id.clone()
    } else if !url.is_empty() {
        url.clone()
    } else {
        format!("{}||{}", source.name, title)
    };

    let image = extract_rss_image(&entry, &content_body, &content_snippet);

    Article {
        id,
        title,
        description,
        url,
        image,
        published_at,
        source: source.name.clone(),
        source_category: source.category,
        source_reliability: source.reliability,
    }
}

/// Fetch every source in parallel; one bad feed never poisons the batch.
pub async fn fetch_all(sources: &[Source]) -> Vec<Article> {
    let client = http_client();
    let futures = sources.iter().map(|s| fetch_source(&client, s));
    let results = futures::future::join_all(futures).await;
    results.into_iter().flatten().collect()
}

/// Apply the relevance filter, dedup by `id`, sort descending by
/// `published_at`, and keep only items within the last 7 days of `now`.
pub fn filter_relevant_and_recent(articles: Vec<Article>, now: DateTime<Utc>) -> Vec<Article> {
    let cutoff = now - chrono::Duration::days(WINDOW_DAYS);

    let mut kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| !a.title.trim().is_empty() && !a.url.trim().is_empty())
        .filter(|a| is_relevant(&a.title, &a.description, ""))
        .collect();

    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    dedup_by_id(&mut kept);
    kept.retain(|a| a.published_at >= cutoff);
    kept
}

/// Drop repeat items sharing the same `id` (e.g. a story carried by both a
/// direct source and an aggregator feed), keeping the first occurrence —
/// the most recent, since this runs after the descending `published_at` sort.
fn dedup_by_id(articles: &mut Vec<Article>) {
    let mut seen = std::collections::HashSet::new();
    articles.retain(|a| seen.insert(a.id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_xml_strips_leading_garbage_and_bom() {
        let mut raw = vec![0xEF, 0xBB, 0xBF];
        raw.extend_from_slice(b"garbage-before-decl<?xml version=\"1.0\"?><rss></rss>");
        let cleaned = sanitize_xml(&raw);
        assert!(cleaned.starts_with(b"<?xml"));
    }

    #[test]
    fn sanitize_xml_passes_through_clean_feeds() {
        let raw = b"<?xml version=\"1.0\"?><rss></rss>";
        assert_eq!(sanitize_xml(raw), &raw[..]);
    }

    #[test]
    fn window_filter_drops_stale_articles() {
        let now = Utc::now();
        let fresh = Article {
            id: "1".into(),
            title: "South Sudan peace talks resume".into(),
            description: String::new(),
            url: "https://example.com/1".into(),
            image: None,
            published_at: now - chrono::Duration::days(1),
            source: "Test".into(),
            source_category: hornsignal_common::SourceCategory::International,
            source_reliability: hornsignal_common::SourceReliability::High,
        };
        let stale = Article {
            published_at: now - chrono::Duration::days(10),
            id: "2".into(),
            ..fresh.clone()
        };
        let kept = filter_relevant_and_recent(vec![fresh.clone(), stale], now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1");
    }

    #[test]
    fn dedup_drops_same_id_from_a_second_source() {
        let now = Utc::now();
        let direct = Article {
            id: "shared-guid".into(),
            title: "South Sudan peace talks resume".into(),
            description: String::new(),
            url: "https://example.com/direct".into(),
            image: None,
            published_at: now,
            source: "Radio Tamazuj".into(),
            source_category: hornsignal_common::SourceCategory::Regional,
            source_reliability: hornsignal_common::SourceReliability::Medium,
        };
        let via_aggregator = Article {
            url: "https://news.google.com/rss/articles/xyz".into(),
            source: "Google News — South Sudan".into(),
            source_category: hornsignal_common::SourceCategory::General,
            source_reliability: hornsignal_common::SourceReliability::Aggregator,
            ..direct.clone()
        };
        let kept = filter_relevant_and_recent(vec![direct.clone(), via_aggregator], now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, direct.url);
    }
}
