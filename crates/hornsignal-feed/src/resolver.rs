//! Aggregator redirect resolution: four independently-toggleable strategies,
//! tried in order, each best-effort. When all fail the original (aggregator)
//! URL is preserved and the article remains usable, just not image-enrichable.

use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

const AGGREGATOR_HOST: &str = "news.google.com";
const HTML_FETCH_TIMEOUT_SECS: u64 = 8;
const BATCH_DECODE_CONCURRENCY: usize = 5;
const BATCH_DECODE_PAUSE_MS: u64 = 200;

/// Hosts a resolved URL must NOT be on to be considered a real publisher URL.
fn is_aggregator_domain(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("news.google.com") || lower.contains("google.com/url")
}

pub fn needs_resolution(url: &str) -> bool {
    url.to_lowercase().contains(AGGREGATOR_HOST)
}

// ---------------------------------------------------------------------------
// Strategy 1: HTML anchor scan in the item payload
// ---------------------------------------------------------------------------

/// Scan `content`/`description`/`summary`/`content:encoded` text for the first
/// `<a href="…">` whose target is not an aggregator domain.
pub fn resolve_via_anchor_scan(payloads: &[&str]) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;
    for payload in payloads {
        if payload.is_empty() {
            continue;
        }
        let document = Html::parse_fragment(payload);
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if href.starts_with("http") && !is_aggregator_domain(href) {
                    return Some(href.to_string());
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Strategy 2: embedded payload scan (base64url decode of the /articles/ id)
// ---------------------------------------------------------------------------

fn base64url_to_bytes(segment: &str) -> Option<Vec<u8>> {
    let mut s = segment.replace('-', "+").replace('_', "/");
    while s.len() % 4 != 0 {
        s.push('=');
    }
    base64_decode(&s)
}

/// Minimal base64 decoder (standard alphabet, `=` padding) so this crate
/// doesn't need an extra dependency for one narrow decode.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    fn val(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let bytes: Vec<u8> = input.bytes().filter(|&b| b != b'=').collect();
    let mut out = Vec::with_capacity(bytes.len() * 3 / 4);
    for chunk in bytes.chunks(4) {
        let mut buf = [0u8; 4];
        let mut n = 0;
        for (i, &b) in chunk.iter().enumerate() {
            buf[i] = val(b)?;
            n += 1;
        }
        let combined = (buf[0] as u32) << 18
            | (buf[1] as u32) << 12
            | (buf[2] as u32) << 6
            | (buf[3] as u32);
        out.push((combined >> 16) as u8);
        if n > 2 {
            out.push((combined >> 8) as u8);
        }
        if n > 3 {
            out.push(combined as u8);
        }
    }
    Some(out)
}

/// Public wrapper over the private `/articles/<id>` extraction, used by the
/// caller to build the id list for `resolve_batch_via_api`.
pub fn extract_article_id(aggregator_url: &str) -> Option<String> {
    extract_articles_id(aggregator_url).map(str::to_string)
}

fn extract_articles_id(aggregator_url: &str) -> Option<&str> {
    let marker = "/articles/";
    let idx = aggregator_url.find(marker)? + marker.len();
    let rest = &aggregator_url[idx..];
    Some(rest.split(['?', '#']).next().unwrap_or(rest))
}

/// Decode the `/articles/<id>` segment, scan the raw bytes for `http`, and
/// walk forward while bytes remain printable ASCII to form a URL candidate.
pub fn resolve_via_embedded_payload(aggregator_url: &str) -> Option<String> {
    let id = extract_articles_id(aggregator_url)?;
    let bytes = base64url_to_bytes(id)?;

    let pos = bytes.windows(4).position(|w| w == b"http")?;
    let mut end = pos;
    while end < bytes.len() && (0x21..=0x7e).contains(&bytes[end]) {
        end += 1;
    }
    let candidate = std::str::from_utf8(&bytes[pos..end]).ok()?;

    let re = Regex::new(r"^https?://[a-z0-9]").ok()?;
    if re.is_match(&candidate.to_lowercase()) && !is_aggregator_domain(candidate) {
        Some(candidate.to_string())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Strategy 3: asynchronous batch-execute API decode
// ---------------------------------------------------------------------------

const BATCHEXECUTE_URL: &str = "https://news.google.com/_/DotsSplashUi/data/batchexecute";

fn batchexecute_body(article_id: &str) -> String {
    let nulls: Vec<serde_json::Value> = vec![serde_json::Value::Null; 30];
    let inner = serde_json::json!(["garturlreq", [[["en-US", "US", [article_id]], nulls]]]);
    let wrapped = serde_json::json!([["Fbv4je", inner.to_string(), serde_json::Value::Null, "generic"]]);
    format!(
        "f.req={}",
        urlencode(&serde_json::to_string(&wrapped).unwrap_or_default())
    )
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Response has the standard anti-XSSI prefix `)]}'\n<length>\n<payload>`;
/// scan for any URL not on a known-aggregator/Google-property domain family.
pub fn extract_url_from_batchexecute_response(body: &str) -> Option<String> {
    let re = Regex::new(r#"https?://[^\s"\\]+"#).ok()?;
    for m in re.find_iter(body) {
        let candidate = m.as_str();
        if !is_aggregator_domain(candidate) && !candidate.contains("gstatic.com") {
            return Some(candidate.trim_end_matches(['\\', '"']).to_string());
        }
    }
    None
}

async fn resolve_via_batchexecute(client: &reqwest::Client, article_id: &str) -> Option<String> {
    let body = batchexecute_body(article_id);
    let response = client
        .post(BATCHEXECUTE_URL)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    let text = response.text().await.ok()?;
    extract_url_from_batchexecute_response(&text)
}

/// Batch size ≤ 5 concurrent calls; 200ms pause between batches.
pub async fn resolve_batch_via_api(client: &reqwest::Client, article_ids: &[String]) -> Vec<Option<String>> {
    let mut results = Vec::with_capacity(article_ids.len());
    for chunk in article_ids.chunks(BATCH_DECODE_CONCURRENCY) {
        let futures = chunk.iter().map(|id| resolve_via_batchexecute(client, id));
        let batch_results = futures::future::join_all(futures).await;
        results.extend(batch_results);
        tokio::time::sleep(Duration::from_millis(BATCH_DECODE_PAUSE_MS)).await;
    }
    results
}

// ---------------------------------------------------------------------------
// Strategy 4: HTML trampoline
// ---------------------------------------------------------------------------

/// Look for, in order: meta refresh, `window.location[.href] = "…"`,
/// `data-url="…"`, the first outbound `<a href="https?://…">` not on an
/// aggregator domain.
pub fn resolve_via_trampoline_html(html: &str) -> Option<String> {
    if let Some(url) = meta_refresh_url(html) {
        if !is_aggregator_domain(&url) {
            return Some(url);
        }
    }
    if let Some(url) = window_location_url(html) {
        if !is_aggregator_domain(&url) {
            return Some(url);
        }
    }
    if let Some(url) = data_url_attr(html) {
        if !is_aggregator_domain(&url) {
            return Some(url);
        }
    }
    resolve_via_anchor_scan(&[html])
}

fn meta_refresh_url(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']refresh["'][^>]*content\s*=\s*["'][^"']*url=([^"'>]+)["']"#).ok()?;
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn window_location_url(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)window\.location(?:\.href)?\s*=\s*["']([^"']+)["']"#).ok()?;
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn data_url_attr(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)data-url\s*=\s*["'](https?://[^"']+)["']"#).ok()?;
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn trampoline_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(HTML_FETCH_TIMEOUT_SECS))
        .user_agent("Mozilla/5.0 (compatible; HornSignalBot/1.0)")
        .build()
        .expect("failed to build trampoline HTTP client")
}

async fn fetch_trampoline_page(url: &str) -> Option<String> {
    let client = trampoline_client();
    let response = client
        .get(url)
        .header("Referer", "https://news.google.com/")
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.text().await.ok()
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Inputs available for resolving one Article's aggregator URL.
pub struct ResolveInput<'a> {
    pub url: &'a str,
    pub payload_fields: Vec<&'a str>,
}

/// Try strategies 1 and 2 (both pure, synchronous, best-effort). Returns
/// `None` if neither resolves, leaving strategies 3/4 (networked) to the
/// caller for items still needed for image enrichment.
pub fn resolve_offline(input: &ResolveInput) -> Option<String> {
    resolve_via_anchor_scan(&input.payload_fields)
        .or_else(|| resolve_via_embedded_payload(input.url))
}

/// Strategy 4, full async round trip: fetch the aggregator page and scan it.
pub async fn resolve_via_trampoline(url: &str) -> Option<String> {
    let html = fetch_trampoline_page(url).await?;
    resolve_via_trampoline_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_scan_skips_aggregator_links() {
        let html = r#"<a href="https://news.google.com/other">x</a><a href="https://bbc.com/news/world-africa-123">real</a>"#;
        assert_eq!(
            resolve_via_anchor_scan(&[html]),
            Some("https://bbc.com/news/world-africa-123".to_string())
        );
    }

    #[test]
    fn meta_refresh_extracts_target_url() {
        let html = r#"<meta http-equiv="refresh" content="0;url=https://reuters.com/story">"#;
        assert_eq!(meta_refresh_url(html), Some("https://reuters.com/story".to_string()));
    }

    #[test]
    fn window_location_extracts_target_url() {
        let html = r#"<script>window.location.href = "https://apnews.com/story";</script>"#;
        assert_eq!(
            window_location_url(html),
            Some("https://apnews.com/story".to_string())
        );
    }

    #[test]
    fn data_url_attr_extracts_target() {
        let html = r#"<div data-url="https://reuters.com/world/africa/story"></div>"#;
        assert_eq!(
            data_url_attr(html),
            Some("https://reuters.com/world/africa/story".to_string())
        );
    }

    #[test]
    fn base64url_decode_handles_dash_underscore_and_padding() {
        // "hi" base64 standard is "aGk=" ; urlsafe form without padding is "aGk"
        let decoded = base64url_to_bytes("aGk").unwrap();
        assert_eq!(decoded, b"hi");
    }

    #[test]
    fn batchexecute_body_is_form_encoded_with_f_req() {
        let body = batchexecute_body("ARTICLEID123");
        assert!(body.starts_with("f.req="));
        assert!(body.contains("ARTICLEID123"));
    }

    #[test]
    fn extract_url_from_batchexecute_skips_google_domains() {
        let body = r#")]}'\n123\n[["wrb.fr","Fbv4je","[\"https://news.google.com/foo\",\"https://bbc.com/real-story\"]"]]"#;
        assert_eq!(
            extract_url_from_batchexecute_response(body),
            Some("https://bbc.com/real-story".to_string())
        );
    }
}
