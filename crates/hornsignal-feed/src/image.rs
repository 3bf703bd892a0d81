//! Image enrichment: synchronous RSS-side extraction during normalization,
//! and an async og:image/twitter:image fallback pass over resolved article
//! pages for cluster members still imageless.

use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

const OG_SCRAPE_TIMEOUT_SECS: u64 = 8;
const OG_SCRAPE_MAX_BYTES: usize = 50 * 1024;
pub const MAX_CANDIDATES_PER_RUN: usize = 60;
pub const OG_BATCH_SIZE: usize = 10;

/// Upgrade `//host/path` to `https://host/path`; pass through absolute URLs; reject everything else.
fn normalize_image_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("//") {
        return Some(format!("https:{raw}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    None
}

fn is_tracking_pixel(url: &str) -> bool {
    url.contains("1x1") || url.contains("1×1") || url.contains("pixel.gif") || url.contains("tracking")
}

/// RSS-side extraction, synchronous, in priority order:
/// 1. `enclosure.url` when `enclosure.type` starts with `image`
/// 2. `media:content[url]`, `media:thumbnail[url]`, `media:group > media:content[url]`
/// 3. `enclosure.url` (typeless)
/// 4. `<img src="…">` in encoded content / content / description / summary, skipping 1x1 pixels
pub fn extract_rss_image(
    entry: &feed_rs::model::Entry,
    content_body: &str,
    summary: &str,
) -> Option<String> {
    // 1 & 3: enclosure links.
    let enclosure = entry.links.iter().find(|l| l.rel.as_deref() == Some("enclosure"));
    if let Some(enclosure) = enclosure {
        let is_image_typed = enclosure
            .media_type
            .as_deref()
            .map(|t| t.starts_with("image"))
            .unwrap_or(false);
        if is_image_typed {
            if let Some(url) = normalize_image_url(&enclosure.href) {
                return Some(url);
            }
        }
    }

    // 2: media:content / media:thumbnail / media:group > media:content.
    for media in &entry.media {
        for content in &media.content {
            if let Some(url) = content.url.as_ref().and_then(|u| normalize_image_url(u.as_str())) {
                return Some(url);
            }
        }
        for thumb in &media.thumbnails {
            if let Some(url) = normalize_image_url(&thumb.image.uri) {
                return Some(url);
            }
        }
    }

    // 3 (typeless enclosure, fallback order).
    if let Some(enclosure) = enclosure {
        if let Some(url) = normalize_image_url(&enclosure.href) {
            return Some(url);
        }
    }

    // 4: first <img src> in content/description/summary not a tracking pixel.
    for haystack in [content_body, summary] {
        if let Some(url) = first_img_src(haystack) {
            return Some(url);
        }
    }

    None
}

fn first_img_src(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).ok()?;
    for cap in re.captures_iter(html) {
        let src = cap.get(1)?.as_str();
        if is_tracking_pixel(src) {
            continue;
        }
        if let Some(url) = normalize_image_url(src) {
            return Some(url);
        }
    }
    None
}

fn og_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(OG_SCRAPE_TIMEOUT_SECS))
        .user_agent("Mozilla/5.0 (compatible; HornSignalBot/1.0)")
        .build()
        .expect("failed to build og:image HTTP client")
}

/// Fetch the article page (first 50KB only) and extract `og:image` (either
/// attribute ordering) or `twitter:image`. Best-effort: any failure returns
/// `None` silently (`ImageScrapeFailure` per the error taxonomy).
pub async fn scrape_preview_image(url: &str) -> Option<String> {
    let client = og_client();
    let response = match client.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        _ => {
            warn!(url, "image: scrape request failed or non-2xx");
            return None;
        }
    };

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(_) => return None,
    };
    let capped = &bytes[..bytes.len().min(OG_SCRAPE_MAX_BYTES)];
    let html = String::from_utf8_lossy(capped);

    extract_meta_image(&html)
}

fn extract_meta_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let meta_selector = Selector::parse("meta").ok()?;

    let mut og_image = None;
    let mut twitter_image = None;

    for element in document.select(&meta_selector) {
        let value = element.value();
        let property = value
            .attr("property")
            .or_else(|| value.attr("name"))
            .unwrap_or("");
        let content = value.attr("content").unwrap_or("");
        if content.is_empty() {
            continue;
        }
        if property.eq_ignore_ascii_case("og:image") && og_image.is_none() {
            og_image = normalize_image_url(content);
        } else if property.eq_ignore_ascii_case("twitter:image") && twitter_image.is_none() {
            twitter_image = normalize_image_url(content);
        }
    }

    og_image.or(twitter_image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_protocol_relative_urls() {
        assert_eq!(
            normalize_image_url("//cdn.example.com/a.jpg"),
            Some("https://cdn.example.com/a.jpg".to_string())
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(normalize_image_url("data:image/png;base64,AAA"), None);
    }

    #[test]
    fn first_img_src_skips_tracking_pixels() {
        let html = r#"<img src="https://t.example.com/1x1.gif"><img src="https://cdn.example.com/real.jpg">"#;
        assert_eq!(
            first_img_src(html),
            Some("https://cdn.example.com/real.jpg".to_string())
        );
    }

    #[test]
    fn extracts_og_image_with_either_attribute_order() {
        let html = r#"<html><head><meta content="https://cdn.example.com/og.jpg" property="og:image"></head></html>"#;
        assert_eq!(
            extract_meta_image(html),
            Some("https://cdn.example.com/og.jpg".to_string())
        );
    }

    #[test]
    fn falls_back_to_twitter_image() {
        let html = r#"<html><head><meta name="twitter:image" content="https://cdn.example.com/tw.jpg"></head></html>"#;
        assert_eq!(
            extract_meta_image(html),
            Some("https://cdn.example.com/tw.jpg".to_string())
        );
    }
}
