//! The curated syndication feed list. A `Source` is an immutable config
//! record created once at startup (spec §3) — there is no admin UI or
//! database table for it; drift in this list is an operational edit, not a
//! schema change.

use hornsignal_common::{Source, SourceCategory, SourceReliability};

fn src(name: &str, url: &str, category: SourceCategory, reliability: SourceReliability) -> Source {
    Source {
        name: name.to_string(),
        url: url.to_string(),
        category,
        reliability,
    }
}

/// The fixed list of sources fetched each ingestion cycle.
pub fn curated_sources() -> Vec<Source> {
    use SourceCategory::*;
    use SourceReliability::*;

    vec![
        src("Reuters Africa", "https://www.reuters.com/arc/outboundfeeds/v3/world/africa/rss/", International, High),
        src("AP Africa", "https://rsshub.app/apnews/topics/africa", International, High),
        src("BBC Africa", "https://feeds.bbci.co.uk/news/world/africa/rss.xml", International, High),
        src("Al Jazeera Africa", "https://www.aljazeera.com/xml/rss/all.xml", International, High),
        src("UN News Africa", "https://news.un.org/feed/subscribe/en/news/region/africa/feed/rss.xml", Humanitarian, High),
        src("ReliefWeb South Sudan", "https://reliefweb.int/updates/rss.xml?search=country:south-sudan", Humanitarian, High),
        src("ReliefWeb Sudan", "https://reliefweb.int/updates/rss.xml?search=country:sudan", Humanitarian, High),
        src("Radio Tamazuj", "https://radiotamazuj.org/en/rss.xml", Regional, Medium),
        src("Sudan Tribune", "https://sudantribune.com/feed/", Regional, Medium),
        src("Dabanga Sudan", "https://www.dabangasudan.org/en/rss.xml", Regional, Medium),
        src("Eye Radio", "https://eyeradio.org/feed/", Local, Medium),
        src("The City Review South Sudan", "https://thecityreview.net/feed/", Local, Medium),
        src("Sudan War Monitor", "https://sudanwarmonitor.com/feed", Regional, Medium),
        src("Google News — South Sudan", "https://news.google.com/rss/search?q=%22south+sudan%22&hl=en-US&gl=US&ceid=US:en", General, Aggregator),
        src("Google News — Sudan", "https://news.google.com/rss/search?q=sudan+when:2d&hl=en-US&gl=US&ceid=US:en", General, Aggregator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_sources_are_non_empty_and_named() {
        let sources = curated_sources();
        assert!(!sources.is_empty());
        assert!(sources.iter().all(|s| !s.name.is_empty() && !s.url.is_empty()));
    }

    #[test]
    fn at_least_one_source_per_reliability_tier() {
        let sources = curated_sources();
        assert!(sources.iter().any(|s| matches!(s.reliability, SourceReliability::High)));
        assert!(sources.iter().any(|s| matches!(s.reliability, SourceReliability::Medium)));
        assert!(sources.iter().any(|s| matches!(s.reliability, SourceReliability::Aggregator)));
    }
}
