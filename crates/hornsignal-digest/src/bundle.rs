//! High-severity event bundling: collapse same-story repeats reported by
//! different clusters into one bundle before rendering.

use std::collections::BTreeSet;

use hornsignal_common::{Event, EventType, Scope, SourceTier, VerificationStatus};

use crate::regions::regions_overlap;

#[derive(Debug, Clone)]
pub struct Bundle {
    pub summary: String,
    pub country: String,
    pub regions: Vec<String>,
    pub event_type: EventType,
    pub event_subtype: String,
    pub severity: i32,
    pub scope: Scope,
    pub source_tier: SourceTier,
    pub verification_status: VerificationStatus,
    pub rationale: String,
    pub actors: Vec<String>,
    pub source_count: i32,
    pub sources: Vec<String>,
    pub article_urls: Vec<String>,
    pub bundled_count: usize,
}

impl From<&Event> for Bundle {
    fn from(event: &Event) -> Self {
        Bundle {
            summary: event.summary.clone(),
            country: event.country.clone(),
            regions: event.regions.clone(),
            event_type: event.event_type,
            event_subtype: event.event_subtype.clone(),
            severity: event.severity,
            scope: event.scope,
            source_tier: event.source_tier,
            verification_status: event.verification_status,
            rationale: event.rationale.clone(),
            actors: event.actors_normalized.clone(),
            source_count: event.article_count,
            sources: event.sources.clone(),
            article_urls: event.article_urls.clone(),
            bundled_count: 1,
        }
    }
}

fn same_key(a: &Bundle, b: &Event) -> bool {
    a.country.eq_ignore_ascii_case(&b.country)
        && a.event_subtype.eq_ignore_ascii_case(&b.event_subtype)
        && a.severity == b.severity
        && regions_overlap(&a.regions, &b.regions)
}

fn merge_in_place(bundle: &mut Bundle, event: &Event) {
    bundle.source_count += event.article_count;
    bundle.bundled_count += 1;

    let mut regions: BTreeSet<String> = bundle.regions.drain(..).collect();
    regions.extend(event.regions.iter().cloned());
    bundle.regions = regions.into_iter().collect();

    let mut sources: BTreeSet<String> = bundle.sources.drain(..).collect();
    sources.extend(event.sources.iter().cloned());
    bundle.sources = sources.into_iter().collect();

    let mut urls: BTreeSet<String> = bundle.article_urls.drain(..).collect();
    urls.extend(event.article_urls.iter().cloned());
    bundle.article_urls = urls.into_iter().collect();

    let mut actors: BTreeSet<String> = bundle.actors.drain(..).collect();
    actors.extend(event.actors_normalized.iter().cloned());
    bundle.actors = actors.into_iter().collect();

    // summary and rationale are kept from the first member by construction:
    // merge never overwrites them.
    bundle.source_tier = bundle.source_tier.max(event.source_tier);
}

/// Greedy single-pass bundling in input order: an event joins the first
/// compatible existing bundle, else starts a new one.
pub fn bundle_events(events: &[Event]) -> Vec<Bundle> {
    let mut bundles: Vec<Bundle> = Vec::new();
    for event in events {
        if let Some(existing) = bundles.iter_mut().find(|b| same_key(b, event)) {
            merge_in_place(existing, event);
        } else {
            bundles.push(Bundle::from(event));
        }
    }
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(country: &str, subtype: &str, severity: i32, regions: &[&str]) -> Event {
        Event {
            cluster_hash: format!("{country}-{subtype}-{}", regions.join(",")),
            summary: "summary".into(),
            country: country.into(),
            regions: regions.iter().map(|s| s.to_string()).collect(),
            event_type: EventType::Security,
            event_subtype: subtype.into(),
            severity,
            scope: Scope::National,
            source_tier: SourceTier::Tier2,
            verification_status: VerificationStatus::Reported,
            confidence: 0.8,
            rationale: "rationale".into(),
            actors: vec![],
            actors_normalized: vec![],
            article_count: 1,
            sources: vec!["Source A".into()],
            article_urls: vec!["https://example.com".into()],
            primary_url: "https://example.com".into(),
            primary_title: "title".into(),
            published_at: Utc::now(),
            extracted_at: Utc::now(),
            model_version: "v".into(),
            prompt_version: "v".into(),
        }
    }

    #[test]
    fn bundles_overlapping_regions_via_containment() {
        let events = vec![
            event("Sudan", "airstrike", 5, &["El Fasher"]),
            event("Sudan", "airstrike", 5, &["North Darfur"]),
        ];
        let bundles = bundle_events(&events);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].bundled_count, 2);
    }

    #[test]
    fn distinct_subtypes_do_not_bundle() {
        let events = vec![
            event("Sudan", "airstrike", 5, &["El Fasher"]),
            event("Sudan", "clash", 5, &["El Fasher"]),
        ];
        let bundles = bundle_events(&events);
        assert_eq!(bundles.len(), 2);
    }
}
