//! Builds a `Digest` from the event store: window bound computation, the
//! baseline guard, and the four sections (topline, high-severity, hot
//! regions, actor spikes).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use hornsignal_extractor::normalize::normalize_actors;
use hornsignal_store::EventStore;

use hornsignal_common::EventType;

use crate::bundle::bundle_events;
use crate::math::{is_baseline_weak, percent_change};
use crate::rationale::clean_rationale;
use crate::regions::{ancestors, collapse_for_display};
use crate::types::{ActorSpike, Digest, HighSeverityEvent, HotRegion, Topline, TypeCount};

const HIGH_SEVERITY_THRESHOLD: i32 = 4;
const HIGH_SEVERITY_CAP: usize = 8;
const HOT_REGIONS_CAP: usize = 10;
const ACTOR_SPIKES_CAP: usize = 15;

pub struct WindowBounds {
    pub this_week_start: DateTime<Utc>,
    pub this_week_end: DateTime<Utc>,
    pub last_week_start: DateTime<Utc>,
    pub last_week_end: DateTime<Utc>,
}

/// "This week" = [now-7d, now], "last week" = [now-14d, now-7d], both
/// rounded down to the start of the current day.
pub fn compute_window_bounds(now: DateTime<Utc>) -> WindowBounds {
    let day_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now);

    WindowBounds {
        this_week_start: day_start - Duration::days(7),
        this_week_end: day_start,
        last_week_start: day_start - Duration::days(14),
        last_week_end: day_start - Duration::days(7),
    }
}

fn window_label(bounds: &WindowBounds) -> String {
    format!(
        "{} to {}",
        bounds.this_week_start.format("%Y-%m-%d"),
        bounds.this_week_end.format("%Y-%m-%d")
    )
}

pub async fn build_digest(store: &EventStore, now: DateTime<Utc>) -> anyhow::Result<Digest> {
    let bounds = compute_window_bounds(now);

    let this_week = store.events_in_window(bounds.this_week_start, bounds.this_week_end).await?;
    let last_week = store.events_in_window(bounds.last_week_start, bounds.last_week_end).await?;

    let baseline_weak = is_baseline_weak(last_week.len() as i64);

    // --- Topline -----------------------------------------------------
    let mut this_counts: HashMap<EventType, i64> = HashMap::new();
    for e in &this_week {
        *this_counts.entry(e.event_type).or_insert(0) += 1;
    }
    let mut last_counts: HashMap<EventType, i64> = HashMap::new();
    for e in &last_week {
        *last_counts.entry(e.event_type).or_insert(0) += 1;
    }

    let mut all_types: Vec<EventType> = this_counts.keys().chain(last_counts.keys()).copied().collect();
    all_types.sort_by_key(|t| t.as_str());
    all_types.dedup();

    let types = all_types
        .into_iter()
        .map(|event_type| {
            let this = *this_counts.get(&event_type).unwrap_or(&0);
            let last = *last_counts.get(&event_type).unwrap_or(&0);
            TypeCount {
                event_type,
                this_week: this,
                last_week: last,
                percent_change: if baseline_weak { None } else { Some(percent_change(last, this)) },
            }
        })
        .collect();

    let topline = Topline {
        this_week_total: this_week.len() as i64,
        last_week_total: last_week.len() as i64,
        types,
    };

    // --- High-severity events -----------------------------------------
    let severe: Vec<_> = this_week.iter().filter(|e| e.severity >= HIGH_SEVERITY_THRESHOLD).cloned().collect();
    let mut bundles = bundle_events(&severe);
    bundles.sort_by(|a, b| b.severity.cmp(&a.severity).then(b.bundled_count.cmp(&a.bundled_count)));
    bundles.truncate(HIGH_SEVERITY_CAP);

    let high_severity = bundles
        .into_iter()
        .map(|b| HighSeverityEvent {
            summary: b.summary,
            country: b.country,
            regions: collapse_for_display(&b.regions),
            event_type: b.event_type,
            event_subtype: b.event_subtype,
            severity: b.severity,
            verification_status: b.verification_status.to_string(),
            rationale: clean_rationale(&b.rationale),
            actors: b.actors,
            source_count: b.source_count,
            bundled_count: b.bundled_count,
        })
        .collect();

    // --- Hot regions ----------------------------------------------------
    let this_regions = store.region_severity_for_window(bounds.this_week_start, bounds.this_week_end).await?;
    let last_regions = store.region_severity_for_window(bounds.last_week_start, bounds.last_week_end).await?;
    let last_region_counts: HashMap<String, i64> =
        last_regions.iter().map(|r| (r.region.to_lowercase(), r.count)).collect();

    let mut hot_regions: Vec<HotRegion> = this_regions
        .into_iter()
        .take(HOT_REGIONS_CAP)
        .map(|r| {
            let last_count = *last_region_counts.get(&r.region.to_lowercase()).unwrap_or(&0);
            HotRegion {
                average_severity: if r.count == 0 { 0.0 } else { r.severity_sum as f64 / r.count as f64 },
                percent_change: if baseline_weak { None } else { Some(percent_change(last_count, r.count)) },
                region: r.region,
                count: r.count,
            }
        })
        .collect();
    hot_regions = collapse_hot_regions(hot_regions);

    // --- Actor spikes -----------------------------------------------------
    let this_actors = store.actor_counts_for_window(bounds.this_week_start, bounds.this_week_end).await?;
    let last_actors = store.actor_counts_for_window(bounds.last_week_start, bounds.last_week_end).await?;

    let mut this_actor_counts: HashMap<String, i64> = HashMap::new();
    for row in this_actors {
        let canonical = normalize_actors(&[row.actor]).into_iter().next().unwrap_or_default();
        *this_actor_counts.entry(canonical).or_insert(0) += row.count;
    }
    let mut last_actor_counts: HashMap<String, i64> = HashMap::new();
    for row in last_actors {
        let canonical = normalize_actors(&[row.actor]).into_iter().next().unwrap_or_default();
        *last_actor_counts.entry(canonical).or_insert(0) += row.count;
    }

    let mut actor_names: Vec<String> = this_actor_counts.keys().chain(last_actor_counts.keys()).cloned().collect();
    actor_names.sort();
    actor_names.dedup();

    let mut actor_spikes: Vec<ActorSpike> = actor_names
        .into_iter()
        .map(|actor| {
            let this = *this_actor_counts.get(&actor).unwrap_or(&0);
            let last = *last_actor_counts.get(&actor).unwrap_or(&0);
            ActorSpike {
                percent_change: if baseline_weak { None } else { Some(percent_change(last, this)) },
                this_week: this,
                last_week: last,
                actor,
            }
        })
        .collect();

    // Rank by change magnitude (spec: "by WoW change magnitude (positive
    // first)"), not the signed value — otherwise a large collapse outranks
    // a tiny rise and gets dropped by the cap below.
    actor_spikes.sort_by(|a, b| {
        let key_a = a.percent_change.unwrap_or(a.this_week - a.last_week);
        let key_b = b.percent_change.unwrap_or(b.this_week - b.last_week);
        key_b.abs().cmp(&key_a.abs()).then(key_b.cmp(&key_a))
    });
    actor_spikes.truncate(ACTOR_SPIKES_CAP);

    Ok(Digest {
        label: window_label(&bounds),
        baseline_weak,
        topline,
        high_severity,
        hot_regions,
        actor_spikes,
    })
}

/// Display-collapse a list of already-ranked hot regions: when a region and
/// a present ancestor both appear in the list, rename the child's row to
/// `Ancestor (Child)` and drop the ancestor's own row, keeping the child's
/// own count/severity statistics (each row is an independent aggregate, not
/// a mergeable bundle).
fn collapse_hot_regions(rows: Vec<HotRegion>) -> Vec<HotRegion> {
    let present: std::collections::HashSet<String> = rows.iter().map(|r| r.region.to_lowercase()).collect();
    let mut dropped: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut renamed: HashMap<String, String> = HashMap::new();

    for row in &rows {
        let lr = row.region.to_lowercase();
        let chain = ancestors(&lr);
        if let Some(closest) = chain.iter().find(|a| present.contains(**a)) {
            let ancestor_display = rows
                .iter()
                .find(|r| r.region.to_lowercase() == *closest)
                .map(|r| r.region.clone())
                .unwrap_or_else(|| closest.to_string());
            renamed.insert(lr.clone(), format!("{} ({})", ancestor_display, row.region));
            for a in &chain {
                if present.contains(*a) {
                    dropped.insert(a.to_string());
                }
            }
        }
    }

    rows.into_iter()
        .filter(|r| !dropped.contains(&r.region.to_lowercase()))
        .map(|mut r| {
            if let Some(label) = renamed.get(&r.region.to_lowercase()) {
                r.region = label.clone();
            }
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_cover_two_contiguous_seven_day_spans() {
        let now = Utc.with_ymd_and_hms(2026, 7, 20, 15, 30, 0).unwrap();
        let bounds = compute_window_bounds(now);
        assert_eq!(bounds.this_week_end, bounds.last_week_end + Duration::days(7));
        assert_eq!(bounds.this_week_start, bounds.this_week_end - Duration::days(7));
        assert_eq!(bounds.this_week_start.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn collapse_hot_regions_merges_child_and_ancestor_rows() {
        let rows = vec![
            HotRegion { region: "El Fasher".into(), count: 5, average_severity: 4.0, percent_change: None },
            HotRegion { region: "North Darfur".into(), count: 2, average_severity: 3.0, percent_change: None },
        ];
        let collapsed = collapse_hot_regions(rows);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].region, "North Darfur (El Fasher)");
        assert_eq!(collapsed[0].count, 5);
    }
}
