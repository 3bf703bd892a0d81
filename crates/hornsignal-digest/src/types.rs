//! The rendered digest's data shape: window metadata plus the four sections.

use serde::{Deserialize, Serialize};

use hornsignal_common::EventType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub event_type: EventType,
    pub this_week: i64,
    pub last_week: i64,
    pub percent_change: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topline {
    pub this_week_total: i64,
    pub last_week_total: i64,
    pub types: Vec<TypeCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighSeverityEvent {
    pub summary: String,
    pub country: String,
    pub regions: Vec<String>,
    pub event_type: EventType,
    pub event_subtype: String,
    pub severity: i32,
    pub verification_status: String,
    pub rationale: String,
    pub actors: Vec<String>,
    pub source_count: i32,
    pub bundled_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotRegion {
    pub region: String,
    pub count: i64,
    pub average_severity: f64,
    pub percent_change: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpike {
    pub actor: String,
    pub this_week: i64,
    pub last_week: i64,
    pub percent_change: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub label: String,
    pub baseline_weak: bool,
    pub topline: Topline,
    pub high_severity: Vec<HighSeverityEvent>,
    pub hot_regions: Vec<HotRegion>,
    pub actor_spikes: Vec<ActorSpike>,
}

impl Digest {
    pub fn high_severity_count(&self) -> usize {
        self.high_severity.len()
    }
}
