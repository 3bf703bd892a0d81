//! Core data model: Source, Article, Cluster, Event, QuarantineRecord, Unsubscribe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    International,
    Regional,
    Local,
    Humanitarian,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceReliability {
    High,
    Medium,
    Aggregator,
}

impl SourceReliability {
    /// `high=3, medium=2, aggregator=1, unknown=0` per the clustering primary-selection rule.
    pub fn rank(&self) -> u8 {
        match self {
            SourceReliability::High => 3,
            SourceReliability::Medium => 2,
            SourceReliability::Aggregator => 1,
        }
    }
}

/// Immutable config record describing one syndication feed. Created at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub category: SourceCategory,
    pub reliability: SourceReliability,
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// Normalized syndication item. Reconstructed each ingestion cycle; never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub source_category: SourceCategory,
    pub source_reliability: SourceReliability,
}

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// A set of Articles judged to cover the same story, derived at cluster time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Sorted by (reliability tier desc, publishedAt desc). Head is `primaryArticle`.
    pub articles: Vec<Article>,
    pub sources: Vec<String>,
    pub latest_date: DateTime<Utc>,
    pub category: SourceCategory,
    pub image: Option<String>,
    pub cluster_hash: String,
}

impl Cluster {
    pub fn primary_article(&self) -> &Article {
        self.articles
            .first()
            .expect("Cluster invariant violated: articles must be non-empty")
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Security,
    Political,
    Economic,
    Humanitarian,
    Infrastructure,
    Legal,
}

impl EventType {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "security" => Some(Self::Security),
            "political" => Some(Self::Political),
            "economic" => Some(Self::Economic),
            "humanitarian" => Some(Self::Humanitarian),
            "infrastructure" => Some(Self::Infrastructure),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Security => "security",
            EventType::Political => "political",
            EventType::Economic => "economic",
            EventType::Humanitarian => "humanitarian",
            EventType::Infrastructure => "infrastructure",
            EventType::Legal => "legal",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Local,
    State,
    National,
    CrossBorder,
}

impl Scope {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "local" => Some(Self::Local),
            "state" => Some(Self::State),
            "national" => Some(Self::National),
            "cross_border" => Some(Self::CrossBorder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::State => "state",
            Scope::National => "national",
            Scope::CrossBorder => "cross_border",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Tier3,
    Tier2,
    Tier1,
}

impl SourceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTier::Tier1 => "tier1",
            SourceTier::Tier2 => "tier2",
            SourceTier::Tier3 => "tier3",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Confirmed,
    Reported,
    Unverified,
}

impl VerificationStatus {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "reported" => Some(Self::Reported),
            "unverified" => Some(Self::Unverified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Confirmed => "confirmed",
            VerificationStatus::Reported => "reported",
            VerificationStatus::Unverified => "unverified",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persistent record keyed by `cluster_hash` (unique). Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub cluster_hash: String,
    pub summary: String,
    pub country: String,
    pub regions: Vec<String>,
    pub event_type: EventType,
    pub event_subtype: String,
    pub severity: i32,
    pub scope: Scope,
    pub source_tier: SourceTier,
    pub verification_status: VerificationStatus,
    pub confidence: f64,
    pub rationale: String,
    pub actors: Vec<String>,
    pub actors_normalized: Vec<String>,
    pub article_count: i32,
    pub sources: Vec<String>,
    pub article_urls: Vec<String>,
    pub primary_url: String,
    pub primary_title: String,
    pub published_at: DateTime<Utc>,
    pub extracted_at: DateTime<Utc>,
    pub model_version: String,
    pub prompt_version: String,
}

// ---------------------------------------------------------------------------
// QuarantineRecord
// ---------------------------------------------------------------------------

/// Sidelined extraction whose output failed validation or was low-confidence.
/// `cluster_hash` is NOT unique (reruns possible); its presence still gates re-extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub cluster_hash: String,
    pub raw_output: String,
    pub error_reasons: Vec<String>,
    pub primary_title: String,
    pub primary_url: String,
    pub sources: Vec<String>,
    pub article_urls: Vec<String>,
    pub model_version: String,
    pub prompt_version: String,
    pub quarantined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Unsubscribe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unsubscribe {
    pub email: String,
    pub token: String,
    pub unsubscribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reliability_rank_orders_high_over_aggregator() {
        assert!(SourceReliability::High.rank() > SourceReliability::Medium.rank());
        assert!(SourceReliability::Medium.rank() > SourceReliability::Aggregator.rank());
    }

    #[test]
    fn event_type_round_trips_through_loose_parse() {
        for t in [
            EventType::Security,
            EventType::Political,
            EventType::Economic,
            EventType::Humanitarian,
            EventType::Infrastructure,
            EventType::Legal,
        ] {
            assert_eq!(EventType::from_str_loose(t.as_str()), Some(t));
        }
        assert_eq!(EventType::from_str_loose("not-a-type"), None);
    }

    #[test]
    fn scope_defaults_are_reachable_via_loose_parse() {
        assert_eq!(Scope::from_str_loose("cross_border"), Some(Scope::CrossBorder));
        assert_eq!(Scope::from_str_loose("cross-border"), Some(Scope::CrossBorder));
        assert_eq!(Scope::from_str_loose("bogus"), None);
    }

    #[test]
    fn source_tier_orders_tier1_above_tier3() {
        assert!(SourceTier::Tier1 > SourceTier::Tier2);
        assert!(SourceTier::Tier2 > SourceTier::Tier3);
    }
}
