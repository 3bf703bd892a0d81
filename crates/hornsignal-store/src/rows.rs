//! Row shapes for the embedded SQLite store. List-valued columns are stored
//! as JSON text and (de)serialized via `sqlx::types::Json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub cluster_hash: String,
    pub summary: String,
    pub country: String,
    pub regions: Json<Vec<String>>,
    pub event_type: String,
    pub event_subtype: String,
    pub severity: i64,
    pub scope: String,
    pub source_tier: String,
    pub verification_status: String,
    pub confidence: f64,
    pub rationale: String,
    pub actors: Json<Vec<String>>,
    pub actors_normalized: Json<Vec<String>>,
    pub article_count: i64,
    pub sources: Json<Vec<String>>,
    pub article_urls: Json<Vec<String>>,
    pub primary_url: String,
    pub primary_title: String,
    pub published_at: DateTime<Utc>,
    pub extracted_at: DateTime<Utc>,
    pub model_version: String,
    pub prompt_version: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuarantineRow {
    pub id: String,
    pub cluster_hash: String,
    pub raw_output: String,
    pub error_reasons: Json<Vec<String>>,
    pub primary_title: String,
    pub primary_url: String,
    pub sources: Json<Vec<String>>,
    pub article_urls: Json<Vec<String>>,
    pub model_version: String,
    pub prompt_version: String,
    pub quarantined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TypeSeverityCount {
    pub event_type: String,
    pub severity: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CountryCount {
    pub country: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegionSeverityRow {
    pub region: String,
    pub count: i64,
    pub severity_sum: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActorCountRow {
    pub actor: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualitySnapshot {
    pub accept_rate: f64,
    pub average_confidence: f64,
    pub recent_quarantine_count: i64,
    pub missing_regions_by_source: Vec<(String, i64)>,
}
