//! Embedded, single-writer, WAL-journaled event store. Exposes `exists`,
//! idempotent inserts for events and quarantine records, point lookups, and
//! the aggregation queries used by the digest builder and admin snapshots.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use hornsignal_common::{Event, QuarantineRecord};

use crate::rows::{
    ActorCountRow, CountryCount, DataQualitySnapshot, EventRow, QuarantineRow,
    RegionSeverityRow, TypeSeverityCount,
};

#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    /// Open (creating if absent) the SQLite database file at `path`, enable
    /// WAL journaling, and run migrations. Single writer by construction:
    /// the pool is capped at one connection.
    pub async fn open(path: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Memory);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// True iff `hash` is present in `events` OR `quarantine`. Gates
    /// re-extraction: both tables suppress a repeat LLM call.
    pub async fn exists(&self, cluster_hash: &str) -> anyhow::Result<bool> {
        let in_events: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM events WHERE cluster_hash = ?1 LIMIT 1",
        )
        .bind(cluster_hash)
        .fetch_optional(&self.pool)
        .await?;
        if in_events.is_some() {
            return Ok(true);
        }

        let in_quarantine: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM quarantine WHERE cluster_hash = ?1 LIMIT 1",
        )
        .bind(cluster_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(in_quarantine.is_some())
    }

    /// Insert an Event. Idempotent by `cluster_hash` UNIQUE (PRIMARY KEY
    /// here) — a conflicting re-insert is treated as success, not an error.
    pub async fn insert_event(&self, event: &Event) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (
                cluster_hash, summary, country, regions, event_type, event_subtype,
                severity, scope, source_tier, verification_status, confidence, rationale,
                actors, actors_normalized, article_count, sources, article_urls,
                primary_url, primary_title, published_at, extracted_at, model_version, prompt_version
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
            )
            ON CONFLICT(cluster_hash) DO NOTHING
            "#,
        )
        .bind(&event.cluster_hash)
        .bind(&event.summary)
        .bind(&event.country)
        .bind(serde_json::to_string(&event.regions)?)
        .bind(event.event_type.as_str())
        .bind(&event.event_subtype)
        .bind(event.severity as i64)
        .bind(event.scope.as_str())
        .bind(event.source_tier.as_str())
        .bind(event.verification_status.as_str())
        .bind(event.confidence)
        .bind(&event.rationale)
        .bind(serde_json::to_string(&event.actors)?)
        .bind(serde_json::to_string(&event.actors_normalized)?)
        .bind(event.article_count as i64)
        .bind(serde_json::to_string(&event.sources)?)
        .bind(serde_json::to_string(&event.article_urls)?)
        .bind(&event.primary_url)
        .bind(&event.primary_title)
        .bind(event.published_at)
        .bind(event.extracted_at)
        .bind(&event.model_version)
        .bind(&event.prompt_version)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(cluster_hash = %event.cluster_hash, "store: duplicate event insert treated as success");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn insert_quarantine(&self, record: &QuarantineRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quarantine (
                id, cluster_hash, raw_output, error_reasons, primary_title, primary_url,
                sources, article_urls, model_version, prompt_version, quarantined_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.cluster_hash)
        .bind(&record.raw_output)
        .bind(serde_json::to_string(&record.error_reasons)?)
        .bind(&record.primary_title)
        .bind(&record.primary_url)
        .bind(serde_json::to_string(&record.sources)?)
        .bind(serde_json::to_string(&record.article_urls)?)
        .bind(&record.model_version)
        .bind(&record.prompt_version)
        .bind(record.quarantined_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_event_by_cluster_hash(&self, hash: &str) -> anyhow::Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT cluster_hash, summary, country, regions, event_type, event_subtype,
                   severity, scope, source_tier, verification_status, confidence, rationale,
                   actors, actors_normalized, article_count, sources, article_urls,
                   primary_url, primary_title, published_at, extracted_at, model_version, prompt_version
            FROM events WHERE cluster_hash = ?1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_event()).transpose()
    }

    /// All events with `published_at` in `[start, end)`, newest first.
    pub async fn events_in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT cluster_hash, summary, country, regions, event_type, event_subtype,
                   severity, scope, source_tier, verification_status, confidence, rationale,
                   actors, actors_normalized, article_count, sources, article_urls,
                   primary_url, primary_title, published_at, extracted_at, model_version, prompt_version
            FROM events
            WHERE published_at >= ?1 AND published_at < ?2
            ORDER BY published_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_event()).collect()
    }

    pub async fn counts_by_type_and_severity(&self) -> anyhow::Result<Vec<TypeSeverityCount>> {
        let rows: Vec<TypeSeverityCount> = sqlx::query_as(
            "SELECT event_type, severity, COUNT(*) as count FROM events GROUP BY event_type, severity",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn counts_by_country(&self) -> anyhow::Result<Vec<CountryCount>> {
        let rows: Vec<CountryCount> = sqlx::query_as(
            "SELECT country, COUNT(*) as count FROM events GROUP BY country ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Region-weighted severity for a window: sum(severity) and count per
    /// region, where `regions` is a JSON array column exploded in Rust
    /// (SQLite has no native `json_each` guarantee across build configs, so
    /// this pulls window events and folds in memory).
    pub async fn region_severity_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RegionSeverityRow>> {
        let events = self.events_in_window(start, end).await?;
        let mut acc: std::collections::HashMap<String, (i64, i64)> = std::collections::HashMap::new();
        for event in &events {
            for region in &event.regions {
                let entry = acc.entry(region.clone()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += event.severity as i64;
            }
        }
        let mut rows: Vec<RegionSeverityRow> = acc
            .into_iter()
            .map(|(region, (count, severity_sum))| RegionSeverityRow {
                region,
                count,
                severity_sum,
            })
            .collect();
        rows.sort_by(|a, b| b.severity_sum.cmp(&a.severity_sum));
        Ok(rows)
    }

    pub async fn actor_counts_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ActorCountRow>> {
        let events = self.events_in_window(start, end).await?;
        let mut acc: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
        for event in &events {
            for actor in &event.actors_normalized {
                *acc.entry(actor.clone()).or_insert(0) += 1;
            }
        }
        let mut rows: Vec<ActorCountRow> = acc
            .into_iter()
            .map(|(actor, count)| ActorCountRow { actor, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    /// Accept rate, average confidence, recent quarantine count, and
    /// missing-regions-by-source, for the admin data-quality snapshot.
    pub async fn data_quality_snapshot(&self, lookback_days: i64) -> anyhow::Result<DataQualitySnapshot> {
        let since = Utc::now() - chrono::Duration::days(lookback_days);

        let accepted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE extracted_at >= ?1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        let quarantined: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quarantine WHERE quarantined_at >= ?1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        let total = accepted + quarantined;
        let accept_rate = if total == 0 { 0.0 } else { accepted as f64 / total as f64 };

        let average_confidence: Option<f64> =
            sqlx::query_scalar("SELECT AVG(confidence) FROM events WHERE extracted_at >= ?1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        let rows: Vec<QuarantineRow> = sqlx::query_as(
            r#"
            SELECT id, cluster_hash, raw_output, error_reasons, primary_title, primary_url,
                   sources, article_urls, model_version, prompt_version, quarantined_at
            FROM quarantine WHERE quarantined_at >= ?1
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut by_source: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
        for row in &rows {
            for source in &row.sources.0 {
                *by_source.entry(source.clone()).or_insert(0) += 1;
            }
        }
        let mut missing_regions_by_source: Vec<(String, i64)> = by_source.into_iter().collect();
        missing_regions_by_source.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(DataQualitySnapshot {
            accept_rate,
            average_confidence: average_confidence.unwrap_or(0.0),
            recent_quarantine_count: quarantined,
            missing_regions_by_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hornsignal_common::{EventType, Scope, SourceTier, VerificationStatus};

    fn sample_event(cluster_hash: &str) -> Event {
        Event {
            cluster_hash: cluster_hash.to_string(),
            summary: "Clash reported in Upper Nile".into(),
            country: "South Sudan".into(),
            regions: vec!["Upper Nile".into()],
            event_type: EventType::Security,
            event_subtype: "clash".into(),
            severity: 4,
            scope: Scope::State,
            source_tier: SourceTier::Tier2,
            verification_status: VerificationStatus::Reported,
            confidence: 0.7,
            rationale: "Multiple local outlets confirm".into(),
            actors: vec!["SPLA-IO".into()],
            actors_normalized: vec!["SPLM-IO".into()],
            article_count: 2,
            sources: vec!["Radio Tamazuj".into()],
            article_urls: vec!["https://example.com/a".into()],
            primary_url: "https://example.com/a".into(),
            primary_title: "Clash in Upper Nile".into(),
            published_at: Utc::now(),
            extracted_at: Utc::now(),
            model_version: "claude-test".into(),
            prompt_version: "v1".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_exists_and_fetch_round_trip() {
        let store = EventStore::open_in_memory().await.unwrap();
        let event = sample_event("hash-1");

        assert!(!store.exists("hash-1").await.unwrap());
        store.insert_event(&event).await.unwrap();
        assert!(store.exists("hash-1").await.unwrap());

        let fetched = store.get_event_by_cluster_hash("hash-1").await.unwrap().unwrap();
        assert_eq!(fetched.country, "South Sudan");
        assert_eq!(fetched.severity, 4);
    }

    #[tokio::test]
    async fn duplicate_insert_is_idempotent() {
        let store = EventStore::open_in_memory().await.unwrap();
        let event = sample_event("hash-2");
        store.insert_event(&event).await.unwrap();
        store.insert_event(&event).await.unwrap();

        let rows: Vec<EventRow> = sqlx::query_as("SELECT * FROM events WHERE cluster_hash = 'hash-2'")
            .fetch_all(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn quarantine_does_not_block_on_unique_hash() {
        let store = EventStore::open_in_memory().await.unwrap();
        let record = QuarantineRecord {
            cluster_hash: "hash-3".into(),
            raw_output: "not json".into(),
            error_reasons: vec!["parse error".into()],
            primary_title: "title".into(),
            primary_url: "https://example.com".into(),
            sources: vec!["X".into()],
            article_urls: vec!["https://example.com".into()],
            model_version: "v".into(),
            prompt_version: "v".into(),
            quarantined_at: Utc::now(),
        };
        store.insert_quarantine(&record).await.unwrap();
        store.insert_quarantine(&record).await.unwrap();
        assert!(store.exists("hash-3").await.unwrap());
    }
}
