//! LLM-backed event extraction: one cluster in, one Event or QuarantineRecord
//! out. Owns the system prompt, the retrying HTTP client, and the
//! parse/validate/normalize pipeline between them.

mod client;
pub mod normalize;
mod parse;
mod prompt;
mod validate;

pub use client::LlmClient;
pub use prompt::{build_system_prompt, PROMPT_VERSION};

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use hornsignal_common::{Article, Cluster, Event, QuarantineRecord};
use hornsignal_store::EventStore;

/// Minimum gap between consecutive LLM calls in the background loop.
const INTER_REQUEST_DELAY: Duration = Duration::from_secs(3);

pub enum Outcome {
    Event(Event),
    Quarantine(QuarantineRecord),
}

pub struct Extractor {
    client: LlmClient,
    system_prompt: String,
}

impl Extractor {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            system_prompt: build_system_prompt(),
        }
    }

    fn build_user_prompt(cluster: &Cluster) -> String {
        let mut body = String::new();
        for (i, article) in cluster.articles.iter().enumerate() {
            body.push_str(&format!(
                "Article {}:\nSource: {}\nTitle: {}\nURL: {}\nDescription: {}\n\n",
                i + 1,
                article.source,
                article.title,
                article.url,
                article.description,
            ));
        }
        body
    }

    /// Run the full extraction flow for one cluster: call the model, parse
    /// its output, validate, and either build an Event or a QuarantineRecord.
    /// Never returns Err for a model/parse/validation failure — those always
    /// quarantine. Err is reserved for transport failures the caller should
    /// retry on a later cycle rather than burn a quarantine row on.
    pub async fn extract(&self, cluster: &Cluster) -> anyhow::Result<Outcome> {
        let user_prompt = Self::build_user_prompt(cluster);
        let raw = self.client.complete(&self.system_prompt, &user_prompt).await?;

        let article_urls: Vec<String> = cluster.articles.iter().map(|a| a.url.clone()).collect();
        let primary = cluster.primary_article();

        let parsed = match parse::parse_json(&raw) {
            Ok(value) => value,
            Err(parse_error) => {
                warn!(cluster_hash = %cluster.cluster_hash, %parse_error, "extractor: unparseable LLM output, quarantining");
                return Ok(Outcome::Quarantine(self.quarantine(
                    cluster,
                    &raw,
                    vec![format!("json parse failure: {parse_error}")],
                    &article_urls,
                    primary,
                )));
            }
        };

        let outcome = validate::validate(&parsed);
        if outcome.is_hard_rejected() {
            warn!(cluster_hash = %cluster.cluster_hash, errors = ?outcome.hard_errors, "extractor: hard validation failure, quarantining");
            return Ok(Outcome::Quarantine(self.quarantine(
                cluster,
                &raw,
                outcome.hard_errors,
                &article_urls,
                primary,
            )));
        }
        if outcome.is_soft_rejected() {
            info!(cluster_hash = %cluster.cluster_hash, errors = ?outcome.soft_errors, "extractor: soft validation failure, quarantining");
            return Ok(Outcome::Quarantine(self.quarantine(
                cluster,
                &raw,
                outcome.soft_errors,
                &article_urls,
                primary,
            )));
        }

        let fields = outcome.fields;
        let source_reliabilities: Vec<_> = cluster.articles.iter().map(|a| a.source_reliability).collect();
        let actors_normalized = normalize::normalize_actors(&fields.actors);

        let event = Event {
            cluster_hash: cluster.cluster_hash.clone(),
            summary: fields.summary,
            country: fields.country.unwrap_or_default(),
            regions: fields.regions,
            event_type: fields.event_type.expect("hard validation guarantees eventType is Some"),
            event_subtype: fields.event_subtype,
            severity: normalize::normalize_severity(fields.severity.expect("hard validation guarantees severity is Some")),
            scope: normalize::default_scope(fields.scope),
            source_tier: normalize::derive_source_tier(&source_reliabilities),
            verification_status: normalize::default_verification_status(fields.verification_status),
            confidence: fields.confidence.unwrap_or(0.0),
            rationale: fields.rationale,
            actors: fields.actors,
            actors_normalized,
            article_count: cluster.articles.len() as i32,
            sources: cluster.sources.clone(),
            article_urls,
            primary_url: primary.url.clone(),
            primary_title: primary.title.clone(),
            published_at: cluster.latest_date,
            extracted_at: Utc::now(),
            model_version: self.client.model().to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
        };

        Ok(Outcome::Event(event))
    }

    fn quarantine(
        &self,
        cluster: &Cluster,
        raw: &str,
        error_reasons: Vec<String>,
        article_urls: &[String],
        primary: &Article,
    ) -> QuarantineRecord {
        QuarantineRecord {
            cluster_hash: cluster.cluster_hash.clone(),
            raw_output: raw.to_string(),
            error_reasons,
            primary_title: primary.title.clone(),
            primary_url: primary.url.clone(),
            sources: cluster.sources.clone(),
            article_urls: article_urls.to_vec(),
            model_version: self.client.model().to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            quarantined_at: Utc::now(),
        }
    }
}

/// Run extraction over every cluster not already recorded (as an event or a
/// quarantine row), serially, pacing requests 3s apart to stay well under
/// the model provider's rate limits. A transport error on one cluster is
/// logged and skipped; it will be retried on the next ingestion cycle since
/// it never got recorded as existing.
pub async fn run_extraction_cycle(extractor: &Extractor, store: &EventStore, clusters: &[Cluster]) -> anyhow::Result<()> {
    let mut processed = 0u32;
    for (i, cluster) in clusters.iter().enumerate() {
        if store.exists(&cluster.cluster_hash).await? {
            continue;
        }

        if i > 0 && processed > 0 {
            tokio::time::sleep(INTER_REQUEST_DELAY).await;
        }

        match extractor.extract(cluster).await {
            Ok(Outcome::Event(event)) => {
                info!(cluster_hash = %cluster.cluster_hash, "extractor: accepted event");
                store.insert_event(&event).await?;
            }
            Ok(Outcome::Quarantine(record)) => {
                store.insert_quarantine(&record).await?;
            }
            Err(err) => {
                warn!(cluster_hash = %cluster.cluster_hash, %err, "extractor: transport failure, will retry next cycle");
            }
        }
        processed += 1;
    }
    Ok(())
}
