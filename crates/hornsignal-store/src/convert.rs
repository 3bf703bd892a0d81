use hornsignal_common::{Event, EventType, Scope, SourceTier, VerificationStatus};

use crate::rows::EventRow;

impl EventRow {
    pub fn into_event(self) -> anyhow::Result<Event> {
        Ok(Event {
            cluster_hash: self.cluster_hash,
            summary: self.summary,
            country: self.country,
            regions: self.regions.0,
            event_type: EventType::from_str_loose(&self.event_type)
                .ok_or_else(|| anyhow::anyhow!("corrupt event_type in store: {}", self.event_type))?,
            event_subtype: self.event_subtype,
            severity: self.severity as i32,
            scope: Scope::from_str_loose(&self.scope)
                .ok_or_else(|| anyhow::anyhow!("corrupt scope in store: {}", self.scope))?,
            source_tier: match self.source_tier.as_str() {
                "tier1" => SourceTier::Tier1,
                "tier2" => SourceTier::Tier2,
                _ => SourceTier::Tier3,
            },
            verification_status: VerificationStatus::from_str_loose(&self.verification_status)
                .ok_or_else(|| anyhow::anyhow!("corrupt verification_status in store"))?,
            confidence: self.confidence,
            rationale: self.rationale,
            actors: self.actors.0,
            actors_normalized: self.actors_normalized.0,
            article_count: self.article_count as i32,
            sources: self.sources.0,
            article_urls: self.article_urls.0,
            primary_url: self.primary_url,
            primary_title: self.primary_title,
            published_at: self.published_at,
            extracted_at: self.extracted_at,
            model_version: self.model_version,
            prompt_version: self.prompt_version,
        })
    }
}
