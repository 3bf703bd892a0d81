//! Field normalization applied after validation passes: severity clamp,
//! defaulting, source-tier derivation from cluster sources, and actor alias
//! folding. Must be idempotent — running it twice on its own output is a no-op.

use std::collections::HashSet;

use hornsignal_common::{Scope, SourceReliability, SourceTier, VerificationStatus};

/// Round-then-clamp severity into [1,5].
pub fn normalize_severity(raw: f64) -> i32 {
    raw.round().clamp(1.0, 5.0) as i32
}

pub fn default_scope(scope: Option<Scope>) -> Scope {
    scope.unwrap_or(Scope::Local)
}

pub fn default_verification_status(status: Option<VerificationStatus>) -> VerificationStatus {
    status.unwrap_or(VerificationStatus::Reported)
}

/// Highest reliability tier present among the cluster's contributing sources.
pub fn derive_source_tier(source_reliabilities: &[SourceReliability]) -> SourceTier {
    source_reliabilities
        .iter()
        .map(|r| match r {
            SourceReliability::High => SourceTier::Tier1,
            SourceReliability::Medium => SourceTier::Tier2,
            SourceReliability::Aggregator => SourceTier::Tier3,
        })
        .max()
        .unwrap_or(SourceTier::Tier3)
}

/// Known actor aliases folded to one canonical spelling, keyed lowercase.
/// Extend as recurring name variants surface in quarantine review.
const ACTOR_ALIASES: &[(&str, &str)] = &[
    ("saf", "Sudanese Armed Forces"),
    ("sudanese armed forces", "Sudanese Armed Forces"),
    ("rsf", "Rapid Support Forces"),
    ("rapid support forces", "Rapid Support Forces"),
    ("spla-io", "SPLA-IO"),
    ("spla io", "SPLA-IO"),
    ("splm/a-io", "SPLM-IO"),
    ("splm-io", "SPLM-IO"),
    ("unmiss", "UNMISS"),
    ("un mission in south sudan", "UNMISS"),
    ("goss", "Government of South Sudan"),
    ("government of south sudan", "Government of South Sudan"),
    ("un refugee agency", "UNHCR"),
    ("unhcr", "UNHCR"),
];

fn canonicalize_actor(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    ACTOR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Case-insensitive dedup preserving first-occurrence order. Idempotent: the
/// canonical forms this produces are themselves stable under another pass,
/// since every alias target matches exactly one canonicalize_actor arm.
pub fn normalize_actors(raw_actors: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for actor in raw_actors {
        let canonical = canonicalize_actor(actor);
        let dedup_key = canonical.to_lowercase();
        if seen.insert(dedup_key) {
            out.push(canonical);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_rounds_and_clamps() {
        assert_eq!(normalize_severity(3.6), 4);
        assert_eq!(normalize_severity(0.2), 1);
        assert_eq!(normalize_severity(7.0), 5);
    }

    #[test]
    fn source_tier_takes_the_highest_present() {
        let tiers = [SourceReliability::Aggregator, SourceReliability::High, SourceReliability::Medium];
        assert_eq!(derive_source_tier(&tiers), SourceTier::Tier1);
        assert_eq!(derive_source_tier(&[]), SourceTier::Tier3);
    }

    #[test]
    fn actor_aliases_fold_and_dedup_case_insensitively() {
        let raw = vec!["SAF".to_string(), "Sudanese Armed Forces".to_string(), "RSF".to_string()];
        let normalized = normalize_actors(&raw);
        assert_eq!(normalized, vec!["Sudanese Armed Forces".to_string(), "Rapid Support Forces".to_string()]);
    }

    #[test]
    fn normalize_actors_is_idempotent() {
        let raw = vec!["saf".to_string(), "Local Militia".to_string()];
        let once = normalize_actors(&raw);
        let twice = normalize_actors(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_actor_passes_through_trimmed() {
        let raw = vec!["  Local Militia  ".to_string()];
        assert_eq!(normalize_actors(&raw), vec!["Local Militia".to_string()]);
    }
}
