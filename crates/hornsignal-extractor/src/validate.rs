//! Schema validation of the parsed LLM JSON object: hard errors reject
//! outright, soft errors only reject when paired with low confidence.

use serde_json::Value;

use hornsignal_common::{EventType, Scope, VerificationStatus};

/// Best-effort field extraction from the parsed JSON, used both for
/// validation and as the source of truth for normalization downstream.
#[derive(Debug, Clone)]
pub struct RawFields {
    pub summary: String,
    pub country: Option<String>,
    pub regions: Vec<String>,
    pub event_type: Option<EventType>,
    pub event_subtype: String,
    pub severity: Option<f64>,
    pub scope: Option<Scope>,
    pub verification_status: Option<VerificationStatus>,
    pub confidence: Option<f64>,
    pub actors: Vec<String>,
    pub rationale: String,
}

pub struct ValidationOutcome {
    pub fields: RawFields,
    pub hard_errors: Vec<String>,
    pub soft_errors: Vec<String>,
}

fn as_string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate(value: &Value) -> ValidationOutcome {
    let mut hard_errors = Vec::new();
    let mut soft_errors = Vec::new();

    let country = value.get("country").and_then(|v| v.as_str()).map(|s| s.to_string());
    if country.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true) {
        hard_errors.push("missing country".to_string());
    }

    let event_type_raw = value.get("eventType").and_then(|v| v.as_str()).unwrap_or("");
    let event_type = EventType::from_str_loose(event_type_raw);
    if event_type.is_none() {
        hard_errors.push(format!("eventType not in enum: {event_type_raw:?}"));
    }

    let severity = value.get("severity").and_then(|v| v.as_f64());
    match severity {
        None => hard_errors.push("severity missing or not a number".to_string()),
        Some(s) if !(1.0..=5.0).contains(&s) => {
            hard_errors.push(format!("severity out of range [1,5]: {s}"))
        }
        _ => {}
    }

    let scope_raw = value.get("scope").and_then(|v| v.as_str());
    let scope = scope_raw.and_then(Scope::from_str_loose);
    if let Some(raw) = scope_raw {
        if scope.is_none() {
            hard_errors.push(format!("scope not in enum: {raw:?}"));
        }
    }

    let verification_raw = value.get("verificationStatus").and_then(|v| v.as_str());
    let verification_status = verification_raw.and_then(VerificationStatus::from_str_loose);
    if let Some(raw) = verification_raw {
        if verification_status.is_none() {
            hard_errors.push(format!("verificationStatus not in enum: {raw:?}"));
        }
    }

    let confidence = value.get("confidence").and_then(|v| v.as_f64());
    if let Some(c) = confidence {
        if !(0.0..=1.0).contains(&c) {
            hard_errors.push(format!("confidence out of range [0,1]: {c}"));
        }
    }

    let regions = value.get("regions").map(as_string_array).unwrap_or_default();
    if regions.is_empty() {
        soft_errors.push("empty or missing regions".to_string());
    }

    if let Some(c) = confidence {
        if c < 0.3 {
            soft_errors.push(format!("low confidence: {c}"));
        }
    }

    let fields = RawFields {
        summary: value.get("summary").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        country,
        regions,
        event_type,
        event_subtype: value.get("eventSubtype").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        severity,
        scope,
        verification_status,
        confidence,
        actors: value.get("actors").map(as_string_array).unwrap_or_default(),
        rationale: value.get("rationale").and_then(|v| v.as_str()).unwrap_or("").to_string(),
    };

    ValidationOutcome {
        fields,
        hard_errors,
        soft_errors,
    }
}

impl ValidationOutcome {
    pub fn is_hard_rejected(&self) -> bool {
        !self.hard_errors.is_empty()
    }

    /// Soft errors only reject when confidence is also < 0.3.
    pub fn is_soft_rejected(&self) -> bool {
        !self.soft_errors.is_empty() && self.fields.confidence.map(|c| c < 0.3).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_country_is_a_hard_error() {
        let value = json!({"country": null, "eventType": "security", "severity": 4});
        let outcome = validate(&value);
        assert!(outcome.is_hard_rejected());
        assert!(outcome.hard_errors.iter().any(|e| e.contains("country")));
    }

    #[test]
    fn severity_out_of_range_is_hard_error() {
        let value = json!({"country": "Sudan", "eventType": "security", "severity": 9});
        let outcome = validate(&value);
        assert!(outcome.is_hard_rejected());
    }

    #[test]
    fn low_confidence_alone_soft_rejects() {
        let value = json!({
            "country": "Sudan", "eventType": "security", "severity": 3,
            "regions": ["Darfur"], "confidence": 0.1
        });
        let outcome = validate(&value);
        assert!(!outcome.is_hard_rejected());
        assert!(outcome.is_soft_rejected());
    }

    #[test]
    fn missing_regions_with_healthy_confidence_accepts() {
        let value = json!({
            "country": "Sudan", "eventType": "security", "severity": 3,
            "confidence": 0.8
        });
        let outcome = validate(&value);
        assert!(!outcome.is_hard_rejected());
        assert!(!outcome.is_soft_rejected());
        assert!(!outcome.soft_errors.is_empty());
    }
}
