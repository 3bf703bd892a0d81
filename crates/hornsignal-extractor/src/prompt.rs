//! System prompt construction. The prompt enumerates the schema, enum
//! domains, severity ladder semantics, and admin-region name lists the model
//! must draw from.

pub const PROMPT_VERSION: &str = "2026-01-v1";

const ADMIN_REGIONS: &[&str] = &[
    // South Sudan states/areas
    "Central Equatoria", "Eastern Equatoria", "Western Equatoria", "Jonglei", "Unity",
    "Upper Nile", "Warrap", "Lakes", "Western Bahr el Ghazal", "Northern Bahr el Ghazal",
    "Abyei", "Pibor",
    // Sudan states
    "Khartoum", "North Darfur", "South Darfur", "West Darfur", "East Darfur", "Central Darfur",
    "North Kordofan", "South Kordofan", "West Kordofan", "Blue Nile", "White Nile", "Gezira",
    "Sennar", "Kassala", "Red Sea", "River Nile", "Northern",
];

pub fn build_system_prompt() -> String {
    format!(
        r#"You are an analyst producing structured event records for a Horn of Africa
(South Sudan, Sudan) news monitoring system. You will be given the titles,
URLs, and descriptions of multiple articles that all cover the same story.

Respond with a single JSON object and nothing else — no markdown fences, no
prose before or after. The object must have exactly these fields:

- summary: string, 1-3 sentences
- country: string (e.g. "South Sudan", "Sudan")
- regions: array of strings, using these standard admin region names where
  applicable: {regions}
- eventType: one of "security", "political", "economic", "humanitarian",
  "infrastructure", "legal"
- eventSubtype: short lowercase slug, e.g. "clash", "airstrike", "displacement"
- severity: integer 1-5, where 1 = routine/administrative, 2 = notable but
  contained, 3 = significant with regional implications, 4 = grave with
  national implications, 5 = critical, mass-casualty or state-threatening
- scope: one of "local", "state", "national", "cross_border"
- verificationStatus: one of "confirmed", "reported", "unverified"
- confidence: float 0.0-1.0, your confidence the extraction is accurate
- actors: array of strings naming the people/groups/institutions involved
- rationale: string, your justification for the severity and verification
  assessment above

Only use information present in the supplied articles. If uncertain, prefer
lower severity and verificationStatus "unverified"."#,
        regions = ADMIN_REGIONS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_enumerates_every_event_type_and_scope() {
        let prompt = build_system_prompt();
        for t in ["security", "political", "economic", "humanitarian", "infrastructure", "legal"] {
            assert!(prompt.contains(t), "missing eventType {t}");
        }
        for s in ["local", "state", "national", "cross_border"] {
            assert!(prompt.contains(s), "missing scope {s}");
        }
    }
}
