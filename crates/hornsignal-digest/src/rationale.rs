//! Strip legacy verbose LLM rationales that restate the severity/verification
//! judgement instead of explaining it. A stripped rationale renders empty.

const PREFIXES: &[&str] = &[
    "the severity",
    "the verification",
    "the confidence",
    "this is rated",
    "rated as",
];

const CONTAINS_PATTERNS: &[&str] = &["which is a grave", "which is a significant", "which is a major", "which is a serious"];

fn starts_with_severity_n(s: &str) -> bool {
    let lower = s.to_lowercase();
    if let Some(rest) = lower.strip_prefix("severity ") {
        rest.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)
    } else {
        false
    }
}

pub fn clean_rationale(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    if PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return String::new();
    }
    if starts_with_severity_n(trimmed) {
        return String::new();
    }
    if CONTAINS_PATTERNS.iter().any(|p| lower.contains(p)) {
        return String::new();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_severity_prefix_justifications() {
        assert_eq!(clean_rationale("The severity is high because of casualties."), "");
        assert_eq!(clean_rationale("Severity 4 due to scale of displacement."), "");
        assert_eq!(clean_rationale("Rated as critical given reports."), "");
    }

    #[test]
    fn strips_which_is_a_patterns() {
        assert_eq!(
            clean_rationale("Multiple deaths reported, which is a grave escalation."),
            ""
        );
    }

    #[test]
    fn keeps_genuine_rationale() {
        let raw = "Three independent outlets confirm troop movement near the border.";
        assert_eq!(clean_rationale(raw), raw);
    }
}
