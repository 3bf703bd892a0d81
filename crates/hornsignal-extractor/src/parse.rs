//! Strip a leading/trailing markdown fence, then parse as JSON.

/// Strip a leading ```json fence and trailing ``` if present.
pub fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_leading = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .trim_start();
    without_leading.strip_suffix("```").unwrap_or(without_leading).trim()
}

/// Parse the raw LLM output into a JSON value. Any parse failure is
/// surfaced as an `Err(message)` for the caller to quarantine with.
pub fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    let stripped = strip_fence(raw);
    serde_json::from_str(stripped).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence_without_json_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn passes_through_unfenced_json() {
        let raw = "{\"a\": 1}";
        assert_eq!(strip_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn parse_failure_surfaces_message() {
        let result = parse_json("not json at all");
        assert!(result.is_err());
    }
}
