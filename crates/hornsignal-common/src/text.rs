//! Small text utilities shared across ingestion, extraction, and digest rendering.

/// Strip HTML tags and collapse `&nbsp;` to a plain space. Not a full HTML
/// parser — good enough for feed `description`/`summary` fields, which are
/// short and rarely contain anything beyond basic markup.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max_chars` Unicode scalar values, not bytes.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_nbsp() {
        let html = "<p>Clashes erupted&nbsp;in <b>Juba</b> today.</p>";
        assert_eq!(strip_html(html), "Clashes erupted in Juba today.");
    }

    #[test]
    fn truncates_by_character_not_byte() {
        let s = "a".repeat(10);
        assert_eq!(truncate_chars(&s, 3).chars().count(), 3);
    }
}
