//! Topical relevance filter over South Sudan / Sudan syndication items.
//!
//! STRONG keywords are title-sufficient: any one match in the title accepts
//! the item outright. SUPPORTING keywords are counted in the body
//! (`contentSnippet + " " + content`) against fixed thresholds.

/// Title-sufficient keywords. A single case-insensitive match anywhere in
/// the title accepts the item.
pub const STRONG_KEYWORDS: &[&str] = &[
    "south sudan",
    "salva kiir",
    "unmiss",
    "khartoum",
    "rsf",
    "al-burhan",
    "al burhan",
    "hemedti",
    "sudan war",
];

/// Body-counted keywords for South Sudan stories. Two or more matches in the
/// body accept the item.
pub const SUPPORTING_SS_KEYWORDS: &[&str] = &[
    "juba",
    "unmiss",
    "salva kiir",
    "riek machar",
    "splm",
    "splm-io",
    "splm/a-io",
    "bor",
    "malakal",
    "wau",
    "renk",
    "jonglei",
    "upper nile",
    "unity state",
    "warrap",
    "central equatoria",
    "eastern equatoria",
    "western equatoria",
    "lakes state",
    "abyei",
    "pibor",
    "nuer",
    "dinka",
    "goss",
    "ceasefire monitoring",
];

/// Body-counted keywords for Sudan stories. Two or more matches accept when
/// the title says "sudan" but not "south sudan"; three or more accept
/// unconditionally regardless of title.
pub const SUPPORTING_SUDAN_KEYWORDS: &[&str] = &[
    "darfur",
    "omdurman",
    "port sudan",
    "el fasher",
    "el-fasher",
    "nyala",
    "kordofan",
    "blue nile",
    "sudanese armed forces",
    "janjaweed",
    "rapid support forces",
    "sudanese army",
    "kassala",
    "gezira",
    "sennar",
    "red sea state",
    "north darfur",
    "south darfur",
];

fn count_matches(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|n| haystack.contains(*n)).count()
}

/// Decide whether an item is topically relevant to the South Sudan / Sudan beat.
///
/// `title`, `content_snippet`, and `content` are compared case-insensitively;
/// `body` is `content_snippet + " " + content`.
pub fn is_relevant(title: &str, content_snippet: &str, content: &str) -> bool {
    let title_lc = title.to_lowercase();
    let body_lc = format!("{content_snippet} {content}").to_lowercase();

    if STRONG_KEYWORDS.iter().any(|k| title_lc.contains(k)) {
        return true;
    }

    if title_lc.contains("sudan") && !title_lc.contains("south sudan") {
        if count_matches(&body_lc, SUPPORTING_SUDAN_KEYWORDS) >= 2 {
            return true;
        }
    }

    if count_matches(&body_lc, SUPPORTING_SS_KEYWORDS) >= 2 {
        return true;
    }

    if count_matches(&body_lc, SUPPORTING_SUDAN_KEYWORDS) >= 3 {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kiir_title_with_two_ss_supporting_terms_in_body_accepts() {
        assert!(is_relevant(
            "Kiir addresses nation in Juba",
            "President speaks in Juba, UNMISS monitors peace",
            "",
        ));
    }

    #[test]
    fn unrelated_title_single_body_mention_rejects() {
        assert!(!is_relevant(
            "Uganda tourism boom",
            "Visitors flock to Juba markets this year",
            "",
        ));
    }

    #[test]
    fn strong_keyword_in_title_accepts_regardless_of_body() {
        assert!(is_relevant("South Sudan truce signed", "", ""));
        assert!(is_relevant("Khartoum under fire again", "", ""));
    }

    #[test]
    fn sudan_only_title_needs_two_sudan_supporting_terms() {
        assert!(!is_relevant(
            "Sudan economy in focus",
            "Darfur prices rising",
            "",
        ));
        assert!(is_relevant(
            "Sudan economy in focus",
            "Darfur and Kordofan markets disrupted",
            "",
        ));
    }

    #[test]
    fn three_sudan_supporting_terms_without_title_match_accepts() {
        assert!(is_relevant(
            "Regional markets roundup",
            "Darfur, Kordofan and Omdurman all reported shortages",
            "",
        ));
    }
}
