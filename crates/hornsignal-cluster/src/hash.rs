use md5::{Digest, Md5};

/// MD5 of the pipe-joined, sorted, lowercased, trimmed titles of a set of
/// articles. Stable dedup key: invariant under reordering of the input.
pub fn cluster_hash<'a>(titles: impl Iterator<Item = &'a str>) -> String {
    let mut normalized: Vec<String> = titles
        .map(|t| t.trim().to_lowercase())
        .collect();
    normalized.sort();
    let joined = normalized.join("|");

    let mut hasher = Md5::new();
    hasher.update(joined.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_invariant_under_title_order() {
        let titles_a = ["Clash in Upper Nile", "Upper Nile clash reported"];
        let titles_b = ["Upper Nile clash reported", "Clash in Upper Nile"];
        assert_eq!(
            cluster_hash(titles_a.iter().copied()),
            cluster_hash(titles_b.iter().copied())
        );
    }

    #[test]
    fn hash_changes_when_article_set_changes() {
        let ab = cluster_hash(["Clash in Upper Nile", "Upper Nile clash reported"].iter().copied());
        let abc = cluster_hash(
            ["Clash in Upper Nile", "Upper Nile clash reported", "Different story entirely"]
                .iter()
                .copied(),
        );
        assert_ne!(ab, abc);
    }

    #[test]
    fn hash_is_case_and_whitespace_insensitive() {
        let a = cluster_hash(["  Clash In Upper Nile  "].iter().copied());
        let b = cluster_hash(["clash in upper nile"].iter().copied());
        assert_eq!(a, b);
    }
}
