use hornsignal_common::{Article, Cluster};

use crate::hash::cluster_hash;
use crate::similarity::cosine;
use crate::tokenize::term_frequencies;

const SIMILARITY_THRESHOLD: f64 = 0.35;

/// Greedy single-pass clustering: iterate articles in input order; for each
/// unassigned article open a new cluster and walk forward, absorbing any
/// later unassigned article whose cosine similarity is >= 0.35.
pub fn cluster_articles(articles: Vec<Article>) -> Vec<Cluster> {
    let term_vectors: Vec<_> = articles.iter().map(|a| {
        term_frequencies(&format!("{} {}", a.title, a.description))
    }).collect();

    let n = articles.len();
    let mut assigned = vec![false; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut group = vec![i];
        for j in (i + 1)..n {
            if assigned[j] {
                continue;
            }
            if cosine(&term_vectors[i], &term_vectors[j]) >= SIMILARITY_THRESHOLD {
                assigned[j] = true;
                group.push(j);
            }
        }
        groups.push(group);
    }

    let mut articles = articles.into_iter().map(Some).collect::<Vec<_>>();
    let mut clusters: Vec<Cluster> = groups
        .into_iter()
        .map(|indices| {
            let mut members: Vec<Article> = indices
                .into_iter()
                .map(|idx| articles[idx].take().expect("each index used once"))
                .collect();
            build_cluster(&mut members)
        })
        .collect();

    clusters.sort_by(|a, b| b.latest_date.cmp(&a.latest_date));
    clusters
}

/// Sort members by (reliability tier desc, publishedAt desc), then derive
/// the cluster's aggregate fields. Head of the sorted list is the primary.
fn build_cluster(members: &mut [Article]) -> Cluster {
    members.sort_by(|a, b| {
        b.source_reliability
            .rank()
            .cmp(&a.source_reliability.rank())
            .then(b.published_at.cmp(&a.published_at))
    });

    let mut sources: Vec<String> = members.iter().map(|a| a.source.clone()).collect();
    sources.sort();
    sources.dedup();

    let latest_date = members
        .iter()
        .map(|a| a.published_at)
        .max()
        .expect("cluster must have at least one article");

    let image = members.iter().find_map(|a| a.image.clone());

    let primary = members.first().expect("cluster must have at least one article");
    let category = primary.source_category;

    let cluster_hash = cluster_hash(members.iter().map(|a| a.title.as_str()));

    Cluster {
        articles: members.to_vec(),
        sources,
        latest_date,
        category,
        image,
        cluster_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hornsignal_common::{SourceCategory, SourceReliability};

    fn article(id: &str, title: &str, reliability: SourceReliability) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            url: format!("https://example.com/{id}"),
            image: None,
            published_at: Utc::now(),
            source: format!("source-{id}"),
            source_category: SourceCategory::International,
            source_reliability: reliability,
        }
    }

    #[test]
    fn similar_titles_cluster_together() {
        let a = article("1", "Kiir meets Machar in Juba", SourceReliability::High);
        let b = article("2", "Machar, Kiir hold Juba meeting", SourceReliability::Medium);
        let c = article("3", "Floods displace 10000 in Jonglei", SourceReliability::Medium);

        let clusters = cluster_articles(vec![a, b, c]);
        assert_eq!(clusters.len(), 2);
        let sizes: Vec<usize> = clusters.iter().map(|c| c.articles.len()).collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&1));
    }

    #[test]
    fn primary_prefers_higher_reliability_tier() {
        let high = article("1", "Clash in Upper Nile leaves dozens dead", SourceReliability::High);
        let agg = article("2", "Clash in Upper Nile leaves dozens dead reported", SourceReliability::Aggregator);

        let clusters = cluster_articles(vec![agg, high.clone()]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].primary_article().id, high.id);
    }

    #[test]
    fn source_count_is_distinct_source_cardinality() {
        let a = article("1", "Clash in Upper Nile leaves dozens dead", SourceReliability::High);
        let mut b = article("2", "Clash in Upper Nile leaves dozens dead", SourceReliability::Medium);
        b.source = a.source.clone();

        let clusters = cluster_articles(vec![a, b]);
        assert_eq!(clusters[0].source_count(), 1);
    }
}
