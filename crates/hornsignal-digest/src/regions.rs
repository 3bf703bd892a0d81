//! Region containment table: child → ancestors, all lowercase. Backs region
//! overlap for event bundling and the parent/child display collapse.

const CONTAINMENT: &[(&str, &[&str])] = &[
    // Sudan — Darfur states
    ("el fasher", &["north darfur", "darfur"]),
    ("north darfur", &["darfur"]),
    ("south darfur", &["darfur"]),
    ("west darfur", &["darfur"]),
    ("east darfur", &["darfur"]),
    ("central darfur", &["darfur"]),
    ("nyala", &["south darfur", "darfur"]),
    ("geneina", &["west darfur", "darfur"]),
    // Sudan — Kordofan states
    ("north kordofan", &["kordofan"]),
    ("south kordofan", &["kordofan"]),
    ("west kordofan", &["kordofan"]),
    ("el obeid", &["north kordofan", "kordofan"]),
    ("kadugli", &["south kordofan", "kordofan"]),
    // Sudan — other states
    ("khartoum", &["khartoum state"]),
    ("omdurman", &["khartoum state"]),
    ("bahri", &["khartoum state"]),
    ("port sudan", &["red sea"]),
    ("wad madani", &["gezira"]),
    // South Sudan
    ("juba", &["central equatoria"]),
    ("bentiu", &["unity"]),
    ("malakal", &["upper nile"]),
    ("bor", &["jonglei"]),
    ("wau", &["western bahr el ghazal"]),
    ("rumbek", &["lakes"]),
    ("torit", &["eastern equatoria"]),
    ("yambio", &["western equatoria"]),
    ("kuajok", &["warrap"]),
    ("aweil", &["northern bahr el ghazal"]),
];

/// Ancestors of `region`, lowercased comparison, empty if `region` is
/// unknown or already top-level.
pub fn ancestors(region: &str) -> Vec<&'static str> {
    let key = region.trim().to_lowercase();
    CONTAINMENT
        .iter()
        .find(|(child, _)| *child == key)
        .map(|(_, ancestors)| ancestors.to_vec())
        .unwrap_or_default()
}

/// Direct parent only (first entry in the ancestor chain), used by the
/// display collapse rule.
pub fn direct_parent(region: &str) -> Option<&'static str> {
    ancestors(region).into_iter().next()
}

/// Reflexive, symmetric region overlap: equal, one contains the other, or
/// their ancestor sets intersect. Empty lists overlap with anything.
pub fn regions_overlap(a: &[String], b: &[String]) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    for ra in a {
        let ra_key = ra.trim().to_lowercase();
        let ra_ancestors = ancestors(ra);
        for rb in b {
            let rb_key = rb.trim().to_lowercase();
            if ra_key == rb_key {
                return true;
            }
            let rb_ancestors = ancestors(rb);
            if rb_ancestors.contains(&ra_key.as_str()) || ra_ancestors.contains(&rb_key.as_str()) {
                return true;
            }
            if ra_ancestors.iter().any(|x| rb_ancestors.contains(x)) {
                return true;
            }
        }
    }
    false
}

/// Collapse child+ancestor combinations before rendering: if a region and
/// one of its present ancestors both appear, display `Ancestor (Child)` and
/// drop the ancestor standalone (picking the closest present ancestor).
pub fn collapse_for_display(regions: &[String]) -> Vec<String> {
    use std::collections::{HashMap, HashSet};

    let lower_present: HashMap<String, String> =
        regions.iter().map(|r| (r.trim().to_lowercase(), r.clone())).collect();

    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut is_child_with_ancestor: HashSet<String> = HashSet::new();
    let mut dropped_ancestors: HashSet<String> = HashSet::new();

    for r in regions {
        let lr = r.trim().to_lowercase();
        let chain = ancestors(&lr);
        if let Some(closest) = chain.iter().find(|a| lower_present.contains_key(**a)) {
            children_of.entry(closest.to_string()).or_default().push(r.clone());
            is_child_with_ancestor.insert(lr.clone());
            for a in &chain {
                if lower_present.contains_key(*a) {
                    dropped_ancestors.insert(a.to_string());
                }
            }
        }
    }

    let mut seen_combo = HashSet::new();
    let mut output = Vec::new();
    for r in regions {
        let lr = r.trim().to_lowercase();
        if is_child_with_ancestor.contains(&lr) {
            let chain = ancestors(&lr);
            if let Some(closest) = chain.iter().find(|a| lower_present.contains_key(**a)) {
                if seen_combo.insert(closest.to_string()) {
                    let ancestor_display = &lower_present[*closest];
                    let kids = &children_of[*closest];
                    output.push(format!("{} ({})", ancestor_display, kids.join(", ")));
                }
            }
            continue;
        }
        if dropped_ancestors.contains(&lr) {
            continue;
        }
        output.push(r.clone());
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_fasher_overlaps_north_darfur_via_containment() {
        let a = vec!["El Fasher".to_string()];
        let b = vec!["North Darfur".to_string()];
        assert!(regions_overlap(&a, &b));
    }

    #[test]
    fn unrelated_regions_do_not_overlap() {
        let a = vec!["Juba".to_string()];
        let b = vec!["Khartoum".to_string()];
        assert!(!regions_overlap(&a, &b));
    }

    #[test]
    fn empty_region_list_overlaps_with_anything() {
        let a: Vec<String> = vec![];
        let b = vec!["Juba".to_string()];
        assert!(regions_overlap(&a, &b));
    }

    #[test]
    fn overlap_is_reflexive_and_symmetric() {
        let a = vec!["North Darfur".to_string()];
        assert!(regions_overlap(&a, &a));
        let b = vec!["El Fasher".to_string()];
        assert_eq!(regions_overlap(&a, &b), regions_overlap(&b, &a));
    }

    #[test]
    fn direct_parent_of_el_fasher_is_north_darfur() {
        assert_eq!(direct_parent("El Fasher"), Some("north darfur"));
        assert_eq!(direct_parent("Darfur"), None);
    }

    #[test]
    fn collapse_merges_child_with_direct_parent() {
        let regions = vec!["El Fasher".to_string(), "North Darfur".to_string()];
        let collapsed = collapse_for_display(&regions);
        assert_eq!(collapsed, vec!["North Darfur (El Fasher)".to_string()]);
    }

    #[test]
    fn collapse_merges_child_with_top_level_ancestor_when_direct_parent_absent() {
        let regions = vec!["El Fasher".to_string(), "Darfur".to_string()];
        let collapsed = collapse_for_display(&regions);
        assert_eq!(collapsed, vec!["Darfur (El Fasher)".to_string()]);
    }

    #[test]
    fn collapse_leaves_unrelated_regions_untouched() {
        let regions = vec!["Juba".to_string(), "Khartoum".to_string()];
        let collapsed = collapse_for_display(&regions);
        assert_eq!(collapsed, regions);
    }
}
