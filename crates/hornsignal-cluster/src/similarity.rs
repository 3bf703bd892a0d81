use std::collections::HashMap;

/// Cosine similarity over two term-frequency vectors.
pub fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let mut dot = 0.0;
    for (term, &freq_a) in a {
        if let Some(&freq_b) = b.get(term) {
            dot += freq_a * freq_b;
        }
    }

    let norm_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::term_frequencies;

    #[test]
    fn identical_text_has_cosine_one() {
        let tf = term_frequencies("Kiir meets Machar in Juba");
        assert!((cosine(&tf, &tf) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_text_has_cosine_zero() {
        let a = term_frequencies("Kiir meets Machar in Juba");
        let b = term_frequencies("Floods displace thousands Jonglei");
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[test]
    fn shared_tokens_exceed_threshold() {
        let a = term_frequencies("Kiir meets Machar in Juba");
        let b = term_frequencies("Machar, Kiir hold Juba meeting");
        assert!(cosine(&a, &b) >= 0.35);
    }
}
