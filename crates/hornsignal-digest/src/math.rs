//! Percent-change arithmetic and the baseline-weak guard shared across
//! topline, hot-regions, and actor-spike sections.

/// `round(((cur - prev) / prev) * 100)`, special-cased at the edges:
/// `pct(0,0) = 0`, `pct(N,0) = +100` for N>0 (prev=0 means "new"), and the
/// ordinary formula otherwise (including `pct(0,N) = -100` for N>0).
pub fn percent_change(prev: i64, cur: i64) -> i64 {
    if prev == 0 && cur == 0 {
        return 0;
    }
    if prev == 0 {
        return 100;
    }
    (((cur - prev) as f64 / prev as f64) * 100.0).round() as i64
}

/// Last week's event count under 5 makes week-over-week percentages
/// statistically meaningless; the digest switches to raw counts only.
pub fn is_baseline_weak(last_week_count: i64) -> bool {
    last_week_count < 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_to_zero_is_zero() {
        assert_eq!(percent_change(0, 0), 0);
    }

    #[test]
    fn zero_to_positive_is_100() {
        assert_eq!(percent_change(0, 7), 100);
    }

    #[test]
    fn positive_to_zero_is_negative_100() {
        assert_eq!(percent_change(7, 0), -100);
    }

    #[test]
    fn ordinary_case_rounds() {
        assert_eq!(percent_change(10, 15), 50);
        assert_eq!(percent_change(3, 4), 33);
    }

    #[test]
    fn baseline_weak_threshold_is_five() {
        assert!(is_baseline_weak(4));
        assert!(!is_baseline_weak(5));
    }
}
