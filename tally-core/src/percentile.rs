use serde::Serialize;

/// Latency distribution of one run's sample set, computed once at run end.
///
/// All fields are `None` when the run produced no samples; callers render an
/// explicit "n/a" instead of indexing into nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSummary {
    pub min: Option<u64>,
    pub p50: Option<u64>,
    pub p75: Option<u64>,
    pub p90: Option<u64>,
    pub p95: Option<u64>,
    pub p99: Option<u64>,
    pub max: Option<u64>,
    pub mean: Option<f64>,
    pub count: u64,
}

/// Nearest-rank percentile summary: the value at index `floor(p * n)` of the
/// ascending-sorted samples, clamped to the last element.
///
/// Deliberately not interpolated; historical trend artifacts were produced
/// with this exact method and must stay comparable.
pub fn summarize(samples: &[u64]) -> PercentileSummary {
    if samples.is_empty() {
        return PercentileSummary::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let nearest_rank = |p: f64| {
        let idx = ((sorted.len() as f64) * p).floor() as usize;
        sorted[idx.min(sorted.len() - 1)]
    };

    let sum: u64 = sorted.iter().sum();

    PercentileSummary {
        min: sorted.first().copied(),
        p50: Some(nearest_rank(0.50)),
        p75: Some(nearest_rank(0.75)),
        p90: Some(nearest_rank(0.90)),
        p95: Some(nearest_rank(0.95)),
        p99: Some(nearest_rank(0.99)),
        max: sorted.last().copied(),
        mean: Some(sum as f64 / sorted.len() as f64),
        count: sorted.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_set_yields_empty_summary() {
        let s = summarize(&[]);
        assert_eq!(s, PercentileSummary::default());
        assert_eq!(s.count, 0);
        assert!(s.p50.is_none());
    }

    #[test]
    fn single_sample_pins_every_percentile() {
        let s = summarize(&[150]);
        assert_eq!(s.min, Some(150));
        assert_eq!(s.p50, Some(150));
        assert_eq!(s.p75, Some(150));
        assert_eq!(s.p90, Some(150));
        assert_eq!(s.p95, Some(150));
        assert_eq!(s.p99, Some(150));
        assert_eq!(s.max, Some(150));
        assert_eq!(s.mean, Some(150.0));
        assert_eq!(s.count, 1);
    }

    #[test]
    fn nearest_rank_uses_floor_index() {
        // n=10: p50 -> index 5, p90 -> index 9, p99 -> index 9.
        let samples: Vec<u64> = (1..=10).map(|v| v * 10).collect();
        let s = summarize(&samples);
        assert_eq!(s.p50, Some(60));
        assert_eq!(s.p75, Some(80));
        assert_eq!(s.p90, Some(100));
        assert_eq!(s.p99, Some(100));
        assert_eq!(s.min, Some(10));
        assert_eq!(s.max, Some(100));
    }

    #[test]
    fn summary_is_order_independent() {
        let sorted: Vec<u64> = (1..=100).collect();
        let mut shuffled = sorted.clone();
        // Deterministic shuffle.
        for i in 0..shuffled.len() {
            let j = (i * 37 + 11) % shuffled.len();
            shuffled.swap(i, j);
        }
        assert_eq!(summarize(&sorted), summarize(&shuffled));
    }

    #[test]
    fn summarize_leaves_input_untouched() {
        let samples = vec![30, 10, 20];
        let _ = summarize(&samples);
        assert_eq!(samples, vec![30, 10, 20]);
    }
}
