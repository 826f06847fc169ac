//! Weighted random selection with near-maximality relaxation.
//!
//! The draw favors the best-scoring candidates without being a strict
//! argmax: a draw below the current acceptance bar is redrawn, and the bar
//! drops one ranked score bucket every `relax_interval` consecutive
//! redraws so a low-probability maximum cannot stall the loop.

use rand::Rng;

/// Draw an index proportional to `scores`, redrawing while the draw falls
/// below the relaxing acceptance bar.
///
/// Scores must be non-negative; zero-scored candidates are never selected.
/// Returns `None` when selection is infeasible: every score is zero, or
/// the bar relaxed past the last bucket without an accepted draw.
pub(crate) fn select_near_max<R: Rng>(
    scores: &[i64],
    relax_interval: u32,
    rng: &mut R,
) -> Option<usize> {
    let total: i64 = scores.iter().sum();
    if total <= 0 {
        return None;
    }

    // Distinct score values, highest first: the ranked buckets the bar
    // walks down. Two candidates sharing a score share a bucket.
    let mut buckets: Vec<i64> = scores.to_vec();
    buckets.sort_unstable_by(|a, b| b.cmp(a));
    buckets.dedup();

    let relax_interval = relax_interval.max(1);
    let mut level = 0;
    let mut redraws: u32 = 0;

    loop {
        let pick = weighted_index(scores, total, rng);
        if scores[pick] >= buckets[level] {
            return Some(pick);
        }
        redraws += 1;
        if redraws % relax_interval == 0 {
            level += 1;
            if level >= buckets.len() {
                return None;
            }
        }
    }
}

/// Cumulative-sum draw over non-negative integer scores.
/// `total` must equal `scores.iter().sum()` and be positive.
fn weighted_index<R: Rng>(scores: &[i64], total: i64, rng: &mut R) -> usize {
    let mut r = rng.gen_range(0..total);
    for (i, &s) in scores.iter().enumerate() {
        if r < s {
            return i;
        }
        r -= s;
    }
    scores.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_all_zero_is_infeasible() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_near_max(&[0, 0, 0], 20, &mut rng), None);
        assert_eq!(select_near_max(&[], 20, &mut rng), None);
    }

    #[test]
    fn test_single_candidate() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_near_max(&[0, 3, 0], 20, &mut rng), Some(1));
    }

    #[test]
    fn test_zero_scores_never_selected() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let pick = select_near_max(&[0, 1, 0, 5], 20, &mut rng).unwrap();
            assert!(pick == 1 || pick == 3);
        }
    }

    #[test]
    fn test_dominant_bucket_wins_quickly() {
        // One candidate holds nearly all the mass and the top bucket,
        // so it should be accepted on the first draw most of the time.
        let mut rng = StdRng::seed_from_u64(1);
        let mut top_hits = 0;
        for _ in 0..100 {
            if select_near_max(&[1000, 1], 20, &mut rng) == Some(0) {
                top_hits += 1;
            }
        }
        assert!(top_hits > 90);
    }

    #[test]
    fn test_relaxation_reaches_low_bucket() {
        // The maximum holds ~1% of the mass, so a strict argmax would
        // redraw ~100 times; with the bar dropping after a single redraw,
        // second-bucket candidates must come through almost always.
        let mut rng = StdRng::seed_from_u64(9);
        let mut scores = vec![10i64; 100];
        scores[0] = 11;

        let mut seen_low = false;
        for _ in 0..100 {
            let pick = select_near_max(&scores, 1, &mut rng).unwrap();
            if pick != 0 {
                seen_low = true;
            }
        }
        assert!(seen_low);
    }
}
