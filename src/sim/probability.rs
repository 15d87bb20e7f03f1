//! Expected landing probabilities
//!
//! Each peg row is a Bernoulli trial, so the raw slot weight is a binomial
//! mass. The slot-to-path mapping on the board is not a perfect binomial tree
//! (edge slots catch extra mass), so weights are normalized across all slots.

/// Binomial coefficient C(n, k) via the multiplicative recurrence
pub fn binomial_coefficient(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 || k == n {
        return 1.0;
    }
    (1..=k).fold(1.0, |acc, i| acc * (n + 1 - i) as f64 / i as f64)
}

/// Raw (unnormalized) weight of a slot
///
/// The slot index is folded onto its mirror so the distribution is symmetric.
pub fn slot_weight(slot_index: usize, total_slots: usize, rows: u32, p: f64) -> f64 {
    if slot_index >= total_slots {
        return 0.0;
    }
    let k = slot_index.min(total_slots - 1 - slot_index) as u32;
    binomial_coefficient(rows, k) * p.powi(k as i32) * (1.0 - p).powi(rows as i32 - k as i32)
}

/// Normalized expected probabilities for every slot, summing to 1
pub fn expected_distribution(total_slots: usize, rows: u32, p: f64) -> Vec<f64> {
    let raw: Vec<f64> = (0..total_slots)
        .map(|i| slot_weight(i, total_slots, rows, p))
        .collect();
    let sum: f64 = raw.iter().sum();

    if sum <= 0.0 || !sum.is_finite() {
        // Degenerate weights (e.g. p = 0 with k > 0): fall back to uniform
        let uniform = if total_slots == 0 { 0.0 } else { 1.0 / total_slots as f64 };
        return vec![uniform; total_slots];
    }

    raw.into_iter().map(|w| w / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_binomial_coefficient() {
        assert_eq!(binomial_coefficient(11, 0), 1.0);
        assert_eq!(binomial_coefficient(11, 11), 1.0);
        assert!((binomial_coefficient(11, 5) - 462.0).abs() < 1e-9);
        assert_eq!(binomial_coefficient(3, 4), 0.0);
    }

    #[test]
    fn test_stock_board_weights() {
        // 10 slots, 11 rows: slot 4 folds to k = 4, slot 5 folds to k = 4
        let w4 = slot_weight(4, 10, 11, 0.5);
        let w5 = slot_weight(5, 10, 11, 0.5);
        assert!((w4 - 330.0 / 2048.0).abs() < 1e-12);
        assert_eq!(w4, w5);

        let dist = expected_distribution(10, 11, 0.5);
        assert!(dist[4] > dist[0]);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_board() {
        assert!(expected_distribution(0, 11, 0.5).is_empty());
        assert_eq!(expected_distribution(1, 11, 0.5), vec![1.0]);
    }

    proptest! {
        #[test]
        fn prop_normalized_sum_is_one(slots in 1usize..64, rows in 0u32..40, p in 0.01f64..0.99) {
            let dist = expected_distribution(slots, rows, p);
            prop_assert_eq!(dist.len(), slots);
            prop_assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_distribution_is_symmetric(slots in 1usize..64, rows in 0u32..40) {
            let dist = expected_distribution(slots, rows, 0.5);
            for i in 0..slots {
                prop_assert!((dist[i] - dist[slots - 1 - i]).abs() < 1e-15);
            }
        }
    }
}
