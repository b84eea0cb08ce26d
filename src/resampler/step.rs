//! Overlap-weighted resampling of step profiles onto target bins.
//!
//! Each target bin's value is the mean of the overlapping source
//! values, weighted by overlap length. The weighting conserves the
//! depth-weighted integral of the measured quantity: coarsening a
//! profile onto unions of whole source intervals reproduces the
//! length-weighted averages exactly, and refining it reproduces the
//! piecewise-constant values with full coverage weight.

use super::grid::TargetGrid;
use crate::profile::StepSample;
use log::debug;

/// One resampled target bin
#[derive(Debug, Clone, Copy)]
pub(crate) struct BinResult {
    pub y_low: f64,
    pub y_sup: f64,
    pub value: f64,
    /// Fraction of the target bin width spanned by non-NaN source
    /// measurements, in [0, 1]
    pub weight: f64,
}

/// Resample sorted, disjoint step samples onto the grid.
///
/// Target bins with no physical overlap are omitted. Without
/// `fill_extremity`, bins at the profile's ends record the actually
/// covered sub-range rather than silently extending to the full bin;
/// with it, the full target bin bounds are kept. Weights are computed
/// against the full target bin width either way.
pub(crate) fn resample_steps(
    samples: &[StepSample],
    grid: &TargetGrid,
    fill_extremity: bool,
) -> Vec<BinResult> {
    let mut results = Vec::with_capacity(grid.num_bins());
    if samples.is_empty() {
        return results;
    }

    let covered_low = samples[0].y_low;
    let covered_sup = samples[samples.len() - 1].y_sup;

    // Both sides are sorted: walk the source once across all bins
    let mut start = 0;
    for bin in 0..grid.num_bins() {
        let (b_low, b_sup) = grid.bin(bin);

        // Skip source intervals entirely above this bin; they stay
        // behind every later bin too
        while start < samples.len() && samples[start].y_sup <= b_low {
            start += 1;
        }

        let mut value_sum = 0.0;
        let mut covered_len = 0.0;
        let mut nan_len = 0.0;

        for sample in &samples[start..] {
            if sample.y_low >= b_sup {
                break;
            }
            let overlap = sample.y_sup.min(b_sup) - sample.y_low.max(b_low);
            if overlap <= 0.0 {
                continue;
            }
            if sample.value.is_nan() {
                nan_len += overlap;
            } else {
                value_sum += sample.value * overlap;
                covered_len += overlap;
            }
        }

        if covered_len <= 0.0 && nan_len <= 0.0 {
            // Nothing physical overlaps this bin
            continue;
        }

        let (value, weight) = if covered_len > 0.0 {
            (value_sum / covered_len, covered_len / (b_sup - b_low))
        } else {
            (f64::NAN, 0.0)
        };

        // Extremity policy: record the actually covered sub-range
        // unless the caller asked to keep full bins
        let (y_low, y_sup) = if fill_extremity {
            (b_low, b_sup)
        } else {
            (b_low.max(covered_low), b_sup.min(covered_sup))
        };

        results.push(BinResult {
            y_low,
            y_sup,
            value,
            weight,
        });
    }

    debug!(
        "resampled {} source intervals onto {} of {} target bins",
        samples.len(),
        results.len(),
        grid.num_bins()
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(y_low: f64, y_sup: f64, value: f64) -> StepSample {
        StepSample::new(y_low, y_sup, value)
    }

    fn grid(edges: &[f64]) -> TargetGrid {
        TargetGrid::from_edges(edges.to_vec()).unwrap()
    }

    #[test]
    fn test_coarsening_weighted_mean() {
        let samples = vec![s(0.0, 0.05, 1.0), s(0.05, 0.10, 2.0), s(0.10, 0.15, 3.0)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10, 0.15]), false);

        assert_eq!(out.len(), 2);
        assert!((out[0].value - 1.5).abs() < 1e-12);
        assert!((out[0].weight - 1.0).abs() < 1e-12);
        assert!((out[1].value - 3.0).abs() < 1e-12);
        assert!((out[1].weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_refinement_passthrough() {
        let samples = vec![s(0.0, 0.10, 4.0), s(0.10, 0.20, 6.0)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.05, 0.10, 0.15, 0.20]), false);

        assert_eq!(out.len(), 4);
        for (result, expected) in out.iter().zip([4.0, 4.0, 6.0, 6.0]) {
            assert!((result.value - expected).abs() < 1e-12);
            assert!((result.weight - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_straddling_interval_split() {
        // One source interval straddles the bin edge at 0.10
        let samples = vec![s(0.05, 0.15, 2.0)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10, 0.20]), false);

        assert_eq!(out.len(), 2);
        assert!((out[0].value - 2.0).abs() < 1e-12);
        assert!((out[0].weight - 0.5).abs() < 1e-12);
        assert!((out[1].weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_source_counts_as_uncovered() {
        let samples = vec![s(0.0, 0.05, 1.0), s(0.05, 0.10, f64::NAN)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10]), false);

        assert_eq!(out.len(), 1);
        // NaN half contributes no value and no coverage
        assert!((out[0].value - 1.0).abs() < 1e-12);
        assert!((out[0].weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_nan_bin() {
        let samples = vec![s(0.0, 0.10, f64::NAN)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10]), false);

        assert_eq!(out.len(), 1);
        assert!(out[0].value.is_nan());
        assert_eq!(out[0].weight, 0.0);
    }

    #[test]
    fn test_uncovered_bins_omitted() {
        let samples = vec![s(0.10, 0.20, 2.0)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10, 0.20, 0.30]), false);

        // Bins [0, 0.10) and [0.20, 0.30) have no physical overlap
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_extremity_clamp_and_fill() {
        // Profile covers [0.02, 0.08) only
        let samples = vec![s(0.02, 0.08, 3.0)];

        let clamped = resample_steps(&samples, &grid(&[0.0, 0.10]), false);
        assert_eq!(clamped.len(), 1);
        assert!((clamped[0].y_low - 0.02).abs() < 1e-12);
        assert!((clamped[0].y_sup - 0.08).abs() < 1e-12);
        assert!((clamped[0].weight - 0.6).abs() < 1e-12);

        let full = resample_steps(&samples, &grid(&[0.0, 0.10]), true);
        assert_eq!(full[0].y_low, 0.0);
        assert_eq!(full[0].y_sup, 0.10);
        // Weight reflects actual coverage either way
        assert!((full[0].weight - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_source_gap_inside_bin() {
        // Disjoint intervals leave [0.04, 0.06) unmeasured
        let samples = vec![s(0.0, 0.04, 2.0), s(0.06, 0.10, 4.0)];
        let out = resample_steps(&samples, &grid(&[0.0, 0.10]), false);

        assert_eq!(out.len(), 1);
        assert!((out[0].value - 3.0).abs() < 1e-12);
        assert!((out[0].weight - 0.8).abs() < 1e-12);
    }
}
