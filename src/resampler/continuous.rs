//! Linear interpolation of continuous profiles onto target sample
//! points.
//!
//! No extrapolation: targets outside the profile's covered range get
//! NaN. A target point that coincides with a source point (within the
//! match tolerance) reproduces that source value exactly, which keeps
//! resampling idempotent on any grid containing the original points.

use crate::profile::PointSample;

/// Interpolate the profile's `(y_mid, value)` pairs at every target
/// depth.
///
/// With `fill_gap`, NaN-valued source points are dropped before
/// interpolation so the valid neighbors bridge across them; without it
/// a segment with a NaN endpoint interpolates to NaN.
pub(crate) fn interpolate_points(
    points: &[PointSample],
    targets: &[f64],
    match_tolerance: f64,
    fill_gap: bool,
) -> Vec<PointSample> {
    let working: Vec<PointSample> = if fill_gap {
        points.iter().filter(|p| !p.value.is_nan()).copied().collect()
    } else {
        points.to_vec()
    };

    targets
        .iter()
        .map(|&y| PointSample::new(y, sample_at(&working, y, match_tolerance)))
        .collect()
}

/// Value at a single target depth
fn sample_at(points: &[PointSample], y: f64, match_tolerance: f64) -> f64 {
    if points.is_empty() {
        return f64::NAN;
    }

    // Exact pass-through beats interpolation: candidates are the
    // neighbors of the insertion point
    let insertion = points.partition_point(|p| p.y_mid < y);
    for candidate in insertion.saturating_sub(1)..=insertion {
        if let Some(point) = points.get(candidate) {
            if (point.y_mid - y).abs() <= match_tolerance {
                return point.value;
            }
        }
    }

    // No extrapolation outside the covered range
    if y < points[0].y_mid || y > points[points.len() - 1].y_mid {
        return f64::NAN;
    }

    let right = insertion;
    let left = right - 1;
    let p0 = points[left];
    let p1 = points[right];
    let alpha = (y - p0.y_mid) / (p1.y_mid - p0.y_mid);
    p0.value + alpha * (p1.value - p0.value)
}
