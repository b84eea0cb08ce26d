//! Interval resampling of measurement profiles onto target grids.
//!
//! The resampler converts one profile at a time:
//! - step profiles go through overlap-weighted binning, which conserves
//!   the depth-weighted integral of the measured quantity;
//! - continuous profiles are linearly interpolated at the grid's sample
//!   points, with exact pass-through of coinciding source points.
//!
//! Orientation is the caller's job: profiles mixing vertical references
//! must be normalized before sharing a grid.

pub mod grid;

mod continuous;
mod gap_fill;
mod step;

pub use grid::TargetGrid;

use crate::profile::{PointSample, Profile, ProfileData, StepSample};
use crate::utils::config::DEFAULT_MATCH_TOLERANCE;
use log::debug;

/// Per-call resampling options
#[derive(Debug, Clone, Copy)]
pub struct ResampleOptions {
    /// Fill internal NaN-valued source intervals (or drop NaN points of
    /// a continuous profile) before resampling
    pub fill_gap: bool,

    /// Keep full target bin bounds at the profile's ends instead of
    /// recording the actually covered sub-range
    pub fill_extremity: bool,

    /// Absolute tolerance for exact pass-through of coinciding sample
    /// points during continuous resampling
    pub match_tolerance: f64,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            fill_gap: false,
            fill_extremity: false,
            match_tolerance: DEFAULT_MATCH_TOLERANCE,
        }
    }
}

/// A resampled profile plus the per-sample coverage weights
#[derive(Debug, Clone)]
pub struct Resampled {
    /// The profile on the target grid, same variable and vertical
    /// reference as the input
    pub profile: Profile,

    /// Coverage weight per output sample: for step bins the fraction of
    /// the target bin width spanned by non-NaN source measurements; for
    /// continuous samples 1.0 where a value was produced, 0.0 where not
    pub weights: Vec<f64>,
}

impl Resampled {
    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }
}

/// Resample a profile onto the target grid.
///
/// An empty profile returns an empty result (nothing to discretize is
/// expected absence, not an error). The output keeps the input's
/// representation kind, identity fields, and vertical reference.
pub fn discretize(profile: &Profile, grid: &TargetGrid, options: &ResampleOptions) -> Resampled {
    if profile.is_empty() {
        debug!(
            "nothing to discretize for {}/{}",
            profile.core_id, profile.variable
        );
        let data = match profile.data() {
            ProfileData::Step(_) => ProfileData::Step(Vec::new()),
            ProfileData::Continuous(_) => ProfileData::Continuous(Vec::new()),
        };
        return Resampled {
            profile: profile.with_data(data),
            weights: Vec::new(),
        };
    }

    match profile.data() {
        ProfileData::Step(samples) => {
            let filled;
            let samples: &[StepSample] = if options.fill_gap {
                filled = gap_fill::fill_internal_gaps(samples);
                &filled
            } else {
                samples
            };

            let bins = step::resample_steps(samples, grid, options.fill_extremity);
            let mut out = Vec::with_capacity(bins.len());
            let mut weights = Vec::with_capacity(bins.len());
            for bin in bins {
                out.push(StepSample::new(bin.y_low, bin.y_sup, bin.value));
                weights.push(bin.weight);
            }

            Resampled {
                profile: profile.with_data(ProfileData::Step(out)),
                weights,
            }
        }
        ProfileData::Continuous(points) => {
            let out: Vec<PointSample> = continuous::interpolate_points(
                points,
                grid.midpoints(),
                options.match_tolerance,
                options.fill_gap,
            );
            let weights = out
                .iter()
                .map(|p| if p.value.is_nan() { 0.0 } else { 1.0 })
                .collect();

            Resampled {
                profile: profile.with_data(ProfileData::Continuous(out)),
                weights,
            }
        }
    }
}
