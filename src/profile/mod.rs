//! Measurement profiles: one variable's values along depth for one core.
//!
//! A profile is either *step* type (a scalar applies to a whole depth
//! interval, e.g. the salinity of a cut section) or *continuous* type
//! (a scalar applies to a single depth point, e.g. a thermistor
//! reading). Exactly one representation is populated per profile.
//!
//! Constructors validate the ordering invariants and own the
//! "descending input is reversed, not rejected" recovery policy, so
//! downstream consumers can rely on sorted, disjoint samples.

pub mod schema;

use crate::utils::error::ProfileError;
use log::warn;
use serde::{Deserialize, Serialize};

/// The datum depth is measured from.
///
/// `Top` is the ice/snow (or ice/air) surface, `Bottom` the ice/water
/// interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalReference {
    Top,
    Bottom,
}

impl VerticalReference {
    /// The opposite datum
    pub fn flipped(self) -> Self {
        match self {
            VerticalReference::Top => VerticalReference::Bottom,
            VerticalReference::Bottom => VerticalReference::Top,
        }
    }

    /// Lowercase name, matching the row schema encoding
    pub fn name(self) -> &'static str {
        match self {
            VerticalReference::Top => "top",
            VerticalReference::Bottom => "bottom",
        }
    }
}

/// One step sample: `value` applies over the depth interval `[y_low, y_sup)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSample {
    pub y_low: f64,
    pub y_sup: f64,
    pub value: f64,
}

impl StepSample {
    pub fn new(y_low: f64, y_sup: f64, value: f64) -> Self {
        Self { y_low, y_sup, value }
    }

    /// Midpoint of the interval
    pub fn y_mid(&self) -> f64 {
        0.5 * (self.y_low + self.y_sup)
    }

    /// Interval width
    pub fn width(&self) -> f64 {
        self.y_sup - self.y_low
    }
}

/// One continuous sample: `value` applies at the depth point `y_mid`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    pub y_mid: f64,
    pub value: f64,
}

impl PointSample {
    pub fn new(y_mid: f64, value: f64) -> Self {
        Self { y_mid, value }
    }
}

/// The measurement representation held by a profile
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileData {
    Step(Vec<StepSample>),
    Continuous(Vec<PointSample>),
}

impl ProfileData {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            ProfileData::Step(samples) => samples.len(),
            ProfileData::Continuous(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for the step representation
    pub fn is_step(&self) -> bool {
        matches!(self, ProfileData::Step(_))
    }
}

/// One variable's values along depth for one core.
///
/// Profiles are never mutated in place: the orientation normalizer and
/// the resampler always return new profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Core this profile was measured on
    pub core_id: String,

    /// Measured variable name (e.g. "salinity", "temperature")
    pub variable: String,

    /// Datum the depth coordinates are measured from
    pub vertical_reference: VerticalReference,

    /// Total core length, used for orientation flips; may be unknown
    pub length: Option<f64>,

    /// Samples, kept sorted and disjoint by the constructors
    data: ProfileData,
}

impl Profile {
    /// Create a step-type profile.
    ///
    /// Samples arriving in descending depth order are reversed (logged
    /// as a data-quality warning), otherwise out-of-order samples are
    /// sorted by `y_low`.
    ///
    /// # Errors
    /// * `ProfileError::NonFiniteDepth` - NaN or infinite interval bound
    /// * `ProfileError::EmptyInterval` - `y_low >= y_sup`
    /// * `ProfileError::OverlappingIntervals` - intervals intersect
    pub fn step(
        core_id: impl Into<String>,
        variable: impl Into<String>,
        vertical_reference: VerticalReference,
        length: Option<f64>,
        mut samples: Vec<StepSample>,
    ) -> Result<Self, ProfileError> {
        let core_id = core_id.into();
        let variable = variable.into();

        for (index, sample) in samples.iter().enumerate() {
            if !sample.y_low.is_finite() || !sample.y_sup.is_finite() {
                return Err(ProfileError::NonFiniteDepth(index));
            }
            if sample.y_low >= sample.y_sup {
                return Err(ProfileError::EmptyInterval {
                    index,
                    y_low: sample.y_low,
                    y_sup: sample.y_sup,
                });
            }
        }

        if !is_sorted_by(&samples, |s| s.y_low) {
            if is_sorted_by_desc(&samples, |s| s.y_low) {
                warn!(
                    "step profile {}/{} arrived bottom-up, reversing",
                    core_id, variable
                );
                samples.reverse();
            } else {
                warn!(
                    "step profile {}/{} arrived unsorted, sorting by y_low",
                    core_id, variable
                );
                samples.sort_by(|a, b| a.y_low.total_cmp(&b.y_low));
            }
        }

        for i in 1..samples.len() {
            if samples[i - 1].y_sup > samples[i].y_low {
                return Err(ProfileError::OverlappingIntervals {
                    first: i - 1,
                    second: i,
                });
            }
        }

        Ok(Self {
            core_id,
            variable,
            vertical_reference,
            length,
            data: ProfileData::Step(samples),
        })
    }

    /// Create a continuous-type profile.
    ///
    /// Points arriving in descending depth order are reversed (logged
    /// as a data-quality warning), otherwise out-of-order points are
    /// sorted by depth.
    ///
    /// # Errors
    /// * `ProfileError::NonFiniteDepth` - NaN or infinite depth
    /// * `ProfileError::DuplicatePoint` - two points at the same depth
    pub fn continuous(
        core_id: impl Into<String>,
        variable: impl Into<String>,
        vertical_reference: VerticalReference,
        length: Option<f64>,
        mut points: Vec<PointSample>,
    ) -> Result<Self, ProfileError> {
        let core_id = core_id.into();
        let variable = variable.into();

        for (index, point) in points.iter().enumerate() {
            if !point.y_mid.is_finite() {
                return Err(ProfileError::NonFiniteDepth(index));
            }
        }

        if !is_sorted_by(&points, |p| p.y_mid) {
            if is_sorted_by_desc(&points, |p| p.y_mid) {
                warn!(
                    "continuous profile {}/{} arrived bottom-up, reversing",
                    core_id, variable
                );
                points.reverse();
            } else {
                warn!(
                    "continuous profile {}/{} arrived unsorted, sorting by depth",
                    core_id, variable
                );
                points.sort_by(|a, b| a.y_mid.total_cmp(&b.y_mid));
            }
        }

        for i in 1..points.len() {
            if points[i - 1].y_mid == points[i].y_mid {
                return Err(ProfileError::DuplicatePoint(points[i].y_mid));
            }
        }

        Ok(Self {
            core_id,
            variable,
            vertical_reference,
            length,
            data: ProfileData::Continuous(points),
        })
    }

    /// The validated samples
    pub fn data(&self) -> &ProfileData {
        &self.data
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for a step-type profile
    pub fn is_step(&self) -> bool {
        self.data.is_step()
    }

    /// Depth span covered by the samples, `None` for an empty profile.
    ///
    /// For a step profile this is the outer interval bounds; for a
    /// continuous profile the first and last point depths.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        match &self.data {
            ProfileData::Step(samples) => {
                let first = samples.first()?;
                let last = samples.last()?;
                Some((first.y_low, last.y_sup))
            }
            ProfileData::Continuous(points) => {
                let first = points.first()?;
                let last = points.last()?;
                Some((first.y_mid, last.y_mid))
            }
        }
    }

    /// Midpoint depth of every sample, in order
    pub fn y_mids(&self) -> Vec<f64> {
        match &self.data {
            ProfileData::Step(samples) => samples.iter().map(StepSample::y_mid).collect(),
            ProfileData::Continuous(points) => points.iter().map(|p| p.y_mid).collect(),
        }
    }

    /// Value of every sample, in order
    pub fn values(&self) -> Vec<f64> {
        match &self.data {
            ProfileData::Step(samples) => samples.iter().map(|s| s.value).collect(),
            ProfileData::Continuous(points) => points.iter().map(|p| p.value).collect(),
        }
    }

    /// New profile with the same identity fields but different samples.
    ///
    /// Used by the transforms, which guarantee the replacement data
    /// upholds the ordering invariants.
    pub(crate) fn with_data(&self, data: ProfileData) -> Self {
        Self {
            core_id: self.core_id.clone(),
            variable: self.variable.clone(),
            vertical_reference: self.vertical_reference,
            length: self.length,
            data,
        }
    }

    /// Same, but with a new vertical reference (orientation flips)
    pub(crate) fn with_data_and_reference(
        &self,
        data: ProfileData,
        vertical_reference: VerticalReference,
    ) -> Self {
        Self {
            core_id: self.core_id.clone(),
            variable: self.variable.clone(),
            vertical_reference,
            length: self.length,
            data,
        }
    }
}

fn is_sorted_by<T>(items: &[T], key: impl Fn(&T) -> f64) -> bool {
    items.windows(2).all(|w| key(&w[0]) <= key(&w[1]))
}

fn is_sorted_by_desc<T>(items: &[T], key: impl Fn(&T) -> f64) -> bool {
    items.windows(2).all(|w| key(&w[0]) >= key(&w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_samples() -> Vec<StepSample> {
        vec![
            StepSample::new(0.0, 0.05, 6.2),
            StepSample::new(0.05, 0.10, 5.1),
            StepSample::new(0.10, 0.15, 4.3),
        ]
    }

    #[test]
    fn test_step_profile_valid() {
        let profile = Profile::step(
            "BRW_CS-20130331",
            "salinity",
            VerticalReference::Top,
            Some(1.2),
            step_samples(),
        )
        .unwrap();

        assert_eq!(profile.len(), 3);
        assert!(profile.is_step());
        assert_eq!(profile.depth_range(), Some((0.0, 0.15)));
    }

    #[test]
    fn test_step_profile_reversed_input() {
        let mut samples = step_samples();
        samples.reverse();

        let profile = Profile::step(
            "core-a",
            "salinity",
            VerticalReference::Bottom,
            None,
            samples,
        )
        .unwrap();

        // Reversed back to ascending order
        assert_eq!(profile.depth_range(), Some((0.0, 0.15)));
        assert_eq!(profile.values(), vec![6.2, 5.1, 4.3]);
    }

    #[test]
    fn test_step_profile_rejects_overlap() {
        let samples = vec![
            StepSample::new(0.0, 0.08, 6.2),
            StepSample::new(0.05, 0.10, 5.1),
        ];
        let err = Profile::step("core-a", "salinity", VerticalReference::Top, None, samples)
            .unwrap_err();
        assert!(matches!(err, ProfileError::OverlappingIntervals { .. }));
    }

    #[test]
    fn test_step_profile_rejects_empty_interval() {
        let samples = vec![StepSample::new(0.10, 0.10, 5.1)];
        let err = Profile::step("core-a", "salinity", VerticalReference::Top, None, samples)
            .unwrap_err();
        assert!(matches!(err, ProfileError::EmptyInterval { index: 0, .. }));
    }

    #[test]
    fn test_continuous_profile_rejects_duplicate_depth() {
        let points = vec![PointSample::new(0.1, -5.0), PointSample::new(0.1, -4.0)];
        let err = Profile::continuous("core-a", "temperature", VerticalReference::Top, None, points)
            .unwrap_err();
        assert!(matches!(err, ProfileError::DuplicatePoint(_)));
    }

    #[test]
    fn test_continuous_profile_allows_nan_values() {
        let points = vec![
            PointSample::new(0.1, -5.0),
            PointSample::new(0.2, f64::NAN),
            PointSample::new(0.3, -3.0),
        ];
        let profile =
            Profile::continuous("core-a", "temperature", VerticalReference::Top, None, points)
                .unwrap();
        assert_eq!(profile.len(), 3);
        assert!(profile.values()[1].is_nan());
    }

    #[test]
    fn test_empty_profile() {
        let profile =
            Profile::step("core-a", "salinity", VerticalReference::Top, None, vec![]).unwrap();
        assert!(profile.is_empty());
        assert_eq!(profile.depth_range(), None);
    }

    #[test]
    fn test_vertical_reference_flip() {
        assert_eq!(VerticalReference::Top.flipped(), VerticalReference::Bottom);
        assert_eq!(VerticalReference::Bottom.flipped(), VerticalReference::Top);
    }
}
