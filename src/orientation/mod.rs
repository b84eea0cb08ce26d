//! Vertical datum normalization.
//!
//! Rewrites profile depth coordinates between the top-referenced and
//! bottom-referenced datums so profiles from different cores can share
//! one grid. Flipping needs a known core length; when neither the
//! profile nor the caller can supply one the profile is dropped with a
//! warning - a deliberate data-loss policy, not a fatal error.

use crate::profile::{PointSample, Profile, ProfileData, StepSample, VerticalReference};
use log::warn;

/// Rewrite a profile onto `target_reference`.
///
/// # Arguments
/// * `profile` - the profile to normalize
/// * `target_reference` - datum the result should use
/// * `fallback_length` - core length to use when the profile carries
///   none (typically the core's ice thickness)
///
/// # Returns
/// A new profile on the target datum, or `None` when a flip is needed
/// but no length is known (the caller should drop the variable).
pub fn normalize(
    profile: &Profile,
    target_reference: VerticalReference,
    fallback_length: Option<f64>,
) -> Option<Profile> {
    if profile.vertical_reference == target_reference {
        return Some(profile.clone());
    }

    let length = match profile.length.or(fallback_length) {
        Some(length) => length,
        None => {
            warn!(
                "dropping {}/{}: cannot flip to {} without a core length",
                profile.core_id,
                profile.variable,
                target_reference.name()
            );
            return None;
        }
    };

    let data = match profile.data() {
        ProfileData::Step(samples) => {
            let mut flipped: Vec<StepSample> = samples
                .iter()
                .map(|s| StepSample::new(length - s.y_sup, length - s.y_low, s.value))
                .collect();
            // Flipping reverses the depth order
            flipped.sort_by(|a, b| a.y_low.total_cmp(&b.y_low));
            ProfileData::Step(flipped)
        }
        ProfileData::Continuous(points) => {
            let mut flipped: Vec<PointSample> = points
                .iter()
                .map(|p| PointSample::new(length - p.y_mid, p.value))
                .collect();
            flipped.sort_by(|a, b| a.y_mid.total_cmp(&b.y_mid));
            ProfileData::Continuous(flipped)
        }
    };

    Some(profile.with_data_and_reference(data, target_reference))
}
