//! Assembly of per-core profiles into one collection.
//!
//! A stack is an append-only multiset of profiles, each carrying its
//! core's broadcast metadata. Insertion order is preserved so
//! downstream grouping stays stable, and an existing
//! `(core_id, variable)` pair is never silently overwritten: callers
//! remove explicitly before re-adding.

use crate::orientation;
use crate::profile::{Profile, VerticalReference};
use crate::resampler::{self, ResampleOptions, TargetGrid};
use crate::utils::error::StackError;
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Per-core scalar metadata broadcast onto every row of that core.
///
/// The scalar fields are reduced from possibly-multi-reading arrays at
/// ingestion via mean-of-non-NaN ([`CoreMetadata::from_readings`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreMetadata {
    pub ice_thickness: Option<f64>,
    pub freeboard: Option<f64>,
    pub snow_depth: Option<f64>,

    /// Sampling date
    pub date: Option<NaiveDate>,

    /// Names of related cores sampled together
    pub collection: Vec<String>,

    /// Named per-core scalar covariates (e.g. accumulated degree-days),
    /// available as secondary grouping axes
    pub covariates: BTreeMap<String, f64>,
}

impl CoreMetadata {
    /// Reduce multi-reading arrays to broadcast scalars via
    /// mean-of-non-NaN. Empty or all-NaN readings reduce to `None`.
    pub fn from_readings(ice_thickness: &[f64], freeboard: &[f64], snow_depth: &[f64]) -> Self {
        Self {
            ice_thickness: mean_of_valid(ice_thickness),
            freeboard: mean_of_valid(freeboard),
            snow_depth: mean_of_valid(snow_depth),
            ..Default::default()
        }
    }

    /// Look up a covariate value by name: the named covariates first,
    /// then the builtin scalar fields. NaN counts as missing.
    pub fn covariate(&self, name: &str) -> Option<f64> {
        let value = match self.covariates.get(name) {
            Some(&v) => Some(v),
            None => match name {
                "ice_thickness" => self.ice_thickness,
                "freeboard" => self.freeboard,
                "snow_depth" => self.snow_depth,
                _ => None,
            },
        };
        value.filter(|v| v.is_finite())
    }
}

/// Mean of the non-NaN readings, or `None` when there are none
pub fn mean_of_valid(values: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// One core: identity, broadcast metadata, and its measured profiles
#[derive(Debug, Clone)]
pub struct Core {
    pub core_id: String,
    pub metadata: CoreMetadata,
    pub profiles: Vec<Profile>,
}

impl Core {
    pub fn new(core_id: impl Into<String>, metadata: CoreMetadata) -> Self {
        Self {
            core_id: core_id.into(),
            metadata,
            profiles: Vec::new(),
        }
    }

    /// Builder-style profile attachment
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.push(profile);
        self
    }
}

/// One stack row: a profile with its core's broadcast metadata
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub profile: Profile,
    pub metadata: CoreMetadata,
}

/// Append-only collection of profiles from many cores
#[derive(Debug, Clone, Default)]
pub struct CoreStack {
    entries: Vec<StackEntry>,
}

impl CoreStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one profile with its core's metadata.
    ///
    /// # Errors
    /// `StackError::DuplicateProfile` when the `(core_id, variable)`
    /// pair is already present; remove it first.
    pub fn push(&mut self, profile: Profile, metadata: CoreMetadata) -> Result<(), StackError> {
        if self.get(&profile.core_id, &profile.variable).is_some() {
            return Err(StackError::DuplicateProfile {
                core_id: profile.core_id.clone(),
                variable: profile.variable.clone(),
            });
        }
        self.entries.push(StackEntry { profile, metadata });
        Ok(())
    }

    /// Append all of a core's profiles, broadcasting its metadata onto
    /// each. Nothing is appended when any pair would be a duplicate.
    ///
    /// # Errors
    /// `StackError::DuplicateProfile` for the first conflicting pair.
    pub fn add_core(&mut self, core: Core) -> Result<(), StackError> {
        for (i, profile) in core.profiles.iter().enumerate() {
            let duplicate_within = core.profiles[..i]
                .iter()
                .any(|p| p.core_id == profile.core_id && p.variable == profile.variable);
            if duplicate_within || self.get(&profile.core_id, &profile.variable).is_some() {
                return Err(StackError::DuplicateProfile {
                    core_id: profile.core_id.clone(),
                    variable: profile.variable.clone(),
                });
            }
        }

        debug!("adding core {} with {} profiles", core.core_id, core.profiles.len());
        for profile in core.profiles {
            self.entries.push(StackEntry {
                profile,
                metadata: core.metadata.clone(),
            });
        }
        Ok(())
    }

    /// Append an entry known to be free of duplicates (row-schema
    /// conversion groups by `(core_id, variable)` beforehand)
    pub(crate) fn push_entry(&mut self, entry: StackEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the profile for `(core_id, variable)`
    pub fn remove(&mut self, core_id: &str, variable: &str) -> Option<Profile> {
        let index = self
            .entries
            .iter()
            .position(|e| e.profile.core_id == core_id && e.profile.variable == variable)?;
        Some(self.entries.remove(index).profile)
    }

    /// Append every entry of `other`, preserving its order. Nothing is
    /// appended when any pair would be a duplicate.
    ///
    /// # Errors
    /// `StackError::DuplicateProfile` for the first conflicting pair.
    pub fn merge(&mut self, other: CoreStack) -> Result<(), StackError> {
        for entry in &other.entries {
            if self
                .get(&entry.profile.core_id, &entry.profile.variable)
                .is_some()
            {
                return Err(StackError::DuplicateProfile {
                    core_id: entry.profile.core_id.clone(),
                    variable: entry.profile.variable.clone(),
                });
            }
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    /// Entry for `(core_id, variable)`, if present
    pub fn get(&self, core_id: &str, variable: &str) -> Option<&StackEntry> {
        self.entries
            .iter()
            .find(|e| e.profile.core_id == core_id && e.profile.variable == variable)
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Core identities in first-appearance order, de-duplicated
    pub fn core_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !ids.contains(&entry.profile.core_id.as_str()) {
                ids.push(&entry.profile.core_id);
            }
        }
        ids
    }

    /// Variable names in first-appearance order, de-duplicated
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.profile.variable.as_str()) {
                names.push(&entry.profile.variable);
            }
        }
        names
    }

    /// Normalize every profile onto `target_reference`.
    ///
    /// Profiles that cannot be flipped (no length known, not even the
    /// core's ice thickness) are dropped from the returned stack; the
    /// orientation normalizer logs each drop.
    pub fn normalize(&self, target_reference: VerticalReference) -> CoreStack {
        let mut normalized = CoreStack::new();
        for entry in &self.entries {
            if let Some(profile) = orientation::normalize(
                &entry.profile,
                target_reference,
                entry.metadata.ice_thickness,
            ) {
                normalized.entries.push(StackEntry {
                    profile,
                    metadata: entry.metadata.clone(),
                });
            }
        }
        debug!(
            "normalized stack to {}: kept {} of {} profiles",
            target_reference.name(),
            normalized.len(),
            self.len()
        );
        normalized
    }

    /// Resample every profile onto the shared grid.
    ///
    /// Coverage weights are a single-profile concern (see
    /// [`resampler::discretize`]) and are not kept at stack level.
    pub fn discretize(&self, grid: &TargetGrid, options: &ResampleOptions) -> CoreStack {
        let mut resampled = CoreStack::new();
        for entry in &self.entries {
            let out = resampler::discretize(&entry.profile, grid, options);
            resampled.entries.push(StackEntry {
                profile: out.profile,
                metadata: entry.metadata.clone(),
            });
        }
        resampled
    }
}
