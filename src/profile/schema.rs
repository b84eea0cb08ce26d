//! Boundary row schema shared with the external importer and exporter.
//!
//! The engine exchanges flat tabular rows at both ends: the importer
//! produces them from workbooks, the plotting/export layer consumes
//! them. Step-type rows carry `y_low`/`y_sup` (and a derived midpoint);
//! continuous-type rows carry a bare `y_mid`. This module is types and
//! conversions only - file handling belongs to the collaborators.

use crate::profile::{PointSample, Profile, ProfileData, StepSample, VerticalReference};
use crate::stack::{CoreMetadata, CoreStack, StackEntry};
use crate::utils::error::ProfileError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One measurement row at the engine boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub core_id: String,
    pub variable: String,

    /// Interval bounds, step-type rows only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y_low: Option<f64>,
    pub y_mid: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y_sup: Option<f64>,

    pub value: f64,
    pub vertical_reference: VerticalReference,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ice_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub freeboard: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snow_depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<NaiveDate>,
}

/// Flatten a stack into boundary rows, broadcasting each core's
/// metadata onto every row
pub fn stack_to_rows(stack: &CoreStack) -> Vec<ProfileRow> {
    let mut rows = Vec::new();
    for entry in stack.entries() {
        let profile = &entry.profile;
        let metadata = &entry.metadata;
        match profile.data() {
            ProfileData::Step(samples) => {
                for sample in samples {
                    rows.push(ProfileRow {
                        core_id: profile.core_id.clone(),
                        variable: profile.variable.clone(),
                        y_low: Some(sample.y_low),
                        y_mid: sample.y_mid(),
                        y_sup: Some(sample.y_sup),
                        value: sample.value,
                        vertical_reference: profile.vertical_reference,
                        length: profile.length,
                        ice_thickness: metadata.ice_thickness,
                        freeboard: metadata.freeboard,
                        snow_depth: metadata.snow_depth,
                        date: metadata.date,
                    });
                }
            }
            ProfileData::Continuous(points) => {
                for point in points {
                    rows.push(ProfileRow {
                        core_id: profile.core_id.clone(),
                        variable: profile.variable.clone(),
                        y_low: None,
                        y_mid: point.y_mid,
                        y_sup: None,
                        value: point.value,
                        vertical_reference: profile.vertical_reference,
                        length: profile.length,
                        ice_thickness: metadata.ice_thickness,
                        freeboard: metadata.freeboard,
                        snow_depth: metadata.snow_depth,
                        date: metadata.date,
                    });
                }
            }
        }
    }
    rows
}

/// Rebuild a stack from boundary rows.
///
/// Rows are grouped by `(core_id, variable)` in first-appearance
/// order; each group's representation is decided by `y_low`/`y_sup`
/// presence and validated through the profile constructors. Within a
/// core, the first non-missing metadata reading wins.
///
/// # Errors
/// * `ProfileError::MixedRepresentation` - a group mixes step and
///   continuous rows
/// * any constructor error from [`Profile::step`] / [`Profile::continuous`]
pub fn stack_from_rows(rows: &[ProfileRow]) -> Result<CoreStack, ProfileError> {
    // Group indices by (core_id, variable), preserving first appearance
    let mut groups: Vec<((String, String), Vec<usize>)> = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let key = (row.core_id.clone(), row.variable.clone());
        match groups.iter().position(|(k, _)| *k == key) {
            Some(position) => groups[position].1.push(index),
            None => groups.push((key, vec![index])),
        }
    }

    let mut stack = CoreStack::new();
    for ((core_id, variable), indices) in groups {
        let group: Vec<&ProfileRow> = indices.iter().map(|&i| &rows[i]).collect();

        let step_rows = group
            .iter()
            .filter(|r| r.y_low.is_some() && r.y_sup.is_some())
            .count();
        if step_rows != 0 && step_rows != group.len() {
            return Err(ProfileError::MixedRepresentation { core_id, variable });
        }

        let vertical_reference = group[0].vertical_reference;
        let length = group.iter().find_map(|r| r.length);

        let profile = if step_rows == group.len() && !group.is_empty() {
            let samples = group
                .iter()
                .filter_map(|r| Some(StepSample::new(r.y_low?, r.y_sup?, r.value)))
                .collect();
            Profile::step(core_id, variable, vertical_reference, length, samples)?
        } else {
            let points = group
                .iter()
                .map(|r| PointSample::new(r.y_mid, r.value))
                .collect();
            Profile::continuous(core_id, variable, vertical_reference, length, points)?
        };

        let metadata = CoreMetadata {
            ice_thickness: group.iter().find_map(|r| r.ice_thickness),
            freeboard: group.iter().find_map(|r| r.freeboard),
            snow_depth: group.iter().find_map(|r| r.snow_depth),
            date: group.iter().find_map(|r| r.date),
            ..Default::default()
        };

        // Grouping guarantees the pair is unique
        stack.push_entry(StackEntry { profile, metadata });
    }

    Ok(stack)
}
