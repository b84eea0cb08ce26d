//! Grouped descriptive statistics over a stacked collection.
//!
//! Every row of every selected variable is binned into its
//! multi-dimensional cell (depth bin, plus any covariate bins), and
//! each non-empty cell yields the requested statistics over its non-NaN
//! values together with contributor provenance. Empty cells are never
//! emitted.

pub mod keys;

pub use keys::GroupKey;

use crate::resampler::TargetGrid;
use crate::stack::CoreStack;
use crate::utils::error::AggregationError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Descriptive statistic computed per cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Min,
    Mean,
    Max,
    Std,
    Median,
    Count,
}

impl Statistic {
    /// Lowercase name, matching the parse format
    pub fn name(self) -> &'static str {
        match self {
            Statistic::Min => "min",
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Std => "std",
            Statistic::Median => "median",
            Statistic::Count => "count",
        }
    }

    /// Compute this statistic over the cell's non-NaN values.
    ///
    /// `values` is never empty: cells only exist once a contributing
    /// row was seen. `Std` is the sample standard deviation (ddof = 1)
    /// and is NaN for a single value.
    fn compute(self, values: &[f64]) -> f64 {
        let n = values.len();
        match self {
            Statistic::Count => n as f64,
            Statistic::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Statistic::Mean => values.iter().sum::<f64>() / n as f64,
            Statistic::Std => {
                if n < 2 {
                    return f64::NAN;
                }
                let mean = values.iter().sum::<f64>() / n as f64;
                let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
                (sum_sq / (n - 1) as f64).sqrt()
            }
            Statistic::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = n / 2;
                if n % 2 == 0 {
                    0.5 * (sorted[mid - 1] + sorted[mid])
                } else {
                    sorted[mid]
                }
            }
        }
    }
}

impl FromStr for Statistic {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Statistic::Min),
            "mean" => Ok(Statistic::Mean),
            "max" => Ok(Statistic::Max),
            "std" => Ok(Statistic::Std),
            "median" => Ok(Statistic::Median),
            "count" => Ok(Statistic::Count),
            other => Err(AggregationError::UnsupportedStatistic(other.to_string())),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One secondary grouping axis: a named per-core covariate binned
/// against its own edges
#[derive(Debug, Clone)]
pub struct CovariateAxis {
    name: String,
    grid: TargetGrid,
}

impl CovariateAxis {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }
}

/// Multi-key grouping specification.
///
/// The depth-bin key is required by construction; covariate axes are
/// optional extras.
#[derive(Debug, Clone)]
pub struct GroupBy {
    depth: TargetGrid,
    covariates: Vec<CovariateAxis>,
}

impl GroupBy {
    /// Group by depth bins against the given grid
    pub fn new(depth: TargetGrid) -> Self {
        Self {
            depth,
            covariates: Vec::new(),
        }
    }

    /// Add a secondary covariate axis.
    ///
    /// # Errors
    /// `AggregationError::DuplicateAxis` when the name is already used.
    pub fn with_covariate(
        mut self,
        name: impl Into<String>,
        grid: TargetGrid,
    ) -> Result<Self, AggregationError> {
        let name = name.into();
        if self.covariates.iter().any(|axis| axis.name == name) {
            return Err(AggregationError::DuplicateAxis(name));
        }
        self.covariates.push(CovariateAxis { name, grid });
        Ok(self)
    }

    pub fn depth_grid(&self) -> &TargetGrid {
        &self.depth
    }

    pub fn covariates(&self) -> &[CovariateAxis] {
        &self.covariates
    }
}

/// One aggregation output cell
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsCell {
    /// Group-key tuple, depth bin first
    pub keys: Vec<GroupKey>,

    pub variable: String,
    pub statistic: Statistic,
    pub value: f64,

    /// Depth-bin center
    pub y_mid: f64,

    /// Depth-bin bounds, present when the variable is step-type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_sup: Option<f64>,

    /// Core identities whose measurements fed this cell, de-duplicated,
    /// in stack row order
    pub contributors: Vec<String>,

    /// Number of non-NaN rows in this cell
    pub count: usize,
}

/// Values and provenance accumulated for one cell of one variable
#[derive(Debug, Default)]
struct CellAccumulator {
    values: Vec<f64>,
    contributors: Vec<String>,
}

impl CellAccumulator {
    fn push(&mut self, value: f64, core_id: &str) {
        self.values.push(value);
        if !self.contributors.iter().any(|c| c == core_id) {
            self.contributors.push(core_id.to_string());
        }
    }
}

/// Partition the stack by the group keys and compute the requested
/// statistics per cell.
///
/// Cells are emitted sorted by (requested variable order, key tuple,
/// requested statistic order) so the output is deterministic.
///
/// # Errors
/// * `AggregationError::NoVariables` / `NoStatistics` - empty request
pub fn aggregate(
    stack: &CoreStack,
    group_by: &GroupBy,
    variables: &[&str],
    statistics: &[Statistic],
) -> Result<Vec<StatisticsCell>, AggregationError> {
    if variables.is_empty() {
        return Err(AggregationError::NoVariables);
    }
    if statistics.is_empty() {
        return Err(AggregationError::NoStatistics);
    }

    let mut cells = Vec::new();

    for &variable in variables {
        let mut groups: BTreeMap<Vec<GroupKey>, CellAccumulator> = BTreeMap::new();

        // Step-type iff every profile of this variable is step-type;
        // cells then carry the bin bounds alongside the center
        let mut saw_variable = false;
        let mut all_step = true;

        for entry in stack.entries() {
            if entry.profile.variable != variable {
                continue;
            }
            saw_variable = true;
            all_step &= entry.profile.is_step();

            // Covariate keys are per-core: resolve once per entry
            let mut covariate_keys = Vec::with_capacity(group_by.covariates.len());
            let mut covered = true;
            for (axis, covariate) in group_by.covariates.iter().enumerate() {
                let bin = entry
                    .metadata
                    .covariate(&covariate.name)
                    .and_then(|v| covariate.grid.bin_index(v));
                match bin {
                    Some(bin) => covariate_keys.push(GroupKey::Covariate { axis, bin }),
                    None => {
                        covered = false;
                        break;
                    }
                }
            }
            if !covered {
                continue;
            }

            for (y_mid, value) in entry
                .profile
                .y_mids()
                .into_iter()
                .zip(entry.profile.values())
            {
                if value.is_nan() {
                    continue;
                }
                let depth_bin = match group_by.depth.bin_index(y_mid) {
                    Some(bin) => bin,
                    None => continue,
                };

                let mut key = Vec::with_capacity(1 + covariate_keys.len());
                key.push(GroupKey::Depth(depth_bin));
                key.extend_from_slice(&covariate_keys);

                groups
                    .entry(key)
                    .or_default()
                    .push(value, &entry.profile.core_id);
            }
        }

        if !saw_variable {
            continue;
        }

        debug!("{}: {} non-empty cells", variable, groups.len());

        for (key, accumulator) in &groups {
            let depth_bin = key[0].bin();
            let (bin_low, bin_sup) = group_by.depth.bin(depth_bin);
            let y_mid = group_by.depth.midpoints()[depth_bin];
            let (y_low, y_sup) = if all_step {
                (Some(bin_low), Some(bin_sup))
            } else {
                (None, None)
            };

            for &statistic in statistics {
                cells.push(StatisticsCell {
                    keys: key.clone(),
                    variable: variable.to_string(),
                    statistic,
                    value: statistic.compute(&accumulator.values),
                    y_mid,
                    y_low,
                    y_sup,
                    contributors: accumulator.contributors.clone(),
                    count: accumulator.values.len(),
                });
            }
        }
    }

    Ok(cells)
}
