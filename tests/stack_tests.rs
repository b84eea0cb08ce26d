use pretty_assertions::assert_eq;

use ice_core_stack::profile::{PointSample, Profile, ProfileData, StepSample, VerticalReference};
use ice_core_stack::resampler::{ResampleOptions, TargetGrid};
use ice_core_stack::stack::{Core, CoreMetadata, CoreStack};
use ice_core_stack::utils::error::StackError;

fn salinity(core_id: &str, values: &[f64]) -> Profile {
    let samples = values
        .iter()
        .enumerate()
        .map(|(i, &v)| StepSample::new(i as f64 * 0.1, (i + 1) as f64 * 0.1, v))
        .collect();
    Profile::step(core_id, "salinity", VerticalReference::Top, Some(1.0), samples).unwrap()
}

fn temperature(core_id: &str) -> Profile {
    Profile::continuous(
        core_id,
        "temperature",
        VerticalReference::Top,
        Some(1.0),
        vec![PointSample::new(0.05, -5.0), PointSample::new(0.25, -3.0)],
    )
    .unwrap()
}

#[test]
fn test_add_core_broadcasts_reduced_metadata() {
    // Two thickness readings, one NaN freeboard reading among two
    let metadata = CoreMetadata::from_readings(&[1.0, 1.4], &[0.08, f64::NAN], &[0.2]);
    assert_eq!(metadata.ice_thickness, Some(1.2));
    assert_eq!(metadata.freeboard, Some(0.08));

    let core = Core::new("core-a", metadata.clone())
        .with_profile(salinity("core-a", &[6.0, 5.0]))
        .with_profile(temperature("core-a"));

    let mut stack = CoreStack::new();
    stack.add_core(core).unwrap();

    assert_eq!(stack.len(), 2);
    for entry in stack.entries() {
        assert_eq!(entry.metadata.ice_thickness, Some(1.2));
        assert_eq!(entry.metadata.snow_depth, Some(0.2));
    }
}

#[test]
fn test_duplicate_pair_is_rejected_until_removed() {
    let mut stack = CoreStack::new();
    stack
        .push(salinity("core-a", &[6.0]), CoreMetadata::default())
        .unwrap();

    let err = stack
        .push(salinity("core-a", &[7.0]), CoreMetadata::default())
        .unwrap_err();
    assert!(matches!(err, StackError::DuplicateProfile { .. }));

    // Explicit remove, then re-add succeeds
    let removed = stack.remove("core-a", "salinity").unwrap();
    assert_eq!(removed.values(), vec![6.0]);
    stack
        .push(salinity("core-a", &[7.0]), CoreMetadata::default())
        .unwrap();
    assert_eq!(
        stack.get("core-a", "salinity").unwrap().profile.values(),
        vec![7.0]
    );
}

#[test]
fn test_merge_unions_stacks() {
    let mut left = CoreStack::new();
    left.push(salinity("core-a", &[6.0]), CoreMetadata::default())
        .unwrap();

    let mut right = CoreStack::new();
    right
        .push(salinity("core-b", &[4.0]), CoreMetadata::default())
        .unwrap();

    left.merge(right).unwrap();
    assert_eq!(left.core_ids(), vec!["core-a", "core-b"]);

    let mut conflicting = CoreStack::new();
    conflicting
        .push(salinity("core-a", &[9.0]), CoreMetadata::default())
        .unwrap();
    assert!(left.merge(conflicting).is_err());
    assert_eq!(left.len(), 2);
}

#[test]
fn test_row_order_is_preserved() {
    let mut stack = CoreStack::new();
    stack
        .push(salinity("core-c", &[1.0]), CoreMetadata::default())
        .unwrap();
    stack
        .push(salinity("core-a", &[2.0]), CoreMetadata::default())
        .unwrap();
    stack
        .push(temperature("core-c"), CoreMetadata::default())
        .unwrap();

    assert_eq!(stack.core_ids(), vec!["core-c", "core-a"]);
    assert_eq!(stack.variables(), vec!["salinity", "temperature"]);
}

#[test]
fn test_stack_normalize_drops_and_keeps() {
    let mut stack = CoreStack::new();
    // No profile length, but the core's ice thickness serves as fallback
    let with_thickness = Profile::step(
        "core-a",
        "salinity",
        VerticalReference::Top,
        None,
        vec![StepSample::new(0.0, 0.2, 6.0)],
    )
    .unwrap();
    stack
        .push(with_thickness, CoreMetadata::from_readings(&[1.0], &[], &[]))
        .unwrap();

    // No length anywhere: dropped on flip
    let without = Profile::step(
        "core-b",
        "salinity",
        VerticalReference::Top,
        None,
        vec![StepSample::new(0.0, 0.2, 4.0)],
    )
    .unwrap();
    stack.push(without, CoreMetadata::default()).unwrap();

    let flipped = stack.normalize(VerticalReference::Bottom);
    assert_eq!(flipped.core_ids(), vec!["core-a"]);

    // Identity direction keeps both
    let same = stack.normalize(VerticalReference::Top);
    assert_eq!(same.len(), 2);
}

#[test]
fn test_stack_discretize_shares_grid() {
    let mut stack = CoreStack::new();
    stack
        .push(salinity("core-a", &[6.0, 5.0]), CoreMetadata::default())
        .unwrap();
    stack
        .push(salinity("core-b", &[4.0, 3.0]), CoreMetadata::default())
        .unwrap();

    let grid = TargetGrid::from_edges(vec![0.0, 0.1, 0.2]).unwrap();
    let resampled = stack.discretize(&grid, &ResampleOptions::default());

    assert_eq!(resampled.len(), 2);
    for entry in resampled.entries() {
        match entry.profile.data() {
            ProfileData::Step(samples) => {
                assert_eq!(samples.len(), 2);
                assert!((samples[0].y_low - 0.0).abs() < 1e-12);
                assert!((samples[1].y_sup - 0.2).abs() < 1e-12);
            }
            ProfileData::Continuous(_) => panic!("expected step data"),
        }
    }
}
