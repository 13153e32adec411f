// tests/statistics_tests.rs

use std::collections::HashMap;

use tddf_loader::grammar::CoordinateSystem;
use tddf_loader::statistics::{
    MetricSummary, StatisticsEngine, StatisticsError, StatisticsReport, TrajectorySample,
};

type Trajectory = (Vec<f64>, Vec<f64>, Vec<f64>);

fn scenario_d() -> Vec<Trajectory> {
    vec![
        (
            vec![0.0, 2.0, 4.0, 6.0, 8.0],
            vec![1.0, 3.0, 5.0, 7.0, 9.0],
            vec![10.0, 20.0, 30.0, 40.0, 50.0],
        ),
        (
            vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0],
            vec![9.0, 7.0, 5.0, 3.0, 1.0, 0.0],
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
        ),
        (
            vec![10.0, 20.0, 30.0, 40.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![10.0, 20.0, 30.0, 40.0],
        ),
    ]
}

fn cartesian_engine_with(trajectories: &[Trajectory]) -> StatisticsEngine {
    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian);
    for (xs, ys, ts) in trajectories {
        engine.add_trajectory(xs, ys, ts).unwrap();
    }
    engine
}

fn entries(report: &StatisticsReport) -> HashMap<&'static str, String> {
    report.entries().into_iter().collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ============================================================================
// Dataset Statistics
// ============================================================================

#[test]
fn test_scenario_d_counts_and_coverage() {
    let report = cartesian_engine_with(&scenario_d()).snapshot();
    assert_eq!(report.trajectories, 3);
    assert_eq!(report.points, 15);
    assert_eq!(report.coverage.min_y, 0.0);
    assert_eq!(report.coverage.max_y, 9.0);
    assert_eq!(report.coverage.min_x, 0.0);
    assert_eq!(report.coverage.max_x, 40.0);
    assert_eq!(report.coverage.min_t, 10.0);
    assert_eq!(report.coverage.max_t, 60.0);
}

#[test]
fn test_scenario_d_metrics() {
    let report = cartesian_engine_with(&scenario_d()).snapshot();

    assert_eq!(report.points_per_trajectory.min, 4.0);
    assert_eq!(report.points_per_trajectory.max, 6.0);
    assert_close(report.points_per_trajectory.mean, 5.0);
    assert_close(report.points_per_trajectory.std, (2.0f64 / 3.0).sqrt());

    assert_close(report.length.min, 11.31371);
    assert_close(report.length.max, 30.0);
    assert_close(report.duration.min, 30.0);
    assert_close(report.duration.max, 50.0);
    assert_close(report.speed.max, 1.0);
    assert_close(report.sampling_rate.min, 10.0);
    assert_close(report.sampling_rate.max, 10.0);
    assert_close(report.sampling_rate.std, 0.0);
}

#[test]
fn test_report_order_and_formatting() {
    let report = cartesian_engine_with(&scenario_d()).snapshot();
    let keys: Vec<&str> = report.entries().iter().map(|(k, _)| *k).collect();
    assert_eq!(keys.len(), 28);
    assert_eq!(keys[0], "NUM_TRAJECTORIES");
    assert_eq!(keys[1], "NUM_POINTS");
    assert_eq!(keys[2], "MIN_PTS_PER_TRAJECTORY");
    assert_eq!(keys[22], "MIN_X");
    assert_eq!(keys[27], "MAX_T");

    let values = entries(&report);
    assert_eq!(values["NUM_POINTS"], "15");
    assert_eq!(values["MIN_PTS_PER_TRAJECTORY"], "4");
    assert_eq!(values["AVG_PTS_PER_TRAJECTORY"], "5");
    assert_eq!(values["MIN_TRAJECTORY_LENGTH"], "11.31371");
    assert_eq!(values["MAX_TRAJECTORY_LENGTH"], "30");
    assert_eq!(values["MIN_Y"], "0");
    assert_eq!(values["MAX_Y"], "9");

    let text = report.to_string();
    assert!(text.starts_with("NUM_TRAJECTORIES\t3\nNUM_POINTS\t15\n"));
    assert!(text.ends_with("MAX_T\t60"));
}

#[test]
fn test_summary_invariants() {
    let report = cartesian_engine_with(&scenario_d()).snapshot();
    let summaries: [MetricSummary; 5] = [
        report.points_per_trajectory,
        report.length,
        report.duration,
        report.speed,
        report.sampling_rate,
    ];
    for s in summaries {
        assert!(s.min <= s.mean + 1e-9 && s.mean <= s.max + 1e-9, "{:?}", s);
        assert!(s.std >= 0.0);
    }
    let c = report.coverage;
    assert!(c.min_x <= c.max_x && c.min_y <= c.max_y && c.min_t <= c.max_t);
}

#[test]
fn test_empty_engine_reports_zero() {
    let report = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian).snapshot();
    assert_eq!(report.trajectories, 0);
    assert_eq!(report.points, 0);
    assert_eq!(report.length, MetricSummary::default());
    assert_eq!(report.coverage.min_x, 0.0);
    assert_eq!(report.coverage.max_t, 0.0);
    for (key, value) in report.entries() {
        assert_eq!(value, "0", "{} should be zero", key);
    }
}

// ============================================================================
// Degenerate Trajectories
// ============================================================================

#[test]
fn test_single_point_trajectory() {
    let engine = cartesian_engine_with(&[(vec![3.0], vec![4.0], vec![100.0])]);
    let report = engine.snapshot();
    assert_eq!(report.length.max, 0.0);
    assert_eq!(report.speed.max, 0.0);
    assert_eq!(report.sampling_rate.max, 0.0);
    assert_eq!(report.coverage.min_x, 3.0);
}

#[test]
fn test_zero_duration_has_zero_speed() {
    let engine = cartesian_engine_with(&[(vec![0.0, 3.0], vec![0.0, 4.0], vec![5.0, 5.0])]);
    let report = engine.snapshot();
    assert_eq!(report.length.max, 5.0);
    assert_eq!(report.speed.max, 0.0);
}

#[test]
fn test_invalid_input() {
    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian);
    assert_eq!(
        engine.add_trajectory(&[], &[], &[]),
        Err(StatisticsError::EmptyTrajectory)
    );
    assert_eq!(
        engine.add_trajectory(&[1.0, 2.0], &[1.0], &[1.0, 2.0]),
        Err(StatisticsError::LengthMismatch { x: 2, y: 1, t: 2 })
    );
    assert_eq!(engine.trajectories_count(), 0);
}

#[test]
fn test_samples_fold_like_trajectories() {
    let samples: Vec<TrajectorySample> = scenario_d()
        .into_iter()
        .map(|(xs, ys, ts)| TrajectorySample::new(xs, ys, ts).unwrap())
        .collect();
    assert_eq!(samples[1].points(), 6);

    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian);
    engine.add_samples(&samples);
    assert_eq!(engine.snapshot(), cartesian_engine_with(&scenario_d()).snapshot());

    assert_eq!(
        TrajectorySample::new(vec![1.0], vec![], vec![1.0]),
        Err(StatisticsError::EmptyTrajectory)
    );
}

// ============================================================================
// Delta Input and Distance Functions
// ============================================================================

#[test]
fn test_delta_encoded_input_matches_absolute() {
    let absolute = cartesian_engine_with(&scenario_d()[..1]).snapshot();

    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian);
    engine
        .add_delta_encoded(
            (&[0.0, 2.0, 2.0, 2.0, 2.0], true),
            (&[1.0, 2.0, 2.0, 2.0, 2.0], true),
            (&[10.0, 20.0, 30.0, 40.0, 50.0], false),
        )
        .unwrap();
    assert_eq!(engine.snapshot(), absolute);
}

#[test]
fn test_geographic_uses_great_circle() {
    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Geographic);
    assert_eq!(engine.distance_name(), "great-circle");
    engine
        .add_trajectory(&[0.0, 1.0], &[0.0, 0.0], &[0.0, 3600.0])
        .unwrap();
    let report = engine.snapshot();
    assert!((report.length.max - 111.195).abs() < 0.01);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_additions() {
    let engine = StatisticsEngine::for_coordinate_system(CoordinateSystem::Cartesian);
    let trajectories = scenario_d();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (xs, ys, ts) in &trajectories {
                    engine.add_trajectory(xs, ys, ts).unwrap();
                }
            });
        }
    });
    let report = engine.snapshot();
    assert_eq!(report.trajectories, 12);
    assert_eq!(report.points, 60);
    assert_eq!(report.points_per_trajectory.min, 4.0);
    assert_eq!(report.points_per_trajectory.max, 6.0);
}
