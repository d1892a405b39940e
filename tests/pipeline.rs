use std::fs;
use std::time::Duration;

use uav_rf_sim::aoa::AoaEstimator;
use uav_rf_sim::channel::{DeadlineSimulator, FreeSpaceChannel};
use uav_rf_sim::config::SimConfig;
use uav_rf_sim::entity::{presets, Pose, TerminalId};
use uav_rf_sim::io::{read_flight_log, run_to_directory, RunSummary};
use uav_rf_sim::policy::MovementPolicy;
use uav_rf_sim::sim::simulate_scenario;

fn horizontal_distance(a: &Pose, b: &Pose) -> f64 {
    ((a.x() - b.x()).powi(2) + (a.y() - b.y()).powi(2)).sqrt()
}

fn free_space() -> DeadlineSimulator {
    DeadlineSimulator::spawn(FreeSpaceChannel::default(), Duration::from_secs(5)).unwrap()
}

#[test]
fn locate_closes_in_on_the_user() {
    for estimator in [AoaEstimator::MaxRss, AoaEstimator::WeightedRss] {
        let mut scenario = presets::campus();
        scenario.drone = scenario.drone.policy(MovementPolicy::Locate).estimator(estimator);
        let user = scenario.terminals[1].pose;

        let run = simulate_scenario(scenario, free_space(), Vec::new(), 5).unwrap();
        let before = horizontal_distance(&run.initial_pose, &user);
        let after = horizontal_distance(run.drone.pose(), &user);
        assert!(after < before, "{}: {:.1} -> {:.1}", estimator, before, after);
        assert!(run.outcomes.iter().all(|s| s.followed == TerminalId(1)));
    }
}

#[test]
fn log_rows_match_scan_sequence() {
    let run = simulate_scenario(presets::campus(), free_space(), Vec::new(), 6).unwrap();
    let rows = read_flight_log(run.writer.as_slice()).unwrap();

    assert_eq!(rows.len(), 10);
    for (i, pair) in rows.chunks(2).enumerate() {
        assert_eq!(pair[0].time, i as u64);
        assert_eq!(pair[0].transmitter(), 1);
        assert_eq!(pair[1].time, i as u64);
        assert_eq!(pair[1].transmitter(), 0);
        assert_eq!(pair[0].drone, pair[1].drone);
    }
    for row in &rows {
        assert_eq!(row.terminals.len(), 5);
        assert_eq!(row.rss.len(), 4);
        assert!(row.rss.iter().all(|r| *r > 0.0 && r.is_finite()));
    }

    // the peak power recorded per scan matches what the policy compared
    for (step, pair) in run.outcomes.iter().zip(rows.chunks(2)) {
        let user = step.links[0].peak_rss;
        let bs = step.links[1].peak_rss;
        assert_eq!(format!("{:.16}", user), format!("{:.16}", pair[0].peak_rss()));
        assert_eq!(format!("{:.16}", bs), format!("{:.16}", pair[1].peak_rss()));
    }
}

#[test]
fn directory_run_with_free_space_channel() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimConfig {
        iterations: 3,
        output_dir: dir.path().join("result"),
        routine: "locate".into(),
        aoa: "weighted-rss".into(),
        ..SimConfig::default()
    };

    let summary = run_to_directory(&config, free_space()).unwrap();
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.rows, 2);

    let text = fs::read_to_string(config.log_path()).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("time,simIdxs,drone.x"));
    assert!(header.ends_with("ant.0,ant.1,ant.2,ant.3"));
    assert!(text.lines().nth(1).unwrap().starts_with("0,u01-t0000-antXX,"));

    let json = fs::read_to_string(config.summary_path()).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.policy, MovementPolicy::Locate);
    assert_eq!(back.estimator, AoaEstimator::WeightedRss);
}
