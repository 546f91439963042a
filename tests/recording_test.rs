use std::path::PathBuf;

use stepcadence::config::{CadenceConfig, RateMethod, TickPeriod};
use stepcadence::driver::replay;
use stepcadence::processing::CadenceProcessor;
use stepcadence::sensor::{RecordingSource, write_recording};
use stepcadence::simulation::{WalkProfile, generate_walk, measure_cadence};
use stepcadence::CadenceError;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stepcadence_{}_{}", std::process::id(), name))
}

#[test]
fn test_replay_from_file_matches_in_memory() {
    let walk = generate_walk(12.0, 120.0, &WalkProfile::default());
    let path = temp_path("walk.csv");
    write_recording(&path, &walk).unwrap();

    let config = CadenceConfig::default();
    let mut source = RecordingSource::open(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(source.len(), walk.len());

    let mut processor = CadenceProcessor::new(&config).unwrap();
    let mut rates = Vec::new();
    let summary = replay(&mut source, &mut processor, config.tick.period, |tick, _| {
        rates.push(tick.rate);
    })
    .unwrap();

    let in_memory = measure_cadence(&walk, &config).unwrap();
    assert_eq!(summary, in_memory.summary);
    assert_eq!(rates.len(), in_memory.ticks.len());
    assert_eq!(rates.last().copied().flatten(), in_memory.final_rate());
}

#[test]
fn test_config_file_drives_replay() {
    let config_path = temp_path("config.toml");
    std::fs::write(
        &config_path,
        r#"
[rate]
method = "span"
window_secs = 4.0

[tick]
period = "1s"

[history]
capacity = 8
"#,
    )
    .unwrap();

    let config = CadenceConfig::load(&config_path).unwrap();
    std::fs::remove_file(&config_path).ok();

    assert_eq!(config.rate.method, RateMethod::Span);
    assert_eq!(config.tick.period, TickPeriod::from_millis(1000));
    assert_eq!(config.peak.min_interval_ms, 250);

    let walk = generate_walk(10.0, 120.0, &WalkProfile::default());
    let m = measure_cadence(&walk, &config).unwrap();

    let times: Vec<u64> = m.ticks.iter().map(|t| t.timestamp_ms).collect();
    assert_eq!(times, (1..=9).map(|s| s * 1000).collect::<Vec<u64>>());

    let rate = m.final_rate().unwrap();
    assert!((rate - 120.0).abs() < 2.0, "rate {}", rate);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let config_path = temp_path("bad_config.toml");
    std::fs::write(&config_path, "[peak]\nmin_interval_ms = \"soon\"\n").unwrap();

    let result = CadenceConfig::load(&config_path);
    std::fs::remove_file(&config_path).ok();

    assert!(matches!(result, Err(CadenceError::ConfigFile(_))));
}

#[test]
fn test_corrupt_recording_reports_line() {
    let path = temp_path("corrupt.csv");
    std::fs::write(&path, "t_ms,x,y,z\n0,0,0,9.8\n20,0,0,9.8\nbad,0,0,9.8\n").unwrap();

    let result = RecordingSource::open(&path);
    std::fs::remove_file(&path).ok();

    match result {
        Err(CadenceError::Recording { line, .. }) => assert_eq!(line, 4),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("corrupt recording should not parse"),
    }
}

#[test]
fn test_missing_recording_is_sensor_unavailable() {
    let result = RecordingSource::open(temp_path("does_not_exist.csv"));
    assert!(matches!(result, Err(CadenceError::SensorUnavailable(_))));
}
