mod test_signals;

use stepcadence::config::{CadenceConfig, RateMethod};
use stepcadence::processing::{ActivityState, CadenceProcessor, ResetMode};
use stepcadence::sensor::RawSample;
use test_signals::{impulse_train, periodic_times, standing_still};

fn processor() -> CadenceProcessor {
    CadenceProcessor::new(&CadenceConfig::default()).unwrap()
}

fn span_processor() -> CadenceProcessor {
    let mut config = CadenceConfig::default();
    config.rate.method = RateMethod::Span;
    CadenceProcessor::new(&config).unwrap()
}

#[test]
fn test_events_follow_impulses() {
    let spikes = periodic_times(2000, 8000, 600);
    let samples = impulse_train(10.0, 50.0, &spikes, 4.0);

    let events = processor().process_samples(&samples);

    // First event is the filter settling onto gravity
    assert_eq!(events[0], 20);
    let expected: Vec<u64> = spikes.iter().map(|t| t + 20).collect();
    assert_eq!(&events[1..], expected.as_slice());
}

#[test]
fn test_sub_threshold_impulses_ignored() {
    let samples = impulse_train(4.0, 50.0, &[2000, 2600, 3200], 1.0);
    let events = processor().process_samples(&samples);
    assert_eq!(events, vec![20]);
}

#[test]
fn test_refractory_interval_is_strict() {
    // 200 ms after the first event is inside the interval, 260 ms is past it
    let samples = impulse_train(4.0, 50.0, &[2000, 2200, 2260], 4.0);
    let events = processor().process_samples(&samples);
    assert_eq!(events, vec![20, 2020, 2280]);
}

#[test]
fn test_injected_events_share_refractory_gate() {
    let mut p = processor();
    let samples = impulse_train(3.0, 50.0, &[2000, 2400], 4.0);
    let (before, after): (Vec<RawSample>, Vec<RawSample>) =
        samples.into_iter().partition(|s| s.timestamp_ms <= 2100);

    p.process_samples(&before);
    assert_eq!(p.total_events(), 2);

    assert!(!p.inject_event(2100), "too close to detected step");
    assert!(p.inject_event(2300));

    // The spike at 2400 confirms at 2420, only 120 ms after the injection
    let detected = p.process_samples(&after);
    assert!(detected.is_empty());
    assert_eq!(p.total_events(), 3);
}

#[test]
fn test_malformed_samples_leave_state_untouched() {
    let spikes = periodic_times(1000, 6000, 500);
    let clean = impulse_train(6.0, 50.0, &spikes, 4.0);

    let mut with_gaps = Vec::new();
    for sample in &clean {
        with_gaps.push(*sample);
        with_gaps.push(RawSample {
            timestamp_ms: sample.timestamp_ms + 10,
            x: Some(0.0),
            y: None,
            z: Some(50.0),
        });
        with_gaps.push(RawSample::new(sample.timestamp_ms + 15, f32::NAN, 0.0, 9.8));
    }

    let mut a = processor();
    let mut b = processor();
    let events_clean = a.process_samples(&clean);
    let events_gaps = b.process_samples(&with_gaps);

    assert_eq!(events_clean, events_gaps);
    assert_eq!(a.gravity(), b.gravity());
    assert_eq!(b.dropped_samples(), 2 * clean.len() as u64);
    assert_eq!(b.accepted_samples(), clean.len() as u64);
}

#[test]
fn test_span_rate_from_impulses() {
    let mut p = span_processor();
    let spikes = periodic_times(1000, 20000, 500);
    p.process_samples(&impulse_train(20.0, 50.0, &spikes, 4.0));

    let output = p.on_tick(20_000);
    let rate = output.rate.unwrap();
    assert!((rate - 120.0).abs() < 0.1, "rate {}", rate);
    assert_eq!(output.state.label(), "brisk");
    assert_eq!(output.window_events, 10);
}

#[test]
fn test_standing_still_settles_to_still() {
    let mut p = processor();
    p.process_samples(&standing_still(8.0, 50.0));

    let output = p.on_tick(8000);
    assert_eq!(output.rate, Some(0.0));
    assert_eq!(output.state.label(), "still");
    assert_eq!(output.window_events, 0);
}

#[test]
fn test_reset_then_recover() {
    let mut p = span_processor();
    let spikes = periodic_times(1000, 20000, 500);
    let samples = impulse_train(20.0, 50.0, &spikes, 4.0);
    let (first, second): (Vec<RawSample>, Vec<RawSample>) =
        samples.into_iter().partition(|s| s.timestamp_ms < 10_000);

    p.process_samples(&first);
    assert!(p.on_tick(9_500).state.is_initialized());

    p.reset(ResetMode::EventsOnly);
    assert_eq!(p.current(), (None, ActivityState::Uninitialized));
    assert!(p.history().iter().all(|slot| slot.is_none()));

    let gravity_before = p.gravity();
    p.process_samples(&second[..1]);
    assert!((p.gravity() - gravity_before).magnitude() < 1e-3);

    let tick = p.on_tick(10_000);
    assert_eq!(tick.state, ActivityState::Uninitialized);
    assert_eq!(tick.rate, None);
    assert_eq!(p.history().latest(), None);

    p.process_samples(&second[1..]);
    let recovered = p.on_tick(20_000);
    let rate = recovered.rate.unwrap();
    assert!((rate - 120.0).abs() < 0.1, "rate {}", rate);
}

#[test]
fn test_full_reset_restarts_filter() {
    let mut p = processor();
    p.process_samples(&standing_still(3.0, 50.0));
    assert_eq!(p.total_events(), 1);

    p.reset(ResetMode::Full);
    assert_eq!(p.gravity().magnitude(), 0.0);
    assert_eq!(p.last_magnitude(), 0.0);

    // Re-converging onto gravity produces a fresh transient event
    let resumed: Vec<RawSample> = standing_still(2.0, 50.0)
        .into_iter()
        .map(|s| RawSample {
            timestamp_ms: s.timestamp_ms + 5000,
            ..s
        })
        .collect();
    let events = p.process_samples(&resumed);
    assert_eq!(events, vec![5020]);
}

#[test]
fn test_history_tracks_ticks() {
    let mut config = CadenceConfig::default();
    config.history.capacity = 4;
    let mut p = CadenceProcessor::new(&config).unwrap();
    p.process_samples(&standing_still(8.0, 50.0));

    for t in [6000, 6500, 7000] {
        p.on_tick(t);
    }

    assert_eq!(p.history().len(), 4);
    assert_eq!(p.history().to_vec(), vec![None, Some(0.0), Some(0.0), Some(0.0)]);
}
