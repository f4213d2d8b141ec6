// End-to-end runs of the motion core over short sample sequences.

use stridewatch::dashboard;
use stridewatch::settings::{DisplaySettings, FallSettings, StepSettings};
use stridewatch::{FallPolarity, FallStatus, MotionCore, Sample, StepEvent, StepPolicy};

fn edge_latch_core() -> MotionCore {
    let step = StepSettings {
        policy: StepPolicy::EdgeLatch,
        accel_threshold: 2.0,
        gyro_threshold: 1.0,
    };
    MotionCore::new(step, FallSettings::default())
}

#[test]
fn single_pulse_counts_once_on_its_rising_edge() {
    let mut core = edge_latch_core();
    let az = [0.0, 0.0, 3.5, 3.5, 0.0];
    let gz = [0.0, 0.0, 2.0, 2.0, 0.0];

    let events: Vec<(usize, StepEvent)> = az
        .iter()
        .zip(gz.iter())
        .enumerate()
        .filter_map(|(i, (&z, &g))| core.tick(&Sample::with_gyro(0.0, 0.0, z, g)).step.map(|e| (i, e)))
        .collect();

    assert_eq!(events, vec![(2, StepEvent { total: 1 })]);
    assert_eq!(core.snapshot().steps, 1);
}

#[test]
fn large_z_excursion_is_monitoring_under_quiet_band() {
    let fall = FallSettings { high: 3.0, low: -30.0, polarity: FallPolarity::QuietBand };
    let mut core = MotionCore::new(StepSettings::default(), fall);
    let sample = Sample::with_gyro(0.0, 0.0, 35.0, 0.0);

    for _ in 0..10 {
        assert_eq!(core.tick(&sample).fall, FallStatus::Monitoring);
    }
}

#[test]
fn large_z_excursion_is_a_fall_under_excursion_polarity() {
    let fall = FallSettings { high: 3.0, low: -30.0, polarity: FallPolarity::Excursion };
    let mut core = MotionCore::new(StepSettings::default(), fall);
    let sample = Sample::with_gyro(0.0, 0.0, 35.0, 0.0);

    for _ in 0..10 {
        assert_eq!(core.tick(&sample).fall, FallStatus::FallDetected);
    }
}

#[test]
fn derivative_policy_counts_rises() {
    let step = StepSettings { policy: StepPolicy::Derivative, accel_threshold: 2.0, gyro_threshold: 0.0 };
    let mut core = MotionCore::new(step, FallSettings::default());

    // Resting on gravity, two sharp rises, one gentle one.
    let trace = [9.8, 9.8, 12.5, 9.6, 9.9, 12.0, 9.7, 10.7];
    let steps = trace
        .iter()
        .filter(|&&z| core.tick(&Sample::accel(0.0, 0.0, z)).step.is_some())
        .count();

    assert_eq!(steps, 2);
}

#[test]
fn remote_reset_mid_session_zeroes_then_keeps_counting() {
    let mut core = edge_latch_core();
    let remote = core.reset_signal();
    let pulse = Sample::with_gyro(0.0, 0.0, 4.0, 3.0);
    let quiet = Sample::with_gyro(0.0, 0.0, 0.0, 0.0);

    let mut history = Vec::new();
    for i in 0..20 {
        if i == 10 {
            remote.request();
        }
        let sample = if i % 2 == 0 { pulse } else { quiet };
        let outcome = core.tick(&sample);
        history.push((outcome.reset_applied, core.snapshot().steps));
    }

    // Non-decreasing everywhere except the reset tick.
    for pair in history.windows(2) {
        let (reset, now) = pair[1];
        let (_, before) = pair[0];
        if !reset {
            assert!(now >= before);
        }
    }

    // Tick 10 is a pulse: reset applied first, then that pulse counts.
    assert_eq!(history[10], (true, 1));
    assert_eq!(history[9].1, 5);
    assert_eq!(core.snapshot().steps, 5);
    assert_eq!(core.step_detector().settings().accel_threshold, 2.0);
}

#[test]
fn resting_device_reads_one_below_its_count() {
    // Seeding from the first sample means rest never counts, so the default
    // -1 display offset shows a resting device as -1.
    for policy in [StepPolicy::Derivative, StepPolicy::EdgeLatch] {
        let step = StepSettings { policy, ..StepSettings::default() };
        let mut core = MotionCore::new(step, FallSettings::default());
        let rest = Sample::with_gyro(0.0, 0.0, 9.8, 0.0);
        for _ in 0..10 {
            assert!(core.tick(&rest).step.is_none());
        }

        let snap = core.snapshot();
        assert_eq!(snap.steps, 0);
        let shown = dashboard::render(&snap, &DisplaySettings::default());
        assert!(shown.contains("<span class='step-count'>-1</span>"));
        let raw = dashboard::render(&snap, &DisplaySettings { step_offset: 0 });
        assert!(raw.contains("<span class='step-count'>0</span>"));
    }
}
