// StrideWatch: Motion Core
//
// The single context object owned by the control loop. Sinks get `Snapshot`
// copies; the only way in from another context is `ResetSignal`, which is
// consumed at the top of the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::detector::{FallDetector, StepDetector};
use crate::events::{FallStatus, Sample, Snapshot, StepEvent};
use crate::settings::{FallSettings, StepSettings};

/// Cross-context reset request. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ResetSignal {
    pending: Arc<AtomicBool>,
}

impl ResetSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Safe to call from any task (e.g. the MQTT event callback).
    pub fn request(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Read and clear.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub step: Option<StepEvent>,
    pub fall: FallStatus,
    /// A pending reset was applied before this tick's sample.
    pub reset_applied: bool,
}

pub struct MotionCore {
    step: StepDetector,
    fall: FallDetector,
    reset: ResetSignal,
    ticks: u64,
}

impl MotionCore {
    pub fn new(step: StepSettings, fall: FallSettings) -> Self {
        Self {
            step: StepDetector::new(step),
            fall: FallDetector::new(fall),
            reset: ResetSignal::new(),
            ticks: 0,
        }
    }

    /// Handle for sinks that may request a reset.
    pub fn reset_signal(&self) -> ResetSignal {
        self.reset.clone()
    }

    pub fn tick(&mut self, sample: &Sample) -> TickOutcome {
        let reset_applied = self.reset.take();
        if reset_applied {
            log::info!("Reset requested, step counter cleared (was {})", self.step.count());
            self.step.reset();
        }

        let step = self.step.update(sample);
        let fall = self.fall.update(sample);
        self.ticks += 1;

        TickOutcome { step, fall, reset_applied }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            steps: self.step.count(),
            fall: self.fall.status(),
            ticks: self.ticks,
        }
    }

    pub fn step_detector(&self) -> &StepDetector {
        &self.step
    }

    pub fn fall_detector(&self) -> &FallDetector {
        &self.fall
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StepPolicy;

    fn core() -> MotionCore {
        MotionCore::new(StepSettings::default(), FallSettings::default())
    }

    fn pulse() -> Sample {
        Sample::with_gyro(0.0, 0.0, 4.0, 3.0)
    }

    fn quiet() -> Sample {
        Sample::with_gyro(0.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn reset_signal_is_read_and_cleared() {
        let signal = ResetSignal::new();
        let remote = signal.clone();
        assert!(!signal.take());
        remote.request();
        assert!(signal.is_pending());
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn reset_is_applied_at_top_of_next_tick() {
        let mut core = core();
        for _ in 0..3 {
            core.tick(&pulse());
            core.tick(&quiet());
        }
        assert_eq!(core.snapshot().steps, 3);

        let remote = core.reset_signal();
        remote.request();
        // Nothing changes until the loop ticks.
        assert_eq!(core.snapshot().steps, 3);

        let outcome = core.tick(&quiet());
        assert!(outcome.reset_applied);
        assert_eq!(core.snapshot().steps, 0);

        let outcome = core.tick(&quiet());
        assert!(!outcome.reset_applied);
    }

    #[test]
    fn reset_tick_still_evaluates_its_sample() {
        let mut core = core();
        core.tick(&pulse());
        core.reset_signal().request();
        let outcome = core.tick(&pulse());
        assert!(outcome.reset_applied);
        // Latch was cleared by the reset, so the sustained pulse counts anew.
        assert_eq!(outcome.step, Some(StepEvent { total: 1 }));
    }

    #[test]
    fn reset_keeps_thresholds() {
        let step = StepSettings { policy: StepPolicy::Derivative, accel_threshold: 1.5, gyro_threshold: 0.0 };
        let mut core = MotionCore::new(step, FallSettings::default());
        core.reset_signal().request();
        core.tick(&quiet());
        assert_eq!(*core.step_detector().settings(), step);
        assert_eq!(*core.fall_detector().settings(), FallSettings::default());
    }

    #[test]
    fn snapshot_tracks_ticks_and_fall() {
        let mut core = core();
        core.tick(&Sample::with_gyro(0.0, 0.0, 0.0, 0.0));
        let snap = core.snapshot();
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.fall, FallStatus::FallDetected);

        core.tick(&Sample::with_gyro(0.0, 0.0, 9.8, 0.0));
        assert_eq!(core.snapshot().fall, FallStatus::Monitoring);
        assert_eq!(core.snapshot().ticks, 2);
    }
}
