// StrideWatch: Step Detector
//
// Two policies, selected by `StepSettings::policy`:
//
//   Derivative  fires when az rose by more than the accel threshold since the
//               previous tick. History is one value (`previous_az`).
//   EdgeLatch   fires on the rising edge of `|az| > accel && |gz| > gyro`.
//               The latch holds while the condition stays true so a sustained
//               pulse counts once.

use crate::events::{Sample, StepEvent};
use crate::settings::{StepPolicy, StepSettings};

pub struct StepDetector {
    settings: StepSettings,
    count: u32,

    // Derivative history. `None` until the first sample so tick 1 never fires.
    previous_az: Option<f32>,

    // EdgeLatch: candidate flag from the previous tick.
    latched: bool,
}

impl StepDetector {
    pub fn new(settings: StepSettings) -> Self {
        Self {
            settings,
            count: 0,
            previous_az: None,
            latched: false,
        }
    }

    /// Evaluate one tick. Returns the event if a step boundary was crossed.
    pub fn update(&mut self, sample: &Sample) -> Option<StepEvent> {
        let fired = match self.settings.policy {
            StepPolicy::Derivative => self.derivative(sample),
            StepPolicy::EdgeLatch => self.edge_latch(sample),
        };

        if !fired {
            return None;
        }

        self.count = self.count.saturating_add(1);
        log::info!("Step detected! Total steps: {}", self.count);
        Some(StepEvent { total: self.count })
    }

    fn derivative(&mut self, sample: &Sample) -> bool {
        let fired = self
            .previous_az
            .is_some_and(|prev| sample.az - prev > self.settings.accel_threshold);
        self.previous_az = Some(sample.az);
        fired
    }

    fn edge_latch(&mut self, sample: &Sample) -> bool {
        // Without a yaw rate the combined condition can never hold.
        let candidate = sample.gz.is_some_and(|gz| {
            sample.az.abs() > self.settings.accel_threshold
                && gz.abs() > self.settings.gyro_threshold
        });
        let rising = candidate && !self.latched;
        self.latched = candidate;
        rising
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn settings(&self) -> &StepSettings {
        &self.settings
    }

    /// Zero the counter and forget history. Thresholds are untouched.
    pub fn reset(&mut self) {
        self.count = 0;
        self.previous_az = None;
        self.latched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derivative(threshold: f32) -> StepDetector {
        StepDetector::new(StepSettings {
            policy: StepPolicy::Derivative,
            accel_threshold: threshold,
            gyro_threshold: 0.0,
        })
    }

    fn edge_latch(accel: f32, gyro: f32) -> StepDetector {
        StepDetector::new(StepSettings {
            policy: StepPolicy::EdgeLatch,
            accel_threshold: accel,
            gyro_threshold: gyro,
        })
    }

    fn az(az: f32) -> Sample {
        Sample::accel(0.0, 0.0, az)
    }

    #[test]
    fn derivative_fires_on_large_rise() {
        let mut d = derivative(2.0);
        assert_eq!(d.update(&az(0.0)), None);
        assert_eq!(d.update(&az(3.0)), Some(StepEvent { total: 1 }));
    }

    #[test]
    fn derivative_ignores_small_rise() {
        let mut d = derivative(2.0);
        assert_eq!(d.update(&az(0.0)), None);
        assert_eq!(d.update(&az(1.0)), None);
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn derivative_threshold_is_strict() {
        let mut d = derivative(2.0);
        d.update(&az(1.0));
        assert_eq!(d.update(&az(3.0)), None);
    }

    #[test]
    fn derivative_first_tick_never_fires() {
        // Gravity alone would exceed the threshold against a zero seed.
        let mut d = derivative(2.0);
        assert_eq!(d.update(&az(9.8)), None);
    }

    #[test]
    fn derivative_tracks_previous_every_tick() {
        let mut d = derivative(2.0);
        d.update(&az(0.0));
        d.update(&az(1.5)); // no step, but history moves to 1.5
        assert_eq!(d.update(&az(3.0)), None);
        assert_eq!(d.update(&az(5.5)), Some(StepEvent { total: 1 }));
    }

    #[test]
    fn derivative_double_counts_oscillation() {
        // Known limitation: no debounce window.
        let mut d = derivative(2.0);
        let fired = [0.0, 3.0, 0.0, 3.0, 0.0, 3.0]
            .iter()
            .filter_map(|&z| d.update(&az(z)))
            .count();
        assert_eq!(fired, 3);
    }

    #[test]
    fn edge_latch_fires_once_per_pulse() {
        let mut d = edge_latch(2.0, 1.0);
        let az = [0.0, 0.0, 3.5, 3.5, 0.0];
        let gz = [0.0, 0.0, 2.0, 2.0, 0.0];

        let fired: Vec<usize> = (0..az.len())
            .filter(|&i| d.update(&Sample::with_gyro(0.0, 0.0, az[i], gz[i])).is_some())
            .collect();

        assert_eq!(fired, vec![2]);
        assert_eq!(d.count(), 1);
    }

    #[test]
    fn edge_latch_rearms_after_condition_drops() {
        let mut d = edge_latch(2.0, 1.0);
        let high = Sample::with_gyro(0.0, 0.0, 3.0, 2.0);
        let low = Sample::with_gyro(0.0, 0.0, 0.0, 0.0);

        assert!(d.update(&high).is_some());
        assert!(d.update(&high).is_none());
        assert!(d.update(&low).is_none());
        assert_eq!(d.update(&high), Some(StepEvent { total: 2 }));
    }

    #[test]
    fn edge_latch_uses_magnitudes() {
        let mut d = edge_latch(2.0, 1.0);
        assert!(d.update(&Sample::with_gyro(0.0, 0.0, -3.0, -2.0)).is_some());
    }

    #[test]
    fn edge_latch_needs_both_axes() {
        let mut d = edge_latch(2.0, 1.0);
        assert!(d.update(&Sample::with_gyro(0.0, 0.0, 3.0, 0.5)).is_none());
        assert!(d.update(&Sample::with_gyro(0.0, 0.0, 1.0, 5.0)).is_none());
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn edge_latch_without_gyro_never_fires() {
        let mut d = edge_latch(2.0, 1.0);
        assert!(d.update(&az(50.0)).is_none());
    }

    #[test]
    fn edge_latch_first_tick_can_fire() {
        // Latch starts clear, so a condition already true on tick 1 is an edge.
        let mut d = edge_latch(2.0, 1.0);
        assert!(d.update(&Sample::with_gyro(0.0, 0.0, 3.0, 2.0)).is_some());
    }

    #[test]
    fn reset_clears_count_and_history_but_keeps_thresholds() {
        let mut d = edge_latch(2.0, 1.0);
        let high = Sample::with_gyro(0.0, 0.0, 3.0, 2.0);
        d.update(&high);
        assert!(d.update(&high).is_none());

        d.reset();
        assert_eq!(d.count(), 0);
        assert_eq!(d.settings().accel_threshold, 2.0);
        assert_eq!(d.settings().gyro_threshold, 1.0);
        // Latch cleared: the still-high signal is a fresh edge.
        assert_eq!(d.update(&high), Some(StepEvent { total: 1 }));
    }

    #[test]
    fn reset_forgets_previous_az() {
        let mut d = derivative(2.0);
        d.update(&az(0.0));
        d.reset();
        assert_eq!(d.update(&az(3.0)), None);
    }

    #[test]
    fn count_is_non_decreasing() {
        let mut d = edge_latch(2.0, 1.0);
        let mut last = 0;
        for i in 0..200 {
            let on = (i / 3) % 2 == 0;
            let s = if on {
                Sample::with_gyro(0.0, 0.0, 4.0, 3.0)
            } else {
                Sample::with_gyro(0.0, 0.0, 0.0, 0.0)
            };
            d.update(&s);
            assert!(d.count() >= last);
            last = d.count();
        }
        assert_eq!(last, 34);
    }
}
