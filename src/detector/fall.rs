// StrideWatch: Fall Detector
//
// Stateless band test on the three acceleration axes. The detector keeps the
// last status only so transitions can be logged; the output never depends on
// earlier ticks.

use crate::events::{FallStatus, Sample};
use crate::settings::{FallPolarity, FallSettings};

/// Pure classification of one sample. Comparisons are signed, not magnitudes.
pub fn classify(settings: &FallSettings, sample: &Sample) -> FallStatus {
    let outside_band = sample
        .axes()
        .iter()
        .any(|&a| a > settings.high || a < settings.low);

    let fall = match settings.polarity {
        FallPolarity::QuietBand => !outside_band,
        FallPolarity::Excursion => outside_band,
    };

    if fall {
        FallStatus::FallDetected
    } else {
        FallStatus::Monitoring
    }
}

pub struct FallDetector {
    settings: FallSettings,
    status: FallStatus,
}

impl FallDetector {
    pub fn new(settings: FallSettings) -> Self {
        Self {
            settings,
            status: FallStatus::Monitoring,
        }
    }

    pub fn update(&mut self, sample: &Sample) -> FallStatus {
        let status = classify(&self.settings, sample);
        if status != self.status {
            match status {
                FallStatus::FallDetected => log::info!("Fall detected!"),
                FallStatus::Monitoring => log::info!("Fall cleared, monitoring"),
            }
            self.status = status;
        }
        status
    }

    pub fn status(&self) -> FallStatus {
        self.status
    }

    pub fn settings(&self) -> &FallSettings {
        &self.settings
    }
}
