// StrideWatch: Motion Loop
//
// The one control loop. Each tick, in order:
//   1. network maintenance (WiFi reconnect, MQTT re-subscribe)
//   2. sample the IMU
//   3. update both detectors (a pending reset is applied first)
//   4. refresh the OLED and the HTTP snapshot, publish MQTT when due
// then sleep for whatever is left of the poll interval.

use std::thread;

use stridewatch::schedule::{Cadence, Clock, MonotonicClock};
use stridewatch::settings::DisplaySettings;
use stridewatch::ui::StatusScreen;
use stridewatch::{MotionCore, Sample};

use crate::drivers::display::OledDisplay;
use crate::drivers::imu::Mpu6050;
use crate::net::http::Dashboard;
use crate::net::mqtt::TelemetryLink;
use crate::net::wifi::WifiLink;

pub struct MotionLoop {
    pub core: MotionCore,
    pub imu: Mpu6050,
    pub display: OledDisplay,
    pub display_settings: DisplaySettings,
    pub wifi: WifiLink,
    pub dashboard: Option<Dashboard>,
    pub telemetry: Option<TelemetryLink>,
    pub cadence: Cadence,
}

impl MotionLoop {
    pub fn run(mut self) -> ! {
        log::info!("Motion loop started ({} ms cadence)", self.cadence.interval().as_millis());
        let clock = MonotonicClock::new();

        loop {
            self.cadence.begin_tick(clock.now_ms());
            self.tick(clock.now_ms());
            thread::sleep(self.cadence.remaining(clock.now_ms()));
        }
    }

    fn tick(&mut self, now_ms: u64) {
        // 1. Network maintenance
        let online = self.wifi.maintain();
        if online {
            if let Some(telemetry) = self.telemetry.as_mut() {
                telemetry.maintain();
            }
        }

        // 2 + 3. Sample and detect. A failed read skips detection this tick;
        // a pending reset waits for the next good sample.
        match self.imu.read() {
            Ok(reading) => {
                let outcome = self.core.tick(&Sample::from(reading));
                log::debug!(
                    "az={:.2} gz={:.2} step={:?} fall={:?}",
                    reading.az,
                    reading.gz,
                    outcome.step,
                    outcome.fall
                );
            }
            Err(e) => log::warn!("IMU read error: {}", e),
        }

        // 4. Sinks
        let snapshot = self.core.snapshot();
        let display_settings = self.display_settings;
        if let Err(e) = self
            .display
            .show(|fb| StatusScreen::render(&snapshot, &display_settings, fb))
        {
            log::warn!("Display refresh failed: {}", e);
        }

        if let Some(dashboard) = &self.dashboard {
            dashboard.update(snapshot);
        }

        if online {
            if let Some(telemetry) = self.telemetry.as_mut() {
                telemetry.publish_if_due(now_ms, &snapshot);
            }
        }
    }
}
