// StrideWatch: Firmware Entry Point
//
// Boot sequence:
//   1. Bring up the shared I2C bus and the OLED (halt if the panel is absent).
//   2. Load settings: defaults, then NVS overrides, then validation.
//   3. Associate with WiFi, waiting as long as the access point takes.
//   4. Probe and configure the MPU6050 (halt if absent).
//   5. Start the HTTP dashboard and/or the MQTT link, as configured.
//   6. Run the motion loop on the main task forever.
//
// A fatal bring-up error is logged, shown on the OLED when there is one, and
// the firmware parks. It does not retry.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod net;
#[cfg(target_os = "espidf")]
mod store;
#[cfg(target_os = "espidf")]
mod tasks;

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("stridewatch: firmware binary, build it for an ESP-IDF target");
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::main()
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::modem::Modem;
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use stridewatch::config::*;
    use stridewatch::schedule::Cadence;
    use stridewatch::ui::BootScreen;
    use stridewatch::{MotionCore, Settings, StartupError};

    use crate::drivers::display::OledDisplay;
    use crate::drivers::imu::Mpu6050;
    use crate::drivers::SharedBus;
    use crate::net::http::Dashboard;
    use crate::net::mqtt::TelemetryLink;
    use crate::net::wifi::WifiLink;
    use crate::store::NvsStore;
    use crate::tasks::motion::MotionLoop;

    pub fn main() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("StrideWatch firmware starting…");

        // ---- Peripherals --------------------------------------------------
        let peripherals = Peripherals::take()?;
        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // ---- I2C bus (shared between OLED and MPU6050) --------------------
        let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21, // SDA
            peripherals.pins.gpio22, // SCL
            &i2c_config,
        )?;
        // The bus lives for the whole programme (firmware never exits).
        let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

        // ---- Display ------------------------------------------------------
        let mut display = OledDisplay::new(i2c_bus);
        if !display.is_connected() || display.init().is_err() {
            halt(None, &StartupError::DisplayNotFound.into());
        }

        match bring_up(i2c_bus, peripherals.modem, sys_loop, nvs, &mut display) {
            Ok(parts) => parts.into_loop(display).run(),
            Err(e) => halt(Some(&mut display), &e),
        }
    }

    /// Everything the motion loop needs, minus the display it borrows during
    /// boot.
    struct BootParts {
        settings: Settings,
        imu: Mpu6050,
        wifi: WifiLink,
        dashboard: Option<Dashboard>,
        telemetry: Option<TelemetryLink>,
        core: MotionCore,
    }

    impl BootParts {
        fn into_loop(self, display: OledDisplay) -> MotionLoop {
            MotionLoop {
                core: self.core,
                imu: self.imu,
                display,
                display_settings: self.settings.display,
                wifi: self.wifi,
                dashboard: self.dashboard,
                telemetry: self.telemetry,
                cadence: Cadence::new(self.settings.poll_interval_ms),
            }
        }
    }

    fn bring_up(
        i2c_bus: SharedBus,
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        display: &mut OledDisplay,
    ) -> anyhow::Result<BootParts> {
        display.show(BootScreen::splash)?;
        thread::sleep(Duration::from_millis(SPLASH_DISPLAY_MS));

        // ---- Settings -----------------------------------------------------
        let store = NvsStore::open(nvs.clone())?;
        let settings = Settings::load(&store).map_err(StartupError::from)?;
        log::info!(
            "Step policy {} (accel {} m/s², gyro {} °/s), fall {} [{}, {}], poll {} ms",
            settings.step.policy.name(),
            settings.step.accel_threshold,
            settings.step.gyro_threshold,
            settings.fall.polarity.name(),
            settings.fall.low,
            settings.fall.high,
            settings.poll_interval_ms,
        );

        // ---- WiFi (blocking rendezvous) -----------------------------------
        let ssid = settings.network.ssid.clone();
        display.show(|fb| BootScreen::connecting(fb, &ssid))?;
        let wifi = WifiLink::connect(modem, sys_loop, nvs, &settings.network)?;

        let ip = wifi.ip()?;
        log::info!("IP Address: {}", ip);
        display.show(|fb| BootScreen::connected(fb, &ip))?;
        thread::sleep(Duration::from_millis(WIFI_STATUS_DISPLAY_MS));

        // ---- IMU ----------------------------------------------------------
        let imu = Mpu6050::new(i2c_bus);
        let imu_ok = imu.is_connected();
        display.show(|fb| BootScreen::self_test(fb, true, imu_ok))?;
        if !imu_ok {
            return Err(StartupError::SensorNotFound.into());
        }
        imu.init()?;
        log::info!("MPU6050 Found!");

        // ---- Core + sinks -------------------------------------------------
        let core = MotionCore::new(settings.step, settings.fall);

        let dashboard = if settings.sinks.http {
            Some(Dashboard::start(settings.display)?)
        } else {
            None
        };

        let telemetry = match &settings.sinks.mqtt {
            Some(mqtt) => Some(TelemetryLink::start(mqtt, core.reset_signal())?),
            None => None,
        };

        log::info!("Boot complete, entering motion loop");
        Ok(BootParts { settings, imu, wifi, dashboard, telemetry, core })
    }

    /// Log the cause, show it if possible, and stop making progress.
    fn halt(display: Option<&mut OledDisplay>, err: &anyhow::Error) -> ! {
        match err.downcast_ref::<StartupError>() {
            Some(cause) => log::error!("Startup failed: {}", cause),
            None => log::error!("Startup failed: {:#}", err),
        }

        if let Some(display) = display {
            let reason = err.to_string();
            let _ = display.show(|fb| BootScreen::halted(fb, &reason));
        }

        // Park forever.
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }
}
