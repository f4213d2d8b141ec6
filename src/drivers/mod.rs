// StrideWatch: I2C Device Drivers
//
// The OLED and the MPU6050 share one I2C bus, guarded by a mutex so either
// driver can be used from any task.

pub mod display;
pub mod imu;

use std::sync::{Mutex, MutexGuard};

use esp_idf_hal::i2c::I2cDriver;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

pub(crate) fn lock(bus: SharedBus) -> anyhow::Result<MutexGuard<'static, I2cDriver<'static>>> {
    bus.lock().map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))
}
