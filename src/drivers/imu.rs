// StrideWatch: MPU6050 IMU Driver
//
// Register-level driver over the shared I2C bus. Readings are converted to
// m/s² and °/s, the units every threshold is expressed in.

use stridewatch::config::*;
use stridewatch::events::ImuReading;

use super::{lock, SharedBus};

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 14-byte sensor burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device answers with the expected WHO_AM_I.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = lock(self.bus) else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±8 g), gyro (±500 °/s), DLPF 5 Hz.
    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = lock(self.bus)?;

        // Wake up (clear SLEEP bit)
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

        // DLPF bandwidth 5 Hz: the loop polls every few hundred ms
        bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x06], I2C_TIMEOUT_TICKS)?;

        // Gyroscope: ±500 °/s
        bus.write(I2C_ADDR_MPU6050, &[REG_GYRO_CONFIG, 0x08], I2C_TIMEOUT_TICKS)?;

        // Accelerometer: ±8 g
        bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;

        log::info!("MPU6050 initialised (±8g, ±500°/s, DLPF 5Hz)");
        Ok(())
    }

    /// Burst-read all 6 axes and convert to physical units.
    pub fn read(&self) -> anyhow::Result<ImuReading> {
        let mut bus = lock(self.bus)?;
        let mut raw = [0u8; 14];
        bus.write_read(
            I2C_ADDR_MPU6050,
            &[REG_ACCEL_XOUT_H],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;

        let word = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]) as f32;
        let accel = |i: usize| word(i) / ACCEL_SCALE_8G * STANDARD_GRAVITY;
        let gyro = |i: usize| word(i) / GYRO_SCALE_500;

        Ok(ImuReading {
            ax: accel(0),
            ay: accel(2),
            az: accel(4),
            // raw[6..8] = temperature, skipped
            gx: gyro(8),
            gy: gyro(10),
            gz: gyro(12),
        })
    }
}
