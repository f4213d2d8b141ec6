// StrideWatch: Hardware & System Configuration
// Target: ESP32 dev board with MPU6050 + SSD1306 on a shared I2C bus

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_HTTP: usize = 6144;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 300;
pub const DEFAULT_PUBLISH_INTERVAL_MS: u32 = 5000;
pub const SPLASH_DISPLAY_MS: u64 = 2000;
pub const WIFI_STATUS_DISPLAY_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Detection thresholds (defaults, overridable at runtime)
// ---------------------------------------------------------------------------
pub const DEFAULT_STEP_ACCEL_THRESHOLD: f32 = 2.0; // m/s²
pub const DEFAULT_STEP_GYRO_THRESHOLD: f32 = 1.0;  // °/s
pub const DEFAULT_FALL_THRESHOLD_HIGH: f32 = 3.0;  // m/s²
pub const DEFAULT_FALL_THRESHOLD_LOW: f32 = -30.0; // m/s²
pub const DEFAULT_STEP_DISPLAY_OFFSET: i32 = -1;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------
pub const DEFAULT_HOSTNAME: &str = "stridewatch";
pub const DEFAULT_MQTT_CLIENT_ID: &str = "stridewatch";
pub const DEFAULT_STEPS_TOPIC: &str = "stridewatch/steps";
pub const DEFAULT_FALL_TOPIC: &str = "stridewatch/fall";
pub const DEFAULT_COMMAND_TOPIC: &str = "stridewatch/command";
pub const NVS_NAMESPACE: &str = "stridewatch";

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0;   // LSB/g  at ±8 g
pub const GYRO_SCALE_500: f32 = 65.5;     // LSB/°/s at ±500 °/s
pub const STANDARD_GRAVITY: f32 = 9.806_65; // m/s² per g
