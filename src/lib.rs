// StrideWatch: Motion Event Core
//
// Step counting and fall classification from a periodic IMU sample stream,
// plus the pure rendering/formatting used by the display, HTTP and MQTT
// sinks. Nothing here touches ESP-IDF, so the whole library runs on the host.

pub mod config;
pub mod dashboard;
pub mod detector;
pub mod engine;
pub mod error;
pub mod events;
pub mod schedule;
pub mod settings;
pub mod telemetry;
pub mod ui;

pub use engine::{MotionCore, ResetSignal, TickOutcome};
pub use error::{SettingsError, StartupError};
pub use events::{Command, FallStatus, ImuReading, Sample, Snapshot, StepEvent};
pub use settings::{FallPolarity, Settings, StepPolicy};
