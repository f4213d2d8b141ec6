// StrideWatch: Error Types
//
// Detectors never fail. These cover configuration and device bring-up, where
// the firmware needs to tell the causes apart before halting.

use thiserror::Error;

/// A rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Threshold or interval is NaN/inf.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// `fall_low` must be strictly below `fall_high`.
    #[error("fall band is inverted (low {low} >= high {high})")]
    InvertedFallBand { low: f32, high: f32 },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("MQTT {0} topic is empty")]
    EmptyTopic(&'static str),

    #[error("MQTT topic '{0}' is used for both steps and fall")]
    DuplicateTopic(String),

    /// Stored value could not be mapped onto a setting (unparseable number,
    /// unknown enum name).
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue { key: &'static str, value: String },

    /// The backing store failed to read a key that is present.
    #[error("could not read setting '{key}': {reason}")]
    Storage { key: &'static str, reason: String },
}

/// Fatal bring-up failures. The firmware halts on any of these.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("SSD1306 display not found on I2C bus")]
    DisplayNotFound,

    #[error("MPU6050 sensor not found on I2C bus")]
    SensorNotFound,

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("network bring-up failed: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_survives_anyhow() {
        let err: anyhow::Error = StartupError::SensorNotFound.into();
        assert!(matches!(
            err.downcast_ref::<StartupError>(),
            Some(StartupError::SensorNotFound)
        ));
    }

    #[test]
    fn settings_error_is_the_source() {
        use std::error::Error;
        let err = StartupError::from(SettingsError::ZeroInterval("poll_interval_ms"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("poll_interval_ms must be greater than zero"));
    }

    #[test]
    fn invalid_value_names_key_and_text() {
        let err = SettingsError::InvalidValue { key: "fall_low", value: "-14,0".into() };
        assert_eq!(err.to_string(), "invalid value '-14,0' for setting 'fall_low'");
    }
}
