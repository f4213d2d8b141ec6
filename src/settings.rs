// StrideWatch: Runtime Settings
//
// Defaults come from `config`; every field can be overridden at boot from a
// key/value store (NVS on the device, a map in tests). Detectors only ever
// see thresholds through these structs.

use std::collections::HashMap;
use std::str::FromStr;

use crate::config::*;
use crate::error::SettingsError;

// ---------------------------------------------------------------------------
// Detection policies
// ---------------------------------------------------------------------------

/// How steps are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPolicy {
    /// Fire when `az` rises by more than the accel threshold since the last
    /// tick. No debounce: a signal oscillating faster than the poll rate can
    /// fire on every tick. Use only when no gyro is available.
    Derivative,
    /// Fire on the rising edge of `|az| > accel && |gz| > gyro`.
    #[default]
    EdgeLatch,
}

impl StepPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Derivative => "derivative",
            Self::EdgeLatch  => "edge_latch",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "derivative" => Some(Self::Derivative),
            "edge_latch" => Some(Self::EdgeLatch),
            _            => None,
        }
    }
}

/// Which side of the `[low, high]` band counts as a fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallPolarity {
    /// Fall while every axis stays inside the band (free-fall: all axes
    /// near zero). Leaving the band on any axis means "monitoring".
    #[default]
    QuietBand,
    /// Fall when any axis leaves the band.
    Excursion,
}

impl FallPolarity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuietBand => "quiet_band",
            Self::Excursion => "excursion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quiet_band" => Some(Self::QuietBand),
            "excursion"  => Some(Self::Excursion),
            _            => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSettings {
    pub policy: StepPolicy,
    /// m/s². Derivative: minimum rise per tick. EdgeLatch: minimum `|az|`.
    pub accel_threshold: f32,
    /// °/s, EdgeLatch only.
    pub gyro_threshold: f32,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            policy: StepPolicy::default(),
            accel_threshold: DEFAULT_STEP_ACCEL_THRESHOLD,
            gyro_threshold: DEFAULT_STEP_GYRO_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallSettings {
    pub high: f32,
    pub low: f32,
    pub polarity: FallPolarity,
}

impl Default for FallSettings {
    fn default() -> Self {
        Self {
            high: DEFAULT_FALL_THRESHOLD_HIGH,
            low: DEFAULT_FALL_THRESHOLD_LOW,
            polarity: FallPolarity::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    /// Added to the raw counter on the OLED and the HTTP page.
    pub step_offset: i32,
}

impl DisplaySettings {
    pub fn shown_steps(&self, steps: u32) -> i64 {
        i64::from(steps) + i64::from(self.step_offset)
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { step_offset: DEFAULT_STEP_DISPLAY_OFFSET }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub ssid: String,
    pub password: String,
    pub hostname: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            ssid: option_env!("STRIDEWATCH_WIFI_SSID").unwrap_or_default().to_string(),
            password: option_env!("STRIDEWATCH_WIFI_PASS").unwrap_or_default().to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub broker_url: String,
    pub client_id: String,
    pub steps_topic: String,
    pub fall_topic: String,
    pub command_topic: String,
    pub publish_interval_ms: u32,
}

impl MqttSettings {
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            client_id: DEFAULT_MQTT_CLIENT_ID.to_string(),
            steps_topic: DEFAULT_STEPS_TOPIC.to_string(),
            fall_topic: DEFAULT_FALL_TOPIC.to_string(),
            command_topic: DEFAULT_COMMAND_TOPIC.to_string(),
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
        }
    }
}

/// Output transports, each switched on independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub http: bool,
    pub mqtt: Option<MqttSettings>,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            http: true,
            mqtt: option_env!("STRIDEWATCH_MQTT_URL")
                .filter(|url| !url.is_empty())
                .map(MqttSettings::new),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub step: StepSettings,
    pub fall: FallSettings,
    pub display: DisplaySettings,
    pub network: NetworkSettings,
    pub sinks: SinkSettings,
    pub poll_interval_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step: StepSettings::default(),
            fall: FallSettings::default(),
            display: DisplaySettings::default(),
            network: NetworkSettings::default(),
            sinks: SinkSettings::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// Override store
// ---------------------------------------------------------------------------

/// Storage keys. NVS limits keys to 15 characters.
pub mod keys {
    pub const NVS_KEY_MAX_LEN: usize = 15;

    pub const STEP_POLICY: &str = "step_policy";
    pub const STEP_ACCEL: &str = "step_acc";
    pub const STEP_GYRO: &str = "step_gyro";
    pub const FALL_HIGH: &str = "fall_high";
    pub const FALL_LOW: &str = "fall_low";
    pub const FALL_POLARITY: &str = "fall_polarity";
    pub const STEP_OFFSET: &str = "step_offset";
    pub const POLL_MS: &str = "poll_ms";
    pub const PUBLISH_MS: &str = "publish_ms";
    pub const WIFI_SSID: &str = "wifi_ssid";
    pub const WIFI_PASS: &str = "wifi_pass";
    pub const MQTT_URL: &str = "mqtt_url";
    pub const HTTP_ON: &str = "http_on";
}

/// Source of setting overrides. `Ok(None)` keeps the default; a value that
/// is present but unusable is an error, never a silent fallback.
pub trait SettingsStore {
    fn get_f32(&self, key: &'static str) -> Result<Option<f32>, SettingsError>;
    fn get_u32(&self, key: &'static str) -> Result<Option<u32>, SettingsError>;
    fn get_i32(&self, key: &'static str) -> Result<Option<i32>, SettingsError>;
    fn get_str(&self, key: &'static str) -> Result<Option<String>, SettingsError>;
}

/// Parse a stored text value, reporting the raw text on failure.
pub fn parse_value<T: FromStr>(key: &'static str, text: &str) -> Result<T, SettingsError> {
    text.trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue { key, value: text.to_string() })
}

/// In-memory store holding every value as text.
#[derive(Debug, Clone, Default)]
pub struct MapStore {
    values: HashMap<String, String>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    fn parsed<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, SettingsError> {
        self.values
            .get(key)
            .map(|text| parse_value(key, text))
            .transpose()
    }
}

impl SettingsStore for MapStore {
    fn get_f32(&self, key: &'static str) -> Result<Option<f32>, SettingsError> {
        self.parsed(key)
    }

    fn get_u32(&self, key: &'static str) -> Result<Option<u32>, SettingsError> {
        self.parsed(key)
    }

    fn get_i32(&self, key: &'static str) -> Result<Option<i32>, SettingsError> {
        self.parsed(key)
    }

    fn get_str(&self, key: &'static str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }
}

impl Settings {
    /// Defaults with every override found in `store` applied, then validated.
    pub fn load(store: &impl SettingsStore) -> Result<Self, SettingsError> {
        let mut s = Self::default();

        if let Some(name) = store.get_str(keys::STEP_POLICY)? {
            s.step.policy = StepPolicy::from_name(&name)
                .ok_or(SettingsError::InvalidValue { key: keys::STEP_POLICY, value: name })?;
        }
        if let Some(v) = store.get_f32(keys::STEP_ACCEL)? {
            s.step.accel_threshold = v;
        }
        if let Some(v) = store.get_f32(keys::STEP_GYRO)? {
            s.step.gyro_threshold = v;
        }
        if let Some(v) = store.get_f32(keys::FALL_HIGH)? {
            s.fall.high = v;
        }
        if let Some(v) = store.get_f32(keys::FALL_LOW)? {
            s.fall.low = v;
        }
        if let Some(name) = store.get_str(keys::FALL_POLARITY)? {
            s.fall.polarity = FallPolarity::from_name(&name)
                .ok_or(SettingsError::InvalidValue { key: keys::FALL_POLARITY, value: name })?;
        }
        if let Some(v) = store.get_i32(keys::STEP_OFFSET)? {
            s.display.step_offset = v;
        }
        if let Some(v) = store.get_u32(keys::POLL_MS)? {
            s.poll_interval_ms = v;
        }
        if let Some(v) = store.get_str(keys::WIFI_SSID)? {
            s.network.ssid = v;
        }
        if let Some(v) = store.get_str(keys::WIFI_PASS)? {
            s.network.password = v;
        }
        if let Some(v) = store.get_u32(keys::HTTP_ON)? {
            s.sinks.http = v != 0;
        }
        if let Some(url) = store.get_str(keys::MQTT_URL)? {
            // An empty URL in the store switches MQTT off.
            s.sinks.mqtt = (!url.is_empty()).then(|| MqttSettings::new(url));
        }
        let publish_ms = store.get_u32(keys::PUBLISH_MS)?;
        if let (Some(mqtt), Some(v)) = (s.sinks.mqtt.as_mut(), publish_ms) {
            mqtt.publish_interval_ms = v;
        }

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let finite = [
            ("step_accel_threshold", self.step.accel_threshold),
            ("step_gyro_threshold", self.step.gyro_threshold),
            ("fall_threshold_high", self.fall.high),
            ("fall_threshold_low", self.fall.low),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SettingsError::NotFinite(name));
            }
        }

        if self.fall.low >= self.fall.high {
            return Err(SettingsError::InvertedFallBand { low: self.fall.low, high: self.fall.high });
        }

        if self.poll_interval_ms == 0 {
            return Err(SettingsError::ZeroInterval("poll_interval_ms"));
        }

        if let Some(mqtt) = &self.sinks.mqtt {
            if mqtt.publish_interval_ms == 0 {
                return Err(SettingsError::ZeroInterval("publish_interval_ms"));
            }
            for (name, topic) in [
                ("steps", &mqtt.steps_topic),
                ("fall", &mqtt.fall_topic),
                ("command", &mqtt.command_topic),
            ] {
                if topic.is_empty() {
                    return Err(SettingsError::EmptyTopic(name));
                }
            }
            if mqtt.steps_topic == mqtt.fall_topic {
                return Err(SettingsError::DuplicateTopic(mqtt.steps_topic.clone()));
            }
        }

        Ok(())
    }
}
