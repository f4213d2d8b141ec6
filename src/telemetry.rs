// StrideWatch: MQTT Telemetry Payloads
//
// Two topics, plain-text payloads. The step counter is published raw; the
// display offset only applies to the OLED and the HTTP page.

use crate::events::Snapshot;
use crate::settings::MqttSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub steps: u32,
    pub fall: bool,
}

impl Telemetry {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            steps: snapshot.steps,
            fall: snapshot.fall.is_fall(),
        }
    }

    pub fn steps_payload(&self) -> String {
        self.steps.to_string()
    }

    pub fn fall_payload(&self) -> String {
        self.fall.to_string()
    }

    /// `(topic, payload)` pairs in publish order.
    pub fn messages<'a>(&self, mqtt: &'a MqttSettings) -> [(&'a str, String); 2] {
        [
            (mqtt.steps_topic.as_str(), self.steps_payload()),
            (mqtt.fall_topic.as_str(), self.fall_payload()),
        ]
    }
}
