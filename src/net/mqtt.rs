// StrideWatch: MQTT Telemetry & Command Link
//
// Publishes `{steps, fall}` on two topics every publish interval and listens
// on the command topic for the `reset` literal. The client reconnects on its
// own; after each new session the command subscription is renewed on the
// next tick.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

use stridewatch::events::{Command, Snapshot};
use stridewatch::schedule::Periodic;
use stridewatch::settings::MqttSettings;
use stridewatch::telemetry::Telemetry;
use stridewatch::ResetSignal;

pub struct TelemetryLink {
    client: EspMqttClient<'static>,
    settings: MqttSettings,
    connected: Arc<AtomicBool>,
    // Bumped by the callback on every CONNACK.
    session: Arc<AtomicU32>,
    subscribed_session: u32,
    schedule: Periodic,
}

impl TelemetryLink {
    pub fn start(settings: &MqttSettings, reset: ResetSignal) -> anyhow::Result<Self> {
        let connected = Arc::new(AtomicBool::new(false));
        let session = Arc::new(AtomicU32::new(0));

        let conf = MqttClientConfiguration {
            client_id: Some(settings.client_id.as_str()),
            ..Default::default()
        };

        let cb_connected = Arc::clone(&connected);
        let cb_session = Arc::clone(&session);
        let command_topic = settings.command_topic.clone();

        let client = EspMqttClient::new_cb(&settings.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    cb_connected.store(true, Ordering::SeqCst);
                    cb_session.fetch_add(1, Ordering::SeqCst);
                    log::info!("MQTT session established");
                }
                EventPayload::Disconnected => {
                    cb_connected.store(false, Ordering::SeqCst);
                    log::warn!("MQTT session lost, client will reconnect");
                }
                EventPayload::Received { topic, data, .. } => {
                    if topic != Some(command_topic.as_str()) {
                        return;
                    }
                    if let Some(Command::Reset) = Command::parse(data) {
                        log::info!("Reset command received");
                        reset.request();
                    }
                }
                EventPayload::Error(e) => log::warn!("MQTT error: {:?}", e),
                _ => {}
            }
        })?;

        log::info!("MQTT client started ({})", settings.broker_url);
        Ok(Self {
            client,
            settings: settings.clone(),
            connected,
            session,
            subscribed_session: 0,
            schedule: Periodic::new(settings.publish_interval_ms),
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Renew the command subscription if a new session came up since the
    /// last tick.
    pub fn maintain(&mut self) {
        if !self.is_connected() {
            return;
        }
        let session = self.session.load(Ordering::SeqCst);
        if session == self.subscribed_session {
            return;
        }
        match self.client.subscribe(&self.settings.command_topic, QoS::AtLeastOnce) {
            Ok(_) => {
                log::info!("Subscribed to '{}'", self.settings.command_topic);
                self.subscribed_session = session;
            }
            Err(e) => log::warn!("MQTT subscribe failed: {}", e),
        }
    }

    /// Publish both telemetry messages if the interval has elapsed. A tick
    /// without a session drops the update.
    pub fn publish_if_due(&mut self, now_ms: u64, snapshot: &Snapshot) {
        if !self.schedule.due(now_ms) {
            return;
        }
        if !self.is_connected() {
            log::debug!("MQTT offline, telemetry skipped");
            return;
        }

        let telemetry = Telemetry::from_snapshot(snapshot);
        for (topic, payload) in telemetry.messages(&self.settings) {
            if let Err(e) = self.client.enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes()) {
                log::warn!("MQTT publish to '{}' failed: {}", topic, e);
            }
        }
    }
}
