// StrideWatch: WiFi Station Link
//
// Association at boot is a rendezvous: it waits as long as the access point
// takes. After that, a dropped link is retried once per tick without
// touching detector state.

use std::thread;
use std::time::Duration;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use stridewatch::settings::NetworkSettings;
use stridewatch::StartupError;

const ASSOCIATION_RETRY: Duration = Duration::from_secs(1);

pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    online: bool,
}

impl WifiLink {
    /// Configure the station and block until it has an IP address.
    pub fn connect(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        settings: &NetworkSettings,
    ) -> anyhow::Result<Self> {
        if settings.ssid.is_empty() {
            return Err(StartupError::Network("no WiFi SSID configured".into()).into());
        }

        let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs))?;
        if let Err(e) = esp_wifi.sta_netif_mut().set_hostname(&settings.hostname) {
            log::warn!("Could not set hostname '{}': {}", settings.hostname, e);
        }
        let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

        let auth_method = if settings.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = ClientConfiguration {
            ssid: settings
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| StartupError::Network("SSID longer than 32 bytes".into()))?,
            password: settings
                .password
                .as_str()
                .try_into()
                .map_err(|_| StartupError::Network("password longer than 64 bytes".into()))?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(config))?;
        wifi.start()?;

        loop {
            match wifi.connect() {
                Ok(()) => break,
                Err(e) => {
                    log::info!("Connecting to WiFi '{}'... ({})", settings.ssid, e);
                    thread::sleep(ASSOCIATION_RETRY);
                }
            }
        }
        wifi.wait_netif_up()?;
        log::info!("Connected to WiFi '{}'", settings.ssid);

        Ok(Self { wifi, online: true })
    }

    pub fn ip(&self) -> anyhow::Result<String> {
        let info = self.wifi.wifi().sta_netif().get_ip_info()?;
        Ok(info.ip.to_string())
    }

    /// Returns whether the link is up this tick. Issues a non-blocking
    /// reconnect if it is not.
    pub fn maintain(&mut self) -> bool {
        let connected = self.wifi.is_connected().unwrap_or(false);

        if connected != self.online {
            if connected {
                log::info!("WiFi link restored");
            } else {
                log::warn!("WiFi association lost, reconnecting");
            }
            self.online = connected;
        }

        if !connected {
            // Non-blocking: this call is the only retry, issued once per tick
            // until the link comes back.
            if let Err(e) = self.wifi.wifi_mut().connect() {
                log::debug!("WiFi reconnect attempt failed: {}", e);
            }
        }
        connected
    }
}
