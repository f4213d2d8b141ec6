// StrideWatch: HTTP Dashboard Server
//
// One route, `GET /`, rendering the latest snapshot. The handler runs on the
// httpd task and only ever reads the copy published by the motion loop.

use std::sync::{Arc, Mutex};

use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;

use stridewatch::config::STACK_HTTP;
use stridewatch::dashboard;
use stridewatch::events::Snapshot;
use stridewatch::settings::DisplaySettings;

pub struct Dashboard {
    _server: EspHttpServer<'static>,
    latest: Arc<Mutex<Snapshot>>,
}

impl Dashboard {
    pub fn start(display: DisplaySettings) -> anyhow::Result<Self> {
        let latest = Arc::new(Mutex::new(Snapshot::default()));

        let mut server = EspHttpServer::new(&Configuration {
            stack_size: STACK_HTTP,
            ..Default::default()
        })?;

        let shared = Arc::clone(&latest);
        server.fn_handler("/", Method::Get, move |req| {
            let snapshot = *shared
                .lock()
                .map_err(|_| anyhow::anyhow!("snapshot mutex poisoned"))?;
            let html = dashboard::render(&snapshot, &display);

            let mut resp = req.into_response(200, Some("OK"), &[("Content-Type", "text/html")])?;
            resp.write_all(html.as_bytes())?;
            Ok::<(), anyhow::Error>(())
        })?;

        log::info!("HTTP server started");
        Ok(Self { _server: server, latest })
    }

    /// Replace the snapshot served to clients.
    pub fn update(&self, snapshot: Snapshot) {
        match self.latest.lock() {
            Ok(mut latest) => *latest = snapshot,
            Err(_) => log::warn!("Dashboard snapshot mutex poisoned, skipping update"),
        }
    }
}
