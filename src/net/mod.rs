// StrideWatch: Network Sinks
//
// WiFi station link plus the two optional transports: the HTTP dashboard
// and the MQTT telemetry/command link.

pub mod http;
pub mod mqtt;
pub mod wifi;
