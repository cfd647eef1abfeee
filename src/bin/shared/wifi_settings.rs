//! WiFi credentials, rendered by the project generator.

use sensordemo_core::config::WifiSettings;

pub const WIFI_SETTINGS: WifiSettings = WifiSettings::new("{{ wifi_ssid }}", "{{ wifi_password }}");
