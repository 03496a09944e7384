use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::domain::models::Rgb;
use crate::infrastructure::bluetooth::protocol;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "govee_ble_controller".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Scanning
    #[serde(default = "default_name_prefix")]
    pub device_name_prefix: String,
    #[serde(default = "default_scan_duration")]
    pub scan_duration_secs: u64,
    #[serde(default = "default_false")]
    pub debug_show_all_devices: bool,

    // Remembered devices and control values
    #[serde(default)]
    pub known_addresses: Vec<String>,
    #[serde(default)]
    pub last_connected_address: Option<String>,
    #[serde(default = "default_color")]
    pub last_color: Rgb,
    #[serde(default = "default_brightness")]
    pub last_brightness_percent: u8,

    // Logging
    #[serde(default)]
    pub log_settings: LogSettings,

    // Advanced BLE settings
    #[serde(default = "default_service_uuid")]
    pub ble_service_uuid: String,
    #[serde(default = "default_control_uuid")]
    pub ble_control_char_uuid: String,

    // Connection behavior
    #[serde(default = "default_connect_max_retries")]
    pub connect_max_retries: u32,
    #[serde(default = "default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,
    #[serde(default = "default_true")]
    pub keep_alive_on_connect: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name_prefix: default_name_prefix(),
            scan_duration_secs: default_scan_duration(),
            debug_show_all_devices: false,
            known_addresses: Vec::new(),
            last_connected_address: None,
            last_color: default_color(),
            last_brightness_percent: default_brightness(),
            log_settings: LogSettings::default(),
            ble_service_uuid: default_service_uuid(),
            ble_control_char_uuid: default_control_uuid(),
            connect_max_retries: default_connect_max_retries(),
            connect_retry_delay_ms: default_connect_retry_delay_ms(),
            keep_alive_on_connect: true,
        }
    }
}

fn default_name_prefix() -> String {
    // Govee lights advertise as "GBK_H6113_XXXX" and similar.
    "GBK".to_string()
}
fn default_scan_duration() -> u64 {
    5
}
fn default_color() -> Rgb {
    Rgb::new(255, 255, 255)
}
fn default_brightness() -> u8 {
    100
}
fn default_service_uuid() -> String {
    protocol::SERVICE_UUID.to_string()
}
fn default_control_uuid() -> String {
    protocol::CONTROL_CHAR_UUID.to_string()
}
fn default_connect_max_retries() -> u32 {
    3
}
fn default_connect_retry_delay_ms() -> u64 {
    500
}

/// Per-user directory holding settings.json and, by default, log output.
pub fn app_config_dir() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("GoveeBleController");
    Some(path)
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self {
            settings,
            settings_path,
        })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = app_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Remember a light we successfully talked to.
    pub fn add_known_address(&mut self, address: &str) -> anyhow::Result<()> {
        self.settings.last_connected_address = Some(address.to_string());
        if !self
            .settings
            .known_addresses
            .iter()
            .any(|a| a.eq_ignore_ascii_case(address))
        {
            self.settings.known_addresses.push(address.to_string());
        }
        self.save()
    }

    pub fn remember_color(&mut self, color: Rgb) -> anyhow::Result<()> {
        self.settings.last_color = color;
        self.save()
    }

    pub fn remember_brightness(&mut self, percent: u8) -> anyhow::Result<()> {
        self.settings.last_brightness_percent = percent;
        self.save()
    }

    /// In-memory service for unit tests; never reads the real config dir.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            settings: Settings::default(),
            settings_path: std::env::temp_dir().join("govee_ble_controller_test_settings.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_original_tool() {
        let settings = Settings::default();
        assert_eq!(settings.device_name_prefix, "GBK");
        assert_eq!(settings.scan_duration_secs, 5);
        assert!(!settings.debug_show_all_devices);
        assert_eq!(settings.ble_service_uuid, protocol::SERVICE_UUID);
        assert_eq!(settings.ble_control_char_uuid, protocol::CONTROL_CHAR_UUID);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        // Older settings files miss newer fields; every field carries a default.
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.device_name_prefix, "GBK");
        assert_eq!(settings.connect_max_retries, 3);
        assert!(settings.keep_alive_on_connect);
        assert_eq!(settings.log_settings.level, "info");
    }

    #[test]
    fn partial_json_keeps_overrides() {
        let settings: Settings =
            serde_json::from_str(r#"{"device_name_prefix":"ihoment","scan_duration_secs":10}"#)
                .unwrap();
        assert_eq!(settings.device_name_prefix, "ihoment");
        assert_eq!(settings.scan_duration_secs, 10);
        assert_eq!(settings.last_brightness_percent, 100);
    }

    #[test]
    fn last_color_reads_struct_and_legacy_array_forms() {
        let settings: Settings =
            serde_json::from_str(r#"{"last_color":{"r":16,"g":32,"b":48}}"#).unwrap();
        assert_eq!(settings.last_color, Rgb::new(16, 32, 48));

        // Files written before the color became a struct hold a bare array.
        let settings: Settings = serde_json::from_str(r#"{"last_color":[1,2,3]}"#).unwrap();
        assert_eq!(settings.last_color, Rgb::new(1, 2, 3));
    }
}
