//! BLE Connection Module
//!
//! Handles connecting to a Govee light and locating its writable control
//! characteristic. All control frames leave through [`GoveeLight`].

use std::time::Duration;

use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::Rgb;
use crate::infrastructure::bluetooth::protocol::{self, LightRequest};

/// Errors surfaced to the UI when talking to a light fails.
///
/// Every variant renders as a sentence fit for the status panel; nothing
/// here is swallowed silently.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("No Bluetooth adapter found")]
    NoAdapter,
    #[error("No device with address {0} in range; scan again and retry")]
    DeviceNotFound(String),
    #[error("Device has no Govee control service {0}")]
    VendorServiceMissing(Uuid),
    #[error("Control characteristic {0} not found on device")]
    ControlCharacteristicMissing(Uuid),
    #[error("Connection failed after {attempts} attempt(s): {last}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        last: btleplug::Error,
    },
    #[error("Invalid UUID in settings: {0}")]
    BadUuid(String),
    #[error("Bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),
}

/// Configuration for connection behavior
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum connect attempts before giving up
    pub max_connect_retries: u32,
    /// Delay between connect attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Vendor service UUID to look for
    pub service_uuid: String,
    /// Control characteristic UUID
    pub control_char_uuid: String,
    /// Send a keep-alive frame right after connecting
    pub keep_alive_on_connect: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_connect_retries: 3,
            retry_delay_ms: 500,
            service_uuid: protocol::SERVICE_UUID.to_string(),
            control_char_uuid: protocol::CONTROL_CHAR_UUID.to_string(),
            keep_alive_on_connect: true,
        }
    }
}

/// A connected Govee light, ready to accept control frames.
pub struct GoveeLight {
    peripheral: Peripheral,
    control: Characteristic,
    address: String,
}

impl GoveeLight {
    /// Connect to a peripheral and resolve its control characteristic.
    pub async fn connect(
        peripheral: Peripheral,
        config: &ConnectionConfig,
    ) -> Result<Self, ControlError> {
        let address = peripheral.address().to_string();
        info!(address = %address, "Connecting to Govee light");

        let attempts = config.max_connect_retries.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match peripheral.connect().await {
                Ok(()) => {
                    last_err = None;
                    break;
                }
                Err(e) => {
                    warn!(attempt, "Connect attempt failed: {}", e);
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
                    }
                }
            }
        }
        if let Some(last) = last_err {
            return Err(ControlError::ConnectFailed { attempts, last });
        }

        peripheral.discover_services().await?;

        let service_uuid = protocol::parse_uuid(&config.service_uuid)
            .map_err(|_| ControlError::BadUuid(config.service_uuid.clone()))?;
        let control_uuid = protocol::parse_uuid(&config.control_char_uuid)
            .map_err(|_| ControlError::BadUuid(config.control_char_uuid.clone()))?;

        let service = peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == service_uuid)
            .ok_or(ControlError::VendorServiceMissing(service_uuid))?;

        let control = service
            .characteristics
            .iter()
            .find(|c| c.uuid == control_uuid)
            .cloned()
            .ok_or(ControlError::ControlCharacteristicMissing(control_uuid))?;

        let light = Self {
            peripheral,
            control,
            address,
        };

        if config.keep_alive_on_connect {
            light.keep_alive().await?;
        }

        info!(address = %light.address, "Connected");
        Ok(light)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    pub async fn set_power(&self, on: bool) -> Result<(), ControlError> {
        self.write_request(LightRequest::Power { on }).await
    }

    pub async fn set_color(&self, color: Rgb) -> Result<(), ControlError> {
        self.write_request(LightRequest::Color(color)).await
    }

    /// Set brightness from a raw hardware level (see
    /// [`protocol::brightness_level`] for the percent mapping).
    pub async fn set_brightness(&self, level: u8) -> Result<(), ControlError> {
        self.write_request(LightRequest::Brightness(level)).await
    }

    pub async fn keep_alive(&self) -> Result<(), ControlError> {
        self.write_request(LightRequest::KeepAlive).await
    }

    async fn write_request(&self, request: LightRequest) -> Result<(), ControlError> {
        let frame = request.encode();
        debug!(address = %self.address, "TX {:02X?}", frame);
        self.peripheral
            .write(&self.control, &frame, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    /// Best-effort disconnect; failures are logged, not surfaced.
    pub async fn disconnect(&self) {
        if let Err(e) = self.peripheral.disconnect().await {
            debug!(address = %self.address, "Disconnect failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_read_as_full_sentences() {
        let err = ControlError::DeviceNotFound("AA:BB:CC:DD:EE:FF".to_string());
        assert_eq!(
            err.to_string(),
            "No device with address AA:BB:CC:DD:EE:FF in range; scan again and retry"
        );

        let err = ControlError::BadUuid("oops".to_string());
        assert_eq!(err.to_string(), "Invalid UUID in settings: oops");
    }

    #[test]
    fn default_config_targets_govee_uuids() {
        let config = ConnectionConfig::default();
        assert_eq!(config.service_uuid, protocol::SERVICE_UUID);
        assert_eq!(config.control_char_uuid, protocol::CONTROL_CHAR_UUID);
        assert_eq!(config.max_connect_retries, 3);
        assert!(config.keep_alive_on_connect);
    }
}
