//! Light Service Module
//!
//! Main service coordinating scanning, connection, and command dispatch for
//! Govee lights. Lives on the Bluetooth worker thread; everything the UI
//! needs to know travels back as an [`AppEvent`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::models::{
    AppEvent, CommandOutcome, ConnectionStatus, LightAction, MessageSeverity, Rgb, StatusMessage,
};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::connection::{ConnectionConfig, ControlError, GoveeLight};
use crate::infrastructure::bluetooth::protocol;
use crate::infrastructure::bluetooth::scanner::{LightScanner, ScanConfig};

/// Discovery window used when a command targets an address the adapter no
/// longer has cached (e.g. after the app restarted without a fresh scan).
const RESOLVE_RESCAN_WINDOW: Duration = Duration::from_secs(3);

/// Main Bluetooth service coordinating all BLE operations
pub struct LightService {
    adapter: Option<Adapter>,
    scanner: LightScanner,
    light: Option<GoveeLight>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    settings: Arc<Mutex<SettingsService>>,
}

impl LightService {
    pub fn new(
        event_sender: mpsc::UnboundedSender<AppEvent>,
        settings: Arc<Mutex<SettingsService>>,
    ) -> Self {
        Self {
            adapter: None,
            scanner: LightScanner::new(event_sender.clone()),
            light: None,
            event_sender,
            settings,
        }
    }

    /// First adapter on the system, opened lazily and cached.
    async fn adapter(&mut self) -> Result<Adapter, ControlError> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }

        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(ControlError::NoAdapter)?;
        if let Ok(banner) = adapter.adapter_info().await {
            info!(adapter = %banner, "Using Bluetooth adapter");
        }

        self.adapter = Some(adapter.clone());
        Ok(adapter)
    }

    /// Start scanning for lights
    pub async fn start_scan(&mut self) -> anyhow::Result<()> {
        let config = {
            let settings = self
                .settings
                .lock()
                .map_err(|_| anyhow::anyhow!("Lock error"))?;
            let s = settings.get();
            ScanConfig {
                name_prefix: s.device_name_prefix.clone(),
                duration: Duration::from_secs(s.scan_duration_secs),
                show_all_devices: s.debug_show_all_devices,
            }
        };

        let adapter = self.adapter().await?;
        self.scanner.start(adapter, config).await
    }

    /// Stop scanning
    pub async fn stop_scan(&mut self) -> anyhow::Result<()> {
        self.scanner.stop().await
    }

    pub async fn set_power(&mut self, address: &str, on: bool) -> CommandOutcome {
        let action = if on {
            LightAction::PowerOn
        } else {
            LightAction::PowerOff
        };
        if let Err(e) = self.ensure_connected(address).await {
            return self.command_failed(action, address, e).await;
        }
        let result = match self.light.as_ref() {
            Some(light) => light.set_power(on).await,
            None => Err(ControlError::DeviceNotFound(address.to_string())),
        };
        match result {
            Ok(()) => {
                info!(address, on, "Power command sent");
                CommandOutcome::ok(action, address, format!("sent to {}", address))
            }
            Err(e) => self.command_failed(action, address, e).await,
        }
    }

    pub async fn set_color(&mut self, address: &str, color: Rgb) -> CommandOutcome {
        let action = LightAction::SetColor;
        if let Err(e) = self.ensure_connected(address).await {
            return self.command_failed(action, address, e).await;
        }
        let result = match self.light.as_ref() {
            Some(light) => light.set_color(color).await,
            None => Err(ControlError::DeviceNotFound(address.to_string())),
        };
        match result {
            Ok(()) => {
                info!(address, color = %color, "Color command sent");
                CommandOutcome::ok(action, address, format!("{} sent to {}", color, address))
            }
            Err(e) => self.command_failed(action, address, e).await,
        }
    }

    pub async fn set_brightness(&mut self, address: &str, percent: u8) -> CommandOutcome {
        let action = LightAction::SetBrightness;
        if let Err(e) = self.ensure_connected(address).await {
            return self.command_failed(action, address, e).await;
        }
        let level = protocol::brightness_level(percent);
        let result = match self.light.as_ref() {
            Some(light) => light.set_brightness(level).await,
            None => Err(ControlError::DeviceNotFound(address.to_string())),
        };
        match result {
            Ok(()) => {
                info!(address, percent, "Brightness command sent");
                CommandOutcome::ok(action, address, format!("{}% sent to {}", percent, address))
            }
            Err(e) => self.command_failed(action, address, e).await,
        }
    }

    pub async fn send_keep_alive(&mut self, address: &str) -> CommandOutcome {
        let action = LightAction::KeepAlive;
        if let Err(e) = self.ensure_connected(address).await {
            return self.command_failed(action, address, e).await;
        }
        let result = match self.light.as_ref() {
            Some(light) => light.keep_alive().await,
            None => Err(ControlError::DeviceNotFound(address.to_string())),
        };
        match result {
            Ok(()) => CommandOutcome::ok(action, address, format!("ping sent to {}", address)),
            Err(e) => self.command_failed(action, address, e).await,
        }
    }

    /// Disconnect from the current light
    pub async fn disconnect(&mut self) {
        if self.light.is_none() {
            return;
        }
        self.drop_connection().await;

        info!("Disconnected from device");
        self.send_log("Disconnected from device", MessageSeverity::Info);
        self.send_status(ConnectionStatus::Disconnected);
    }

    /// Reuse the held connection when the target hasn't changed; otherwise
    /// tear it down and connect fresh. On success `self.light` is `Some`.
    async fn ensure_connected(&mut self, address: &str) -> Result<(), ControlError> {
        // Commands interrupt a scan in progress; the adapter stays free.
        if self.scanner.is_scanning() {
            if let Err(e) = self.scanner.stop().await {
                warn!("Failed to stop scan before connecting: {}", e);
            }
        }

        if let Some(light) = &self.light {
            if light.address().eq_ignore_ascii_case(address) && light.is_connected().await {
                return Ok(());
            }
        }
        self.drop_connection().await;

        self.send_status(ConnectionStatus::Connecting);
        self.send_log(&format!("Connecting to {}...", address), MessageSeverity::Info);

        let peripheral = self.resolve(address).await?;
        let config = self.connection_config();

        let light = GoveeLight::connect(peripheral, &config).await?;
        self.light = Some(light);
        self.send_status(ConnectionStatus::Connected);
        Ok(())
    }

    /// Look the address up in the adapter's peripheral cache, rescanning
    /// briefly if it isn't there.
    async fn resolve(&mut self, address: &str) -> Result<Peripheral, ControlError> {
        let adapter = self.adapter().await?;

        if let Some(peripheral) = Self::find_by_address(&adapter, address).await? {
            return Ok(peripheral);
        }

        info!(address, "Address not cached, opening a short discovery window");
        adapter.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(RESOLVE_RESCAN_WINDOW).await;
        if let Err(e) = adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        Self::find_by_address(&adapter, address)
            .await?
            .ok_or_else(|| ControlError::DeviceNotFound(address.to_string()))
    }

    async fn find_by_address(
        adapter: &Adapter,
        address: &str,
    ) -> Result<Option<Peripheral>, ControlError> {
        for peripheral in adapter.peripherals().await? {
            if peripheral
                .address()
                .to_string()
                .eq_ignore_ascii_case(address)
            {
                return Ok(Some(peripheral));
            }
        }
        Ok(None)
    }

    /// Every failure ends in a terminal `Error` status, whether or not a
    /// connection ever existed; a held connection is dropped so the next
    /// command reconnects instead of writing into the void.
    async fn command_failed(
        &mut self,
        action: LightAction,
        address: &str,
        err: ControlError,
    ) -> CommandOutcome {
        warn!(address, action = action.label(), "Command failed: {}", err);
        self.drop_connection().await;
        self.send_status(ConnectionStatus::Error);
        CommandOutcome::failed(action, address, err.to_string())
    }

    async fn drop_connection(&mut self) {
        if let Some(light) = self.light.take() {
            light.disconnect().await;
        }
    }

    fn connection_config(&self) -> ConnectionConfig {
        let Ok(settings) = self.settings.lock() else {
            warn!("Settings lock poisoned, using default connection config");
            return ConnectionConfig::default();
        };
        let s = settings.get();
        ConnectionConfig {
            max_connect_retries: s.connect_max_retries,
            retry_delay_ms: s.connect_retry_delay_ms,
            service_uuid: s.ble_service_uuid.clone(),
            control_char_uuid: s.ble_control_char_uuid.clone(),
            keep_alive_on_connect: s.keep_alive_on_connect,
        }
    }

    fn send_status(&self, status: ConnectionStatus) {
        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(status));
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage::new(message, severity)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A command that fails before any connection exists must still land the
    // UI in a terminal status, never a dangling `Connecting`. Exercises the
    // no-adapter / unknown-address path, which needs no real light.
    #[tokio::test]
    async fn failed_command_ends_in_error_status() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let settings = Arc::new(Mutex::new(SettingsService::for_tests()));
        let mut service = LightService::new(tx, settings);

        let outcome = service.set_power("00:00:00:00:00:00", true).await;
        assert!(!outcome.success);

        let mut last_status = None;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::ConnectionStatus(status) = event {
                last_status = Some(status);
            }
        }
        assert_eq!(last_status, Some(ConnectionStatus::Error));
    }
}
