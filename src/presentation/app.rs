use crate::domain::models::{
    AppEvent, BluetoothCommand, CommandOutcome, ConnectionStatus, MessageSeverity, ScannedLight,
    StatusMessage, Tab,
};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::LightService;
use eframe::egui;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::error;

/// Rows kept in the Debug tab's command history.
const COMMAND_LOG_CAP: usize = 32;

pub struct GoveeApp {
    // Services
    pub(crate) settings: Arc<Mutex<SettingsService>>,

    // Bluetooth
    pub(crate) bluetooth_tx: mpsc::UnboundedSender<BluetoothCommand>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    pub(crate) connection_status: ConnectionStatus,
    pub(crate) status_message: Option<StatusMessage>,

    // UI State
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,

    // Scanning
    pub(crate) is_scanning: bool,
    pub(crate) scanned_lights: Vec<ScannedLight>,
    pub(crate) selected_address: Option<String>,

    // Control inputs
    pub(crate) picked_color: [u8; 3],
    pub(crate) brightness_percent: u8,

    // Command history for the Debug tab
    pub(crate) command_log: VecDeque<CommandOutcome>,

    // Address the most recent command targeted; persisted once a
    // connection to it succeeds.
    pub(crate) last_target_address: Option<String>,

    // Logging guard
    pub(crate) _logging_guard: Option<crate::infrastructure::logging::LoggingGuard>,
}

impl GoveeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Apply Neubrutalism Style (default Light)
        crate::presentation::theme::configure_neubrutalism(&cc.egui_ctx, false);

        let settings_service = SettingsService::new().expect("Failed to load settings");

        let logging_guard =
            crate::infrastructure::logging::init_logger(&settings_service.get().log_settings)
                .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
                .ok();

        tracing::info!("Starting Govee BLE Controller");

        let settings = Arc::new(Mutex::new(settings_service));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (bt_cmd_tx, mut bt_cmd_rx) = mpsc::unbounded_channel();
        let bt_settings = settings.clone();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime for Bluetooth");

            rt.block_on(async move {
                let tx = event_tx.clone();
                let mut service = LightService::new(event_tx, bt_settings);

                while let Some(cmd) = bt_cmd_rx.recv().await {
                    match cmd {
                        BluetoothCommand::StartScan => {
                            if let Err(e) = service.start_scan().await {
                                error!("Failed to start scan: {}", e);
                                let _ = tx.send(AppEvent::LogMessage(StatusMessage::new(
                                    format!("Scan failed: {}", e),
                                    MessageSeverity::Error,
                                )));
                                let _ = tx.send(AppEvent::ScanFinished);
                            }
                        }
                        BluetoothCommand::StopScan => {
                            if let Err(e) = service.stop_scan().await {
                                error!("Failed to stop scan: {}", e);
                            }
                        }
                        BluetoothCommand::SetPower { address, on } => {
                            let outcome = service.set_power(&address, on).await;
                            let _ = tx.send(AppEvent::CommandResult(outcome));
                        }
                        BluetoothCommand::SetColor { address, color } => {
                            let outcome = service.set_color(&address, color).await;
                            let _ = tx.send(AppEvent::CommandResult(outcome));
                        }
                        BluetoothCommand::SetBrightness { address, percent } => {
                            let outcome = service.set_brightness(&address, percent).await;
                            let _ = tx.send(AppEvent::CommandResult(outcome));
                        }
                        BluetoothCommand::SendKeepAlive { address } => {
                            let outcome = service.send_keep_alive(&address).await;
                            let _ = tx.send(AppEvent::CommandResult(outcome));
                        }
                        BluetoothCommand::Disconnect => {
                            service.disconnect().await;
                        }
                    }
                }
            });
        });

        let (picked_color, brightness_percent, last_target_address) = {
            let guard = settings.lock().unwrap();
            let s = guard.get();
            (
                s.last_color.to_array(),
                s.last_brightness_percent,
                s.last_connected_address.clone(),
            )
        };

        Self {
            settings,
            bluetooth_tx: bt_cmd_tx,
            event_rx,
            connection_status: ConnectionStatus::Disconnected,
            status_message: None,
            selected_tab: Tab::Home,
            is_dark_mode: false,
            is_scanning: false,
            scanned_lights: Vec::new(),
            selected_address: None,
            picked_color,
            brightness_percent,
            command_log: VecDeque::new(),
            last_target_address,
            _logging_guard: logging_guard,
        }
    }
}

impl eframe::App for GoveeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::DeviceFound(light) => {
                    upsert_light(&mut self.scanned_lights, light);
                }
                AppEvent::ScanFinished => {
                    self.is_scanning = false;

                    // An error reported during the scan stays on screen instead
                    // of being replaced by the completion summary.
                    let should_update_msg = self
                        .status_message
                        .as_ref()
                        .map_or(true, |m| m.severity != MessageSeverity::Error);

                    if should_update_msg {
                        self.status_message = if self.scanned_lights.is_empty() {
                            Some(StatusMessage::new(
                                "No Govee devices found.",
                                MessageSeverity::Warning,
                            ))
                        } else {
                            Some(StatusMessage::new(
                                format!(
                                    "Status: Scan Complete - {} device(s) found",
                                    self.scanned_lights.len()
                                ),
                                MessageSeverity::Success,
                            ))
                        };
                    }
                }
                AppEvent::ConnectionStatus(status) => {
                    self.connection_status = status;
                    if status == ConnectionStatus::Connected {
                        if let Some(address) = self.last_target_address.clone() {
                            if let Ok(mut settings) = self.settings.lock() {
                                let _ = settings.add_known_address(&address);
                            }
                        }
                    }
                }
                AppEvent::CommandResult(outcome) => {
                    self.status_message = Some(outcome.status_message());
                    self.command_log.push_front(outcome);
                    self.command_log.truncate(COMMAND_LOG_CAP);
                }
                AppEvent::LogMessage(msg) => {
                    self.status_message = Some(msg);
                }
            }
        }

        ctx.request_repaint();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Home, "Home");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");
                ui.selectable_value(&mut self.selected_tab, Tab::Debug, "Debug");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        crate::presentation::theme::configure_neubrutalism(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(440.0);
                    ui.add_space(20.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Home => tabs::home::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                        Tab::Debug => tabs::debug::render(self, ui),
                    }

                    ui.add_space(40.0);
                });
            });
        });
    }
}

/// Merge a discovery report into the list: repeat sightings refresh signal
/// strength in place instead of growing the list.
fn upsert_light(lights: &mut Vec<ScannedLight>, light: ScannedLight) {
    if let Some(existing) = lights.iter_mut().find(|l| l.address == light.address) {
        existing.rssi = light.rssi;
        // A late advertisement can fill in a name we missed at first sight.
        if light.name != "Unknown" {
            existing.name = light.name;
        }
    } else {
        lights.push(light);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(name: &str, address: &str, rssi: Option<i16>) -> ScannedLight {
        ScannedLight {
            name: name.to_string(),
            address: address.to_string(),
            rssi,
        }
    }

    #[test]
    fn new_addresses_append() {
        let mut lights = vec![light("GBK_H6113_A1B2", "AA:BB:CC:DD:EE:FF", Some(-40))];
        upsert_light(&mut lights, light("GBK_H6159_C3D4", "11:22:33:44:55:66", Some(-60)));
        assert_eq!(lights.len(), 2);
    }

    #[test]
    fn repeat_sightings_update_in_place() {
        let mut lights = vec![light("GBK_H6113_A1B2", "AA:BB:CC:DD:EE:FF", Some(-40))];
        upsert_light(&mut lights, light("GBK_H6113_A1B2", "AA:BB:CC:DD:EE:FF", Some(-55)));
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].rssi, Some(-55));
    }

    #[test]
    fn late_names_replace_unknown() {
        let mut lights = vec![light("Unknown", "AA:BB:CC:DD:EE:FF", None)];
        upsert_light(&mut lights, light("GBK_H6113_A1B2", "AA:BB:CC:DD:EE:FF", Some(-50)));
        assert_eq!(lights[0].name, "GBK_H6113_A1B2");

        upsert_light(&mut lights, light("Unknown", "AA:BB:CC:DD:EE:FF", Some(-52)));
        assert_eq!(lights[0].name, "GBK_H6113_A1B2");
        assert_eq!(lights[0].rssi, Some(-52));
    }
}
