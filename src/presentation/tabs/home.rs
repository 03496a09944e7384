use crate::domain::models::{
    BluetoothCommand, ConnectionStatus, MessageSeverity, Rgb, StatusMessage,
};
use crate::presentation::app::GoveeApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut GoveeApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Govee BLE Controller");
    ui.add_space(20.0);

    ui_device_panel(app, ui);
    ui.add_space(15.0);

    ui_control_panel(app, ui);
    ui.add_space(15.0);

    ui_status_panel(app, ui);
}

fn ui_device_panel(app: &mut GoveeApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Device Discovery", |ui| {
        // Status Banner (Adaptive)
        let (status_text, bg_color, text_color) = match app.connection_status {
            ConnectionStatus::Connected => (
                "CONNECTED",
                egui::Color32::from_rgb(0, 200, 0),
                egui::Color32::BLACK,
            ),
            ConnectionStatus::Connecting => (
                "CONNECTING...",
                egui::Color32::from_rgb(255, 200, 0),
                egui::Color32::BLACK,
            ),
            ConnectionStatus::Disconnected => (
                "DISCONNECTED",
                egui::Color32::from_gray(100),
                egui::Color32::WHITE,
            ),
            ConnectionStatus::Error => (
                "ERROR",
                egui::Color32::from_rgb(255, 50, 50),
                egui::Color32::WHITE,
            ),
        };

        Components::status_banner(ui, status_text, bg_color, text_color);

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if app.is_scanning {
                if ui.button("Stop Scan").clicked() {
                    app.is_scanning = false;
                    let _ = app.bluetooth_tx.send(BluetoothCommand::StopScan);
                }
                ui.spinner();
            } else if ui.button("Scan for Lights").clicked() {
                app.is_scanning = true;
                app.scanned_lights.clear();
                app.selected_address = None;
                app.status_message = Some(StatusMessage::new(
                    "Status: Scanning...",
                    MessageSeverity::Info,
                ));
                let _ = app.bluetooth_tx.send(BluetoothCommand::StartScan);
            }

            if app.connection_status == ConnectionStatus::Connected {
                if ui.button("Disconnect").clicked() {
                    let _ = app.bluetooth_tx.send(BluetoothCommand::Disconnect);
                }
            }
        });

        if !app.scanned_lights.is_empty() {
            ui.separator();
            ui.label("Nearby Lights:");
            egui::ScrollArea::vertical()
                .id_salt("scan_results")
                .max_height(140.0)
                .show(ui, |ui| {
                    for light in &app.scanned_lights {
                        let selected =
                            app.selected_address.as_deref() == Some(light.address.as_str());
                        ui.horizontal(|ui| {
                            if ui.selectable_label(selected, light.label()).clicked() {
                                app.selected_address = Some(light.address.clone());
                            }
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    ui.weak(light.rssi_label());
                                },
                            );
                        });
                    }
                });
        }
    });
}

fn ui_control_panel(app: &mut GoveeApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Light Control", |ui| {
        ui.horizontal(|ui| {
            if ui.button("Turn ON").clicked() {
                send_power(app, true);
            }
            if ui.button("Turn OFF").clicked() {
                send_power(app, false);
            }
        });

        ui.separator();
        Components::sub_heading(ui, "Color & Brightness");

        ui.horizontal(|ui| {
            ui.label("Color:");
            ui.color_edit_button_srgb(&mut app.picked_color);
            if ui.button("Set Color").clicked() {
                send_color(app);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Brightness:");
            ui.add(egui::Slider::new(&mut app.brightness_percent, 0..=100).suffix("%"));
            if ui.button("Set Brightness").clicked() {
                send_brightness(app);
            }
        });
    });
}

fn ui_status_panel(app: &mut GoveeApp, ui: &mut egui::Ui) {
    let current_msg = app.status_message.clone();
    if let Some(msg) = current_msg {
        Components::brutalist_card(ui, "System Status", |ui| {
            let color = match msg.severity {
                MessageSeverity::Info => egui::Color32::from_rgb(0, 120, 255),
                MessageSeverity::Success => egui::Color32::from_rgb(0, 150, 0),
                MessageSeverity::Warning => egui::Color32::from_rgb(200, 150, 0),
                MessageSeverity::Error => egui::Color32::RED,
            };

            ui.label(egui::RichText::new(&msg.message).color(color).strong());
        });
    }
}

/// All control buttons refuse to fire without a selection.
fn selected_address(app: &mut GoveeApp) -> Option<String> {
    match require_selection(app.selected_address.as_deref()) {
        Ok(address) => Some(address),
        Err(warning) => {
            app.status_message = Some(warning);
            None
        }
    }
}

fn require_selection(selected: Option<&str>) -> Result<String, StatusMessage> {
    match selected {
        Some(address) => Ok(address.to_string()),
        None => Err(StatusMessage::new(
            "Please select a device first.",
            MessageSeverity::Warning,
        )),
    }
}

fn send_power(app: &mut GoveeApp, on: bool) {
    let Some(address) = selected_address(app) else {
        return;
    };
    app.last_target_address = Some(address.clone());
    app.status_message = Some(StatusMessage::new(
        if on { "Turning ON..." } else { "Turning OFF..." },
        MessageSeverity::Info,
    ));
    let _ = app
        .bluetooth_tx
        .send(BluetoothCommand::SetPower { address, on });
}

fn send_color(app: &mut GoveeApp) {
    let Some(address) = selected_address(app) else {
        return;
    };
    let color = Rgb::from_array(app.picked_color);
    if let Ok(mut settings) = app.settings.lock() {
        let _ = settings.remember_color(color);
    }
    app.last_target_address = Some(address.clone());
    app.status_message = Some(StatusMessage::new(
        format!("Setting color to {}...", color),
        MessageSeverity::Info,
    ));
    let _ = app
        .bluetooth_tx
        .send(BluetoothCommand::SetColor { address, color });
}

fn send_brightness(app: &mut GoveeApp) {
    let Some(address) = selected_address(app) else {
        return;
    };
    let percent = app.brightness_percent;
    if let Ok(mut settings) = app.settings.lock() {
        let _ = settings.remember_brightness(percent);
    }
    app.last_target_address = Some(address.clone());
    app.status_message = Some(StatusMessage::new(
        format!("Setting brightness to {}%...", percent),
        MessageSeverity::Info,
    ));
    let _ = app
        .bluetooth_tx
        .send(BluetoothCommand::SetBrightness { address, percent });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selection_yields_the_warning() {
        let warning = require_selection(None).unwrap_err();
        assert_eq!(warning.message, "Please select a device first.");
        assert_eq!(warning.severity, MessageSeverity::Warning);
    }

    #[test]
    fn selection_passes_through() {
        let address = require_selection(Some("A4:C1:38:12:34:56")).unwrap();
        assert_eq!(address, "A4:C1:38:12:34:56");
    }
}
