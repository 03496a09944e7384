use crate::domain::models::{BluetoothCommand, ConnectionStatus, MessageSeverity, StatusMessage};
use crate::presentation::app::GoveeApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut GoveeApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Debug & Internal State");
    ui.add_space(20.0);

    Components::brutalist_card(ui, "Bluetooth Engine Status", |ui| {
        ui.horizontal(|ui| {
            ui.label("State:");
            let (text, color) = match app.connection_status {
                ConnectionStatus::Connected => ("LINKED", egui::Color32::from_rgb(0, 255, 100)),
                ConnectionStatus::Disconnected => ("IDLE", egui::Color32::from_gray(150)),
                ConnectionStatus::Error => ("FAULTED", egui::Color32::from_rgb(255, 80, 80)),
                ConnectionStatus::Connecting => {
                    ("TRANSITIONING", egui::Color32::from_rgb(255, 200, 0))
                }
            };
            ui.label(egui::RichText::new(text).color(color).strong());
        });

        let endpoint = app
            .selected_address
            .as_deref()
            .or(app.last_target_address.as_deref());
        if let Some(address) = endpoint {
            ui.label(format!("Endpoint: {}", address));
        }
        ui.label(format!("Scan active: {}", app.is_scanning));
        ui.label(format!("Lights in list: {}", app.scanned_lights.len()));
    });

    ui.add_space(10.0);

    if !app.command_log.is_empty() {
        Components::brutalist_card(ui, "Recent Commands", |ui| {
            egui::Grid::new("command_log_grid")
                .spacing([20.0, 5.0])
                .show(ui, |ui| {
                    for outcome in &app.command_log {
                        ui.label(outcome.action.label());
                        ui.label(&outcome.address);
                        if outcome.success {
                            ui.label(
                                egui::RichText::new("OK")
                                    .color(egui::Color32::from_rgb(0, 255, 100)),
                            );
                        } else {
                            ui.label(
                                egui::RichText::new("FAIL")
                                    .color(egui::Color32::from_rgb(255, 80, 80)),
                            );
                        }
                        ui.label(&outcome.detail);
                        ui.end_row();
                    }
                });
        });

        ui.add_space(10.0);
    }

    Components::brutalist_card(ui, "Protocol Test", |ui| {
        ui.label("Sends a keep-alive frame to the selected light.");
        if ui.button("Send Keep-Alive").clicked() {
            if let Some(address) = app.selected_address.clone() {
                app.last_target_address = Some(address.clone());
                let _ = app
                    .bluetooth_tx
                    .send(BluetoothCommand::SendKeepAlive { address });
            } else {
                app.status_message = Some(StatusMessage::new(
                    "Please select a device first.",
                    MessageSeverity::Warning,
                ));
            }
        }
    });
}
