use crate::domain::models::{MessageSeverity, StatusMessage};
use crate::presentation::app::GoveeApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut GoveeApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Global Settings");
    ui.add_space(20.0);

    let mut save_feedback = None;

    if let Ok(mut settings) = app.settings.lock() {
        let settings_mut = settings.get_mut();

        Components::brutalist_card(ui, "Scanning", |ui| {
            ui.horizontal(|ui| {
                ui.label("Name Prefix:");
                ui.text_edit_singleline(&mut settings_mut.device_name_prefix);
            });
            ui.horizontal(|ui| {
                ui.label("Scan Duration:");
                ui.add(
                    egui::Slider::new(&mut settings_mut.scan_duration_secs, 1..=30).suffix(" s"),
                );
            });
            ui.checkbox(
                &mut settings_mut.debug_show_all_devices,
                "Show all BLE devices (ignore name filter)",
            );
        });

        ui.add_space(10.0);

        Components::brutalist_card(ui, "Connection", |ui| {
            ui.horizontal(|ui| {
                ui.label("Connect Retries:");
                ui.add(egui::Slider::new(&mut settings_mut.connect_max_retries, 1..=10));
            });
            ui.horizontal(|ui| {
                ui.label("Retry Delay:");
                ui.add(
                    egui::Slider::new(&mut settings_mut.connect_retry_delay_ms, 100..=5000)
                        .suffix(" ms"),
                );
            });
            ui.checkbox(
                &mut settings_mut.keep_alive_on_connect,
                "Send keep-alive frame after connecting",
            );
        });

        ui.add_space(10.0);

        Components::brutalist_card(ui, "Bluetooth Protocol", |ui| {
            ui.collapsing("Override Service UUIDs", |ui| {
                ui.label(
                    egui::RichText::new("⚠️ Warning: Altering these may break light control.")
                        .color(egui::Color32::from_rgb(255, 200, 0)),
                );

                egui::Grid::new("ble_uuids")
                    .spacing([10.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Service:");
                        ui.text_edit_singleline(&mut settings_mut.ble_service_uuid);
                        ui.end_row();
                        ui.label("Control:");
                        ui.text_edit_singleline(&mut settings_mut.ble_control_char_uuid);
                        ui.end_row();
                    });
            });
        });

        ui.add_space(10.0);

        Components::brutalist_card(ui, "Logging & Debug", |ui| {
            ui.horizontal(|ui| {
                ui.label("Verbosity Level:");
                egui::ComboBox::from_id_salt("log_level")
                    .selected_text(&settings_mut.log_settings.level)
                    .show_ui(ui, |ui| {
                        for level in &["trace", "debug", "info", "warn", "error"] {
                            ui.selectable_value(
                                &mut settings_mut.log_settings.level,
                                level.to_string(),
                                *level,
                            );
                        }
                    });
            });

            ui.checkbox(
                &mut settings_mut.log_settings.console_logging_enabled,
                "Standard Console Logs",
            );
            ui.checkbox(
                &mut settings_mut.log_settings.file_logging_enabled,
                "Persistent File Logs",
            );

            if settings_mut.log_settings.file_logging_enabled {
                ui.indent("file_logs", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Save Path:");
                        ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                    });
                    ui.horizontal(|ui| {
                        ui.label("File Prefix:");
                        ui.text_edit_singleline(&mut settings_mut.log_settings.file_name_prefix);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Rotation:");
                        egui::ComboBox::from_id_salt("log_rot")
                            .selected_text(&settings_mut.log_settings.rotation)
                            .show_ui(ui, |ui| {
                                for rot in &["daily", "hourly", "never"] {
                                    ui.selectable_value(
                                        &mut settings_mut.log_settings.rotation,
                                        rot.to_string(),
                                        *rot,
                                    );
                                }
                            });
                    });
                });
                ui.label(
                    egui::RichText::new("Restart required for log changes.")
                        .italics()
                        .size(12.0),
                );
            }
        });

        ui.add_space(10.0);

        if ui.button("Save Settings").clicked() {
            save_feedback = Some(match settings.save() {
                Ok(()) => StatusMessage::new("Settings saved.", MessageSeverity::Success),
                Err(e) => StatusMessage::new(
                    format!("Failed to save settings: {}", e),
                    MessageSeverity::Error,
                ),
            });
        }
    }

    if save_feedback.is_some() {
        app.status_message = save_feedback;
    }
}
