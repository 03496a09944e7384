mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_title("Govee BLE Controller"),
        ..Default::default()
    };

    eframe::run_native(
        "Govee BLE Controller",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::GoveeApp::new(cc)))),
    )
}
