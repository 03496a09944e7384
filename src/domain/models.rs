use serde::{Deserialize, Serialize};

/// An RGB color as the light renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// egui's color widgets work on `[u8; 3]`.
    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A peripheral seen during the most recent scan.
#[derive(Debug, Clone)]
pub struct ScannedLight {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
}

impl ScannedLight {
    /// List-row label, `Name [AA:BB:CC:DD:EE:FF]`.
    pub fn label(&self) -> String {
        format!("{} [{}]", self.name, self.address)
    }

    pub fn rssi_label(&self) -> String {
        match self.rssi {
            Some(rssi) => format!("{} dBm", rssi),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// What the user asked the light to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAction {
    PowerOn,
    PowerOff,
    SetColor,
    SetBrightness,
    KeepAlive,
}

impl LightAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PowerOn => "Turn On",
            Self::PowerOff => "Turn Off",
            Self::SetColor => "Set Color",
            Self::SetBrightness => "Set Brightness",
            Self::KeepAlive => "Keep-Alive",
        }
    }
}

/// Result of one device command, reported back to the UI.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub action: LightAction,
    pub address: String,
    pub success: bool,
    pub detail: String,
}

impl CommandOutcome {
    pub fn ok(action: LightAction, address: &str, detail: impl Into<String>) -> Self {
        Self {
            action,
            address: address.to_string(),
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(action: LightAction, address: &str, detail: impl Into<String>) -> Self {
        Self {
            action,
            address: address.to_string(),
            success: false,
            detail: detail.into(),
        }
    }

    /// Status-line rendition, e.g. `Turn On: sent to A4:C1:38:12:34:56`.
    pub fn status_message(&self) -> StatusMessage {
        StatusMessage {
            message: format!("{}: {}", self.action.label(), self.detail),
            severity: if self.success {
                MessageSeverity::Success
            } else {
                MessageSeverity::Error
            },
        }
    }
}

/// Commands sent from the UI to the Bluetooth worker.
#[derive(Debug, Clone)]
pub enum BluetoothCommand {
    StartScan,
    StopScan,
    SetPower { address: String, on: bool },
    SetColor { address: String, color: Rgb },
    SetBrightness { address: String, percent: u8 },
    SendKeepAlive { address: String },
    Disconnect,
}

/// Events marshaled from the Bluetooth worker back to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    DeviceFound(ScannedLight),
    ScanFinished,
    ConnectionStatus(ConnectionStatus),
    CommandResult(CommandOutcome),
    LogMessage(StatusMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Settings,
    Debug,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_array_round_trip() {
        let color = Rgb::new(0x12, 0xAB, 0xFF);
        assert_eq!(Rgb::from_array(color.to_array()), color);
    }

    #[test]
    fn rgb_displays_as_hex() {
        assert_eq!(Rgb::new(255, 0, 127).to_string(), "#FF007F");
        assert_eq!(Rgb::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn scanned_light_label_matches_list_format() {
        let light = ScannedLight {
            name: "GBK_H6113".to_string(),
            address: "A4:C1:38:12:34:56".to_string(),
            rssi: Some(-60),
        };
        assert_eq!(light.label(), "GBK_H6113 [A4:C1:38:12:34:56]");
        assert_eq!(light.rssi_label(), "-60 dBm");

        let nameless = ScannedLight {
            rssi: None,
            ..light
        };
        assert_eq!(nameless.rssi_label(), "N/A");
    }

    #[test]
    fn outcome_carries_the_target_address() {
        // The Debug tab's command history shows the address per row, so
        // both constructors must record it.
        let ok = CommandOutcome::ok(LightAction::PowerOn, "AA:BB", "sent to AA:BB");
        assert_eq!(ok.address, "AA:BB");

        let err = CommandOutcome::failed(LightAction::KeepAlive, "11:22", "out of reach");
        assert_eq!(err.address, "11:22");
    }

    #[test]
    fn outcome_status_message_reflects_detail_and_severity() {
        let ok = CommandOutcome::ok(LightAction::PowerOn, "AA:BB", "sent to AA:BB");
        let msg = ok.status_message();
        assert_eq!(msg.message, "Turn On: sent to AA:BB");
        assert_eq!(msg.severity, MessageSeverity::Success);

        let err = CommandOutcome::failed(LightAction::SetColor, "AA:BB", "no device in reach");
        let msg = err.status_message();
        assert_eq!(msg.message, "Set Color: no device in reach");
        assert_eq!(msg.severity, MessageSeverity::Error);
    }
}
