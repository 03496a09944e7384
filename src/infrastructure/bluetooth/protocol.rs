//! Govee BLE control protocol.
//!
//! Govee's family of BLE lights (H6001, H6113, H6159, ...) exposes a vendor
//! service with a single writable "control" characteristic. Every command is
//! a fixed 20-byte frame:
//!
//! ```text
//! byte 0      header   (0x33 = command, 0xAA = keep-alive)
//! byte 1      opcode   (0x01 power, 0x04 brightness, 0x05 color)
//! bytes 2..   payload, zero padded
//! byte 19     XOR of bytes 0..19
//! ```
//!
//! The frame layout comes from public reverse engineering of the Govee Home
//! app's BLE traffic; the lights accept writes without response.

use uuid::Uuid;

use crate::domain::models::Rgb;

/// Vendor service advertised by Govee lights.
pub const SERVICE_UUID: &str = "00010203-0405-0607-0809-0a0b0c0d1910";

/// Writable control characteristic inside [`SERVICE_UUID`].
pub const CONTROL_CHAR_UUID: &str = "00010203-0405-0607-0809-0a0b0c0d2b11";

/// Every Govee control frame is exactly this long.
pub const FRAME_SIZE: usize = 20;

const HEADER_COMMAND: u8 = 0x33;
const HEADER_KEEP_ALIVE: u8 = 0xAA;

const OP_POWER: u8 = 0x01;
const OP_BRIGHTNESS: u8 = 0x04;
const OP_COLOR: u8 = 0x05;

/// Color opcode sub-mode selecting manual RGB (as opposed to scenes/music).
const COLOR_MODE_MANUAL: u8 = 0x02;

/// A single command for the light, before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRequest {
    Power { on: bool },
    Color(Rgb),
    /// Raw hardware level, 0x00..=0xFF. See [`brightness_level`].
    Brightness(u8),
    KeepAlive,
}

impl LightRequest {
    /// Encode into the 20-byte wire frame, checksum included.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        match *self {
            LightRequest::Power { on } => {
                frame[0] = HEADER_COMMAND;
                frame[1] = OP_POWER;
                frame[2] = if on { 0x01 } else { 0x00 };
            }
            LightRequest::Color(color) => {
                frame[0] = HEADER_COMMAND;
                frame[1] = OP_COLOR;
                frame[2] = COLOR_MODE_MANUAL;
                frame[3] = color.r;
                frame[4] = color.g;
                frame[5] = color.b;
            }
            LightRequest::Brightness(level) => {
                frame[0] = HEADER_COMMAND;
                frame[1] = OP_BRIGHTNESS;
                frame[2] = level;
            }
            LightRequest::KeepAlive => {
                frame[0] = HEADER_KEEP_ALIVE;
                frame[1] = 0x01;
            }
        }
        frame[FRAME_SIZE - 1] = xor_checksum(&frame[..FRAME_SIZE - 1]);
        frame
    }
}

/// XOR of all bytes; the lights reject frames whose final byte doesn't match.
fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Map a user-facing percentage (0..=100) onto the hardware's 0x00..=0xFF
/// brightness range. Values above 100 clamp.
pub fn brightness_level(percent: u8) -> u8 {
    let percent = percent.min(100) as u16;
    (percent * 0xFF / 100) as u8
}

pub fn parse_uuid(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|e| anyhow::anyhow!("Invalid UUID '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_frame() {
        let frame = LightRequest::Power { on: true }.encode();
        assert_eq!(frame[0], 0x33);
        assert_eq!(frame[1], 0x01);
        assert_eq!(frame[2], 0x01);
        assert!(frame[3..19].iter().all(|&b| b == 0));
        assert_eq!(frame[19], 0x33); // 0x33 ^ 0x01 ^ 0x01
    }

    #[test]
    fn power_off_frame() {
        let frame = LightRequest::Power { on: false }.encode();
        assert_eq!(frame[2], 0x00);
        assert_eq!(frame[19], 0x32); // 0x33 ^ 0x01
    }

    #[test]
    fn color_frame_carries_manual_mode_and_rgb() {
        let frame = LightRequest::Color(Rgb::new(0x12, 0x34, 0x56)).encode();
        assert_eq!(&frame[..6], &[0x33, 0x05, 0x02, 0x12, 0x34, 0x56]);
        assert!(frame[6..19].iter().all(|&b| b == 0));
    }

    #[test]
    fn keep_alive_frame() {
        let frame = LightRequest::KeepAlive.encode();
        assert_eq!(frame[0], 0xAA);
        assert_eq!(frame[1], 0x01);
        assert_eq!(frame[19], 0xAB);
    }

    #[test]
    fn every_frame_xors_to_zero() {
        let requests = [
            LightRequest::Power { on: true },
            LightRequest::Power { on: false },
            LightRequest::Color(Rgb::new(255, 0, 128)),
            LightRequest::Brightness(0x7F),
            LightRequest::KeepAlive,
        ];
        for request in requests {
            let frame = request.encode();
            assert_eq!(frame.iter().fold(0u8, |acc, b| acc ^ b), 0);
        }
    }

    #[test]
    fn brightness_level_scales_and_clamps() {
        assert_eq!(brightness_level(0), 0x00);
        assert_eq!(brightness_level(100), 0xFF);
        assert_eq!(brightness_level(50), 0x7F);
        assert_eq!(brightness_level(200), 0xFF);
    }

    #[test]
    fn well_known_uuids_parse() {
        assert!(parse_uuid(SERVICE_UUID).is_ok());
        assert!(parse_uuid(CONTROL_CHAR_UUID).is_ok());
        assert!(parse_uuid("not-a-uuid").is_err());
    }
}
