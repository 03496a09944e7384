//! BLE Scanner Module
//!
//! Handles Bluetooth LE device discovery for Govee lights. Discovery runs
//! as a spawned task with a fixed time window; every matching advertisement
//! is forwarded to the UI as it arrives.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use btleplug::api::{Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::Adapter;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::models::{AppEvent, MessageSeverity, ScannedLight, StatusMessage};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Advertised names must start with this to be reported.
    pub name_prefix: String,
    pub duration: Duration,
    /// Report every device regardless of name (debug aid).
    pub show_all_devices: bool,
}

/// BLE scanner for discovering Govee lights
pub struct LightScanner {
    scan: Option<(Adapter, JoinHandle<()>)>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl LightScanner {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            scan: None,
            event_sender,
        }
    }

    /// Start a time-boxed scan on the given adapter.
    ///
    /// Any scan already in flight is stopped first. Matching devices are
    /// delivered as [`AppEvent::DeviceFound`]; the window closing (or
    /// [`stop`](Self::stop)) delivers [`AppEvent::ScanFinished`].
    pub async fn start(&mut self, adapter: Adapter, config: ScanConfig) -> Result<()> {
        self.stop().await?;

        info!(
            prefix = %config.name_prefix,
            duration_secs = config.duration.as_secs(),
            "Starting BLE scan"
        );
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::new(
            "Scanning for Govee lights...",
            MessageSeverity::Info,
        )));

        // Subscribe before starting the scan so early advertisements aren't
        // missed.
        let mut events = adapter.events().await?;
        adapter.start_scan(ScanFilter::default()).await?;

        let sender = self.event_sender.clone();
        let scan_adapter = adapter.clone();
        let task = tokio::spawn(async move {
            let mut seen: HashSet<String> = HashSet::new();
            let deadline = tokio::time::sleep(config.duration);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    event = events.next() => {
                        let Some(event) = event else { break };
                        let id = match event {
                            CentralEvent::DeviceDiscovered(id)
                            | CentralEvent::DeviceUpdated(id) => id,
                            _ => continue,
                        };
                        let Ok(peripheral) = scan_adapter.peripheral(&id).await else {
                            continue;
                        };
                        let Ok(Some(props)) = peripheral.properties().await else {
                            continue;
                        };

                        let name = props.local_name.unwrap_or_default();
                        if !config.show_all_devices
                            && !matches_prefix(&name, &config.name_prefix)
                        {
                            continue;
                        }

                        let address = peripheral.address().to_string();
                        seen.insert(address.clone());
                        let _ = sender.send(AppEvent::DeviceFound(ScannedLight {
                            name: if name.is_empty() {
                                "Unknown".to_string()
                            } else {
                                name
                            },
                            address,
                            rssi: props.rssi,
                        }));
                    }
                }
            }

            if let Err(e) = scan_adapter.stop_scan().await {
                warn!("Failed to stop scan: {}", e);
            }
            info!(found = seen.len(), "Scan window elapsed");
            let _ = sender.send(AppEvent::ScanFinished);
        });

        self.scan = Some((adapter, task));
        Ok(())
    }

    /// Stop a scan before its window elapses.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some((adapter, task)) = self.scan.take() {
            if !task.is_finished() {
                info!("Stopping BLE scan early");
                task.abort();
                // The window is reported closed even when the radio refuses
                // the stop request; the UI must not wait on a scan that is
                // already gone.
                let stop_result = adapter.stop_scan().await;
                self.announce_finished("Scan stopped.");
                stop_result?;
            }
        }
        Ok(())
    }

    /// Tell the UI the scan window is closed.
    fn announce_finished(&self, note: &str) {
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::new(
            note,
            MessageSeverity::Info,
        )));
        let _ = self.event_sender.send(AppEvent::ScanFinished);
    }

    /// Check if a scan window is currently open
    pub fn is_scanning(&self) -> bool {
        self.scan
            .as_ref()
            .is_some_and(|(_, task)| !task.is_finished())
    }
}

impl Drop for LightScanner {
    fn drop(&mut self) {
        if let Some((_, task)) = self.scan.take() {
            task.abort();
        }
    }
}

/// Name filter used during scans. Unnamed devices never match.
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    !name.is_empty() && name.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_devices_never_match() {
        assert!(!matches_prefix("", "GBK"));
        assert!(!matches_prefix("", ""));
    }

    #[test]
    fn govee_names_match_default_prefix() {
        assert!(matches_prefix("GBK_H6113_A1B2", "GBK"));
        assert!(matches_prefix("GBK", "GBK"));
    }

    #[test]
    fn other_vendors_are_filtered() {
        assert!(!matches_prefix("LEDBlue-12345", "GBK"));
        assert!(!matches_prefix("ihoment_H6001", "GBK"));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert!(!matches_prefix("gbk_h6113", "GBK"));
    }

    #[test]
    fn finish_notice_reaches_the_ui() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scanner = LightScanner::new(tx);

        scanner.announce_finished("Scan stopped.");

        assert!(matches!(rx.try_recv(), Ok(AppEvent::LogMessage(_))));
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ScanFinished)));
    }
}
