use super::relay::DetectionRelay;
use super::types::{scan_request_from_args, CallbackId, CommandInvocation, CommandResult};
use crate::config::QrBridgeConfig;
use crate::error::{QrBridgeError, Result};
use crate::events::{EventBus, ScannerEvent};
use crate::platform::ScanRequest;
use crate::session::{SessionController, StopReason};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Multiplexes web-layer commands into controller calls and maps the first
/// decoded QR string back to a single terminal result per invocation.
pub struct CommandBridge {
    controller: Arc<SessionController>,
    config: QrBridgeConfig,
    event_bus: Arc<EventBus>,
}

impl CommandBridge {
    pub fn new(
        controller: Arc<SessionController>,
        config: QrBridgeConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            controller,
            config,
            event_bus,
        }
    }

    /// Route one command invocation and resolve with its terminal result.
    ///
    /// `startScanner` resolves on the first decoded QR string, on a setup
    /// failure, or with a `cancelled` error when the session is torn down
    /// before anything decodes. `stopScanner` acknowledges once teardown
    /// completes, whether or not a session was active. Unrecognized command
    /// names are surfaced as an `unknown_command` error instead of being
    /// silently dropped.
    pub async fn dispatch(&self, invocation: CommandInvocation) -> CommandResult {
        let callback = CallbackId::new();
        info!(callback = %callback, command = %invocation.command, "dispatching bridge command");

        match invocation.command.as_str() {
            "startScanner" => {
                let request =
                    scan_request_from_args(&invocation.args, &self.config.presentation);
                self.start_scanner(callback, request).await
            }
            "stopScanner" => self.stop_scanner(callback).await,
            other => {
                let error = QrBridgeError::UnknownCommand {
                    name: other.to_string(),
                };
                warn!(callback = %callback, %error, "unrecognized bridge command");
                CommandResult::error("unknown_command")
            }
        }
    }

    /// Parse a raw command object from the host channel and dispatch it.
    ///
    /// Fails only when the object itself is malformed; command-level
    /// failures still resolve as error results.
    pub async fn dispatch_json(&self, raw: &str) -> Result<CommandResult> {
        let invocation: CommandInvocation = serde_json::from_str(raw)
            .map_err(|e| QrBridgeError::bridge(format!("malformed command object: {}", e)))?;
        Ok(self.dispatch(invocation).await)
    }

    async fn start_scanner(&self, callback: CallbackId, request: ScanRequest) -> CommandResult {
        let (tx, mut rx) = mpsc::channel(self.config.scanner.detection_channel_capacity);
        let relay = Arc::new(DetectionRelay::new(tx));

        let cancelled = match self.controller.start(&request, relay).await {
            Ok(token) => token,
            Err(error) => {
                warn!(callback = %callback, %error, "startScanner failed");
                return CommandResult::error(error.reason_code());
            }
        };

        tokio::select! {
            // Prefer a queued decode over a concurrent teardown.
            biased;
            payload = rx.recv() => match payload {
                Some(payload) => {
                    self.controller.stop(StopReason::Decoded).await;
                    self.event_bus
                        .publish(ScannerEvent::CodeDetected {
                            payload_len: payload.len(),
                            timestamp: SystemTime::now(),
                        })
                        .await;
                    info!(callback = %callback, "scan completed");
                    CommandResult::ok_with_value(payload)
                }
                None => {
                    warn!(callback = %callback, "detection relay dropped before decode");
                    CommandResult::error("cancelled")
                }
            },
            _ = cancelled.cancelled() => {
                info!(callback = %callback, "scan cancelled before decode");
                CommandResult::error("cancelled")
            }
        }
    }

    async fn stop_scanner(&self, callback: CallbackId) -> CommandResult {
        self.controller.stop(StopReason::WebRequest).await;
        info!(callback = %callback, "stopScanner acknowledged");
        CommandResult::ok()
    }
}
