use crate::platform::AuthorizationStatus;
use crate::session::StopReason;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn};

/// Events that can occur in the scanner lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScannerEvent {
    /// A start command was accepted and session setup began
    ScannerStarting { timestamp: SystemTime },
    /// The capture pipeline is running and the preview is visible
    ScannerStarted { timestamp: SystemTime },
    /// The first valid QR code was decoded
    CodeDetected {
        payload_len: usize,
        timestamp: SystemTime,
    },
    /// The session was torn down
    ScannerStopped {
        reason: StopReason,
        timestamp: SystemTime,
    },
    /// The OS permission prompt was answered
    PermissionResolved {
        status: AuthorizationStatus,
        timestamp: SystemTime,
    },
    /// A component error occurred
    ComponentError { component: String, error: String },
}

impl ScannerEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> SystemTime {
        match self {
            ScannerEvent::ScannerStarting { timestamp } => *timestamp,
            ScannerEvent::ScannerStarted { timestamp } => *timestamp,
            ScannerEvent::CodeDetected { timestamp, .. } => *timestamp,
            ScannerEvent::ScannerStopped { timestamp, .. } => *timestamp,
            ScannerEvent::PermissionResolved { timestamp, .. } => *timestamp,
            ScannerEvent::ComponentError { .. } => SystemTime::now(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            ScannerEvent::ScannerStarting { .. } => "Scanner starting".to_string(),
            ScannerEvent::ScannerStarted { .. } => "Scanner started".to_string(),
            ScannerEvent::CodeDetected { payload_len, .. } => {
                format!("Code detected ({} bytes)", payload_len)
            }
            ScannerEvent::ScannerStopped { reason, .. } => {
                format!("Scanner stopped: {}", reason.as_str())
            }
            ScannerEvent::PermissionResolved { status, .. } => {
                format!("Permission resolved: {}", status.as_str())
            }
            ScannerEvent::ComponentError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ScannerEvent::ScannerStarting { .. } => "scanner_starting",
            ScannerEvent::ScannerStarted { .. } => "scanner_started",
            ScannerEvent::CodeDetected { .. } => "code_detected",
            ScannerEvent::ScannerStopped { .. } => "scanner_stopped",
            ScannerEvent::PermissionResolved { .. } => "permission_resolved",
            ScannerEvent::ComponentError { .. } => "component_error",
        }
    }
}

/// Async event bus for lifecycle observability using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<ScannerEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers, returning how many received it
    pub async fn publish(&self, event: ScannerEvent) -> usize {
        if self.debug_logging {
            debug!("Publishing event: {}", event.description());
        }

        match &event {
            ScannerEvent::CodeDetected { payload_len, .. } => {
                info!("Code detected ({} bytes)", payload_len);
            }
            ScannerEvent::ComponentError { component, error } => {
                error!("Component error in {}: {}", component, error);
            }
            ScannerEvent::PermissionResolved { status, .. } => {
                if *status == AuthorizationStatus::Granted {
                    info!("Camera permission granted");
                } else {
                    warn!("Camera permission not granted: {}", status.as_str());
                }
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("Event published with no subscribers");
                0
            }
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        let delivered = bus
            .publish(ScannerEvent::ScannerStarting {
                timestamp: SystemTime::now(),
            })
            .await;
        assert_eq!(delivered, 1);

        let event = receiver.recv().await.expect("event should be delivered");
        assert_eq!(event.event_type(), "scanner_starting");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(16);
        let delivered = bus
            .publish(ScannerEvent::ComponentError {
                component: "session".to_string(),
                error: "boom".to_string(),
            })
            .await;
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_event_descriptions() {
        let event = ScannerEvent::CodeDetected {
            payload_len: 5,
            timestamp: SystemTime::now(),
        };
        assert_eq!(event.description(), "Code detected (5 bytes)");
        assert_eq!(event.event_type(), "code_detected");

        let event = ScannerEvent::ScannerStopped {
            reason: StopReason::Decoded,
            timestamp: SystemTime::now(),
        };
        assert_eq!(event.description(), "Scanner stopped: decoded");
    }
}
