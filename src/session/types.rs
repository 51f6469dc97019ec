use serde::{Deserialize, Serialize};

/// Scanner lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Starting,
    Running,
}

/// Why a session was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The first valid QR code was decoded
    Decoded,
    /// The web layer issued a stopScanner command
    WebRequest,
    /// Session setup failed before reaching Running
    StartFailed,
    /// A new startScanner command replaced the session
    Superseded,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Decoded => "decoded",
            StopReason::WebRequest => "web_request",
            StopReason::StartFailed => "start_failed",
            StopReason::Superseded => "superseded",
        }
    }
}
