use thiserror::Error;

/// Terminal failures for a single scan attempt.
///
/// None of these are retried automatically; the web layer must issue a new
/// `startScanner` command. Every variant leaves the scanner Idle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera access restricted by device policy")]
    PermissionRestricted,

    #[error("no video capture device available")]
    DeviceUnavailable,

    #[error("capture pipeline configuration failed: {details}")]
    ConfigurationFailed { details: String },
}

impl ScanError {
    pub fn configuration<S: Into<String>>(details: S) -> Self {
        Self::ConfigurationFailed {
            details: details.into(),
        }
    }

    /// Machine-readable reason code carried in error results on the bridge.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ScanError::PermissionDenied => "permission_denied",
            ScanError::PermissionRestricted => "permission_restricted",
            ScanError::DeviceUnavailable => "device_unavailable",
            ScanError::ConfigurationFailed { .. } => "configuration_failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum QrBridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Unknown bridge command: {name}")]
    UnknownCommand { name: String },

    #[error("Bridge error: {message}")]
    Bridge { message: String },
}

impl QrBridgeError {
    pub fn bridge<S: Into<String>>(message: S) -> Self {
        Self::Bridge {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QrBridgeError>;
