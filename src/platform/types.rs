use serde::{Deserialize, Serialize};

/// Camera authorization state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    Restricted,
    NotDetermined,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::Granted => "granted",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Restricted => "restricted",
            AuthorizationStatus::NotDetermined => "not_determined",
        }
    }
}

/// Symbology of a machine-readable object reported by the detection output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Qr,
    Barcode,
    Face,
}

/// A detected symbol/region reported per frame by the platform's detection
/// output. Only QR-kind objects with a decodable payload are acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataObject {
    pub kind: MetadataKind,
    pub payload: Option<String>,
}

impl MetadataObject {
    pub fn qr<S: Into<String>>(payload: S) -> Self {
        Self {
            kind: MetadataKind::Qr,
            payload: Some(payload.into()),
        }
    }

    /// A QR region the platform detected but could not decode.
    pub fn undecodable_qr() -> Self {
        Self {
            kind: MetadataKind::Qr,
            payload: None,
        }
    }

    pub fn of_kind(kind: MetadataKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }
}

/// Descriptor for a video input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    pub id: String,
    pub label: String,
}

impl VideoDevice {
    pub fn new<S: Into<String>>(id: S, label: S) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Presentational configuration for one scan, received from the web layer
/// and handed through unchanged to the preview surface.
///
/// The field defaults match what the hosting apps have historically relied
/// on when a command omits arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanRequest {
    pub screen_title: String,
    pub display_text: String,
    pub display_text_color: String,
    pub button_text: String,
    #[serde(alias = "showButton")]
    pub show_cancel_button: bool,
    #[serde(alias = "isRtl")]
    pub is_right_to_left: bool,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            screen_title: "Scan QR Code.".to_string(),
            display_text: "Point your phone to the QR code to scan it".to_string(),
            display_text_color: "0b0b0b".to_string(),
            button_text: "I don't have a QR Code".to_string(),
            show_cancel_button: false,
            is_right_to_left: false,
        }
    }
}
