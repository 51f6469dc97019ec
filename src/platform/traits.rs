use super::types::{AuthorizationStatus, MetadataObject, ScanRequest, VideoDevice};
use crate::error::ScanError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Receives detection events from a running capture pipeline.
///
/// Exactly one observer is registered per session. The platform invokes
/// `on_metadata_objects` once per frame that produced detections; the
/// observer decides what, if anything, to do with them.
pub trait MetadataObserver: Send + Sync {
    fn on_metadata_objects(&self, objects: &[MetadataObject]);
}

/// Camera authorization queries and the OS-level permission prompt.
#[async_trait]
pub trait PermissionGateway: Send + Sync + Debug {
    /// Current authorization state. Must not prompt the user.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt the user for camera access. Resolves once the user responds,
    /// which may take arbitrarily long.
    async fn request_access(&self) -> bool;
}

/// Device enumeration and capture-pipeline construction.
#[async_trait]
pub trait CaptureBackend: Send + Sync + Debug {
    /// Stable identifier for logging, e.g. "avfoundation" or "mock".
    fn name(&self) -> &str;

    /// The default video input device, if any camera exists.
    async fn default_video_device(&self) -> Option<VideoDevice>;

    /// Bind the device into a capture pipeline with a QR-only
    /// metadata-detection output attached.
    ///
    /// Fails with `ScanError::ConfigurationFailed` when the input or the
    /// detection output cannot be attached.
    async fn build_session(
        &self,
        device: &VideoDevice,
    ) -> Result<Box<dyn CaptureHandle>, ScanError>;
}

/// Ownership token for a constructed capture pipeline.
///
/// Dropping or stopping the handle releases the camera.
#[async_trait]
pub trait CaptureHandle: Send + Sync {
    /// Begin capture, delivering detections to the observer.
    async fn start(&self, observer: Arc<dyn MetadataObserver>) -> Result<(), ScanError>;

    /// Halt capture and release the device. Idempotent.
    async fn stop(&self);
}

/// Host view hierarchy hook for the live camera preview.
#[async_trait]
pub trait PreviewSurface: Send + Sync + Debug {
    /// Insert the live preview layer beneath the web content, styled per
    /// the request's presentational fields.
    async fn attach_below_web_content(&self, request: &ScanRequest) -> Result<(), ScanError>;

    /// Remove the preview layer. Idempotent.
    async fn detach(&self);

    /// Toggle web-content transparency so the preview shows through.
    async fn set_web_content_transparent(&self, transparent: bool);
}
