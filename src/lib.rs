pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod platform;
pub mod session;

pub use bridge::{CallbackId, CommandBridge, CommandInvocation, CommandResult, ResultStatus};
pub use config::{PresentationConfig, QrBridgeConfig, ScannerConfig, SystemConfig};
pub use error::{QrBridgeError, Result, ScanError};
pub use events::{EventBus, ScannerEvent};
pub use platform::{
    AuthorizationStatus, CaptureBackend, CaptureHandle, MetadataKind, MetadataObject,
    MetadataObserver, MockCaptureBackend, MockCaptureHandle, MockPermissionGateway, MockPlatform,
    MockPreviewSurface, PermissionGateway, PreviewSurface, ScanRequest, VideoDevice,
};
pub use session::{ScannerState, SessionController, StopReason};
