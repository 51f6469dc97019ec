mod mock;
mod traits;
mod types;

pub use mock::{
    MockCaptureBackend, MockCaptureHandle, MockPermissionGateway, MockPlatform, MockPreviewSurface,
};
pub use traits::{
    CaptureBackend, CaptureHandle, MetadataObserver, PermissionGateway, PreviewSurface,
};
pub use types::{AuthorizationStatus, MetadataKind, MetadataObject, ScanRequest, VideoDevice};
