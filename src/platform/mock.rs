use super::traits::{
    CaptureBackend, CaptureHandle, MetadataObserver, PermissionGateway, PreviewSurface,
};
use super::types::{AuthorizationStatus, MetadataObject, ScanRequest, VideoDevice};
use crate::error::ScanError;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Mock permission gateway for testing without a real authorization API.
///
/// The prompt answer is configurable; requesting access transitions a
/// `NotDetermined` status to `Granted` or `Denied` the way the OS does.
#[derive(Debug)]
pub struct MockPermissionGateway {
    status: RwLock<AuthorizationStatus>,
    prompt_answer: AtomicBool,
    prompt_count: AtomicU64,
}

impl MockPermissionGateway {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status: RwLock::new(status),
            prompt_answer: AtomicBool::new(true),
            prompt_count: AtomicU64::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(AuthorizationStatus::Granted)
    }

    /// Configure what the simulated user answers to the prompt.
    pub fn set_prompt_answer(&self, granted: bool) {
        self.prompt_answer.store(granted, Ordering::Relaxed);
    }

    pub fn set_status(&self, status: AuthorizationStatus) {
        *self.status.write() = status;
    }

    /// Number of times the OS prompt was shown.
    pub fn prompt_count(&self) -> u64 {
        self.prompt_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PermissionGateway for MockPermissionGateway {
    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.read()
    }

    async fn request_access(&self) -> bool {
        self.prompt_count.fetch_add(1, Ordering::Relaxed);
        let granted = self.prompt_answer.load(Ordering::Relaxed);
        *self.status.write() = if granted {
            AuthorizationStatus::Granted
        } else {
            AuthorizationStatus::Denied
        };
        debug!(granted, "mock permission prompt answered");
        granted
    }
}

/// Mock capture handle. Clones share state so tests can keep a handle to a
/// pipeline after ownership moved into the session controller.
#[derive(Clone, Default)]
pub struct MockCaptureHandle {
    observer: Arc<Mutex<Option<Arc<dyn MetadataObserver>>>>,
    running: Arc<AtomicBool>,
    fail_start: Arc<AtomicBool>,
    start_count: Arc<AtomicU64>,
    stop_count: Arc<AtomicU64>,
}

impl MockCaptureHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn start_count(&self) -> u64 {
        self.start_count.load(Ordering::Relaxed)
    }

    pub fn stop_count(&self) -> u64 {
        self.stop_count.load(Ordering::Relaxed)
    }

    /// Push a synthetic detection frame into the registered observer.
    ///
    /// Returns whether the frame was delivered; a stopped pipeline delivers
    /// nothing, mirroring real hardware.
    pub fn emit_frame(&self, objects: &[MetadataObject]) -> bool {
        if !self.running.load(Ordering::Relaxed) {
            return false;
        }
        let observer = self.observer.lock().clone();
        match observer {
            Some(observer) => {
                observer.on_metadata_objects(objects);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for MockCaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCaptureHandle")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("start_count", &self.start_count.load(Ordering::Relaxed))
            .field("stop_count", &self.stop_count.load(Ordering::Relaxed))
            .finish()
    }
}

#[async_trait]
impl CaptureHandle for MockCaptureHandle {
    async fn start(&self, observer: Arc<dyn MetadataObserver>) -> Result<(), ScanError> {
        self.start_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_start.load(Ordering::Relaxed) {
            return Err(ScanError::configuration("injected pipeline start failure"));
        }
        *self.observer.lock() = Some(observer);
        self.running.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.stop_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Mock capture backend with configurable device presence and failure
/// injection for attach and pipeline-start paths.
#[derive(Debug)]
pub struct MockCaptureBackend {
    device: RwLock<Option<VideoDevice>>,
    fail_attach: AtomicBool,
    fail_pipeline_start: AtomicBool,
    device_query_count: AtomicU64,
    build_count: AtomicU64,
    last_handle: Mutex<Option<MockCaptureHandle>>,
}

impl MockCaptureBackend {
    pub fn new() -> Self {
        Self {
            device: RwLock::new(Some(VideoDevice::new("camera0", "Mock back camera"))),
            fail_attach: AtomicBool::new(false),
            fail_pipeline_start: AtomicBool::new(false),
            device_query_count: AtomicU64::new(0),
            build_count: AtomicU64::new(0),
            last_handle: Mutex::new(None),
        }
    }

    pub fn set_device(&self, device: Option<VideoDevice>) {
        *self.device.write() = device;
    }

    pub fn set_attach_failure(&self, fail: bool) {
        self.fail_attach.store(fail, Ordering::Relaxed);
    }

    pub fn set_pipeline_start_failure(&self, fail: bool) {
        self.fail_pipeline_start.store(fail, Ordering::Relaxed);
    }

    pub fn device_query_count(&self) -> u64 {
        self.device_query_count.load(Ordering::Relaxed)
    }

    pub fn build_count(&self) -> u64 {
        self.build_count.load(Ordering::Relaxed)
    }

    /// The most recently built pipeline, for frame injection in tests.
    pub fn last_handle(&self) -> Option<MockCaptureHandle> {
        self.last_handle.lock().clone()
    }
}

impl Default for MockCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for MockCaptureBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn default_video_device(&self) -> Option<VideoDevice> {
        self.device_query_count.fetch_add(1, Ordering::Relaxed);
        self.device.read().clone()
    }

    async fn build_session(
        &self,
        device: &VideoDevice,
    ) -> Result<Box<dyn CaptureHandle>, ScanError> {
        self.build_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_attach.load(Ordering::Relaxed) {
            return Err(ScanError::configuration(format!(
                "cannot attach input for device {}",
                device.id
            )));
        }
        let handle = MockCaptureHandle::default();
        handle
            .fail_start
            .store(self.fail_pipeline_start.load(Ordering::Relaxed), Ordering::Relaxed);
        *self.last_handle.lock() = Some(handle.clone());
        debug!(device = %device.id, "mock capture session built");
        Ok(Box::new(handle))
    }
}

/// Mock preview surface recording attach/detach/transparency calls.
#[derive(Debug, Default)]
pub struct MockPreviewSurface {
    attached: AtomicBool,
    transparent: AtomicBool,
    fail_attach: AtomicBool,
    attach_count: AtomicU64,
    detach_count: AtomicU64,
    last_request: Mutex<Option<ScanRequest>>,
}

impl MockPreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attach_failure(&self, fail: bool) {
        self.fail_attach.store(fail, Ordering::Relaxed);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Relaxed)
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent.load(Ordering::Relaxed)
    }

    pub fn attach_count(&self) -> u64 {
        self.attach_count.load(Ordering::Relaxed)
    }

    pub fn detach_count(&self) -> u64 {
        self.detach_count.load(Ordering::Relaxed)
    }

    /// The presentational fields the last attach received.
    pub fn last_request(&self) -> Option<ScanRequest> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl PreviewSurface for MockPreviewSurface {
    async fn attach_below_web_content(&self, request: &ScanRequest) -> Result<(), ScanError> {
        self.attach_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_attach.load(Ordering::Relaxed) {
            return Err(ScanError::configuration("injected preview attach failure"));
        }
        *self.last_request.lock() = Some(request.clone());
        self.attached.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn detach(&self) {
        if self.attached.swap(false, Ordering::Relaxed) {
            self.detach_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    async fn set_web_content_transparent(&self, transparent: bool) {
        self.transparent.store(transparent, Ordering::Relaxed);
    }
}

/// Bundle of all mock collaborators, shared by tests and the dev harness.
#[derive(Debug)]
pub struct MockPlatform {
    pub permissions: Arc<MockPermissionGateway>,
    pub backend: Arc<MockCaptureBackend>,
    pub preview: Arc<MockPreviewSurface>,
}

impl MockPlatform {
    pub fn with_authorization(status: AuthorizationStatus) -> Self {
        Self {
            permissions: Arc::new(MockPermissionGateway::new(status)),
            backend: Arc::new(MockCaptureBackend::new()),
            preview: Arc::new(MockPreviewSurface::new()),
        }
    }

    pub fn granted() -> Self {
        Self::with_authorization(AuthorizationStatus::Granted)
    }
}
