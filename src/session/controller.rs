use super::types::{ScannerState, StopReason};
use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::events::{EventBus, ScannerEvent};
use crate::platform::{
    AuthorizationStatus, CaptureBackend, CaptureHandle, MetadataObserver, PermissionGateway,
    PreviewSurface, ScanRequest,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Transient handle wrapping an active capture pipeline.
///
/// Exists only between `start` and (`stop` | decode | error). The
/// cancellation token wakes any task waiting on the session's outcome.
struct ScanSession {
    handle: Box<dyn CaptureHandle>,
    cancel: CancellationToken,
}

struct ActiveSlot {
    state: ScannerState,
    session: Option<ScanSession>,
}

/// Owns the camera authorization check and the capture-session lifecycle.
///
/// The session is a single-slot resource: at most one capture pipeline is
/// ever active, and a new `start` supersedes whatever came before it. All
/// session mutation is serialized through one async mutex, so the controller
/// is the sole mutator of session state.
pub struct SessionController {
    config: ScannerConfig,
    permissions: Arc<dyn PermissionGateway>,
    backend: Arc<dyn CaptureBackend>,
    preview: Arc<dyn PreviewSurface>,
    event_bus: Arc<EventBus>,
    active: Mutex<ActiveSlot>,
}

impl SessionController {
    pub fn new(
        config: ScannerConfig,
        permissions: Arc<dyn PermissionGateway>,
        backend: Arc<dyn CaptureBackend>,
        preview: Arc<dyn PreviewSurface>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            permissions,
            backend,
            preview,
            event_bus,
            active: Mutex::new(ActiveSlot {
                state: ScannerState::Idle,
                session: None,
            }),
        }
    }

    /// Query the platform authorization state without prompting.
    pub fn check_permission(&self) -> AuthorizationStatus {
        self.permissions.authorization_status()
    }

    /// Show the OS permission prompt and wait for the user's answer.
    pub async fn request_permission(&self) -> AuthorizationStatus {
        let granted = self.permissions.request_access().await;
        let status = if granted {
            AuthorizationStatus::Granted
        } else {
            AuthorizationStatus::Denied
        };
        self.event_bus
            .publish(ScannerEvent::PermissionResolved {
                status,
                timestamp: SystemTime::now(),
            })
            .await;
        status
    }

    pub async fn state(&self) -> ScannerState {
        self.active.lock().await.state
    }

    pub async fn is_running(&self) -> bool {
        self.state().await == ScannerState::Running
    }

    /// Tear down any existing session, then establish a new capture
    /// pipeline for `request`.
    ///
    /// Returns the session's cancellation token; it fires when the session
    /// is torn down by any path, letting the bridge resolve a pending start
    /// that never decodes.
    pub async fn start(
        &self,
        request: &ScanRequest,
        observer: Arc<dyn MetadataObserver>,
    ) -> Result<CancellationToken, ScanError> {
        let mut slot = self.active.lock().await;

        // Single-slot invariant: a new scan replaces whatever was active.
        self.teardown_locked(&mut slot, StopReason::Superseded).await;

        slot.state = ScannerState::Starting;
        self.event_bus
            .publish(ScannerEvent::ScannerStarting {
                timestamp: SystemTime::now(),
            })
            .await;

        match self.establish(request, observer).await {
            Ok(session) => {
                let cancel = session.cancel.clone();
                slot.session = Some(session);
                slot.state = ScannerState::Running;
                info!(backend = self.backend.name(), "scanner running");
                self.event_bus
                    .publish(ScannerEvent::ScannerStarted {
                        timestamp: SystemTime::now(),
                    })
                    .await;
                Ok(cancel)
            }
            Err(error) => {
                slot.state = ScannerState::Idle;
                warn!(%error, "scanner start failed");
                self.event_bus
                    .publish(ScannerEvent::ComponentError {
                        component: "session".to_string(),
                        error: error.to_string(),
                    })
                    .await;
                self.event_bus
                    .publish(ScannerEvent::ScannerStopped {
                        reason: StopReason::StartFailed,
                        timestamp: SystemTime::now(),
                    })
                    .await;
                Err(error)
            }
        }
    }

    /// Halt capture, detach the preview and release the session.
    ///
    /// Idempotent: calling with no active session is a no-op.
    pub async fn stop(&self, reason: StopReason) {
        let mut slot = self.active.lock().await;
        self.teardown_locked(&mut slot, reason).await;
    }

    /// Permission check/prompt, device acquisition and pipeline assembly.
    ///
    /// Ordering matters: authorization is settled before any device access
    /// is attempted, and a pipeline that fails to start leaves no preview
    /// layer behind.
    async fn establish(
        &self,
        request: &ScanRequest,
        observer: Arc<dyn MetadataObserver>,
    ) -> Result<ScanSession, ScanError> {
        let mut status = self.permissions.authorization_status();
        if status == AuthorizationStatus::NotDetermined {
            debug!("camera authorization not determined, prompting");
            status = self.request_permission().await;
        }

        match status {
            AuthorizationStatus::Granted => {}
            AuthorizationStatus::Restricted => return Err(ScanError::PermissionRestricted),
            AuthorizationStatus::Denied | AuthorizationStatus::NotDetermined => {
                return Err(ScanError::PermissionDenied)
            }
        }

        let device = self
            .backend
            .default_video_device()
            .await
            .ok_or(ScanError::DeviceUnavailable)?;
        debug!(device = %device.id, label = %device.label, "acquired video device");

        let setup_timeout = Duration::from_secs(self.config.setup_timeout_secs);
        let handle = timeout(setup_timeout, self.backend.build_session(&device))
            .await
            .map_err(|_| ScanError::configuration("capture session setup timed out"))??;

        self.preview.attach_below_web_content(request).await?;

        if let Err(error) = handle.start(observer).await {
            self.preview.detach().await;
            return Err(error);
        }

        self.preview.set_web_content_transparent(true).await;

        Ok(ScanSession {
            handle,
            cancel: CancellationToken::new(),
        })
    }

    /// Unconditional teardown of the session in `slot`, if any.
    async fn teardown_locked(&self, slot: &mut ActiveSlot, reason: StopReason) {
        let Some(session) = slot.session.take() else {
            slot.state = ScannerState::Idle;
            debug!("stop requested with no active session");
            return;
        };

        session.cancel.cancel();

        let teardown_timeout = Duration::from_secs(self.config.teardown_timeout_secs);
        if timeout(teardown_timeout, session.handle.stop())
            .await
            .is_err()
        {
            warn!("capture pipeline stop timed out");
        }

        self.preview.detach().await;
        self.preview.set_web_content_transparent(false).await;

        slot.state = ScannerState::Idle;
        info!(reason = reason.as_str(), "scanner stopped");
        self.event_bus
            .publish(ScannerEvent::ScannerStopped {
                reason,
                timestamp: SystemTime::now(),
            })
            .await;
    }
}
