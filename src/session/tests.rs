use super::*;
use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::events::EventBus;
use crate::platform::{
    AuthorizationStatus, MetadataObject, MetadataObserver, MockPlatform, ScanRequest,
};
use std::sync::Arc;

struct NullObserver;

impl MetadataObserver for NullObserver {
    fn on_metadata_objects(&self, _objects: &[MetadataObject]) {}
}

fn observer() -> Arc<dyn MetadataObserver> {
    Arc::new(NullObserver)
}

fn create_test_scanner_config() -> ScannerConfig {
    ScannerConfig {
        setup_timeout_secs: 2,
        teardown_timeout_secs: 2,
        detection_channel_capacity: 8,
    }
}

fn controller_for(platform: &MockPlatform) -> SessionController {
    SessionController::new(
        create_test_scanner_config(),
        platform.permissions.clone(),
        platform.backend.clone(),
        platform.preview.clone(),
        Arc::new(EventBus::new(16)),
    )
}

#[tokio::test]
async fn test_start_with_granted_permission() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert!(result.is_ok());
    assert_eq!(controller.state().await, ScannerState::Running);

    assert!(platform.preview.is_attached());
    assert!(platform.preview.is_transparent());
    assert_eq!(platform.backend.build_count(), 1);

    let handle = platform.backend.last_handle().unwrap();
    assert!(handle.is_running());
}

#[tokio::test]
async fn test_denied_permission_skips_device_acquisition() {
    let platform = MockPlatform::with_authorization(AuthorizationStatus::Denied);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert_eq!(result.unwrap_err(), ScanError::PermissionDenied);
    assert_eq!(controller.state().await, ScannerState::Idle);

    // no device was touched
    assert_eq!(platform.backend.device_query_count(), 0);
    assert_eq!(platform.backend.build_count(), 0);
    assert!(!platform.preview.is_attached());
}

#[tokio::test]
async fn test_restricted_permission_skips_device_acquisition() {
    let platform = MockPlatform::with_authorization(AuthorizationStatus::Restricted);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert_eq!(result.unwrap_err(), ScanError::PermissionRestricted);
    assert_eq!(platform.backend.device_query_count(), 0);
}

#[tokio::test]
async fn test_undetermined_permission_prompts_then_starts() {
    let platform = MockPlatform::with_authorization(AuthorizationStatus::NotDetermined);
    platform.permissions.set_prompt_answer(true);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert!(result.is_ok());
    assert_eq!(platform.permissions.prompt_count(), 1);
    assert_eq!(
        controller.check_permission(),
        AuthorizationStatus::Granted
    );
    assert_eq!(controller.state().await, ScannerState::Running);
}

#[tokio::test]
async fn test_undetermined_permission_prompt_denied() {
    let platform = MockPlatform::with_authorization(AuthorizationStatus::NotDetermined);
    platform.permissions.set_prompt_answer(false);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert_eq!(result.unwrap_err(), ScanError::PermissionDenied);
    assert_eq!(platform.permissions.prompt_count(), 1);
    assert_eq!(controller.state().await, ScannerState::Idle);
    assert_eq!(platform.backend.device_query_count(), 0);
}

#[tokio::test]
async fn test_missing_device_fails_start() {
    let platform = MockPlatform::granted();
    platform.backend.set_device(None);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert_eq!(result.unwrap_err(), ScanError::DeviceUnavailable);
    assert_eq!(platform.backend.build_count(), 0);
    assert_eq!(controller.state().await, ScannerState::Idle);
}

#[tokio::test]
async fn test_attach_failure_fails_start() {
    let platform = MockPlatform::granted();
    platform.backend.set_attach_failure(true);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert!(matches!(
        result.unwrap_err(),
        ScanError::ConfigurationFailed { .. }
    ));
    assert!(!platform.preview.is_attached());
    assert_eq!(controller.state().await, ScannerState::Idle);
}

#[tokio::test]
async fn test_pipeline_start_failure_detaches_preview() {
    let platform = MockPlatform::granted();
    platform.backend.set_pipeline_start_failure(true);
    let controller = controller_for(&platform);

    let result = controller.start(&ScanRequest::default(), observer()).await;
    assert!(matches!(
        result.unwrap_err(),
        ScanError::ConfigurationFailed { .. }
    ));

    // the preview was attached during setup but must not leak
    assert_eq!(platform.preview.attach_count(), 1);
    assert!(!platform.preview.is_attached());
    assert!(!platform.preview.is_transparent());
    assert_eq!(controller.state().await, ScannerState::Idle);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    controller
        .start(&ScanRequest::default(), observer())
        .await
        .unwrap();
    let handle = platform.backend.last_handle().unwrap();

    controller.stop(StopReason::WebRequest).await;
    controller.stop(StopReason::WebRequest).await;

    assert_eq!(controller.state().await, ScannerState::Idle);
    assert_eq!(handle.stop_count(), 1);
}

#[tokio::test]
async fn test_stop_without_session_is_noop() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    controller.stop(StopReason::WebRequest).await;
    assert_eq!(controller.state().await, ScannerState::Idle);
    assert_eq!(platform.preview.detach_count(), 0);
}

#[tokio::test]
async fn test_stop_releases_resources() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    controller
        .start(&ScanRequest::default(), observer())
        .await
        .unwrap();
    let handle = platform.backend.last_handle().unwrap();

    controller.stop(StopReason::Decoded).await;

    assert!(!handle.is_running());
    assert!(!platform.preview.is_attached());
    assert!(!platform.preview.is_transparent());
    assert_eq!(controller.state().await, ScannerState::Idle);
}

#[tokio::test]
async fn test_restart_supersedes_previous_session() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    controller
        .start(&ScanRequest::default(), observer())
        .await
        .unwrap();
    let first = platform.backend.last_handle().unwrap();

    controller
        .start(&ScanRequest::default(), observer())
        .await
        .unwrap();
    let second = platform.backend.last_handle().unwrap();

    // the first pipeline was torn down before the second came up
    assert_eq!(first.stop_count(), 1);
    assert!(!first.is_running());
    assert!(second.is_running());
    assert_eq!(platform.backend.build_count(), 2);

    // no duplicated preview layers
    assert_eq!(
        platform.preview.attach_count(),
        platform.preview.detach_count() + 1
    );
    assert_eq!(controller.state().await, ScannerState::Running);
}

#[tokio::test]
async fn test_start_cancellation_token_fires_on_stop() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    let token = controller
        .start(&ScanRequest::default(), observer())
        .await
        .unwrap();
    assert!(!token.is_cancelled());

    controller.stop(StopReason::WebRequest).await;
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_preview_receives_presentation_fields() {
    let platform = MockPlatform::granted();
    let controller = controller_for(&platform);

    let request = ScanRequest {
        screen_title: "Pair device".to_string(),
        is_right_to_left: true,
        ..ScanRequest::default()
    };
    controller.start(&request, observer()).await.unwrap();

    let seen = platform.preview.last_request().unwrap();
    assert_eq!(seen, request);
}

#[tokio::test]
async fn test_request_permission_reports_outcome() {
    let platform = MockPlatform::with_authorization(AuthorizationStatus::NotDetermined);
    platform.permissions.set_prompt_answer(false);
    let controller = controller_for(&platform);

    assert_eq!(
        controller.check_permission(),
        AuthorizationStatus::NotDetermined
    );
    let status = controller.request_permission().await;
    assert_eq!(status, AuthorizationStatus::Denied);
    assert_eq!(controller.check_permission(), AuthorizationStatus::Denied);
}
