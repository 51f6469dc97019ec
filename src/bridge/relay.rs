use crate::platform::{MetadataKind, MetadataObject, MetadataObserver};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Observer registered with the capture pipeline for one session.
///
/// Inspects only the first object of each frame and forwards the first
/// decodable QR payload to the bridge; the latch seals after that so later
/// frames arriving before teardown completes are dropped.
pub(crate) struct DetectionRelay {
    tx: mpsc::Sender<String>,
    latch: AtomicBool,
}

impl DetectionRelay {
    pub(crate) fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            tx,
            latch: AtomicBool::new(false),
        }
    }
}

impl MetadataObserver for DetectionRelay {
    fn on_metadata_objects(&self, objects: &[MetadataObject]) {
        let Some(first) = objects.first() else {
            return;
        };

        if first.kind != MetadataKind::Qr {
            debug!(kind = ?first.kind, "ignoring non-QR metadata object");
            return;
        }

        let Some(payload) = first.payload.as_deref() else {
            debug!("ignoring QR object without decodable payload");
            return;
        };

        if self.latch.swap(true, Ordering::SeqCst) {
            return;
        }

        if self.tx.try_send(payload.to_string()).is_err() {
            warn!("detection relay channel closed before delivery");
        }
    }
}
