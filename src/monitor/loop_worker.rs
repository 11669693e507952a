use anyhow::{Context, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::pose::{PoseLandmarks, PoseSource};

use super::controller::MonitorController;

// Set to false to silence this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Marks a detection as running until dropped, including when the detector
/// panics.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Pulls one frame from `source` every `frame_interval` and pushes it into
/// the session. A capture still running when the next tick fires causes
/// that tick to be skipped rather than queued.
pub async fn capture_loop(
    monitor: MonitorController,
    source: Box<dyn PoseSource>,
    frame_interval: Duration,
    capture_timeout: Duration,
    cancel_token: CancellationToken,
) {
    let source_name = source.name().to_string();
    let source = Arc::new(Mutex::new(source));
    let in_flight = Arc::new(AtomicBool::new(false));

    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log_info!(
        "capture loop started (source: {}, every {}ms)",
        source_name,
        frame_interval.as_millis()
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                if in_flight.load(Ordering::SeqCst) {
                    log_warn!("previous capture from {} still running; skipping frame", source_name);
                    continue;
                }

                let fut = perform_capture(&monitor, &source, &in_flight);
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        log_info!("capture loop shutting down (capture from {} abandoned)", source_name);
                        break;
                    }
                    result = tokio::time::timeout(capture_timeout, fut) => match result {
                        Ok(Ok(())) => {},
                        Ok(Err(err)) => log_error!("capture from {} failed: {err:?}", source_name),
                        Err(_) => log_warn!("capture timeout (> {}ms) from {}", capture_timeout.as_millis(), source_name),
                    }
                }
            }
        }
    }
}

async fn perform_capture(
    monitor: &MonitorController,
    source: &Arc<Mutex<Box<dyn PoseSource>>>,
    in_flight: &Arc<AtomicBool>,
) -> Result<()> {
    let capture_start = Instant::now();

    let guard = InFlightGuard::acquire(in_flight);
    let detection = tokio::task::spawn_blocking({
        let source = Arc::clone(source);
        move || {
            let _guard = guard;
            // A detector that panicked earlier leaves the lock poisoned; the
            // source itself is still usable for the next frame.
            let mut source = source
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            source.detect()
        }
    })
    .await
    .context("pose detection worker join failed")??;
    let detect_ms = capture_start.elapsed().as_millis();

    // An empty frame still counts: the live angle should fall back to
    // "Detecting" instead of repeating a stale pose.
    let landmarks = detection.unwrap_or_else(|| {
        log_debug!("no landmarks in frame");
        PoseLandmarks::default()
    });

    let snapshot = monitor
        .record_pose(landmarks)
        .await
        .context("failed to record pose")?;

    log_debug!(
        "frame {}: {} (status {}, detect {}ms, total {}ms)",
        snapshot.frames,
        snapshot.display_text(),
        snapshot.status.as_str(),
        detect_ms,
        capture_start.elapsed().as_millis()
    );

    Ok(())
}
