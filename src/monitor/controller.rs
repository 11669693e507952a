use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    alert::{AlertScheduler, AlertSink},
    baseline::{Baseline, BaselineStore},
    pose::{PoseLandmarks, PoseSource},
    posture::{compute, Deviation, PostureConfig, PostureTracker},
    settings::SettingsStore,
};

use super::loop_worker::capture_loop;
use super::snapshot::{PostureSnapshot, SessionSummary};

/// Everything that lives for one monitoring session. Dropped on stop, so a
/// new session always starts uncalibrated.
struct MonitorSession {
    id: String,
    started_at: DateTime<Utc>,
    config: PostureConfig,
    store: BaselineStore,
    tracker: PostureTracker,
    alerts: AlertScheduler,
    last: Deviation,
    frames: u64,
    slouching_frames: u64,
    alerts_raised: u64,
}

impl MonitorSession {
    /// Runs the classifier on the current store contents and feeds the
    /// tracker and alert cycle.
    fn evaluate(&mut self, now: Instant) {
        let was_alerting = self.tracker.is_alerting();
        self.last = compute(&self.store, &self.config);
        self.tracker.update(&self.last, now.into_std());

        let alerting = self.tracker.is_alerting();
        if alerting && !was_alerting {
            self.alerts_raised += 1;
            info!(
                "Slouching latched at {:.1}° (session {})",
                self.last.angle.unwrap_or_default(),
                self.id
            );
        } else if !alerting && was_alerting {
            info!("Posture recovered (session {})", self.id);
        }
        self.alerts.set_slouching(alerting);
    }

    fn snapshot(&self) -> PostureSnapshot {
        PostureSnapshot {
            session_id: Some(self.id.clone()),
            status: self.tracker.status(),
            angle: self.last.angle,
            slouching: self.last.slouching,
            alerting: self.tracker.is_alerting(),
            calibrated: self.store.is_calibrated(),
            frames: self.frames,
            updated_at: Utc::now(),
        }
    }
}

struct CaptureWorker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the monitoring session: baseline store, classifier state, alert
/// cycle and, optionally, a capture loop feeding it frames.
///
/// Cheap to clone; every clone drives the same session.
#[derive(Clone)]
pub struct MonitorController {
    session: Arc<Mutex<Option<MonitorSession>>>,
    worker: Arc<Mutex<Option<CaptureWorker>>>,
    settings: Arc<SettingsStore>,
    sink: Arc<dyn AlertSink>,
    publisher: Arc<watch::Sender<PostureSnapshot>>,
}

impl MonitorController {
    pub fn new(settings: Arc<SettingsStore>, sink: Arc<dyn AlertSink>) -> Self {
        let (publisher, _) = watch::channel(PostureSnapshot::idle());
        Self {
            session: Arc::new(Mutex::new(None)),
            worker: Arc::new(Mutex::new(None)),
            settings,
            sink,
            publisher: Arc::new(publisher),
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> PostureSnapshot {
        self.publisher.borrow().clone()
    }

    /// Receives a new snapshot after every frame, calibration and session
    /// change.
    pub fn subscribe(&self) -> watch::Receiver<PostureSnapshot> {
        self.publisher.subscribe()
    }

    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Starts a session. With a `source`, frames are captured every
    /// `frame_interval_ms`; without one, frames arrive via [`record_pose`].
    ///
    /// [`record_pose`]: MonitorController::record_pose
    pub async fn start_session(
        &self,
        source: Option<Box<dyn PoseSource>>,
    ) -> Result<PostureSnapshot> {
        let settings = self.settings.snapshot();
        let config = settings.posture;

        let snapshot = {
            let mut session = self.session.lock().await;
            if session.is_some() {
                bail!("monitoring session already active");
            }

            let new_session = MonitorSession {
                id: Uuid::new_v4().to_string(),
                started_at: Utc::now(),
                tracker: PostureTracker::new(&config),
                alerts: AlertScheduler::new(Arc::clone(&self.sink), settings.alerts),
                config: config.clone(),
                store: BaselineStore::new(),
                last: Deviation::UNKNOWN,
                frames: 0,
                slouching_frames: 0,
                alerts_raised: 0,
            };
            info!(
                "Monitoring session {} started (threshold {}°, hysteresis {}°, sustain {}ms)",
                new_session.id,
                config.threshold_degrees,
                config.hysteresis_degrees,
                config.sustain_ms
            );
            let snapshot = new_session.snapshot();
            *session = Some(new_session);
            snapshot
        };

        if let Some(source) = source {
            self.spawn_capture(source, &config).await;
        }

        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Ends the session and discards its baseline. Returns `None` when no
    /// session was active.
    pub async fn stop_session(&self) -> Result<Option<SessionSummary>> {
        self.stop_capture().await?;

        let Some(mut session) = self.session.lock().await.take() else {
            return Ok(None);
        };
        session.alerts.stop();

        let summary = SessionSummary {
            id: session.id.clone(),
            started_at: session.started_at,
            stopped_at: Utc::now(),
            frames: session.frames,
            slouching_frames: session.slouching_frames,
            alerts_raised: session.alerts_raised,
        };
        info!(
            "Monitoring session {} stopped after {} frames ({} slouching, {} alerts)",
            summary.id, summary.frames, summary.slouching_frames, summary.alerts_raised
        );

        self.publish(PostureSnapshot::idle());
        Ok(Some(summary))
    }

    /// Stores `landmarks` as the latest frame and re-evaluates posture
    /// against it before returning.
    pub async fn record_pose(&self, landmarks: PoseLandmarks) -> Result<PostureSnapshot> {
        let snapshot = {
            let mut guard = self.session.lock().await;
            let session = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no active monitoring session"))?;

            session.store.record_pose(landmarks);
            session.frames += 1;
            session.evaluate(Instant::now());
            if session.last.slouching {
                session.slouching_frames += 1;
            }
            session.snapshot()
        };

        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Freezes the latest frame as the new baseline. Returns `false` (and
    /// keeps any previous baseline) when no frame has arrived yet.
    pub async fn calibrate(&self) -> Result<bool> {
        let snapshot = {
            let mut guard = self.session.lock().await;
            let session = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no active monitoring session"))?;

            if !session.store.calibrate() {
                info!("Calibration requested before any pose arrived; ignoring");
                return Ok(false);
            }

            if let Some(baseline) = session.store.baseline() {
                info!(
                    "Baseline captured with {} valid side(s) (session {})",
                    baseline.valid_sides(),
                    session.id
                );
            }
            session.tracker.reset();
            session.evaluate(Instant::now());
            session.snapshot()
        };

        self.publish(snapshot);
        Ok(true)
    }

    pub async fn baseline(&self) -> Option<Baseline> {
        let guard = self.session.lock().await;
        guard.as_ref().and_then(|s| s.store.baseline().cloned())
    }

    pub async fn last_pose(&self) -> Option<PoseLandmarks> {
        let guard = self.session.lock().await;
        guard.as_ref().and_then(|s| s.store.last_pose().cloned())
    }

    fn publish(&self, snapshot: PostureSnapshot) {
        self.publisher.send_replace(snapshot);
    }

    async fn spawn_capture(&self, source: Box<dyn PoseSource>, config: &PostureConfig) {
        let mut worker = self.worker.lock().await;
        if let Some(old) = worker.take() {
            old.cancel_token.cancel();
            old.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            self.clone(),
            source,
            Duration::from_millis(config.frame_interval_ms.max(1)),
            Duration::from_millis(config.capture_timeout_ms.max(1)),
            cancel_token.clone(),
        ));

        *worker = Some(CaptureWorker {
            handle,
            cancel_token,
        });
    }

    async fn stop_capture(&self) -> Result<()> {
        let Some(worker) = self.worker.lock().await.take() else {
            return Ok(());
        };
        worker.cancel_token.cancel();
        worker
            .handle
            .await
            .context("capture loop task failed to join")
    }
}
