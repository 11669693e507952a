pub mod alert;
pub mod baseline;
pub mod geometry;
pub mod monitor;
pub mod pose;
pub mod posture;
pub mod settings;
mod utils;

use std::sync::Arc;

use alert::AlertSink;
use anyhow::{Context, Result};
use log::{info, warn};
use monitor::MonitorController;
use pose::StubPoseSource;
use settings::SettingsStore;

// Sideways shoulder swing for the demo source, enough to cross the default threshold.
const DEMO_LEAN_PX: f64 = 40.0;

fn alert_sink(settings: &SettingsStore) -> Arc<dyn AlertSink> {
    #[cfg(feature = "audio")]
    {
        let alerts = settings.alerts();
        return Arc::new(alert::ChimeSink::new(
            std::time::Duration::from_millis(alerts.chime_duration_ms),
            alerts.volume,
        ));
    }

    #[cfg(not(feature = "audio"))]
    {
        let _ = settings;
        Arc::new(alert::LogAlertSink)
    }
}

/// Runs a monitoring session against the stub pose source until Ctrl-C.
/// The first frame is taken as the baseline.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    utils::logging::set_verbose(utils::logging::debug_from_env());

    info!("Backtrack starting up...");

    let settings_path = SettingsStore::default_path();
    let settings = Arc::new(SettingsStore::new(settings_path)?);
    info!("Using settings from {}", settings.path().display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        let sink = alert_sink(&settings);
        let monitor = MonitorController::new(settings, sink);
        let mut updates = monitor.subscribe();

        let source = StubPoseSource::new().with_lean(DEMO_LEAN_PX);
        monitor.start_session(Some(Box::new(source))).await?;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut calibrated = false;
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    if !calibrated && snapshot.frames > 0 {
                        calibrated = monitor.calibrate().await?;
                        continue;
                    }
                    if snapshot.session_id.is_some() {
                        info!(
                            "{}{}",
                            snapshot.display_text(),
                            if snapshot.alerting { " - Slouching!" } else { "" }
                        );
                    }
                }
                signal = &mut ctrl_c => {
                    if let Err(err) = signal {
                        warn!("failed to listen for Ctrl-C: {err}");
                    }
                    break;
                }
            }
        }

        if let Some(summary) = monitor.stop_session().await? {
            info!(
                "Session {}: {} frames, {} slouching, {} alerts",
                summary.id, summary.frames, summary.slouching_frames, summary.alerts_raised
            );
        }
        Ok::<(), anyhow::Error>(())
    })
}
