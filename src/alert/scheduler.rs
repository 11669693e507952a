use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{AlertConfig, AlertSink};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Runs at most one alert cycle at a time.
///
/// While slouching, the sink chimes every `chime_gap` and pulses every
/// `pulse_interval`. Clearing cancels any pending repeat immediately. A
/// new cycle never chimes sooner than `chime_gap` after the previous
/// cycle's last chime.
pub struct AlertScheduler {
    sink: Arc<dyn AlertSink>,
    config: AlertConfig,
    last_chime: Arc<Mutex<Option<Instant>>>,
    cycle: Option<(JoinHandle<()>, CancellationToken)>,
}

impl AlertScheduler {
    pub fn new(sink: Arc<dyn AlertSink>, config: AlertConfig) -> Self {
        Self {
            sink,
            config,
            last_chime: Arc::new(Mutex::new(None)),
            cycle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.cycle.is_some()
    }

    /// Must be called from within a tokio runtime.
    pub fn set_slouching(&mut self, slouching: bool) {
        if !self.config.enabled {
            return;
        }

        match (slouching, self.cycle.is_some()) {
            (true, false) => self.start_cycle(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    pub fn stop(&mut self) {
        if let Some((handle, token)) = self.cycle.take() {
            token.cancel();
            drop(handle);
            self.sink.cleared();
            log_info!("alert cycle stopped");
        }
    }

    fn start_cycle(&mut self) {
        let token = CancellationToken::new();
        let handle = tokio::spawn(alert_cycle(
            Arc::clone(&self.sink),
            self.config.clone(),
            Arc::clone(&self.last_chime),
            token.clone(),
        ));
        self.cycle = Some((handle, token));
        log_info!("alert cycle started");
    }
}

impl Drop for AlertScheduler {
    fn drop(&mut self) {
        if let Some((_, token)) = self.cycle.take() {
            token.cancel();
        }
    }
}

async fn alert_cycle(
    sink: Arc<dyn AlertSink>,
    config: AlertConfig,
    last_chime: Arc<Mutex<Option<Instant>>>,
    cancel_token: CancellationToken,
) {
    let gap = config.chime_gap();
    let start = Instant::now();

    let mut next_chime = match last_chime.lock().ok().and_then(|g| *g) {
        Some(at) if start.saturating_duration_since(at) < gap => at + gap,
        _ => start,
    };

    let pulse_interval = config.pulse_interval();
    let mut pulses = time::interval_at(start + pulse_interval, pulse_interval);
    pulses.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = time::sleep_until(next_chime) => {
                let now = Instant::now();
                sink.chime();
                if let Ok(mut guard) = last_chime.lock() {
                    *guard = Some(now);
                }
                next_chime = now + gap;
                log_debug!("chime played, next in {}ms", gap.as_millis());
            }
            _ = pulses.tick(), if config.haptics => {
                sink.pulse();
            }
        }
    }
}
