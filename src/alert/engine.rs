use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Mutex,
};
use std::thread;
use std::time::Duration;

use super::chime::Chime;
use super::AlertSink;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const CHIME_FREQUENCY_HZ: f32 = 880.0;

enum AudioCommand {
    Chime,
    Stop,
}

/// Plays alert chimes on a dedicated audio thread that owns the non-Send
/// rodio stream. Haptic pulses have no device here and are logged.
pub struct ChimeSink {
    tx: Mutex<Option<Sender<AudioCommand>>>,
    chime_duration: Duration,
    volume: f32,
}

impl ChimeSink {
    pub fn new(chime_duration: Duration, volume: f32) -> Self {
        Self {
            tx: Mutex::new(None),
            chime_duration,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let chime_duration = self.chime_duration;
        let volume = self.volume;

        thread::Builder::new()
            .name("alert-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Chime => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log_warn!("chime skipped: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.set_volume(volume);
                                s.append(Chime::new(CHIME_FREQUENCY_HZ, chime_duration));
                                s.play();
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, cmd: AudioCommand) {
        let result = self
            .ensure_thread()
            .and_then(|tx| tx.send(cmd).map_err(|e| e.to_string()));
        if let Err(err) = result {
            log_warn!("alert audio unavailable: {err}");
        }
    }

    pub fn shutdown(&self) {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
    }
}

impl AlertSink for ChimeSink {
    fn chime(&self) {
        self.send(AudioCommand::Chime);
    }

    fn pulse(&self) {
        log_info!("haptic pulse (no haptic device on this host)");
    }
}

impl Drop for ChimeSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}
