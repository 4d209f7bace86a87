//! Local-media backend: plays files through rodio on a dedicated worker
//! thread. One `OutputStream` is opened once and reused across tracks.
//!
//! Commands travel over an mpsc channel; the worker publishes position and
//! duration into a shared [`ProgressHandle`] and reports lifecycle changes as
//! [`BackendEvent`]s. Progress is effectively push-based: the worker updates
//! the reading on its own tick without being asked.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{error, warn};

use crate::catalog::{MediaRef, TrackDescriptor};

use super::backend::PlaybackBackend;
use super::error::PlayerError;
use super::types::{BackendEvent, Progress, ProgressHandle, ProgressReading};

#[derive(Debug)]
enum LocalCmd {
    Load {
        path: PathBuf,
        duration: Option<Duration>,
        epoch: u64,
    },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(u8),
    Quit,
}

pub struct LocalBackend {
    tx: Sender<LocalCmd>,
    events: Receiver<BackendEvent>,
    progress: ProgressHandle,
    join: Option<JoinHandle<()>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<LocalCmd>();
        let (event_tx, events) = mpsc::channel::<BackendEvent>();
        let progress: ProgressHandle = Arc::new(Mutex::new(Progress::default()));

        let join = spawn_worker(rx, event_tx, progress.clone());

        Self {
            tx,
            events,
            progress,
            join: Some(join),
        }
    }

    fn send(&self, cmd: LocalCmd) -> Result<(), PlayerError> {
        self.tx
            .send(cmd)
            .map_err(|e| PlayerError::Backend(e.to_string()))
    }
}

impl PlaybackBackend for LocalBackend {
    fn load(&mut self, track: &TrackDescriptor, epoch: u64) -> Result<(), PlayerError> {
        let MediaRef::File(path) = &track.media else {
            return Err(PlayerError::PlaybackRejected(
                "remote entry handed to the local backend".to_string(),
            ));
        };
        self.send(LocalCmd::Load {
            path: path.clone(),
            duration: track.duration,
            epoch,
        })
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.send(LocalCmd::Play)
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.send(LocalCmd::Pause)
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.send(LocalCmd::Seek(position))
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.send(LocalCmd::SetVolume(volume.min(100)))
    }

    fn position(&self) -> Duration {
        ProgressReading::from_handle(&self.progress).position
    }

    fn duration(&self) -> Option<Duration> {
        ProgressReading::from_handle(&self.progress).duration
    }

    fn poll_events(&mut self) -> Vec<BackendEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(LocalCmd::Quit);
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

/// State the worker keeps for the currently loaded track.
struct Loaded {
    path: PathBuf,
    sink: Sink,
    epoch: u64,
    duration: Option<Duration>,
    /// When the current play stretch started; `None` while paused.
    started_at: Option<Instant>,
    /// Elapsed time accumulated across pauses and seeks.
    accumulated: Duration,
}

impl Loaded {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}

fn spawn_worker(
    rx: Receiver<LocalCmd>,
    events: Sender<BackendEvent>,
    progress: ProgressHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when the stream is dropped; noisy for
                // a TUI app.
                stream.log_on_drop(false);
                stream
            }
            Err(e) => {
                error!(error = %e, "no audio output device; playback disabled");
                degraded_loop(rx, events);
                return;
            }
        };

        let mut loaded: Option<Loaded> = None;
        let mut volume: u8 = 100;

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(LocalCmd::Load {
                    path,
                    duration,
                    epoch,
                }) => {
                    if let Some(old) = loaded.take() {
                        old.sink.stop();
                    }
                    match create_sink_at(&stream, &path, Duration::ZERO) {
                        Ok(sink) => {
                            sink.set_volume(volume as f32 / 100.0);
                            loaded = Some(Loaded {
                                path,
                                sink,
                                epoch,
                                duration,
                                started_at: None,
                                accumulated: Duration::ZERO,
                            });
                            publish(&progress, Duration::ZERO, duration);
                        }
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "load rejected");
                            publish(&progress, Duration::ZERO, None);
                            let _ = events.send(BackendEvent::Rejected { epoch });
                        }
                    }
                }
                Ok(LocalCmd::Play) => {
                    if let Some(cur) = loaded.as_mut() {
                        cur.sink.play();
                        if cur.started_at.is_none() {
                            cur.started_at = Some(Instant::now());
                        }
                        let _ = events.send(BackendEvent::Started { epoch: cur.epoch });
                    }
                }
                Ok(LocalCmd::Pause) => {
                    if let Some(cur) = loaded.as_mut() {
                        cur.sink.pause();
                        if let Some(st) = cur.started_at.take() {
                            cur.accumulated += st.elapsed();
                        }
                    }
                }
                Ok(LocalCmd::Seek(position)) => {
                    // rodio has no random access on a playing sink; rebuild
                    // the sink and skip into the decoded stream.
                    let Some(cur) = loaded.as_mut() else {
                        continue;
                    };
                    let target = match cur.duration {
                        Some(total) => position.min(total),
                        None => position,
                    };
                    let was_playing = cur.started_at.is_some();
                    cur.sink.stop();
                    match create_sink_at(&stream, &cur.path, target) {
                        Ok(sink) => {
                            sink.set_volume(volume as f32 / 100.0);
                            if was_playing {
                                sink.play();
                                cur.started_at = Some(Instant::now());
                            } else {
                                cur.started_at = None;
                            }
                            cur.sink = sink;
                            cur.accumulated = target;
                            publish(&progress, target, cur.duration);
                        }
                        Err(e) => {
                            warn!(path = %cur.path.display(), error = %e, "seek rebuild failed");
                            let epoch = cur.epoch;
                            loaded = None;
                            let _ = events.send(BackendEvent::Rejected { epoch });
                        }
                    }
                }
                Ok(LocalCmd::SetVolume(v)) => {
                    volume = v;
                    if let Some(cur) = loaded.as_ref() {
                        cur.sink.set_volume(volume as f32 / 100.0);
                    }
                }
                Ok(LocalCmd::Quit) => {
                    if let Some(cur) = loaded.take() {
                        cur.sink.stop();
                    }
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Push a progress reading and detect end-of-track.
                    let Some(cur) = loaded.as_ref() else {
                        continue;
                    };
                    if cur.started_at.is_some() && cur.sink.empty() {
                        let epoch = cur.epoch;
                        let end = cur.duration.unwrap_or_else(|| cur.elapsed());
                        publish(&progress, end, cur.duration);
                        loaded = None;
                        let _ = events.send(BackendEvent::Ended { epoch });
                        continue;
                    }
                    let mut position = cur.elapsed();
                    if let Some(total) = cur.duration {
                        position = position.min(total);
                    }
                    publish(&progress, position, cur.duration);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Fallback loop when no output device exists: every load is rejected so the
/// UI falls back to paused instead of hanging in Loading.
fn degraded_loop(rx: Receiver<LocalCmd>, events: Sender<BackendEvent>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            LocalCmd::Load { epoch, .. } => {
                let _ = events.send(BackendEvent::Rejected { epoch });
            }
            LocalCmd::Quit => break,
            _ => {}
        }
    }
}

/// Open and decode `path`, returning a paused sink positioned at `start_at`.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, PlayerError> {
    let file =
        File::open(path).map_err(|e| PlayerError::PlaybackRejected(format!("open: {e}")))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| PlayerError::PlaybackRejected(format!("decode: {e}")))?
        // `skip_duration` is the seeking primitive; `Duration::ZERO` is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

fn publish(progress: &ProgressHandle, position: Duration, duration: Option<Duration>) {
    if let Ok(mut p) = progress.lock() {
        p.position = position;
        p.duration = duration;
    }
}
