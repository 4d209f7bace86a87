//! Remote-video backend: drives an MPD daemon over its control socket.
//!
//! The daemon is an external player the process does not own: the connection
//! comes up asynchronously after startup, state changes are observed rather
//! than pushed, and progress has to be polled. The worker buffers commands
//! until the daemon is reachable (a command issued early is deferred, never
//! fatal) and polls position/duration on a fixed interval only while the
//! observed state is playing, stopping immediately on any other transition.
//! There is exactly one poll loop because there is exactly one worker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mpd::{Client, State};
use tracing::{debug, info, warn};

use crate::catalog::{MediaRef, TrackDescriptor};
use crate::config::RemoteSettings;

use super::backend::PlaybackBackend;
use super::error::PlayerError;
use super::types::{BackendEvent, Progress, ProgressHandle, ProgressReading};

/// Wakeup interval while not playing; used for reconnect attempts and
/// draining deferred commands, not for progress.
const IDLE_TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum RemoteCmd {
    Load { uri: String, epoch: u64 },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(u8),
    Quit,
}

pub struct RemoteBackend {
    tx: Sender<RemoteCmd>,
    events: Receiver<BackendEvent>,
    progress: ProgressHandle,
    join: Option<JoinHandle<()>>,
}

impl RemoteBackend {
    pub fn new(settings: RemoteSettings, poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<RemoteCmd>();
        let (event_tx, events) = mpsc::channel::<BackendEvent>();
        let progress: ProgressHandle = Arc::new(Mutex::new(Progress::default()));

        let worker = Worker {
            settings,
            poll_interval,
            events: event_tx,
            progress: progress.clone(),
            client: None,
            pending: VecDeque::new(),
            announced_ready: false,
            epoch: 0,
            observed_playing: false,
        };
        let join = thread::spawn(move || worker.run(rx));

        Self {
            tx,
            events,
            progress,
            join: Some(join),
        }
    }

    fn send(&self, cmd: RemoteCmd) -> Result<(), PlayerError> {
        self.tx
            .send(cmd)
            .map_err(|e| PlayerError::Backend(e.to_string()))
    }
}

impl PlaybackBackend for RemoteBackend {
    fn load(&mut self, track: &TrackDescriptor, epoch: u64) -> Result<(), PlayerError> {
        let MediaRef::Remote(uri) = &track.media else {
            return Err(PlayerError::PlaybackRejected(
                "local entry handed to the remote backend".to_string(),
            ));
        };
        self.send(RemoteCmd::Load {
            uri: uri.clone(),
            epoch,
        })
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.send(RemoteCmd::Play)
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.send(RemoteCmd::Pause)
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.send(RemoteCmd::Seek(position))
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.send(RemoteCmd::SetVolume(volume.min(100)))
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
        let _ = self.tx.send(RemoteCmd::Quit);
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

struct Worker {
    settings: RemoteSettings,
    poll_interval: Duration,
    events: Sender<BackendEvent>,
    progress: ProgressHandle,
    client: Option<Client>,
    /// Commands received before the daemon was reachable, replayed in order.
    pending: VecDeque<RemoteCmd>,
    announced_ready: bool,
    /// Epoch of the most recent load; stamps every emitted event.
    epoch: u64,
    observed_playing: bool,
}

impl Worker {
    fn run(mut self, rx: Receiver<RemoteCmd>) {
        loop {
            let timeout = if self.observed_playing {
                self.poll_interval
            } else {
                IDLE_TICK
            };
            match rx.recv_timeout(timeout) {
                Ok(RemoteCmd::Quit) => {
                    if let Some(client) = self.client.as_mut() {
                        let _ = client.pause(true);
                    }
                    break;
                }
                Ok(cmd) => {
                    self.pending.push_back(cmd);
                    self.drain_pending();
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.drain_pending();
                    if self.observed_playing {
                        self.poll_status();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Reconnect if needed; deferred commands stay queued until this works.
    fn ensure_connected(&mut self) -> bool {
        let healthy = self
            .client
            .as_mut()
            .map(|c| c.status().is_ok())
            .unwrap_or(false);
        if healthy {
            return true;
        }

        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        match Client::connect(&addr) {
            Ok(client) => {
                info!(%addr, "connected to mpd");
                self.client = Some(client);
                if !self.announced_ready {
                    self.announced_ready = true;
                    let _ = self.events.send(BackendEvent::Ready);
                }
                true
            }
            Err(e) => {
                debug!(%addr, error = %e, "mpd not reachable yet");
                self.client = None;
                false
            }
        }
    }

    fn drain_pending(&mut self) {
        if self.pending.is_empty() || !self.ensure_connected() {
            return;
        }
        while let Some(cmd) = self.pending.pop_front() {
            if !self.apply(cmd) {
                // Connection dropped mid-drain; remaining commands wait for
                // the next reconnect.
                break;
            }
        }
    }

    /// Apply one command. Returns false when the connection died.
    fn apply(&mut self, cmd: RemoteCmd) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        match cmd {
            RemoteCmd::Load { uri, epoch } => {
                self.epoch = epoch;
                let result = client.clear().and_then(|_| client.push(mpd::Song {
                    file: uri.clone(),
                    ..Default::default()
                }));
                match result {
                    Ok(_) => {
                        publish(&self.progress, Duration::ZERO, None);
                        true
                    }
                    Err(e) => {
                        warn!(%uri, error = %e, "mpd load rejected");
                        let _ = self.events.send(BackendEvent::Rejected { epoch });
                        self.client = None;
                        false
                    }
                }
            }
            RemoteCmd::Play => match client.play() {
                Ok(()) => {
                    self.observed_playing = true;
                    let _ = self.events.send(BackendEvent::Started { epoch: self.epoch });
                    self.poll_status();
                    true
                }
                Err(e) => {
                    warn!(error = %e, "mpd refused to play");
                    let _ = self.events.send(BackendEvent::Rejected { epoch: self.epoch });
                    self.client = None;
                    false
                }
            },
            RemoteCmd::Pause => {
                self.observed_playing = false;
                match client.pause(true) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "mpd pause failed");
                        self.client = None;
                        false
                    }
                }
            }
            RemoteCmd::Seek(position) => {
                let result = client.currentsong().and_then(|song| match song {
                    Some(song) => match song.place {
                        Some(place) => client.seek(place.id, position.as_secs_f64()),
                        None => Ok(()),
                    },
                    None => Ok(()),
                });
                match result {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "mpd seek failed");
                        self.client = None;
                        false
                    }
                }
            }
            RemoteCmd::SetVolume(v) => match client.volume(v.min(100) as i8) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "mpd volume failed");
                    self.client = None;
                    false
                }
            },
            RemoteCmd::Quit => false,
        }
    }

    /// One progress/state poll. Only called while the observed state is
    /// playing; any non-playing result stops the polling immediately.
    fn poll_status(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.observed_playing = false;
            return;
        };
        match client.status() {
            Ok(status) => {
                publish(
                    &self.progress,
                    status.elapsed.unwrap_or(Duration::ZERO),
                    status.duration,
                );
                match status.state {
                    State::Play => {}
                    State::Pause => {
                        self.observed_playing = false;
                        let _ = self.events.send(BackendEvent::Paused { epoch: self.epoch });
                    }
                    State::Stop => {
                        // With a single-song queue the daemon stops at the
                        // end of the track.
                        self.observed_playing = false;
                        let _ = self.events.send(BackendEvent::Ended { epoch: self.epoch });
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "mpd status failed");
                self.client = None;
                self.observed_playing = false;
            }
        }
    }
}

fn publish(progress: &ProgressHandle, position: Duration, duration: Option<Duration>) {
    if let Ok(mut p) = progress.lock() {
        p.position = position;
        p.duration = duration;
    }
}
