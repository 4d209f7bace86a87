use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::{BackendKind, Catalog, MediaRef, TrackDescriptor};

use super::backend::PlaybackBackend;
use super::controller::PlayerController;
use super::error::PlayerError;
use super::types::{BackendEvent, Phase, TransportState};

fn track(index: usize, title: &str) -> TrackDescriptor {
    TrackDescriptor {
        index,
        media: MediaRef::File(PathBuf::from(format!("/tmp/{title}.mp3"))),
        title: title.to_string(),
        artist: format!("{title} artist"),
        artwork: None,
        duration: Some(Duration::from_secs(200)),
    }
}

fn catalog(titles: &[&str]) -> Catalog {
    let tracks = titles
        .iter()
        .enumerate()
        .map(|(i, t)| track(i, t))
        .collect();
    Catalog::new(tracks, BackendKind::Local)
}

/// What the mock backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load { title: String, epoch: u64 },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(u8),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    queued_events: Vec<BackendEvent>,
    duration: Option<Duration>,
    position: Duration,
    reject_play: bool,
}

/// Recording backend: captures every command and replays injected events.
#[derive(Clone, Default)]
struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    fn with_duration(secs: u64) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().duration = Some(Duration::from_secs(secs));
        mock
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn last_call(&self) -> Option<Call> {
        self.state.lock().unwrap().calls.last().cloned()
    }

    fn inject(&self, event: BackendEvent) {
        self.state.lock().unwrap().queued_events.push(event);
    }
}

impl PlaybackBackend for MockBackend {
    fn load(&mut self, track: &TrackDescriptor, epoch: u64) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Load {
            title: track.title.clone(),
            epoch,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let mut s = self.state.lock().unwrap();
        if s.reject_play {
            return Err(PlayerError::PlaybackRejected("test".to_string()));
        }
        s.calls.push(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Pause);
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.state.lock().unwrap().calls.push(Call::Seek(position));
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::SetVolume(volume));
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().unwrap().duration
    }

    fn poll_events(&mut self) -> Vec<BackendEvent> {
        std::mem::take(&mut self.state.lock().unwrap().queued_events)
    }

    fn shutdown(&mut self) {}
}

fn controller_with(titles: &[&str], mock: &MockBackend) -> PlayerController {
    PlayerController::new(catalog(titles), Box::new(mock.clone()), 100)
}

fn current(transport: &TransportState) -> Option<usize> {
    transport.current
}

#[test]
fn select_track_updates_transport_before_backend_confirms() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B", "C"], &mock);

    ctl.select_track(1).unwrap();

    // Optimistic: current + phase set even though no event arrived yet.
    assert_eq!(current(ctl.transport()), Some(1));
    assert_eq!(ctl.transport().phase, Phase::Loading);
    assert!(ctl.transport().is_playing());

    // Backend saw load then play, in that order.
    let calls = mock.calls();
    assert_eq!(
        calls[1],
        Call::Load {
            title: "B".to_string(),
            epoch: 1
        }
    );
    assert_eq!(calls[2], Call::Play);
}

#[test]
fn select_track_out_of_range_is_invalid_index() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A"], &mock);
    assert!(matches!(
        ctl.select_track(3),
        Err(PlayerError::InvalidIndex { index: 3, len: 1 })
    ));
    assert_eq!(ctl.transport().phase, Phase::Idle);
}

#[test]
fn started_event_moves_loading_to_playing() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A"], &mock);
    ctl.select_track(0).unwrap();

    mock.inject(BackendEvent::Started { epoch: 1 });
    ctl.pump_events();
    assert_eq!(ctl.transport().phase, Phase::Playing);
}

#[test]
fn next_and_previous_wrap_around() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B", "C"], &mock);

    ctl.select_track(2).unwrap();
    ctl.next();
    assert_eq!(current(ctl.transport()), Some(0));

    ctl.previous();
    assert_eq!(current(ctl.transport()), Some(2));
}

#[test]
fn next_and_previous_wrap_on_single_track_catalog() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["Only"], &mock);

    ctl.select_track(0).unwrap();
    ctl.next();
    assert_eq!(current(ctl.transport()), Some(0));
    ctl.previous();
    assert_eq!(current(ctl.transport()), Some(0));
}

#[test]
fn next_from_idle_selects_first_previous_selects_last() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B", "C"], &mock);

    ctl.next();
    assert_eq!(current(ctl.transport()), Some(0));

    let mock2 = MockBackend::default();
    let mut ctl2 = controller_with(&["A", "B", "C"], &mock2);
    ctl2.previous();
    assert_eq!(current(ctl2.transport()), Some(2));
}

#[test]
fn navigation_on_empty_catalog_is_a_noop() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&[], &mock);
    ctl.next();
    ctl.previous();
    ctl.toggle_play();
    assert_eq!(ctl.transport().phase, Phase::Idle);
    assert_eq!(current(ctl.transport()), None);
}

#[test]
fn ended_auto_advances_and_stays_playing() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B", "C"], &mock);

    ctl.select_track(1).unwrap(); // epoch 1
    mock.inject(BackendEvent::Started { epoch: 1 });
    ctl.pump_events();

    mock.inject(BackendEvent::Ended { epoch: 1 });
    ctl.pump_events();

    assert_eq!(current(ctl.transport()), Some(2));
    assert!(ctl.transport().is_playing());
}

#[test]
fn ended_on_last_track_wraps_to_first() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B", "C"], &mock);

    ctl.select_track(2).unwrap();
    mock.inject(BackendEvent::Started { epoch: 1 });
    ctl.pump_events();
    mock.inject(BackendEvent::Ended { epoch: 1 });
    ctl.pump_events();

    assert_eq!(current(ctl.transport()), Some(0));
    assert!(ctl.transport().is_playing());
}

#[test]
fn stale_epoch_events_are_dropped() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B"], &mock);

    ctl.select_track(0).unwrap(); // epoch 1
    ctl.select_track(1).unwrap(); // epoch 2, first load now stale

    // Late confirmation and ended for the first load must not advance or
    // change phase.
    mock.inject(BackendEvent::Ended { epoch: 1 });
    ctl.pump_events();
    assert_eq!(current(ctl.transport()), Some(1));
    assert_eq!(ctl.transport().phase, Phase::Loading);

    mock.inject(BackendEvent::Started { epoch: 2 });
    ctl.pump_events();
    assert_eq!(ctl.transport().phase, Phase::Playing);
}

#[test]
fn rejected_play_falls_back_to_paused_and_keeps_selection() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A"], &mock);

    ctl.select_track(0).unwrap();
    mock.inject(BackendEvent::Rejected { epoch: 1 });
    ctl.pump_events();

    assert_eq!(ctl.transport().phase, Phase::Paused);
    assert_eq!(current(ctl.transport()), Some(0));
    assert!(!ctl.transport().is_playing());
}

#[test]
fn synchronous_play_error_also_falls_back_to_paused() {
    let mock = MockBackend::default();
    mock.state.lock().unwrap().reject_play = true;
    let mut ctl = controller_with(&["A"], &mock);

    ctl.select_track(0).unwrap();
    assert_eq!(ctl.transport().phase, Phase::Paused);
    assert_eq!(current(ctl.transport()), Some(0));
}

#[test]
fn toggle_play_flips_phase_and_issues_backend_commands() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A"], &mock);
    ctl.select_track(0).unwrap();
    mock.inject(BackendEvent::Started { epoch: 1 });
    ctl.pump_events();

    ctl.toggle_play();
    assert_eq!(ctl.transport().phase, Phase::Paused);
    assert_eq!(mock.last_call(), Some(Call::Pause));

    ctl.toggle_play();
    assert_eq!(ctl.transport().phase, Phase::Playing);
    assert_eq!(mock.last_call(), Some(Call::Play));
}

#[test]
fn seek_commit_converts_fraction_to_absolute_position() {
    let mock = MockBackend::with_duration(200);
    let mut ctl = controller_with(&["A"], &mock);
    ctl.select_track(0).unwrap();

    ctl.seek_start();
    assert!(ctl.transport().scrubbing);

    ctl.seek_commit(0.5);
    assert!(!ctl.transport().scrubbing);
    assert_eq!(mock.last_call(), Some(Call::Seek(Duration::from_secs(100))));
}

#[test]
fn seek_commit_without_duration_only_clears_scrubbing() {
    let mock = MockBackend::default(); // duration unknown
    let mut ctl = controller_with(&["A"], &mock);
    ctl.select_track(0).unwrap();

    ctl.seek_start();
    ctl.seek_commit(0.5);
    assert!(!ctl.transport().scrubbing);
    assert!(!matches!(mock.last_call(), Some(Call::Seek(_))));
}

#[test]
fn seek_drag_is_display_only_and_clamped() {
    let mock = MockBackend::with_duration(100);
    let mut ctl = controller_with(&["A"], &mock);
    ctl.select_track(0).unwrap();

    let calls_before = mock.calls().len();
    ctl.seek_start();
    ctl.seek_drag(1.5);
    assert_eq!(ctl.transport().scrub_fraction, 1.0);
    ctl.seek_drag(-0.2);
    assert_eq!(ctl.transport().scrub_fraction, 0.0);
    // No backend traffic while dragging.
    assert_eq!(mock.calls().len(), calls_before);

    ctl.seek_cancel();
    assert!(!ctl.transport().scrubbing);
    assert_eq!(mock.calls().len(), calls_before);
}

#[test]
fn set_volume_clamps_before_forwarding() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A"], &mock);

    ctl.set_volume(150);
    assert_eq!(ctl.transport().volume, 100);
    assert_eq!(mock.last_call(), Some(Call::SetVolume(100)));

    ctl.set_volume(-20);
    assert_eq!(ctl.transport().volume, 0);
    assert_eq!(mock.last_call(), Some(Call::SetVolume(0)));
}

#[test]
fn close_resets_to_idle_and_invalidates_in_flight_confirmations() {
    let mock = MockBackend::default();
    let mut ctl = controller_with(&["A", "B"], &mock);
    ctl.select_track(0).unwrap(); // epoch 1

    ctl.close();
    assert_eq!(ctl.transport().phase, Phase::Idle);
    assert_eq!(current(ctl.transport()), None);

    // The old load's confirmation is now stale.
    mock.inject(BackendEvent::Started { epoch: 1 });
    ctl.pump_events();
    assert_eq!(ctl.transport().phase, Phase::Idle);
}
