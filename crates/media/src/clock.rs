//! The playback clock streams synchronize against, and the [TimerObserver]
//! hooks that let streams react to the clock being played, paused or stopped.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::time::PlaybackTime;

/// Something that knows the current playback position.
pub trait PlaybackClock {
    /// The current playback position.
    fn offset(&self) -> PlaybackTime;
}

impl<C: PlaybackClock + ?Sized> PlaybackClock for &C {
    fn offset(&self) -> PlaybackTime {
        (**self).offset()
    }
}

impl<C: PlaybackClock + ?Sized> PlaybackClock for std::rc::Rc<C> {
    fn offset(&self) -> PlaybackTime {
        (**self).offset()
    }
}

impl<C: PlaybackClock + ?Sized> PlaybackClock for std::sync::Arc<C> {
    fn offset(&self) -> PlaybackTime {
        (**self).offset()
    }
}

/// The state a [Timer] is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimerStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Hooks invoked when a [Timer] changes [TimerStatus]. Every hook gets the
/// clock and the status the timer was in *before* the transition.
///
/// All hooks do nothing by default.
pub trait TimerObserver {
    /// Called right before the timer starts playing.
    fn will_play(&mut self, _clock: &dyn PlaybackClock, _previous: TimerStatus) {}

    /// Called right after the timer started playing.
    fn did_play(&mut self, _clock: &dyn PlaybackClock, _previous: TimerStatus) {}

    /// Called right after the timer was paused.
    fn did_pause(&mut self, _clock: &dyn PlaybackClock, _previous: TimerStatus) {}

    /// Called right after the timer was stopped (and its offset was reset).
    fn did_stop(&mut self, _clock: &dyn PlaybackClock, _previous: TimerStatus) {}
}

/// A wall-clock [PlaybackClock] that can be played, paused and stopped.
///
/// The timer doesn't own its observers; they're passed to each transition.
/// Transitions to the status the timer is already in do nothing (and notify
/// nobody).
#[derive(Debug, Default)]
pub struct Timer {
    state: Mutex<TimerState>,
}

#[derive(Debug, Default)]
struct TimerState {
    status: TimerStatus,
    /// Playback time accumulated before the last time the timer started
    /// playing.
    elapsed: Duration,
    /// When the timer last started playing (only set while playing).
    started_at: Option<Instant>,
}

impl TimerState {
    fn offset(&self) -> Duration {
        self.elapsed + self.started_at.map_or(Duration::ZERO, |start| start.elapsed())
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.lock().status
    }

    /// Start (or resume) playback.
    pub fn play(&self, observers: &mut [&mut dyn TimerObserver]) {
        let previous = self.status();
        if previous == TimerStatus::Playing {
            return;
        }

        for observer in observers.iter_mut() {
            observer.will_play(self, previous);
        }

        {
            let mut state = self.lock();
            state.status = TimerStatus::Playing;
            state.started_at = Some(Instant::now());
        }

        for observer in observers.iter_mut() {
            observer.did_play(self, previous);
        }
    }

    /// Pause playback, keeping the current offset. Does nothing unless the
    /// timer is playing.
    pub fn pause(&self, observers: &mut [&mut dyn TimerObserver]) {
        let previous = self.status();
        if previous != TimerStatus::Playing {
            return;
        }

        {
            let mut state = self.lock();
            state.elapsed = state.offset();
            state.started_at = None;
            state.status = TimerStatus::Paused;
        }

        for observer in observers.iter_mut() {
            observer.did_pause(self, previous);
        }
    }

    /// Stop playback and rewind the offset to zero.
    pub fn stop(&self, observers: &mut [&mut dyn TimerObserver]) {
        let previous = self.status();
        if previous == TimerStatus::Stopped {
            return;
        }

        *self.lock() = TimerState::default();

        for observer in observers.iter_mut() {
            observer.did_stop(self, previous);
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlaybackClock for Timer {
    fn offset(&self) -> PlaybackTime {
        PlaybackTime::from_duration(self.lock().offset())
    }
}
