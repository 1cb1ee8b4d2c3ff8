use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Persisted form of the event clock. All values are Unix milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClockState {
    /// When the clock was last resumed.
    pub start_time: i64,
    /// Elapsed time accumulated before the last resume.
    pub pause_time: i64,
    pub running: bool,
}

/// Pausable elapsed-time counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    state: ClockState,
}

impl Clock {
    pub fn from_state(state: ClockState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Start or resume counting at `now`. No-op when already running.
    pub fn resume_at(&mut self, now: i64) {
        if self.state.running {
            return;
        }
        self.state.start_time = now;
        self.state.running = true;
    }

    /// Stop counting at `now`, folding the running segment into `pause_time`.
    pub fn pause_at(&mut self, now: i64) {
        if !self.state.running {
            return;
        }
        self.state.pause_time += (now - self.state.start_time).max(0);
        self.state.running = false;
    }

    /// Elapsed milliseconds as of `now`.
    pub fn duration_at(&self, now: i64) -> i64 {
        if self.state.running {
            self.state.pause_time + (now - self.state.start_time).max(0)
        } else {
            self.state.pause_time
        }
    }

    pub fn reset(&mut self) {
        self.state = ClockState::default();
    }
}

/// The event clock shared between request handlers.
#[derive(Debug, Default)]
pub struct SharedClock {
    inner: Mutex<Clock>,
}

impl SharedClock {
    pub fn new(state: ClockState) -> Self {
        Self {
            inner: Mutex::new(Clock::from_state(state)),
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Replace the whole state, e.g. after reloading it from the store.
    pub fn restore(&self, state: ClockState) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Clock::from_state(state);
    }

    pub fn duration(&self) -> i64 {
        let clock = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        clock.duration_at(Self::now())
    }

    pub fn snapshot(&self) -> (ClockState, i64) {
        let clock = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (clock.state(), clock.duration_at(Self::now()))
    }
}
