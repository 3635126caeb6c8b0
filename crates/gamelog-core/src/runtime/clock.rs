// crates/gamelog-core/src/runtime/clock.rs
// ============================================================================
// Module: Clocks
// Description: Wall-clock and controllable clock implementations.
// Purpose: Supply server-assigned timestamps through the Clock interface.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! [`SystemClock`] reads the UTC wall clock and is the only place the crate
//! does so. [`FixedClock`] returns a settable instant for deterministic tests
//! and replays.

use std::sync::Mutex;
use std::sync::PoisonError;

use time::Duration;
use time::OffsetDateTime;

use crate::core::Timestamp;
use crate::interfaces::Clock;

/// Wall clock returning the current UTC time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(OffsetDateTime::now_utc())
    }
}

/// Clock returning a caller-controlled instant.
#[derive(Debug)]
pub struct FixedClock {
    /// Current instant.
    current: Mutex<Timestamp>,
}

impl FixedClock {
    /// Creates a clock pinned at `start`.
    #[must_use]
    pub const fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Moves the clock to `value`.
    pub fn set(&self, value: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Advances the clock by `step`.
    pub fn advance(&self, step: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Timestamp::new(guard.as_offset_date_time() + step);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
