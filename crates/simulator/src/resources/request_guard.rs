//! RAII guard enforcing one outstanding backend request per session.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use uuid::Uuid;

use events::{Event, EventBus};

/// Holds a session's busy flag for the lifetime of one request.
///
/// The flag is cleared on drop, so an early return or a panic in the caller
/// cannot leave the session stuck in a busy state.
///
/// # Example
///
/// ```ignore
/// let _guard = RequestGuard::acquire(&self.busy, self.id, self.events.as_ref())
///     .ok_or(SimulatorError::RequestInFlight(self.id))?;
/// // ... await the backend ...
/// // flag released here
/// ```
pub struct RequestGuard<'a> {
    flag: &'a AtomicBool,
    session_id: Uuid,
    events: Option<&'a EventBus>,
}

impl<'a> RequestGuard<'a> {
    /// Take the flag, or `None` when another request already holds it.
    pub fn acquire(flag: &'a AtomicBool, session_id: Uuid, events: Option<&'a EventBus>) -> Option<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(session_id = %session_id, "Request rejected, session busy");
            return None;
        }

        if let Some(bus) = events {
            bus.emit(Event::BusyChanged {
                session_id,
                busy: true,
            });
        }

        Some(Self {
            flag,
            session_id,
            events,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);

        if let Some(bus) = self.events {
            bus.emit(Event::BusyChanged {
                session_id: self.session_id,
                busy: false,
            });
        }
    }
}
