use crate::core::party::PartyId;
use crate::routing::error::RouterError;
use crate::session::accounting::Session;
use log::debug;
use std::cell::Cell;

/// Single "session active" flag shared by every routing call of one router.
///
/// `Closed -> Open -> Closed`. Opening while a session is active fails with
/// [`RouterError::Reentrant`]. The flag is released by [`SessionLock`]'s
/// `Drop`, so every exit path of a call clears it.
#[derive(Debug, Default)]
pub struct SessionGuard {
    active: Cell<bool>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.active.get()
    }

    /// Open a session accounted under `party`.
    pub fn open(&self, party: PartyId) -> Result<Session<'_>, RouterError> {
        let lock = self.lock()?;
        Ok(Session::new(party, lock))
    }

    fn lock(&self) -> Result<SessionLock<'_>, RouterError> {
        if self.active.replace(true) {
            return Err(RouterError::Reentrant);
        }
        debug!("session guard acquired");
        Ok(SessionLock { guard: self })
    }
}

/// Proof that the guard is held; releases it when dropped.
#[derive(Debug)]
pub struct SessionLock<'g> {
    guard: &'g SessionGuard,
}

impl Drop for SessionLock<'_> {
    fn drop(&mut self) {
        self.guard.active.set(false);
        debug!("session guard released");
    }
}
