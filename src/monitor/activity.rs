use super::state::FactoryState;
use super::Monitor;
use crate::model::Item;
use std::fmt::Display;
use std::sync::Arc;

/// Actor kinds whose presence reserves the store against simple sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Thief,
    CompanyBuyer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Thief => write!(f, "thief"),
            Role::CompanyBuyer => write!(f, "company buyer"),
        }
    }
}

/// Guard tracking an active thief or company buyer.
///
/// The counter is incremented when the guard is created and decremented
/// exactly once: inside the actor's final critical section through
/// [`release`](Self::release), or on drop if the actor is abandoned.
pub struct ActivityGuard<P: Item> {
    monitor: Arc<Monitor<P>>,
    role: Role,
    released: bool,
}

impl<P: Item> ActivityGuard<P> {
    pub(crate) fn enter(monitor: Arc<Monitor<P>>, role: Role) -> Self {
        // Entering only blocks other actors, nobody needs waking.
        monitor.lock().enter(role);
        Self {
            monitor,
            role,
            released: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The monitor whose counter this guard holds.
    pub(crate) fn monitor(&self) -> &Arc<Monitor<P>> {
        &self.monitor
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Ends the activity inside the caller's critical section.
    pub(crate) fn release(&mut self, state: &mut FactoryState<P>) {
        if !self.released {
            state.leave(self.role);
            self.released = true;
        }
    }
}

impl<P: Item> Drop for ActivityGuard<P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let role = self.role;
        self.monitor.mutate(|state| state.leave(role));
        self.released = true;
    }
}
