//! # Task Registry
//!
//! One generic registry, parameterized by the actor's result type, replaces
//! per-kind bookkeeping of thread handles. It is the only place actor tasks
//! are spawned, joined and forgotten.

use crate::actors::FactoryActor;
use crate::error::FactoryError;
use crate::model::ActorId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, info_span, warn, Instrument};

type Handle<R> = JoinHandle<Result<R, FactoryError>>;

/// Where a registered id stands.
enum Slot<R> {
    Running(Handle<R>),
    /// A `finish` call holds the handle and is waiting on it.
    Joining,
}

/// Maps caller-chosen ids to in-flight actor tasks of one kind.
///
/// An id stays registered from `launch` until a `finish` call has actually
/// collected its result, so the result is never lost and the id cannot be
/// reused while its task may still be running. Launching an id that is
/// still registered is rejected.
pub struct TaskRegistry<R> {
    kind: &'static str,
    handles: Mutex<HashMap<ActorId, Slot<R>>>,
}

impl<R> TaskRegistry<R> {
    fn handles(&self) -> MutexGuard<'_, HashMap<ActorId, Slot<R>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Debug + Send + 'static> TaskRegistry<R> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Spawns `actor` on the current Tokio runtime under `id`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn launch<A>(&self, id: ActorId, actor: A) -> Result<(), FactoryError>
    where
        A: FactoryActor<Output = R>,
    {
        let kind = self.kind;
        let mut handles = self.handles();
        let slot = match handles.entry(id) {
            Entry::Occupied(_) => {
                warn!(kind, %id, "Actor already running");
                return Err(FactoryError::DuplicateActor { kind, id });
            }
            Entry::Vacant(slot) => slot,
        };

        let span = info_span!("actor", kind, %id);
        let task = async move {
            info!("Actor started");
            let result = actor.run().await;
            match &result {
                Ok(output) => info!(?output, "Actor finished"),
                Err(e) => warn!(error = %e, "Actor failed"),
            }
            result
        };
        slot.insert(Slot::Running(tokio::spawn(task.instrument(span))));
        Ok(())
    }

    /// Waits for the task registered under `id` and returns its result.
    ///
    /// Finishing an id that is unknown, already finished, or being finished
    /// by another caller fails with [`FactoryError::UnknownActor`].
    ///
    /// Cancel safe: if the returned future is dropped before the task
    /// completes, the task stays registered and can be finished again.
    pub async fn finish(&self, id: ActorId) -> Result<R, FactoryError> {
        let kind = self.kind;
        let Some(mut joining) = self.check_out(id) else {
            warn!(kind, %id, "Finish for unknown actor");
            return Err(FactoryError::UnknownActor { kind, id });
        };
        let joined = joining
            .wait()
            .await
            .ok_or(FactoryError::UnknownActor { kind, id })?;
        joined.map_err(|e| FactoryError::ActorFailed {
            kind,
            id,
            reason: e.to_string(),
        })?
    }

    /// Marks `id` as being joined and hands its handle to a [`Joining`] guard.
    fn check_out(&self, id: ActorId) -> Option<Joining<'_, R>> {
        let mut handles = self.handles();
        let slot = handles.get_mut(&id)?;
        match std::mem::replace(slot, Slot::Joining) {
            Slot::Running(handle) => Some(Joining {
                registry: self,
                id,
                handle: Some(handle),
            }),
            Slot::Joining => None,
        }
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.handles().contains_key(&id)
    }

    pub fn in_flight(&self) -> usize {
        self.handles().len()
    }
}

/// A checked-out handle. Dropping it unregisters the id once the task has
/// been joined, or puts the handle back if the wait was abandoned.
struct Joining<'a, R> {
    registry: &'a TaskRegistry<R>,
    id: ActorId,
    handle: Option<Handle<R>>,
}

impl<R> Joining<'_, R> {
    /// Joins the task. `None` once the handle has already been consumed.
    async fn wait(&mut self) -> Option<Result<Result<R, FactoryError>, JoinError>> {
        let joined = self.handle.as_mut()?.await;
        self.handle = None;
        Some(joined)
    }
}

impl<R> Drop for Joining<'_, R> {
    fn drop(&mut self) {
        let mut handles = self.registry.handles();
        match self.handle.take() {
            Some(handle) => {
                debug!(kind = self.registry.kind, id = %self.id, "Finish abandoned, actor stays registered");
                handles.insert(self.id, Slot::Running(handle));
            }
            None => {
                handles.remove(&self.id);
            }
        }
    }
}
