// src/quiz/registry.rs

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::quiz::controller::QuizController;

type SlotMap = Mutex<HashMap<Uuid, Arc<Mutex<SessionSlot>>>>;

/// Sessions untouched for this long are dropped when a new one is opened.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("session {0} does not exist")]
    UnknownSession(Uuid),

    #[error("session {0} is still generating a quiz")]
    Busy(Uuid),
}

#[derive(Debug)]
struct SessionSlot {
    controller: QuizController,
    busy: bool,
    last_used: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            controller: QuizController::new(),
            busy: false,
            last_used: Instant::now(),
        }
    }
}

/// One quiz controller per client session, keyed by session id.
///
/// Locks are only held for the length of a single controller operation and
/// never across an await.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Arc<SlotMap>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a session busy while its quiz is being generated.
    ///
    /// Opens a new session when `id` is `None`; that session is removed again
    /// if the guard is dropped without `finish`. Fails with `Busy` if another
    /// generation for the same session is still outstanding.
    pub fn begin_generation(&self, id: Option<Uuid>) -> Result<GenerationGuard, RegistryError> {
        let (id, slot, fresh) = match id {
            Some(id) => (id, self.slot(id)?, false),
            None => {
                let (id, slot) = self.open();
                (id, slot, true)
            }
        };

        {
            let mut guard = slot.lock();
            if guard.busy {
                return Err(RegistryError::Busy(id));
            }
            guard.busy = true;
            guard.last_used = Instant::now();
        }

        Ok(GenerationGuard {
            id,
            slot,
            fresh,
            sessions: Arc::downgrade(&self.sessions),
        })
    }

    /// Runs one controller operation against an idle session.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        op: impl FnOnce(&mut QuizController) -> R,
    ) -> Result<R, RegistryError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        if guard.busy {
            return Err(RegistryError::Busy(id));
        }
        guard.last_used = Instant::now();
        Ok(op(&mut guard.controller))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn slot(&self, id: Uuid) -> Result<Arc<Mutex<SessionSlot>>, RegistryError> {
        self.sessions
            .lock()
            .get(&id)
            .cloned()
            .ok_or(RegistryError::UnknownSession(id))
    }

    fn open(&self) -> (Uuid, Arc<Mutex<SessionSlot>>) {
        let mut sessions = self.sessions.lock();

        let before = sessions.len();
        sessions.retain(|_, slot| {
            let slot = slot.lock();
            slot.busy || slot.last_used.elapsed() < SESSION_IDLE_TTL
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} idle quiz sessions", pruned);
        }

        let id = Uuid::new_v4();
        let slot = Arc::new(Mutex::new(SessionSlot::new()));
        sessions.insert(id, slot.clone());
        tracing::info!("Opened quiz session {}", id);
        (id, slot)
    }
}

/// Held while a quiz is generated for a session. Dropping it clears the busy
/// flag whether or not a quiz was started, and forgets a session that never
/// got one.
#[derive(Debug)]
pub struct GenerationGuard {
    id: Uuid,
    slot: Arc<Mutex<SessionSlot>>,
    fresh: bool,
    sessions: Weak<SlotMap>,
}

impl GenerationGuard {
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Hands the generated questions to the session's controller.
    pub fn finish<R>(mut self, op: impl FnOnce(&mut QuizController) -> R) -> R {
        self.fresh = false;
        let mut slot = self.slot.lock();
        slot.last_used = Instant::now();
        op(&mut slot.controller)
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.slot.lock().busy = false;

        // The slot lock is released above; `open` takes the map lock first.
        if self.fresh {
            if let Some(sessions) = self.sessions.upgrade() {
                sessions.lock().remove(&self.id);
                tracing::debug!("Discarded quiz session {} that never started", self.id);
            }
        }
    }
}
