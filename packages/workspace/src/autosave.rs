//! Debounced autosave.
//!
//! Every edit calls [`Autosave::touch`], which (re)arms an idle timer. When
//! the timer runs out without another edit the document is saved. Leaving a
//! document either flushes the pending save or explicitly discards it.

use crate::errors::SessionError;
use crate::session::{DocumentSession, SaveReport};
use crate::store::BlockStore;
use courseweave_editor::{Mutation, MutationResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

struct PendingSave {
    token: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Timer {
    next_token: u64,
    pending: Option<PendingSave>,
}

pub struct Autosave<S> {
    session: Arc<DocumentSession<S>>,
    delay: Duration,
    timer: Arc<Mutex<Timer>>,
}

impl<S: BlockStore + 'static> Autosave<S> {
    pub fn new(session: Arc<DocumentSession<S>>, delay: Duration) -> Self {
        Self {
            session,
            delay,
            timer: Arc::new(Mutex::new(Timer::default())),
        }
    }

    pub fn session(&self) -> &Arc<DocumentSession<S>> {
        &self.session
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Apply an edit and re-arm the timer
    pub async fn apply(&self, mutation: Mutation) -> Result<MutationResult, SessionError> {
        let result = self.session.apply(mutation).await?;
        self.touch().await;
        Ok(result)
    }

    pub async fn is_pending(&self) -> bool {
        self.timer.lock().await.pending.is_some()
    }

    /// Restart the idle timer
    pub async fn touch(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(previous) = timer.pending.take() {
            previous.handle.abort();
        }

        timer.next_token += 1;
        let token = timer.next_token;

        let session = self.session.clone();
        let shared = self.timer.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Claim the slot; a touch or flush in the meantime owns it now
            {
                let mut timer = shared.lock().await;
                let ours = timer.pending.as_ref().map_or(false, |pending| pending.token == token);
                if !ours {
                    return;
                }
                timer.pending = None;
            }

            debug!(doc_id = session.doc_id(), "Autosave fired");
            if let Err(err) = session.save().await {
                error!(doc_id = session.doc_id(), %err, "Autosave failed");
            }
        });

        timer.pending = Some(PendingSave { token, handle });
    }

    /// Cancel the timer and save now. `None` when there was nothing to save.
    pub async fn flush(&self) -> Result<Option<SaveReport>, SessionError> {
        let pending = self.cancel().await;
        if !pending && !self.session.has_unsaved_changes().await {
            return Ok(None);
        }
        self.session.save().await.map(Some)
    }

    /// Cancel the timer without saving. True when a save was pending.
    pub async fn discard(&self) -> bool {
        let dropped = self.cancel().await;
        if dropped {
            debug!(doc_id = self.session.doc_id(), "Discarded pending autosave");
        }
        dropped
    }

    pub async fn close(&self) -> Result<Option<SaveReport>, SessionError> {
        self.flush().await
    }

    async fn cancel(&self) -> bool {
        match self.timer.lock().await.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }
}
