//! Render scheduler: debounced, last-submitted-wins rendering.
//!
//! DESIGN
//! ======
//! Every `schedule` call bumps an epoch and aborts the pending task, then
//! spawns a new one that sleeps for the debounce window and fires. Only the
//! last submission inside a window reaches the renderer. A render already in
//! flight when a newer submission arrives is aborted; if it gets as far as
//! committing, the epoch check discards it.
//!
//! The scheduler is the only writer of the current [`RenderResult`]. Commits
//! happen under the state lock and the [`RenderObserver`] is notified inside
//! that critical section, so observers see commits in epoch order.
//!
//! ERROR HANDLING
//! ==============
//! Renderer failures, timeouts, and an unavailable renderer all commit a
//! `Failure` result. Nothing is propagated to the caller of `schedule`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Artifact, DiagramRenderer, InitializationError, RenderError, RenderResult, RendererSettings, ThemeSettings};
use crate::config::RenderConfig;

/// Receives every committed render result.
pub trait RenderObserver: Send + Sync {
    fn render_committed(&self, result: &RenderResult);
}

struct Submission {
    source: String,
    theme: ThemeSettings,
}

#[derive(Default)]
struct SlotState {
    epoch: u64,
    pending: Option<JoinHandle<()>>,
    current: Option<RenderResult>,
    last: Option<Submission>,
}

pub struct RenderScheduler {
    renderer: Arc<dyn DiagramRenderer>,
    observer: Arc<dyn RenderObserver>,
    debounce: Duration,
    timeout: Duration,
    session: String,
    counter: AtomicU64,
    init_error: Mutex<Option<String>>,
    state: Mutex<SlotState>,
}

impl RenderScheduler {
    #[must_use]
    pub fn new(renderer: Arc<dyn DiagramRenderer>, observer: Arc<dyn RenderObserver>, config: &RenderConfig) -> Arc<Self> {
        let session = Uuid::new_v4().simple().to_string();
        Arc::new(Self {
            renderer,
            observer,
            debounce: config.debounce,
            timeout: config.timeout,
            session: session[..8].to_string(),
            counter: AtomicU64::new(0),
            init_error: Mutex::new(None),
            state: Mutex::new(SlotState::default()),
        })
    }

    /// Configure the renderer. A failure is recorded and every later render
    /// fails fast with its message; it is returned so the caller can surface it.
    ///
    /// # Errors
    ///
    /// Returns the renderer's [`InitializationError`].
    pub async fn initialize(&self, settings: &RendererSettings) -> Result<(), InitializationError> {
        let outcome = self.renderer.initialize(settings).await;
        let mut slot = self.init_error.lock().unwrap_or_else(PoisonError::into_inner);
        match &outcome {
            Ok(()) => *slot = None,
            Err(e) => {
                warn!(error = %e, "render: renderer initialization failed");
                *slot = Some(e.to_string());
            }
        }
        outcome
    }

    #[must_use]
    pub fn initialization_error(&self) -> Option<String> {
        self.init_error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Submit `source` for rendering after the debounce window. Replaces any
    /// pending submission.
    pub fn schedule(self: &Arc<Self>, source: String, theme: ThemeSettings) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.epoch += 1;
        let epoch = state.epoch;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.last = Some(Submission { source: source.clone(), theme: theme.clone() });

        let this = Arc::clone(self);
        let debounce = self.debounce;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            this.fire(epoch, source, theme).await;
        }));
        debug!(epoch, "render: scheduled");
    }

    /// Re-submit the last source and theme. Returns `false` if nothing was
    /// ever submitted.
    pub fn force_rerender(self: &Arc<Self>) -> bool {
        let last = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.last.as_ref().map(|s| (s.source.clone(), s.theme.clone()))
        };
        let Some((source, theme)) = last else {
            return false;
        };
        self.schedule(source, theme);
        true
    }

    /// The committed result, or `None` while a render is in flight or before
    /// the first one.
    #[must_use]
    pub fn current(&self) -> Option<RenderResult> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current.clone()
    }

    /// The current successful artifact, if any.
    #[must_use]
    pub fn artifact(&self) -> Option<Artifact> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current.as_ref().and_then(RenderResult::artifact).cloned()
    }

    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("diagram-{}-{n}", self.session)
    }

    async fn fire(&self, epoch: u64, source: String, theme: ThemeSettings) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.epoch != epoch {
                return;
            }
            state.current = None;
        }

        let result = if source.trim().is_empty() {
            RenderResult::Empty
        } else {
            let id = self.next_id();
            match self.render_once(&id, &source, &theme).await {
                Ok(artifact) => {
                    info!(%id, width = artifact.bounds.width, height = artifact.bounds.height, "render: success");
                    RenderResult::Success { artifact }
                }
                Err(e) => {
                    info!(%id, error = %e, "render: failure");
                    RenderResult::failure(&e, theme.theme)
                }
            }
        };

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "render: superseded result dropped");
            return;
        }
        state.pending = None;
        state.current = Some(result.clone());
        self.observer.render_committed(&result);
    }

    async fn render_once(&self, id: &str, source: &str, theme: &ThemeSettings) -> Result<Artifact, RenderError> {
        if let Some(message) = self.initialization_error() {
            return Err(RenderError::Unavailable(message));
        }
        let svg = tokio::time::timeout(self.timeout, self.renderer.render(id, source, theme))
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_secs()))??;
        Artifact::measure(id, svg)
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
