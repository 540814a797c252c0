//! Editor service: the orchestrator behind every user-facing operation.
//!
//! DESIGN
//! ======
//! The editor is the only writer of the diagram source. Source, theme, and
//! grid live in one `Document` behind one lock, and every mutation hands
//! its render to the scheduler before the lock is released, so the last
//! scheduled render always matches the last written source and theme.
//! Render outcomes come back through [`Surface`], the scheduler's observer,
//! which owns the error banner, the viewport, and the event channel.
//!
//! Generation requests take a sequence number once they pass validation.
//! Streamed partials and final results from any request other than the
//! latest are dropped. Each current partial becomes the source (the render
//! debounce coalesces them); a failure after partials puts the earlier
//! source back.
//!
//! ERROR HANDLING
//! ==============
//! Failures are caught here and turned into error-banner updates plus a
//! transient notification. Typed errors are still returned so the HTTP
//! layer can answer with a code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use super::events::{EditorEvent, ErrorState, GridStyle, NotificationLevel, SourceOrigin};
use super::preferences::{Preferences, PreferencesSummary};
use crate::config::RenderConfig;
use crate::db::store::PrefsError;
use crate::export::{self, ExportError, ExportFormat, ExportOutput};
use crate::frame::ErrorCode;
use crate::llm::prompt::build_fix_prompt;
use crate::llm::{DiagramGenerator, GenerationError, GenerationRequest, ProviderId};
use crate::render::{
    Artifact, Bounds, DiagramRenderer, InitializationError, RenderObserver, RenderResult, RenderScheduler,
    RendererSettings, Theme, ThemeSettings,
};
use crate::viewport::{ViewportController, ViewportState};

const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// SURFACE
// =============================================================================

/// Error banner, viewport, and event fan-out. Shared with the scheduler.
pub struct Surface {
    error: Mutex<ErrorState>,
    viewport: Mutex<ViewportController>,
    events: broadcast::Sender<EditorEvent>,
}

impl Surface {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { error: Mutex::new(ErrorState::default()), viewport: Mutex::new(ViewportController::new()), events }
    }

    fn emit(&self, event: EditorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>, code: Option<&'static str>) {
        self.emit(EditorEvent::Notification { level, message: message.into(), code });
    }

    fn set_error(&self, next: ErrorState) {
        let changed = {
            let mut error = self.error.lock().unwrap_or_else(PoisonError::into_inner);
            if *error == next {
                false
            } else {
                *error = next.clone();
                true
            }
        };
        if changed {
            self.emit(EditorEvent::ErrorChanged { error: next });
        }
    }

    fn raise(&self, message: impl Into<String>) {
        self.set_error(ErrorState::raised(message));
    }

    fn clear_error(&self) {
        self.set_error(ErrorState::default());
    }

    fn error(&self) -> ErrorState {
        self.error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn viewport_state(&self) -> ViewportState {
        self.viewport.lock().unwrap_or_else(PoisonError::into_inner).state()
    }

    /// Apply `f` to the viewport and publish the resulting state.
    fn with_viewport(&self, f: impl FnOnce(&mut ViewportController)) -> ViewportState {
        let state = {
            let mut vp = self.viewport.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut vp);
            vp.state()
        };
        self.emit(EditorEvent::ViewportChanged { viewport: state });
        state
    }
}

impl RenderObserver for Surface {
    fn render_committed(&self, result: &RenderResult) {
        match result {
            RenderResult::Success { artifact } => {
                self.clear_error();
                self.emit(EditorEvent::RenderSucceeded { artifact: artifact.clone() });
                // Recenter only after the new artifact is committed and measured.
                self.with_viewport(|vp| vp.recenter(artifact.bounds));
            }
            RenderResult::Failure { message, placeholder } => {
                self.raise(message.clone());
                self.viewport.lock().unwrap_or_else(PoisonError::into_inner).clear_artifact();
                self.emit(EditorEvent::RenderFailed { message: message.clone(), placeholder: placeholder.clone() });
                self.notify(NotificationLevel::Error, format!("Render failed: {message}"), None);
            }
            RenderResult::Empty => {
                self.clear_error();
                self.viewport.lock().unwrap_or_else(PoisonError::into_inner).clear_artifact();
                self.emit(EditorEvent::RenderCleared);
            }
        }
    }
}

// =============================================================================
// EDITOR
// =============================================================================

/// What happened to a generation request that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The result became the new source.
    Adopted { seq: u64, source: String },
    /// A newer request was issued before this one finished.
    Superseded { seq: u64 },
    /// Fix requested while the current render is not a failure.
    NothingToFix,
}

/// Point-in-time view of the whole editor.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub source: String,
    pub theme: Theme,
    pub grid: GridStyle,
    pub error: ErrorState,
    pub render: Option<RenderResult>,
    pub viewport: ViewportState,
    pub container: Bounds,
    pub preferences: PreferencesSummary,
    pub renderer_error: Option<String>,
}

/// What the user is editing.
#[derive(Default)]
struct Document {
    source: String,
    theme: Theme,
    grid: GridStyle,
}

pub struct Editor {
    doc: Mutex<Document>,
    generation_seq: AtomicU64,
    scheduler: Arc<RenderScheduler>,
    generator: Arc<dyn DiagramGenerator>,
    prefs: Arc<Preferences>,
    surface: Arc<Surface>,
}

impl Editor {
    #[must_use]
    pub fn new(
        renderer: Arc<dyn DiagramRenderer>,
        generator: Arc<dyn DiagramGenerator>,
        prefs: Arc<Preferences>,
        config: &RenderConfig,
    ) -> Self {
        let surface = Arc::new(Surface::new());
        let scheduler = RenderScheduler::new(renderer, surface.clone(), config);
        Self {
            doc: Mutex::new(Document::default()),
            generation_seq: AtomicU64::new(0),
            scheduler,
            generator,
            prefs,
            surface,
        }
    }

    /// Configure the renderer. Failure is shown, recorded, and not fatal.
    ///
    /// # Errors
    ///
    /// Returns the renderer's [`InitializationError`].
    pub async fn initialize(&self, max_text_size: usize) -> Result<(), InitializationError> {
        let settings = RendererSettings { theme: self.theme_settings(), max_text_size };
        let outcome = self.scheduler.initialize(&settings).await;
        if let Err(e) = &outcome {
            let message = format!("Failed to initialize diagram renderer: {e}");
            self.surface.raise(message.clone());
            self.surface.notify(NotificationLevel::Error, message, Some(e.error_code()));
        }
        outcome
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.surface.events.subscribe()
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn source(&self) -> String {
        self.doc().source.clone()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.doc().theme
    }

    #[must_use]
    pub fn grid(&self) -> GridStyle {
        self.doc().grid
    }

    fn theme_settings(&self) -> ThemeSettings {
        ThemeSettings::for_theme(self.theme())
    }

    #[must_use]
    pub fn error(&self) -> ErrorState {
        self.surface.error()
    }

    #[must_use]
    pub fn artifact(&self) -> Option<Artifact> {
        self.scheduler.artifact()
    }

    #[must_use]
    pub fn render_result(&self) -> Option<RenderResult> {
        self.scheduler.current()
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    #[must_use]
    pub fn snapshot(&self) -> EditorSnapshot {
        let (viewport, container) = {
            let vp = self.surface.viewport.lock().unwrap_or_else(PoisonError::into_inner);
            (vp.state(), vp.container())
        };
        let (source, theme, grid) = {
            let doc = self.doc();
            (doc.source.clone(), doc.theme, doc.grid)
        };
        EditorSnapshot {
            source,
            theme,
            grid,
            error: self.surface.error(),
            render: self.scheduler.current(),
            viewport,
            container,
            preferences: self.prefs.summary(),
            renderer_error: self.scheduler.initialization_error(),
        }
    }

    // -------------------------------------------------------------------------
    // Source and render
    // -------------------------------------------------------------------------

    /// Write the source and schedule its render. Callers hold the document lock.
    fn commit_source(&self, doc: &mut Document, source: String, origin: SourceOrigin) {
        doc.source.clone_from(&source);
        self.surface.clear_error();
        self.surface.emit(EditorEvent::SourceChanged { source: source.clone(), origin });
        self.scheduler.schedule(source, ThemeSettings::for_theme(doc.theme));
    }

    fn commit_theme(&self, doc: &mut Document, theme: Theme) {
        doc.theme = theme;
        info!(%theme, "editor: theme changed");
        self.surface.emit(EditorEvent::ThemeChanged { theme });
        self.scheduler.schedule(doc.source.clone(), ThemeSettings::for_theme(theme));
    }

    /// User edit: replace the source, clear the banner, schedule a render.
    pub fn edit(&self, source: impl Into<String>) {
        let mut doc = self.doc();
        self.commit_source(&mut doc, source.into(), SourceOrigin::User);
    }

    /// Switch theme and re-render the current source with it.
    pub fn set_theme(&self, theme: Theme) {
        let mut doc = self.doc();
        self.commit_theme(&mut doc, theme);
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut doc = self.doc();
        let next = doc.theme.toggled();
        self.commit_theme(&mut doc, next);
        next
    }

    /// Background grid style. Display-only; does not re-render.
    pub fn set_grid(&self, style: GridStyle) {
        self.doc().grid = style;
        self.surface.emit(EditorEvent::GridChanged { style });
    }

    /// Re-render the current source and theme without changing either.
    pub fn force_rerender(&self) {
        let doc = self.doc();
        if !self.scheduler.force_rerender() {
            self.scheduler.schedule(doc.source.clone(), ThemeSettings::for_theme(doc.theme));
        }
    }

    // -------------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------------

    /// Generate a diagram from `prompt` with the active provider and adopt it.
    ///
    /// # Errors
    ///
    /// Returns the [`GenerationError`] of the latest request; failures of
    /// superseded requests are reported as `Superseded`.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationOutcome, GenerationError> {
        self.run_generation(prompt.to_string()).await
    }

    /// Ask the active provider to repair the current source using the last
    /// render error.
    ///
    /// # Errors
    ///
    /// Same as [`Editor::generate`].
    pub async fn fix_with_ai(&self) -> Result<GenerationOutcome, GenerationError> {
        let Some(RenderResult::Failure { message, .. }) = self.scheduler.current() else {
            return Ok(GenerationOutcome::NothingToFix);
        };
        self.run_generation(build_fix_prompt(&self.source(), &message)).await
    }

    fn is_current_generation(&self, seq: u64) -> bool {
        self.generation_seq.load(Ordering::SeqCst) == seq
    }

    async fn run_generation(&self, prompt: String) -> Result<GenerationOutcome, GenerationError> {
        let provider = self.prefs.active_provider();
        let request = GenerationRequest { prompt, provider, credential: self.prefs.credential(provider) };

        if let Err(e) = request.validate() {
            self.generation_failed(provider, &e);
            return Err(e);
        }

        let (seq, before) = {
            let doc = self.doc();
            (self.generation_seq.fetch_add(1, Ordering::SeqCst) + 1, doc.source.clone())
        };
        info!(seq, %provider, "editor: generation started");
        self.surface.emit(EditorEvent::GenerationStarted { seq, provider });

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let generator = Arc::clone(&self.generator);
        let call = async move {
            let result = generator.generate(&request, Some(&tx)).await;
            drop(tx);
            result
        };
        let forward = async {
            let mut last = None;
            while let Some(partial) = rx.recv().await {
                if self.adopt_partial(seq, &partial) {
                    last = Some(partial);
                }
            }
            last
        };
        let (result, last_partial) = tokio::join!(call, forward);

        let mut doc = self.doc();
        if !self.is_current_generation(seq) {
            info!(seq, "editor: superseded generation dropped");
            return Ok(GenerationOutcome::Superseded { seq });
        }

        match result {
            Ok(source) => {
                if doc.source != source {
                    self.commit_source(&mut doc, source.clone(), SourceOrigin::Generated);
                }
                drop(doc);
                self.surface.notify(
                    NotificationLevel::Success,
                    format!("Diagram generated with {}", provider.label()),
                    None,
                );
                Ok(GenerationOutcome::Adopted { seq, source })
            }
            Err(e) => {
                if last_partial.is_some_and(|last| doc.source == last) {
                    self.commit_source(&mut doc, before, SourceOrigin::Restored);
                }
                drop(doc);
                self.generation_failed(provider, &e);
                Err(e)
            }
        }
    }

    /// Make a streamed partial the source if `seq` is still the latest request.
    fn adopt_partial(&self, seq: u64, partial: &str) -> bool {
        let mut doc = self.doc();
        if !self.is_current_generation(seq) {
            return false;
        }
        self.surface.emit(EditorEvent::GenerationProgress { seq, partial: partial.to_string() });
        self.commit_source(&mut doc, partial.to_string(), SourceOrigin::Generated);
        true
    }

    fn generation_failed(&self, provider: ProviderId, error: &GenerationError) {
        warn!(%provider, code = error.error_code(), error = %error, "editor: generation failed");
        let message = match error {
            GenerationError::MissingCredential(p) => format!("Add an API key for {} to generate diagrams", p.label()),
            other => format!("AI generation failed: {other}"),
        };
        self.surface.raise(message.clone());
        self.surface.notify(NotificationLevel::Error, message, Some(error.error_code()));
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// `NoArtifact` before the first successful render; `SerializationFailure`
    /// if encoding fails.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportOutput, ExportError> {
        let surface = &self.surface;
        let on_pan = |viewport: ViewportState| surface.emit(EditorEvent::ViewportChanged { viewport });
        let result =
            export::export(format, self.scheduler.artifact(), self.theme(), &surface.viewport, &on_pan).await;
        match &result {
            Ok(output) => {
                self.surface.notify(NotificationLevel::Success, format!("Exported {}", output.file_name), None);
            }
            Err(e) => {
                warn!(%format, error = %e, "editor: export failed");
                self.surface.notify(NotificationLevel::Error, e.to_string(), Some(e.error_code()));
            }
        }
        result
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    pub fn begin_drag(&self, x: f64, y: f64) -> ViewportState {
        self.surface.with_viewport(|vp| vp.begin_drag(x, y))
    }

    pub fn continue_drag(&self, x: f64, y: f64) -> ViewportState {
        self.surface.with_viewport(|vp| vp.continue_drag(x, y))
    }

    pub fn end_drag(&self) -> ViewportState {
        self.surface.with_viewport(ViewportController::end_drag)
    }

    pub fn zoom(&self, delta: f64) -> ViewportState {
        self.surface.with_viewport(|vp| vp.zoom(delta))
    }

    pub fn zoom_in(&self) -> ViewportState {
        self.surface.with_viewport(ViewportController::zoom_in)
    }

    pub fn zoom_out(&self) -> ViewportState {
        self.surface.with_viewport(ViewportController::zoom_out)
    }

    pub fn wheel(&self, delta_y: f64) -> ViewportState {
        self.surface.with_viewport(|vp| vp.wheel(delta_y))
    }

    pub fn reset_view(&self) -> ViewportState {
        self.surface.with_viewport(ViewportController::reset_view)
    }

    pub fn fit_to_view(&self) -> ViewportState {
        self.surface.with_viewport(ViewportController::fit_to_view)
    }

    pub fn set_container(&self, container: Bounds) -> ViewportState {
        self.surface.with_viewport(|vp| vp.set_container(container))
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.surface.viewport_state()
    }

    // -------------------------------------------------------------------------
    // Preferences
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails.
    pub async fn set_active_provider(&self, provider: ProviderId) -> Result<(), PrefsError> {
        self.prefs.set_active_provider(provider).await.inspect_err(|e| self.prefs_failed(e))
    }

    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails.
    pub async fn save_credential(&self, provider: ProviderId, credential: &str) -> Result<(), PrefsError> {
        self.prefs.save_credential(provider, credential).await.inspect_err(|e| self.prefs_failed(e))?;
        self.surface.notify(NotificationLevel::Success, format!("{} API key saved", provider.label()), None);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails.
    pub async fn mark_tips_seen(&self) -> Result<(), PrefsError> {
        self.prefs.mark_tips_seen().await.inspect_err(|e| self.prefs_failed(e))
    }

    fn prefs_failed(&self, error: &PrefsError) {
        warn!(error = %error, "editor: preferences write failed");
        self.surface.notify(NotificationLevel::Error, error.to_string(), Some(error.error_code()));
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
