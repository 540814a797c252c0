//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The editor is process-wide: one diagram source, one render slot, one
//! viewport. Every connected socket observes the same event stream.

use std::sync::Arc;

use crate::services::editor::Editor;

/// Clone is required by Axum; the editor is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub editor: Arc<Editor>,
}

impl AppState {
    #[must_use]
    pub fn new(editor: Editor) -> Self {
        Self { editor: Arc::new(editor) }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub(crate) mod test_helpers;
