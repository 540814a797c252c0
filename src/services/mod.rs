//! Domain services used by the HTTP and websocket routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own editor state and preference persistence so route
//! handlers stay focused on protocol translation.

pub mod editor;
pub mod events;
pub mod preferences;
