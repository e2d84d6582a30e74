//! UI rendering for the panel
//!
//! The rendering layer is a thin consumer: it reads the derived model and
//! the app's owned state (loading flags, toast, confirmation dialog) and
//! feeds gestures back through `PanelApp::submit`.

mod panel;

pub use panel::render_panel;
