/// State management module
///
/// This module owns the edit session state machine (session.rs): which
/// images are loaded, whether a provider request is in flight, the last
/// error, and the active style selection. All transitions go through it.

pub mod session;
