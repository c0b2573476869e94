/// Reclaim CLI — command-line frontend.
///
/// This crate contains argument parsing, the session state machine, and
/// output rendering. Business logic lives in `reclaim-core`.
pub mod app;
pub mod render;
pub mod state;

pub use app::{run, Cli};
pub use state::{Session, SessionPhase};
