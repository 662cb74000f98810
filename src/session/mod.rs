//! Completion session: state machine, debouncing and the async driver

pub mod controller;
pub mod debounce;
pub mod driver;
pub mod state;

pub use controller::{CompletionController, EditEvent};
pub use debounce::Debouncer;
pub use driver::{spawn_session_driver, SessionHandle, SessionIntent};
pub use state::{Anchor, CompletionSession, EditInstruction};
