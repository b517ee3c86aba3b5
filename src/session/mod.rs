//! Unified session: one interactive process moving between the setup
//! wizard and the live connection dashboard.
//!
//! ```text
//!  application thread                 session thread
//! ┌────────────────────┐  Msg  ┌────────────────────────────┐
//! │ Session            │ ────► │ program::run               │
//! │  wait_for_mode     │       │   Coordinator::update      │
//! │  activate_runtime  │ ◄──── │   Configurator | Dashboard │
//! │  wait_for_runtime… │ Event └────────────────────────────┘
//! └────────────────────┘
//! ```
//!
//! The coordinator and its sub-models are only ever touched by the session
//! thread. The application observes them through events, the published
//! phase and the completion signal.

mod context;
mod coordinator;
mod event;
mod handle;
mod program;

pub use context::{with_cancel, CancelHandle, Context};
pub use coordinator::{Coordinator, Step};
pub use event::{Phase, RuntimeExit, SessionEvent};
pub use handle::{Session, SessionBuilder, EVENT_BUFFER};
