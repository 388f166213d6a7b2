//! Client sessions
//!
//! A session pairs one connection with a bounded outbound buffer and a role.
//! Each session runs two tasks:
//!
//! ```text
//!   peer ──► reader loop ──► RouterInput ──► Router
//!                                              │ try_enqueue
//!                                              ▼
//!   peer ◄── writer pump ◄── outbound buffer (bounded)
//! ```
//!
//! The [`SessionHandle`] is what the registry and router hold; the reader
//! and pump own the connection halves.

pub mod context;
pub mod handle;
pub mod pump;
pub mod reader;
pub mod state;

pub use context::{Role, SessionContext, SessionId};
pub use handle::{EnqueueOutcome, SessionHandle};
pub use pump::{run_writer_pump, PumpExit};
pub use reader::{run_reader_loop, ReaderExit};
pub use state::{SessionPhase, SessionState};
