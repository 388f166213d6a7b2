//! Session registry
//!
//! The registry is the authoritative set of live sessions. A session is a
//! member exactly while it is `Active`: the connect path inserts it after
//! activation and teardown removes it before anything else happens.
//!
//! # Architecture
//!
//! ```text
//!                 Arc<Registry>
//!        ┌──────────────────────────────┐
//!        │ sessions: HashMap<SessionId, │
//!        │   Arc<SessionHandle>>        │
//!        └───────┬──────────────┬───────┘
//!                │              │
//!     add/remove │              │ snapshot()
//!    (write lock)│              │ (read lock)
//!                │              ▼
//!        [session lifecycle]  [Router]
//! ```
//!
//! Removing a session closes its outbound buffer while the write lock is
//! held. A router working from an older snapshot can therefore still see the
//! handle, but every enqueue it attempts is rejected.

pub mod error;
pub mod store;

pub use error::RegistryError;
pub use store::Registry;
