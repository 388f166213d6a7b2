//! Broadcast routing
//!
//! Every session's reader loop feeds one shared input stream; a single
//! [`Router`] task drains it and republishes each message to the registry
//! members selected by the [`FanoutPredicate`].
//!
//! # Architecture
//!
//! ```text
//!   [reader A]   [reader B]   [reader C]
//!        │            │            │
//!        └────────────┼────────────┘
//!                     ▼
//!            RouterInput (bounded, producers wait)
//!                     │
//!                     ▼
//!                  Router ── registry.snapshot()
//!                     │
//!        ┌────────────┼────────────┐
//!        ▼            ▼            ▼
//!   try_enqueue  try_enqueue  try_enqueue   (full => drop for that session)
//! ```
//!
//! Because the router handles one message at a time, any recipient that
//! stays registered sees messages in the order they reached the router.

pub mod dispatch;
pub mod message;
pub mod predicate;

pub use dispatch::{RouteOutcome, Router, RouterInput};
pub use message::BroadcastMessage;
pub use predicate::FanoutPredicate;
