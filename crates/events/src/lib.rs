//! gighub domain event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the envelope published after every committed
//!   project mutation, carrying the users it concerns.

pub mod bus;

pub use bus::{EventBus, EventKind, PlatformEvent};
