//! Event-driven notification routing.
//!
//! - [`router::NotificationRouter`] -- Turns platform events into stored
//!   per-user notifications.

pub mod router;

pub use router::NotificationRouter;
