//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a `&mut PgConnection` inside a transaction) as the
//! first argument.

pub mod notification_repo;
pub mod project_repo;
pub mod user_repo;

pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
