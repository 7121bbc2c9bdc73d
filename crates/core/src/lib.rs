//! Domain rules for the gighub freelancer marketplace.
//!
//! Everything here is pure: rules take the current project aggregate and an
//! explicit [`caller::Caller`] and either return a
//! [`lifecycle::ProjectChange`] to persist or a [`error::CoreError`].

pub mod application;
pub mod caller;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod pagination;
pub mod project;
pub mod roles;
pub mod status;
pub mod types;
pub mod visibility;
