//! Row structs and DTOs.
//!
//! Row structs derive `FromRow` and mirror one table each. Aggregate
//! assembly into `gighub_core::project::Project` lives in [`project`].

pub mod notification;
pub mod project;
pub mod user;
