//! Marketplace role names.
//!
//! These must match the `ck_users_role` constraint in the users migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_FREELANCER: &str = "freelancer";

/// The two marketplace roles. Every user holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Freelancer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Freelancer => ROLE_FREELANCER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_FREELANCER => Ok(Role::Freelancer),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_CLIENT}, {ROLE_FREELANCER}"
            ))),
        }
    }
}
