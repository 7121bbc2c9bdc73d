//! Status enums for the project aggregate.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` lookup table, and its label is the
//! lookup table's `name` column as well as the JSON representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant, in lookup-table order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID back into the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lowercase label used in the API and lookup table.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$($label),+].join(", ")
                    ))),
                }
            }
        }
    };
}

define_status_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Open = 1 => "open",
        InProgress = 2 => "in_progress",
        Completed = 3 => "completed",
        Cancelled = 4 => "cancelled",
    }
}

define_status_enum! {
    /// Application review status.
    ApplicationStatus {
        Pending = 1 => "pending",
        Accepted = 2 => "accepted",
        Rejected = 3 => "rejected",
    }
}

impl ProjectStatus {
    /// `completed` and `cancelled` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }

    /// Whether a freelancer must be bound while the project is in this status.
    pub fn requires_freelancer(self) -> bool {
        matches!(self, ProjectStatus::InProgress | ProjectStatus::Completed)
    }
}

impl ApplicationStatus {
    /// A decision is any status other than `pending`.
    pub fn is_decision(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}
