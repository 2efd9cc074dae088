use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of platform roles used for Role-Based Access Control (RBAC).
/// Roles form a strict total order: `User < Moderator < Editor < Admin`.
/// Every comparison goes through [`Role::rank`], so the hierarchy is defined in one place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    /// Readers and authors of their own posts.
    #[default]
    User,
    /// Community moderation.
    Moderator,
    /// Editorial control over the publication workflow and taxonomy.
    Editor,
    /// Full platform access. Satisfies every requirement.
    Admin,
}

impl Role {
    /// Every role, lowest rank first.
    pub const ALL: [Role; 4] = [Role::User, Role::Moderator, Role::Editor, Role::Admin];

    /// rank
    ///
    /// The position of the role in the hierarchy (USER=1 .. ADMIN=4).
    pub const fn rank(self) -> u8 {
        match self {
            Role::User => 1,
            Role::Moderator => 2,
            Role::Editor => 3,
            Role::Admin => 4,
        }
    }

    /// Returns true when this role meets or exceeds `required`.
    pub const fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Moderator => "MODERATOR",
            Role::Editor => "EDITOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
