use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Privilege tiers. The discriminants are the stored values; note the gap
/// between `Executive` (5) and `SuperAdmin` (10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleLevel {
    /// Any authenticated user
    #[default]
    Open = 0,
    Assistant = 1,
    Professional = 2,
    Senior = 3,
    Manager = 4,
    Executive = 5,
    /// Satisfies every role check
    SuperAdmin = 10,
}

impl RoleLevel {
    pub const ALL: [RoleLevel; 7] = [
        RoleLevel::Open,
        RoleLevel::Assistant,
        RoleLevel::Professional,
        RoleLevel::Senior,
        RoleLevel::Manager,
        RoleLevel::Executive,
        RoleLevel::SuperAdmin,
    ];

    pub fn value(self) -> i64 {
        self as i64
    }

    pub fn from_value(value: i64) -> Option<RoleLevel> {
        Self::ALL.into_iter().find(|level| level.value() == value)
    }

    /// Maps any stored integer onto a defined tier. Unrecognized values
    /// degrade to `Open` rather than erroring.
    pub fn normalize(value: i64) -> RoleLevel {
        Self::from_value(value).unwrap_or(RoleLevel::Open)
    }

    pub fn label(self) -> &'static str {
        match self {
            RoleLevel::Open => "OPEN",
            RoleLevel::Assistant => "ASSISTANT",
            RoleLevel::Professional => "PROFESSIONAL",
            RoleLevel::Senior => "SENIOR",
            RoleLevel::Manager => "MANAGER",
            RoleLevel::Executive => "EXECUTIVE",
            RoleLevel::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl PartialOrd for RoleLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RoleLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

/// Label for a raw stored level; `"Unknown"` when it names no tier.
pub fn level_label(value: i64) -> &'static str {
    RoleLevel::from_value(value).map(RoleLevel::label).unwrap_or("Unknown")
}

/// The one role comparison used by the gate, the admin checks and the client.
pub fn has_required_level(actual: i64, required: RoleLevel) -> bool {
    let actual = RoleLevel::normalize(actual);
    actual >= required || actual == RoleLevel::SuperAdmin
}
