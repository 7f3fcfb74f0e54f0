//! Authorization core.
//!
//! - `level`: role tiers and the single comparison primitive
//! - `status`: profile status derivation and lifecycle transitions
//! - `policy`: named policy presets
//! - `gate`: the decision pipeline shared by both enforcement points
//! - `edge`: pre-routing session check for pages and APIs
//! - `guard`: per-endpoint extractor running the full gate

pub mod edge;
mod gate;
mod guard;
mod level;
mod policy;
mod status;

pub use gate::{AuthContext, Decision, Denial, Gate, ProfileLookup};
pub use guard::{
    approval_notice, AdminOnly, ApprovalNotice, Assistant, Authorized, ProfileCreation, RoutePolicy,
    SelfServiceProfile, SelfServiceRead, APPROVAL_HEADER,
};
pub use level::{has_required_level, level_label, RoleLevel};
pub use policy::Policy;
pub use status::{approval_after_edit, audit_action, Editor, ProfileEvent, ProfileState, ProfileStatus};

/// What happens to a complete but unapproved profile on a route that
/// expects approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalEnforcement {
    /// Deny with `PROFILE_PENDING_APPROVAL`
    Strict,
    /// Allow, flagging the decision as degraded
    Advisory,
}

impl ApprovalEnforcement {
    /// Reads `PROFILE_APPROVAL_STRICT_MODE`. Not cached: operators may flip
    /// the mode without a restart.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("PROFILE_APPROVAL_STRICT_MODE").ok().as_deref())
    }

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_lowercase()).as_deref() {
            Some("true") | Some("1") | Some("yes") | Some("strict") => ApprovalEnforcement::Strict,
            _ => ApprovalEnforcement::Advisory,
        }
    }

    pub fn is_strict(self) -> bool {
        self == ApprovalEnforcement::Strict
    }
}

/// Where the enforcement mode comes from for each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalModeSource {
    Env,
    Fixed(ApprovalEnforcement),
}

impl ApprovalModeSource {
    pub fn current(self) -> ApprovalEnforcement {
        match self {
            ApprovalModeSource::Env => ApprovalEnforcement::from_env(),
            ApprovalModeSource::Fixed(mode) => mode,
        }
    }
}
