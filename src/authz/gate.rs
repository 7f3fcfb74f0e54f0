use async_trait::async_trait;
use axum::http::StatusCode;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::level::{has_required_level, RoleLevel};
use super::policy::Policy;
use super::status::{ProfileState, ProfileStatus};
use super::ApprovalEnforcement;
use crate::db;
use crate::errors::{AppError, ReasonCode};
use crate::models::profile::Profile;
use crate::session::Identity;

/// Source of the caller's profile. The gate never reads storage directly.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile_for(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
}

#[async_trait]
impl ProfileLookup for SqlitePool {
    async fn profile_for(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        db::profiles::find_by_user(self, user_id).await
    }
}

/// Everything a handler learns about its caller once the gate allows.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub role_level: RoleLevel,
    pub department_id: Option<i64>,
    pub status: ProfileStatus,
    /// Allowed although the profile awaits approval (advisory mode)
    pub degraded: bool,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.identity.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub reason: ReasonCode,
}

impl Denial {
    pub fn status(&self) -> StatusCode {
        self.reason.status()
    }

    pub fn message(&self) -> &'static str {
        match self.reason {
            ReasonCode::Unauthenticated => "Unauthorized",
            ReasonCode::ProfileNotFound => "User profile not found. Please create one.",
            ReasonCode::ProfileIncomplete => "User profile incomplete. Please complete your profile.",
            ReasonCode::ProfilePendingApproval => "Profile pending admin approval. Access denied.",
            ReasonCode::InsufficientRole => "Forbidden: Insufficient role level",
            _ => "Access denied",
        }
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial.reason {
            ReasonCode::Unauthenticated => AppError::unauthenticated(denial.message()),
            reason => AppError::forbidden(reason, denial.message()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Decision {
    Allow(AuthContext),
    /// Session stage passed; the full check still has to run. Carries the
    /// identity when one was presented.
    Proceed(Option<Identity>),
    Deny(Denial),
    RedirectRequired(String),
}

#[derive(Debug, Clone, Copy)]
pub struct Gate {
    enforcement: ApprovalEnforcement,
}

impl Gate {
    pub fn new(enforcement: ApprovalEnforcement) -> Self {
        Self { enforcement }
    }

    pub fn enforcement(&self) -> ApprovalEnforcement {
        self.enforcement
    }

    /// Session stage only. The edge interceptor stops here; `redirect` is
    /// where a page request without a session should be sent.
    pub fn screen(&self, identity: Option<Identity>, policy: Policy, redirect: Option<String>) -> Decision {
        let flags = policy.flags();
        if !flags.requires_session {
            return Decision::Proceed(identity);
        }

        match (identity, redirect) {
            (Some(identity), _) => Decision::Proceed(Some(identity)),
            (None, Some(target)) => Decision::RedirectRequired(target),
            (None, None) => Decision::Deny(Denial {
                reason: ReasonCode::Unauthenticated,
            }),
        }
    }

    /// Full pipeline. First failing check wins; lookup failures are errors,
    /// never allows.
    pub async fn authorize<L>(&self, identity: Option<Identity>, policy: Policy, lookup: &L) -> Result<Decision, AppError>
    where
        L: ProfileLookup + ?Sized,
    {
        let identity = match self.screen(identity, policy, None) {
            Decision::Proceed(Some(identity)) => identity,
            Decision::Proceed(None) => {
                tracing::debug!(policy = policy.name(), "public route, no session");
                return Ok(Decision::Proceed(None));
            }
            other => {
                tracing::warn!(policy = policy.name(), reason = %ReasonCode::Unauthenticated, "no valid session");
                return Ok(other);
            }
        };

        let flags = policy.flags();
        let user_id = identity.user_id;
        let deny = |reason: ReasonCode| {
            tracing::warn!(%user_id, policy = policy.name(), %reason, "access denied");
            Ok(Decision::Deny(Denial { reason }))
        };

        let profile = lookup.profile_for(user_id).await?;
        let status = ProfileStatus::of(profile.as_ref());
        let exempt_from_completion = flags.creation_route || flags.skip_completion;
        let mut degraded = false;

        match status.state() {
            ProfileState::NoProfile if !exempt_from_completion => return deny(ReasonCode::ProfileNotFound),
            ProfileState::Incomplete if !exempt_from_completion => return deny(ReasonCode::ProfileIncomplete),
            ProfileState::CompleteUnapproved if !(flags.allow_unapproved || flags.skip_approval) => {
                match self.enforcement {
                    ApprovalEnforcement::Strict => return deny(ReasonCode::ProfilePendingApproval),
                    ApprovalEnforcement::Advisory => {
                        tracing::debug!(%user_id, policy = policy.name(), "profile pending approval, advisory allow");
                        degraded = true;
                    }
                }
            }
            _ => {}
        }

        let raw_level = profile.as_ref().and_then(Profile::role_level).unwrap_or(0);
        if !has_required_level(raw_level, flags.required_role) {
            return deny(ReasonCode::InsufficientRole);
        }

        tracing::debug!(%user_id, policy = policy.name(), "access granted");

        Ok(Decision::Allow(AuthContext {
            role_level: RoleLevel::normalize(raw_level),
            department_id: profile.as_ref().and_then(|p| p.department_id),
            identity,
            profile,
            status,
            degraded,
        }))
    }
}
