//! Client-side status reconciliation.
//!
//! Derives the same [`ProfileStatus`] the server gate uses from the caller's
//! own profile and maps it to exactly one [`UiAction`]. Snapshots are cached
//! per identity and dropped only on an [`InvalidationTag`].

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::authz::{has_required_level, ApprovalEnforcement, ApprovalModeSource, ProfileStatus, RoleLevel};
use crate::errors::AppError;
use crate::models::profile::Profile;

mod source;

pub use source::{ClientSession, HttpProfileSource, ProfileSource};

pub const DEFAULT_PROFILE_PATH: &str = "/profile";
pub const DEFAULT_PENDING_APPROVAL_PATH: &str = "/profile?pendingApproval=true";

/// Events that make a cached snapshot stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTag {
    SignedIn(ClientSession),
    SignedOut,
    /// The caller's own profile changed (created, edited, approved)
    ProfileMutated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    None,
    /// Blocking prompt to create or finish the profile
    CompletionPrompt,
    PendingApprovalRedirect(String),
    /// Dismissible notice; the caller keeps access
    ApprovalBanner,
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub profile_path: String,
    pub pending_approval_path: String,
    pub enforcement: ApprovalModeSource,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            profile_path: DEFAULT_PROFILE_PATH.to_string(),
            pending_approval_path: DEFAULT_PENDING_APPROVAL_PATH.to_string(),
            enforcement: ApprovalModeSource::Env,
        }
    }
}

impl ReconcilerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("PENDING_APPROVAL_PATH") {
            if !path.trim().is_empty() {
                config.pending_approval_path = path.trim().to_string();
            }
        }
        config
    }
}

/// Pure mapping from status to action. `pathname` suppresses prompts and
/// redirects while the caller is already on the profile page.
pub fn ui_action(
    status: ProfileStatus,
    enforcement: ApprovalEnforcement,
    pathname: &str,
    config: &ReconcilerConfig,
) -> UiAction {
    let on_profile_page = pathname.starts_with(config.profile_path.as_str());

    if !status.has_profile || !status.is_complete {
        return if on_profile_page { UiAction::None } else { UiAction::CompletionPrompt };
    }

    if status.is_approved {
        return UiAction::None;
    }

    match enforcement {
        ApprovalEnforcement::Strict if on_profile_page => UiAction::None,
        ApprovalEnforcement::Strict => UiAction::PendingApprovalRedirect(config.pending_approval_path.clone()),
        ApprovalEnforcement::Advisory => UiAction::ApprovalBanner,
    }
}

#[derive(Debug, Default)]
struct ReconcilerState {
    session: Option<ClientSession>,
    snapshots: HashMap<Uuid, Option<Profile>>,
    /// Bumped on every invalidation; a fetch may only fill the cache if the
    /// generation it started under is still current.
    generation: u64,
}

pub struct StatusReconciler<S> {
    source: S,
    config: ReconcilerConfig,
    state: Mutex<ReconcilerState>,
}

impl<S: ProfileSource> StatusReconciler<S> {
    pub fn new(source: S, config: ReconcilerConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(ReconcilerState::default()),
        }
    }

    pub async fn invalidate(&self, tag: InvalidationTag) {
        let mut state = self.state.lock().await;
        state.generation = state.generation.wrapping_add(1);
        match tag {
            InvalidationTag::SignedIn(session) => {
                tracing::debug!(user_id = %session.identity.user_id, "identity changed, dropping snapshot");
                state.snapshots.remove(&session.identity.user_id);
                state.session = Some(session);
            }
            InvalidationTag::SignedOut => {
                state.session = None;
                state.snapshots.clear();
            }
            InvalidationTag::ProfileMutated => {
                if let Some(user_id) = state.session.as_ref().map(|s| s.identity.user_id) {
                    state.snapshots.remove(&user_id);
                }
            }
        }
    }

    /// Cached profile for the current identity, fetching once after each
    /// invalidation. `Ok(None)` when signed out or without a profile.
    pub async fn snapshot(&self) -> Result<Option<Profile>, AppError> {
        let (session, generation) = {
            let state = self.state.lock().await;
            let Some(session) = state.session.clone() else {
                return Ok(None);
            };
            if let Some(cached) = state.snapshots.get(&session.identity.user_id) {
                return Ok(cached.clone());
            }
            (session, state.generation)
        };

        let fetched = self.source.fetch_own_profile(&session).await?;

        let mut state = self.state.lock().await;
        // Any invalidation during the fetch (sign-out, identity switch or a
        // profile mutation) makes this result stale.
        if state.generation == generation {
            state.snapshots.insert(session.identity.user_id, fetched.clone());
        } else {
            tracing::debug!(user_id = %session.identity.user_id, "discarding profile fetched before an invalidation");
        }
        Ok(fetched)
    }

    pub async fn status(&self) -> Result<Option<ProfileStatus>, AppError> {
        if self.state.lock().await.session.is_none() {
            return Ok(None);
        }
        let profile = self.snapshot().await?;
        Ok(Some(ProfileStatus::of(profile.as_ref())))
    }

    /// The one action to take on `pathname`. Fetch failures yield
    /// `UiAction::None`: without a trustworthy snapshot nothing is shown.
    pub async fn action_for(&self, pathname: &str) -> UiAction {
        match self.status().await {
            Ok(Some(status)) => ui_action(status, self.config.enforcement.current(), pathname, &self.config),
            Ok(None) => UiAction::None,
            Err(err) => {
                tracing::error!(error = %err, "could not reconcile profile status");
                UiAction::None
            }
        }
    }

    /// Role check against the cached profile; false without one.
    pub async fn has_access(&self, required: RoleLevel) -> bool {
        match self.snapshot().await {
            Ok(Some(profile)) => has_required_level(profile.role_level().unwrap_or(0), required),
            _ => false,
        }
    }
}
