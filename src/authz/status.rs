use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::profile::Profile;

/// The three booleans every consumer branches on. Derived only through
/// [`ProfileStatus::of`] so the server gate and the client reconciler agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatus {
    pub has_profile: bool,
    pub is_complete: bool,
    pub is_approved: bool,
}

impl ProfileStatus {
    pub fn of(profile: Option<&Profile>) -> Self {
        match profile {
            None => Self::default(),
            Some(profile) => {
                let named = profile.name.as_deref().is_some_and(|name| !name.trim().is_empty());
                Self {
                    has_profile: true,
                    is_complete: named && profile.department_id.is_some() && profile.role_id.is_some(),
                    is_approved: profile.approved,
                }
            }
        }
    }

    pub fn state(self) -> ProfileState {
        match (self.has_profile, self.is_complete, self.is_approved) {
            (false, _, _) => ProfileState::NoProfile,
            (true, false, _) => ProfileState::Incomplete,
            (true, true, false) => ProfileState::CompleteUnapproved,
            (true, true, true) => ProfileState::CompleteApproved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileState {
    NoProfile,
    /// Tolerated: rows may exist without every field
    Incomplete,
    CompleteUnapproved,
    CompleteApproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEvent {
    /// Owner creates a profile with every field present
    Created,
    Approved,
    Revoked,
    OwnerEdited,
    AdminEdited,
}

impl ProfileState {
    /// Next state, or `None` when the event is illegal here.
    pub fn on(self, event: ProfileEvent) -> Option<ProfileState> {
        use ProfileEvent::*;
        use ProfileState::*;

        match (self, event) {
            (NoProfile, Created) => Some(CompleteUnapproved),
            (NoProfile, _) | (_, Created) => None,

            (Incomplete, OwnerEdited | AdminEdited) => Some(Incomplete),
            (Incomplete, Approved | Revoked) => Some(Incomplete),

            (CompleteUnapproved, Approved) => Some(CompleteApproved),
            (CompleteUnapproved, _) => Some(CompleteUnapproved),

            (CompleteApproved, Revoked | OwnerEdited) => Some(CompleteUnapproved),
            (CompleteApproved, Approved | AdminEdited) => Some(CompleteApproved),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    Owner,
    Admin,
}

/// Value to write into `approved` alongside an accepted edit. `None` keeps
/// the stored value.
pub fn approval_after_edit(editor: Editor, requested: Option<bool>) -> Option<bool> {
    match editor {
        Editor::Owner => Some(false),
        Editor::Admin => requested,
    }
}

/// Audit action for a profile write given the states around it.
pub fn audit_action(before: ProfileState, after: ProfileState) -> &'static str {
    match (before, after) {
        (ProfileState::CompleteApproved, ProfileState::CompleteApproved) => "updated",
        (_, ProfileState::CompleteApproved) => "approved",
        (ProfileState::CompleteApproved, _) => "revoked",
        _ => "updated",
    }
}
