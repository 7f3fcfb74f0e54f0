use super::level::RoleLevel;

/// Closed set of route policies. Every protected operation names exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// No session needed. Only the edge screens with this preset, for paths on
    /// its allow-list; public handlers take no [`Authorized`] extractor, so
    /// the full gate never sees it.
    ///
    /// [`Authorized`]: super::Authorized
    PublicRead,
    /// Own profile snapshot; works before a profile exists
    SelfServiceRead,
    /// Own profile edits; unapproved and incomplete callers allowed
    SelfServiceProfile,
    /// Creating the caller's first profile
    ProfileCreation,
    /// Complete, approved profile with at least this level
    Member(RoleLevel),
    /// Complete, approved profile at `SUPER_ADMIN`
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PolicyFlags {
    pub required_role: RoleLevel,
    pub requires_session: bool,
    pub allow_unapproved: bool,
    pub creation_route: bool,
    pub skip_completion: bool,
    pub skip_approval: bool,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self {
            required_role: RoleLevel::Open,
            requires_session: true,
            allow_unapproved: false,
            creation_route: false,
            skip_completion: false,
            skip_approval: false,
        }
    }
}

impl Policy {
    pub(crate) fn flags(self) -> PolicyFlags {
        let base = PolicyFlags::default();
        match self {
            Policy::PublicRead => PolicyFlags {
                requires_session: false,
                skip_completion: true,
                skip_approval: true,
                ..base
            },
            Policy::SelfServiceRead => PolicyFlags {
                skip_completion: true,
                skip_approval: true,
                ..base
            },
            Policy::SelfServiceProfile => PolicyFlags {
                allow_unapproved: true,
                skip_completion: true,
                ..base
            },
            // allow_unapproved so the handler, not the gate, answers a second
            // creation attempt with 409.
            Policy::ProfileCreation => PolicyFlags {
                creation_route: true,
                allow_unapproved: true,
                ..base
            },
            Policy::Member(level) => PolicyFlags {
                required_role: level,
                ..base
            },
            Policy::AdminOnly => PolicyFlags {
                required_role: RoleLevel::SuperAdmin,
                ..base
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::PublicRead => "PublicRead",
            Policy::SelfServiceRead => "SelfServiceRead",
            Policy::SelfServiceProfile => "SelfServiceProfile",
            Policy::ProfileCreation => "ProfileCreation",
            Policy::Member(_) => "Member",
            Policy::AdminOnly => "AdminOnly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_to_flags() {
        let flags = Policy::SelfServiceRead.flags();
        assert!(flags.requires_session && flags.skip_completion && flags.skip_approval);
        assert_eq!(flags.required_role, RoleLevel::Open);

        let flags = Policy::ProfileCreation.flags();
        assert!(flags.creation_route && flags.allow_unapproved && !flags.skip_completion);

        let flags = Policy::SelfServiceProfile.flags();
        assert!(flags.allow_unapproved && flags.skip_completion && !flags.skip_approval);

        assert_eq!(Policy::AdminOnly.flags().required_role, RoleLevel::SuperAdmin);
        assert_eq!(Policy::Member(RoleLevel::Senior).flags().required_role, RoleLevel::Senior);
        assert!(!Policy::PublicRead.flags().requires_session);
    }

    #[test]
    fn full_check_presets_skip_nothing() {
        for policy in [Policy::Member(RoleLevel::Assistant), Policy::AdminOnly] {
            let flags = policy.flags();
            assert!(!flags.allow_unapproved && !flags.skip_completion && !flags.skip_approval);
            assert!(!flags.creation_route);
        }
    }
}
