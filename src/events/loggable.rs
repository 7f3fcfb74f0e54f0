use serde::{Deserialize, Serialize};

/// Severity levels for audit entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reference data and approval changes
    Critical,
    #[default]
    Important,
    Noise,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Noise => "noise",
        }
    }
}

/// Entities whose mutations land in the audit log.
pub trait Loggable: Serialize + Send + Sync {
    /// Prefix of the event name, e.g. `"profile"` in `"profile.approved"`.
    fn entity_type() -> &'static str;

    /// Primary key as text. Reference data uses integer ids, profiles are
    /// keyed by their owner's user id.
    fn subject_id(&self) -> String;

    fn severity(&self) -> Severity {
        Severity::Important
    }

    fn severity_for_action(&self, action: &str) -> Severity {
        match action {
            "deleted" | "approved" | "revoked" => Severity::Critical,
            "created" | "updated" => self.severity(),
            _ => Severity::Important,
        }
    }
}
