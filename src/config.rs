use crate::authz::edge::EdgeConfig;
use crate::authz::{ApprovalEnforcement, ApprovalModeSource};
use crate::errors::AppError;
use crate::session::SessionConfig;

pub const DEFAULT_PORT: u16 = 8000;

/// Everything the router needs besides the pool.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub approval: ApprovalModeSource,
    pub edge: EdgeConfig,
}

impl AppConfig {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            approval: ApprovalModeSource::Env,
            edge: EdgeConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            session: SessionConfig::from_env()?,
            approval: ApprovalModeSource::Env,
            edge: EdgeConfig::from_env(),
        })
    }

    /// Pins the approval mode instead of reading it per decision.
    pub fn with_approval(mut self, mode: ApprovalEnforcement) -> Self {
        self.approval = ApprovalModeSource::Fixed(mode);
        self
    }
}

/// Loads `.env` from the working directory, falling back to the crate root.
pub fn load_env() {
    if dotenvy::dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }
}

pub fn app_port() -> u16 {
    std::env::var("APP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}
