use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use super::gate::{AuthContext, Decision, Gate};
use super::level::RoleLevel;
use super::policy::Policy;
use crate::app::AppState;
use crate::errors::AppError;

pub const APPROVAL_HEADER: &str = "x-profile-approval";

/// Compile-time policy for [`Authorized`].
pub trait RoutePolicy: Send + Sync + 'static {
    const POLICY: Policy;
}

macro_rules! route_policy {
    ($($(#[$meta:meta])* $name:ident => $policy:expr;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RoutePolicy for $name {
                const POLICY: Policy = $policy;
            }
        )*
    };
}

route_policy! {
    SelfServiceRead => Policy::SelfServiceRead;
    SelfServiceProfile => Policy::SelfServiceProfile;
    ProfileCreation => Policy::ProfileCreation;
    AdminOnly => Policy::AdminOnly;
    /// `Member(ASSISTANT)`
    Assistant => Policy::Member(RoleLevel::Assistant);
}

/// Extractor that runs the full gate before the handler body. A handler
/// taking `Authorized<P>` is never entered on a denial.
#[derive(Debug, Clone)]
pub struct Authorized<P: RoutePolicy> {
    pub ctx: AuthContext,
    _policy: PhantomData<fn() -> P>,
}

impl<P: RoutePolicy> Deref for Authorized<P> {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

#[async_trait]
impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: RoutePolicy,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = state.session.identify(&parts.headers);
        let gate = Gate::new(state.approval.current());
        let span = tracing::info_span!("authorize", path = %parts.uri.path());

        let decision = gate.authorize(identity, P::POLICY, &state.pool).instrument(span).await?;

        match decision {
            Decision::Allow(ctx) => {
                if ctx.degraded {
                    if let Some(notice) = parts.extensions.get::<ApprovalNotice>() {
                        notice.flag();
                    }
                }
                parts.extensions.insert(ctx.clone());
                Ok(Self {
                    ctx,
                    _policy: PhantomData,
                })
            }
            Decision::Deny(denial) => Err(denial.into()),
            Decision::Proceed(_) | Decision::RedirectRequired(_) => Err(AppError::internal(format!(
                "policy {} cannot guard an endpoint",
                P::POLICY.name()
            ))),
        }
    }
}

/// Per-request slot the extractor flags when it allowed a degraded decision.
#[derive(Debug, Clone, Default)]
pub struct ApprovalNotice(Arc<AtomicBool>);

impl ApprovalNotice {
    pub fn flag(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_flagged(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Adds `x-profile-approval: pending` to responses whose authorization was
/// degraded.
pub async fn approval_notice(mut request: Request, next: Next) -> Response {
    let notice = ApprovalNotice::default();
    request.extensions_mut().insert(notice.clone());

    let mut response = next.run(request).await;
    if notice.is_flagged() {
        response
            .headers_mut()
            .insert(HeaderName::from_static(APPROVAL_HEADER), HeaderValue::from_static("pending"));
    }
    response
}
