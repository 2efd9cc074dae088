use thiserror::Error;

use super::{
    role::Role,
    session::{Principal, SessionContext, SessionResolver},
};

/// Reasons a gate denies a request. Callers map these to 401/403 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No valid session. Recoverable by re-authenticating.
    #[error("Authentication required")]
    AuthenticationRequired,
    /// Authenticated, but the role ranks below the requirement.
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    /// Authenticated, not an admin, and not the owner of the resource.
    #[error("Access denied: you don't own this resource")]
    AccessDenied,
}

/// Outcome of a single gate evaluation.
pub type AuthorizationDecision = Result<Principal, AuthError>;

/// authorize_role
///
/// Allows `principal` when its role ranks at or above `required`.
pub fn authorize_role(principal: Option<Principal>, required: Role) -> AuthorizationDecision {
    let principal = principal.ok_or(AuthError::AuthenticationRequired)?;

    if principal.role.satisfies(required) {
        Ok(principal)
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}

/// authorize_ownership
///
/// Allows `principal` when it is an admin or its id equals `owner_id` exactly.
pub fn authorize_ownership(principal: Option<Principal>, owner_id: &str) -> AuthorizationDecision {
    let principal = principal.ok_or(AuthError::AuthenticationRequired)?;

    // Admins may act on any resource.
    if principal.role == Role::Admin {
        return Ok(principal);
    }

    if principal.id == owner_id {
        Ok(principal)
    } else {
        Err(AuthError::AccessDenied)
    }
}

/// AuthGate
///
/// Request-facing authorization: resolves the principal from an explicit
/// [`SessionContext`] and applies the role or ownership rule. Shared read-only
/// across requests through the application state.
#[derive(Clone)]
pub struct AuthGate {
    resolver: SessionResolver,
}

impl AuthGate {
    pub fn new(resolver: SessionResolver) -> Self {
        Self { resolver }
    }

    pub async fn current_principal(&self, ctx: &SessionContext) -> Option<Principal> {
        self.resolver.current_principal(ctx).await
    }

    /// require_role
    ///
    /// Returns the principal when its role meets `required`.
    ///
    /// # Errors
    /// `AuthenticationRequired` without a session, `InsufficientPermissions` when the
    /// role ranks too low.
    pub async fn require_role(&self, ctx: &SessionContext, required: Role) -> AuthorizationDecision {
        let decision = authorize_role(self.current_principal(ctx).await, required);
        if let Err(reason) = &decision {
            tracing::debug!(%reason, required = %required, "role requirement denied");
        }
        decision
    }

    /// require_ownership
    ///
    /// Returns the principal when it owns the resource or is an admin.
    ///
    /// # Errors
    /// `AuthenticationRequired` without a session, `AccessDenied` otherwise.
    pub async fn require_ownership(
        &self,
        ctx: &SessionContext,
        owner_id: &str,
    ) -> AuthorizationDecision {
        let decision = authorize_ownership(self.current_principal(ctx).await, owner_id);
        if let Err(reason) = &decision {
            tracing::debug!(%reason, owner_id, "ownership requirement denied");
        }
        decision
    }
}
