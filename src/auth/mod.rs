//! Authorization Core
//!
//! Resolves the calling principal from an explicit session context and gates
//! operations on role rank or resource ownership.

/// The ordered role hierarchy.
pub mod role;

/// Session resolution: context extraction, providers, and the failure-absorbing resolver.
pub mod session;

/// Role and ownership gates.
pub mod gate;

pub use gate::{AuthError, AuthGate, AuthorizationDecision, authorize_ownership, authorize_role};
pub use role::Role;
pub use session::{
    Claims, JwtSessionProvider, Principal, SessionContext, SessionError, SessionProvider,
    SessionProviderState, SessionResolver,
};
