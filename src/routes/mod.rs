//! Router Module Index
//!
//! Routing is split by the minimum privilege a route needs, so the session layer is
//! applied per module rather than per handler.

/// Routes accessible to anonymous readers.
pub mod public;

/// Routes requiring a signed-in principal.
pub mod authenticated;

/// Routes requiring an elevated role (EDITOR or ADMIN).
pub mod editorial;
