//! Authentication and authorization: token signing, password hashing, the
//! per-request identity context and the route guard.

/// Route requirement declarations and the allow/deny decision.
pub mod guard;
/// Per-request identity context and the authentication middlewares.
pub mod identity;
/// Argon2 password hashing.
pub mod password;
/// Signed-token service (session and room tokens).
pub mod token;
