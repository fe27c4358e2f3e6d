//! Request guards.
//!
//! - [`auth`]: `AuthUser` / `MaybeAuthUser` extractors resolving the bearer token to a user
//! - [`role`]: the single role predicate and the route-layer middleware built on it
//!
//! Authentication always runs first, so a request without a valid token gets
//! 401 even on routes its role could never reach.

pub mod auth;
pub mod role;
