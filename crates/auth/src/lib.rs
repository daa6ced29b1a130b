//! `antiwaste-auth`: authentication/authorization boundary.
//!
//! Decodes HS256 bearer tokens into a [`Principal`] and answers the two
//! questions the marketplace asks: does the principal hold a role, and may it
//! act on a resource owned by a given user. Decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, ensure_owner_or_admin, require_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use principal::Principal;
pub use roles::Role;
