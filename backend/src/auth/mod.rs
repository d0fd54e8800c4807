//! Identity & access: registration rules, credentials, bearer tokens.

pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;
pub mod validation;

pub use identity::{IdentityService, LoginOutcome};
pub use middleware::require_auth;
pub use password::PasswordHasher;
pub use token::{AuthError, AuthUser, Claims, TokenService};
