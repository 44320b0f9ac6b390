//! Authentication
//!
//! Bearer-token validation and viewer identity extraction. Token issuance
//! lives with the platform's account service; this crate only validates
//! access tokens and resolves them to local people.

pub mod error;
pub mod jwt;
pub mod middleware;

pub use error::{AuthError, AuthResult};
pub use middleware::{optional_auth, require_auth, AuthPerson, MaybeAuthPerson};
