//! Accounts, password hashing and bearer-token sessions.

pub mod domain;
pub mod extract;
pub mod repository;
pub mod router;
pub mod service;
pub mod token;

pub use domain::{AuthSession, User, UserProfile, UserRole};
pub use extract::AuthUser;
pub use repository::UserRepository;
pub use router::auth_router;
pub use service::AuthService;
pub use token::{TokenClaims, TokenError, TokenSigner};
