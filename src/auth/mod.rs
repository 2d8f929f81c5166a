// Public API - what other modules can use
pub use handlers::issue_guest_token;
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::{TokenResponse, UserClaims};

// Internal modules
mod handlers;
mod middleware;
mod token;
mod types;
