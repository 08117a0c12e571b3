pub mod auth;
pub mod layers;

pub use auth::{auth_middleware, AuthUser};
pub use layers::{apply_middleware, rate_limited, LOGIN_LIMIT, REGISTER_LIMIT};
