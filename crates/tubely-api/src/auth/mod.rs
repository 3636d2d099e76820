pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{JwtClaims, JwtManager};
pub use models::AuthUser;
