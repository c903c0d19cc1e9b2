pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtManager};
pub use middleware::{AuthLayer, TOKEN_COOKIE};
