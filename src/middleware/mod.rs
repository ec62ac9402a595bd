pub mod auth;
pub mod chain;
pub mod fault;
pub mod logging;
pub mod response;

pub use auth::{jwt_auth_middleware, VerifiedClaims};
pub use chain::{Dispatcher, Interceptor, Next};
pub use fault::FaultBarrier;
pub use logging::RequestLogger;
pub use response::{ApiResponse, ProxyResponse};
