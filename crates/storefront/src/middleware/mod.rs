//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Session layer (tower-sessions with in-memory store)
//! 6. Rate limiting on admin routes (governor)

pub mod auth;
pub mod cart;
pub mod locale;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::AdminToken;
pub use cart::SessionCart;
pub use locale::{RequestLocale, set_locale};
pub use rate_limit::admin_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
