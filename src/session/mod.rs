//! Cookie sessions: the token codec, the cookie builder and the route guard.

pub mod cookie;
pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod token;

pub use cookie::{SessionCookies, SESSION_COOKIE};
pub use extractors::CurrentUser;
pub use guard::{decide, GuardDecision};
pub use middleware::SessionGuard;
pub use token::{SessionClaims, SessionCodec};
