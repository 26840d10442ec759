use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::Duration;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Builds the session cookie with fixed attributes.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    max_age: Duration,
    secure: bool,
}

impl SessionCookies {
    pub fn new(max_age: Duration, secure: bool) -> Self {
        Self { max_age, secure }
    }

    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.max_age.num_seconds()))
            .finish()
    }

    /// An empty, already-expired cookie that makes the browser drop the session.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish();
        cookie.make_removal();
        cookie
    }
}
