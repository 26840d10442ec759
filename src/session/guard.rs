//! Access rules applied to every request before it reaches a handler.

/// Pages only useful to signed-out visitors.
pub const PUBLIC_ROUTES: &[&str] = &["/login"];
/// Pages that require a session.
pub const PRIVATE_ROUTES: &[&str] = &["/dashboard", "/dashboard/invoices", "/dashboard/customers"];

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GuardDecision {
    /// Target of the redirect, if any.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// Strips trailing slashes so `/dashboard/` matches `/dashboard`. The root stays `/`.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Paths the guard never looks at: API calls, static assets and the health check.
pub fn is_excluded(path: &str) -> bool {
    path == "/health"
        || path == "/api"
        || path.starts_with("/api/")
        || path.starts_with("/static/")
        || path.ends_with(".png")
}

/// Decides what happens to a request for `path` given whether a valid session exists.
pub fn decide(path: &str, has_session: bool) -> GuardDecision {
    let path = normalize_path(path);

    if PRIVATE_ROUTES.contains(&path) && !has_session {
        return GuardDecision::RedirectToLogin;
    }
    if PUBLIC_ROUTES.contains(&path) && has_session {
        return GuardDecision::RedirectToDashboard;
    }
    GuardDecision::Allow
}
