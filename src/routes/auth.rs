use crate::{
    actions,
    auth::{SignInForm, SignUpForm},
    state::AppState,
};
use actix_web::{post, web, Responder};

/// Sign in
///
/// Checks the credentials and, on success, sets the `session` cookie and redirects to
/// `/dashboard`. Failures answer `401` with a single message.
#[post("/login")]
pub async fn login(state: web::Data<AppState>, form: web::Form<SignInForm>) -> impl Responder {
    actions::sign_in(&state, form.into_inner())
        .await
        .into_response(&state.cookies)
}

/// Sign up
///
/// Creates the account and starts a session. An email that is already registered
/// answers `409 Conflict`.
#[post("/signup")]
pub async fn signup(state: web::Data<AppState>, form: web::Form<SignUpForm>) -> impl Responder {
    actions::sign_up(&state, form.into_inner())
        .await
        .into_response(&state.cookies)
}

#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    actions::sign_out().into_response(&state.cookies)
}
