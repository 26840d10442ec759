use actix_web::web;
use uuid::Uuid;
use validator::Validate;

use super::{field_errors, ActionOutcome, ActionState, CookieChange};
use crate::auth::{hash_password, verify_password, SignInForm, SignUpForm};
use crate::error::AppError;
use crate::models::User;
use crate::repository::UserRepository;
use crate::session::guard::DASHBOARD_PATH;
use crate::state::AppState;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const EMAIL_TAKEN: &str = "User with this email already exists.";
pub const SIGN_UP_FAILED: &str = "Invalid email, password or username.";

fn invalid_credentials() -> ActionOutcome {
    ActionOutcome::Denied(ActionState::message(INVALID_CREDENTIALS))
}

/// Runs bcrypt on the blocking thread pool.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Blocking task failed: {}", e)))?
}

/// Checks the credentials and starts a session.
///
/// Unknown email, wrong password and lookup failures all produce the same message.
pub async fn sign_in(state: &AppState, form: SignInForm) -> ActionOutcome {
    if let Err(errors) = form.validate() {
        log::debug!("Sign in error: validation failed");
        return ActionOutcome::Invalid(ActionState::invalid(
            field_errors(&errors),
            "Missing fields. Failed to sign in.",
        ));
    }
    let (Some(email), Some(password)) = (form.email, form.password) else {
        return ActionOutcome::Invalid(ActionState::message("Missing fields. Failed to sign in."));
    };

    let user = match state.users.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::info!("Sign in attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => {
            log::error!("Failed to look up user: {}", e);
            return invalid_credentials();
        }
    };

    let hashed = user.password.clone();
    match blocking(move || verify_password(&password, &hashed)).await {
        Ok(true) => {}
        Ok(false) => {
            log::info!("Wrong password for user {}", user.id);
            return invalid_credentials();
        }
        Err(e) => {
            log::warn!("Could not verify password for user {}: {}", user.id, e);
            return invalid_credentials();
        }
    }

    match state.codec.encode(user.id) {
        Ok(token) => ActionOutcome::redirect_with_cookie(DASHBOARD_PATH, CookieChange::Set(token)),
        Err(e) => {
            log::error!("{}", e);
            invalid_credentials()
        }
    }
}

/// Creates an account and starts a session for it.
pub async fn sign_up(state: &AppState, form: SignUpForm) -> ActionOutcome {
    if let Err(errors) = form.validate() {
        log::debug!("Sign up error: validation failed");
        return ActionOutcome::Invalid(ActionState::invalid(
            field_errors(&errors),
            "Missing fields. Failed to sign up.",
        ));
    }
    let (Some(email), Some(password), Some(name)) = (form.email, form.password, form.name) else {
        return ActionOutcome::Invalid(ActionState::message("Missing fields. Failed to sign up."));
    };

    match state.users.find_user_by_email(&email).await {
        Ok(None) => {}
        Ok(Some(_)) => return ActionOutcome::Conflict(ActionState::message(EMAIL_TAKEN)),
        Err(e) => {
            log::error!("Failed to look up user: {}", e);
            return ActionOutcome::Failed(ActionState::message(SIGN_UP_FAILED));
        }
    }

    let cost = state.bcrypt_cost;
    let hashed = match blocking(move || hash_password(&password, cost)).await {
        Ok(hashed) => hashed,
        Err(e) => {
            log::error!("{}", e);
            return ActionOutcome::Failed(ActionState::message(SIGN_UP_FAILED));
        }
    };

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password: hashed,
    };
    if let Err(e) = state.users.insert_user(&user).await {
        log::error!("Failed to create user: {}", e);
        return ActionOutcome::Failed(ActionState::message(SIGN_UP_FAILED));
    }
    log::info!("Created user {}", user.id);

    match state.codec.encode(user.id) {
        Ok(token) => ActionOutcome::redirect_with_cookie(DASHBOARD_PATH, CookieChange::Set(token)),
        Err(e) => {
            log::error!("{}", e);
            ActionOutcome::Failed(ActionState::message(SIGN_UP_FAILED))
        }
    }
}

/// Ends the session by clearing the cookie. Issued tokens are not tracked server-side.
pub fn sign_out() -> ActionOutcome {
    ActionOutcome::redirect_with_cookie("/", CookieChange::Clear)
}
