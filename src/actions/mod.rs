//! Form actions: validate a submission, run one statement, then redirect or report.
//!
//! Actions never fail with an error. Every path ends in an [`ActionOutcome`]: a
//! redirect on success, field errors on invalid input, or a single message on
//! credential or database failures.

pub mod auth;
pub mod invoices;

use actix_web::{http::header, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::ValidationErrors;

use crate::session::SessionCookies;

pub use auth::{sign_in, sign_out, sign_up};
pub use invoices::{create_invoice, delete_invoice, update_invoice, InvoiceForm};

/// Messages per form field, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// What a form gets back when an action does not redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionState {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
        }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CookieChange {
    /// Store this session token.
    Set(String),
    /// Remove the session cookie.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub location: &'static str,
    pub cookie: Option<CookieChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Redirect(Redirect),
    /// Input failed validation (422).
    Invalid(ActionState),
    /// Credentials were rejected (401).
    Denied(ActionState),
    /// The account already exists (409).
    Conflict(ActionState),
    /// No row matched the given id (404).
    NotFound(ActionState),
    /// The database call failed (500).
    Failed(ActionState),
}

impl ActionOutcome {
    pub fn redirect(location: &'static str) -> Self {
        ActionOutcome::Redirect(Redirect {
            location,
            cookie: None,
        })
    }

    pub fn redirect_with_cookie(location: &'static str, cookie: CookieChange) -> Self {
        ActionOutcome::Redirect(Redirect {
            location,
            cookie: Some(cookie),
        })
    }

    /// The state returned to the form, if the action did not redirect.
    pub fn state(&self) -> Option<&ActionState> {
        match self {
            ActionOutcome::Redirect(_) => None,
            ActionOutcome::Invalid(state)
            | ActionOutcome::Denied(state)
            | ActionOutcome::Conflict(state)
            | ActionOutcome::NotFound(state)
            | ActionOutcome::Failed(state) => Some(state),
        }
    }

    pub fn into_response(self, cookies: &SessionCookies) -> HttpResponse {
        match self {
            ActionOutcome::Redirect(redirect) => {
                let mut response = HttpResponse::SeeOther();
                response.insert_header((header::LOCATION, redirect.location));
                match redirect.cookie {
                    Some(CookieChange::Set(token)) => {
                        response.cookie(cookies.issue(token));
                    }
                    Some(CookieChange::Clear) => {
                        response.cookie(cookies.removal());
                    }
                    None => {}
                }
                response.finish()
            }
            ActionOutcome::Invalid(state) => HttpResponse::UnprocessableEntity().json(state),
            ActionOutcome::Denied(state) => HttpResponse::Unauthorized().json(state),
            ActionOutcome::Conflict(state) => HttpResponse::Conflict().json(state),
            ActionOutcome::NotFound(state) => HttpResponse::NotFound().json(state),
            ActionOutcome::Failed(state) => HttpResponse::InternalServerError().json(state),
        }
    }
}

/// Flattens `validator` errors into per-field message lists.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
