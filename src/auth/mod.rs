pub mod password;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

pub use password::{hash_password, verify_password};

lazy_static! {
    // Latin letters only, at least four of them.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z]{4,}$").unwrap();
}

/// Fields of the sign-in form.
///
/// Every field is optional at the type level so a missing field becomes a field
/// error instead of a rejected request body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(
        required(message = "Invalid email address."),
        email(message = "Invalid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password must be at least 6 characters long."),
        length(min = 6, message = "Password must be at least 6 characters long.")
    )]
    pub password: Option<String>,
}

/// Fields of the sign-up form.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(
        required(message = "Invalid email address."),
        email(message = "Invalid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password must be at least 6 characters long."),
        length(min = 6, message = "Password must be at least 6 characters long.")
    )]
    pub password: Option<String>,
    #[validate(
        required(
            message = "Name must contain only Latin letters and be at least 4 characters long."
        ),
        regex(
            path = "NAME_REGEX",
            message = "Name must contain only Latin letters and be at least 4 characters long."
        )
    )]
    pub name: Option<String>,
}
