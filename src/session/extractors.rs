use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::session::token::SessionClaims;

/// The signed-in user's id, taken from the claims `SessionGuard` stored on the request.
///
/// Fails with `401 Unauthorized` when the request carried no valid session. Handlers on
/// paths the guard does not redirect for (invoice mutations, `/query`) rely on this to
/// refuse anonymous callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<SessionClaims>() {
            Some(claims) => ready(Ok(CurrentUser(claims.sub))),
            None => {
                let err = AppError::Unauthorized("Sign in to continue.".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
