use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::session::cookie::SESSION_COOKIE;
use crate::session::guard::{decide, is_excluded};
use crate::session::token::SessionCodec;

/// Route guard middleware.
///
/// Decodes the `session` cookie on every request, stores valid `SessionClaims` in the
/// request extensions and answers with `303 See Other` when `guard::decide` asks for a
/// redirect.
pub struct SessionGuard {
    codec: SessionCodec,
}

impl SessionGuard {
    pub fn new(codec: SessionCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGuardService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct SessionGuardService<S> {
    service: S,
    codec: SessionCodec,
}

impl<S, B> Service<ServiceRequest> for SessionGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // The router matches the percent-decoded path, so the guard must too.
        let path = req.match_info().as_str().to_owned();
        if is_excluded(&path) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_owned());
        let claims = self.codec.decode(token.as_deref());
        let decision = decide(&path, claims.is_some());

        match decision.location() {
            None => {
                if let Some(claims) = claims {
                    req.extensions_mut().insert(claims);
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Some(location) => {
                log::debug!("{:?}: {} -> {}", decision, path, location);
                let response = HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, location))
                    .finish();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
