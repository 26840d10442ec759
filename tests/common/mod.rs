#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

use invoicedash::models::{Customer, Invoice, InvoiceStatus};
use invoicedash::repository::InMemoryRepository;
use invoicedash::session::{SessionCodec, SessionCookies, SessionGuard, SESSION_COOKIE};
use invoicedash::{routes, AppState};

pub const SECRET: &str = "integration-test-session-secret-0123456789";

pub fn state(repository: Arc<InMemoryRepository>) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        repository,
        SessionCodec::new(SECRET, Duration::hours(1)),
        SessionCookies::new(Duration::hours(1), false),
        4,
    ))
}

/// The full application, as `main` builds it, with the debug routes mounted.
pub async fn app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(SessionGuard::new(state.codec.clone()))
            .wrap(Logger::default())
            .configure(routes::config)
            .configure(routes::debug::config),
    )
    .await
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
}

pub fn customer(name: &str, email: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        image_url: format!("/customers/{}.png", name.to_lowercase().replace(' ', "-")),
    }
}

pub fn invoice(
    customer: &Customer,
    amount: i32,
    status: InvoiceStatus,
    date: (i32, u32, u32),
) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        amount,
        status,
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    }
}
