use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{format_currency, Customer},
    repository::{CustomerRepository, InvoiceRepository},
    session::CurrentUser,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub value: String,
}

/// Landing page. Reachable with or without a session.
#[get("/")]
pub async fn home(user: Option<CurrentUser>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "page": "home",
        "authenticated": user.is_some(),
    }))
}

/// Login page. The guard sends signed-in visitors to the dashboard instead.
#[get("/login")]
pub async fn login_page() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "page": "login",
        "actions": { "sign_in": "/login", "sign_up": "/signup" },
    }))
}

/// Summary cards shown at the top of the dashboard.
#[get("")]
pub async fn dashboard(
    state: web::Data<AppState>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let summary = state.invoices.invoice_summary().await?;

    let cards = vec![
        Card {
            title: "Collected",
            value: format_currency(summary.total_paid),
        },
        Card {
            title: "Pending",
            value: format_currency(summary.total_pending),
        },
        Card {
            title: "Total Invoices",
            value: summary.invoice_count.to_string(),
        },
        Card {
            title: "Total Customers",
            value: summary.customer_count.to_string(),
        },
    ];

    Ok(HttpResponse::Ok().json(serde_json::json!({ "page": "dashboard", "cards": cards })))
}

#[get("/customers")]
pub async fn customers(
    state: web::Data<AppState>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let customers: Vec<Customer> = state.customers.list_customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}
