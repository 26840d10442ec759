use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    actions::{self, invoices::INVOICES_PATH, InvoiceForm},
    error::AppError,
    models::{format_currency, Customer, Invoice, InvoiceListing},
    repository::{CustomerRepository, InvoiceRepository},
    revalidate::Revalidator,
    session::CurrentUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceRow {
    #[serde(flatten)]
    pub listing: InvoiceListing,
    pub formatted_amount: String,
}

#[derive(Debug, Serialize)]
pub struct InvoicesPage {
    pub query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub invoices: Vec<InvoiceRow>,
}

#[derive(Debug, Serialize)]
pub struct EditInvoicePage {
    pub invoice: Invoice,
    pub customers: Vec<Customer>,
}

/// Filtered, paginated invoice table.
///
/// ## Query Parameters:
/// - `query` (optional): matched case-insensitively against customer name and email,
///   amount, date and status.
/// - `page` (optional): 1-based page number, defaults to 1.
///
/// ## Responses:
/// - `200 OK` with a weak `ETag` that changes whenever an invoice is written.
/// - `304 Not Modified` when `If-None-Match` carries the current tag.
#[get("/invoices")]
pub async fn list_invoices(
    state: web::Data<AppState>,
    params: web::Query<InvoiceQuery>,
    req: HttpRequest,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let etag = state.revalidator.etag(INVOICES_PATH);
    let fresh = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|tags| tags.split(',').any(|tag| tag.trim() == etag))
        .unwrap_or(false);
    if fresh {
        return Ok(HttpResponse::NotModified()
            .insert_header((header::ETAG, etag))
            .finish());
    }

    let params = params.into_inner();
    let query = params.query.unwrap_or_default();
    let current_page = params.page.unwrap_or(1).max(1);

    let listings = state.invoices.search_invoices(&query, current_page).await?;
    let total_pages = state.invoices.invoice_pages(&query).await?;
    let invoices = listings
        .into_iter()
        .map(|listing| InvoiceRow {
            formatted_amount: format_currency(i64::from(listing.amount)),
            listing,
        })
        .collect();

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, etag))
        .json(InvoicesPage {
            query,
            current_page,
            total_pages,
            invoices,
        }))
}

/// The invoice plus every customer it could be reassigned to.
#[get("/invoices/{id}/edit")]
pub async fn edit_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let invoice = state
        .invoices
        .find_invoice(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", id)))?;
    let customers = state.customers.list_customers().await?;

    Ok(HttpResponse::Ok().json(EditInvoicePage { invoice, customers }))
}

#[post("/invoices")]
pub async fn create_invoice(
    state: web::Data<AppState>,
    form: web::Form<InvoiceForm>,
    _user: CurrentUser,
) -> impl Responder {
    actions::create_invoice(&state, form.into_inner())
        .await
        .into_response(&state.cookies)
}

#[post("/invoices/{id}")]
pub async fn update_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<InvoiceForm>,
    _user: CurrentUser,
) -> impl Responder {
    actions::update_invoice(&state, path.into_inner(), form.into_inner())
        .await
        .into_response(&state.cookies)
}

#[post("/invoices/{id}/delete")]
pub async fn delete_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    _user: CurrentUser,
) -> impl Responder {
    actions::delete_invoice(&state, path.into_inner())
        .await
        .into_response(&state.cookies)
}
