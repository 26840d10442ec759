//! Maintenance endpoint, mounted only when `DEBUG_ROUTES=true`.

use actix_web::{delete, get, web, HttpResponse, Responder};

use crate::{
    actions::invoices::INVOICES_PATH,
    error::AppError,
    repository::MaintenanceRepository,
    revalidate::Revalidator,
    session::CurrentUser,
    state::AppState,
};

/// Lists users. Password hashes are never serialized.
#[get("/query")]
pub async fn list_users(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    log::warn!("User {} listed all users through /query", user.0);
    let users = state.maintenance.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Drops every table. Irreversible.
#[delete("/query")]
pub async fn drop_tables(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    log::warn!("User {} dropped all tables through /query", user.0);
    state.maintenance.drop_all_tables().await?;
    state.revalidator.revalidate(INVOICES_PATH);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Tables dropped" })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users).service(drop_tables);
}
