pub mod auth;
pub mod debug;
pub mod health;
pub mod invoices;
pub mod pages;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(pages::home)
        .service(pages::login_page)
        .service(auth::login)
        .service(auth::signup)
        .service(auth::logout)
        .service(
            web::scope("/dashboard")
                .service(pages::dashboard)
                .service(pages::customers)
                .service(invoices::list_invoices)
                .service(invoices::edit_invoice)
                .service(invoices::create_invoice)
                .service(invoices::update_invoice)
                .service(invoices::delete_invoice),
        );
}
