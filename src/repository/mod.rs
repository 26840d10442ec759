//! Data access. Every method issues exactly one SQL statement.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Customer, Invoice, InvoiceListing, InvoiceSummary, NewInvoice, User};

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Rows per page of the invoices table.
pub const INVOICES_PER_PAGE: u32 = 6;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn insert_invoice(&self, invoice: &NewInvoice, date: chrono::NaiveDate)
        -> Result<(), AppError>;
    /// Returns the number of rows updated.
    async fn update_invoice(&self, id: Uuid, invoice: &NewInvoice) -> Result<u64, AppError>;
    /// Returns the number of rows deleted.
    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError>;
    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError>;
    /// Case-insensitive search over customer name and email, amount, date and status,
    /// newest first. `page` starts at 1.
    async fn search_invoices(&self, query: &str, page: u32)
        -> Result<Vec<InvoiceListing>, AppError>;
    async fn invoice_pages(&self, query: &str) -> Result<u32, AppError>;
    async fn invoice_summary(&self) -> Result<InvoiceSummary, AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;
}

/// Operations behind the `/query` maintenance endpoint.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    /// Drops `invoices`, `customers`, `users` and `revenue`.
    async fn drop_all_tables(&self) -> Result<(), AppError>;
}

/// Anything that backs the whole application.
pub trait Repository:
    UserRepository + InvoiceRepository + CustomerRepository + MaintenanceRepository
{
}

impl<T> Repository for T where
    T: UserRepository + InvoiceRepository + CustomerRepository + MaintenanceRepository
{
}

pub(crate) fn page_count(rows: i64) -> u32 {
    let per_page = i64::from(INVOICES_PER_PAGE);
    u32::try_from((rows.max(0) + per_page - 1) / per_page).unwrap_or(u32::MAX)
}

pub(crate) fn page_offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(INVOICES_PER_PAGE)
}
