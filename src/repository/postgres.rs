use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    page_count, page_offset, CustomerRepository, InvoiceRepository, MaintenanceRepository,
    UserRepository, INVOICES_PER_PAGE,
};
use crate::error::AppError;
use crate::models::{Customer, Invoice, InvoiceListing, InvoiceSummary, NewInvoice, User};

const INVOICE_SEARCH_FILTER: &str = "customers.name ILIKE $1 \
     OR customers.email ILIKE $1 \
     OR invoices.amount::text ILIKE $1 \
     OR invoices.date::text ILIKE $1 \
     OR invoices.status ILIKE $1";

/// PostgreSQL-backed repository sharing one connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn like_pattern(query: &str) -> String {
    format!("%{}%", query.trim())
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for PgRepository {
    async fn insert_invoice(&self, invoice: &NewInvoice, date: NaiveDate) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO invoices (customer_id, amount, status, date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status.as_str())
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_invoice(&self, id: Uuid, invoice: &NewInvoice) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE invoices
             SET customer_id = $1, amount = $2, status = $3
             WHERE id = $4",
        )
        .bind(invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListing>, AppError> {
        let sql = format!(
            "SELECT invoices.id, invoices.amount, invoices.date, invoices.status,
                    customers.name, customers.email, customers.image_url
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE {}
             ORDER BY invoices.date DESC
             LIMIT $2 OFFSET $3",
            INVOICE_SEARCH_FILTER
        );

        let invoices = sqlx::query_as::<_, InvoiceListing>(&sql)
            .bind(like_pattern(query))
            .bind(i64::from(INVOICES_PER_PAGE))
            .bind(page_offset(page))
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    async fn invoice_pages(&self, query: &str) -> Result<u32, AppError> {
        let sql = format!(
            "SELECT COUNT(*)
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE {}",
            INVOICE_SEARCH_FILTER
        );

        let (rows,): (i64,) = sqlx::query_as(&sql)
            .bind(like_pattern(query))
            .fetch_one(&self.pool)
            .await?;

        Ok(page_count(rows))
    }

    async fn invoice_summary(&self) -> Result<InvoiceSummary, AppError> {
        let summary = sqlx::query_as::<_, InvoiceSummary>(
            "SELECT
                (SELECT COUNT(*) FROM invoices) AS invoice_count,
                (SELECT COUNT(*) FROM customers) AS customer_count,
                COALESCE((SELECT SUM(amount) FROM invoices WHERE status = 'paid'), 0)::BIGINT
                    AS total_paid,
                COALESCE((SELECT SUM(amount) FROM invoices WHERE status = 'pending'), 0)::BIGINT
                    AS total_pending",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

#[async_trait]
impl CustomerRepository for PgRepository {
    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

#[async_trait]
impl MaintenanceRepository for PgRepository {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn drop_all_tables(&self) -> Result<(), AppError> {
        sqlx::query("DROP TABLE IF EXISTS invoices, customers, users, revenue")
            .execute(&self.pool)
            .await?;

        log::warn!("Dropped invoices, customers, users and revenue tables");
        Ok(())
    }
}
