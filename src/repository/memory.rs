use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{
    page_count, page_offset, CustomerRepository, InvoiceRepository, MaintenanceRepository,
    UserRepository, INVOICES_PER_PAGE,
};
use crate::error::AppError;
use crate::models::{
    Customer, Invoice, InvoiceListing, InvoiceStatus, InvoiceSummary, NewInvoice, User,
};

/// In-memory implementation of every repository trait.
///
/// Used by the test suites and for running the dashboard without a database. After
/// `drop_all_tables` every call fails the way PostgreSQL does once the relations are
/// gone.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    customers: RwLock<HashMap<Uuid, Customer>>,
    invoices: RwLock<HashMap<Uuid, Invoice>>,
    writes: AtomicU64,
    dropped: AtomicBool,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let repository = Self::new();
        for customer in customers {
            repository.add_customer(customer);
        }
        repository
    }

    pub fn add_customer(&self, customer: Customer) {
        write(&self.customers).insert(customer.id, customer);
    }

    /// Seeds an invoice without counting it as a write.
    pub fn add_invoice(&self, invoice: Invoice) {
        write(&self.invoices).insert(invoice.id, invoice);
    }

    pub fn invoice_count(&self) -> usize {
        read(&self.invoices).len()
    }

    pub fn user_count(&self) -> usize {
        read(&self.users).len()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        read(&self.invoices).values().cloned().collect()
    }

    /// Number of successful INSERT/UPDATE/DELETE statements executed so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_tables(&self, table: &str) -> Result<(), AppError> {
        if self.dropped.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(format!(
                "relation \"{}\" does not exist",
                table
            )));
        }
        Ok(())
    }

    fn ensure_customer(&self, customer_id: Uuid) -> Result<(), AppError> {
        if !read(&self.customers).contains_key(&customer_id) {
            return Err(AppError::DatabaseError(
                "insert or update on table \"invoices\" violates foreign key constraint \
                 \"invoices_customer_id_fkey\""
                    .into(),
            ));
        }
        Ok(())
    }

    fn record_write(&self, rows: u64) -> u64 {
        self.writes.fetch_add(1, Ordering::SeqCst);
        rows
    }

    fn matching_listings(&self, query: &str) -> Vec<InvoiceListing> {
        let needle = query.trim().to_lowercase();
        let customers = read(&self.customers);

        let mut listings: Vec<InvoiceListing> = read(&self.invoices)
            .values()
            .filter_map(|invoice| {
                let customer = customers.get(&invoice.customer_id)?;
                Some(InvoiceListing {
                    id: invoice.id,
                    amount: invoice.amount,
                    date: invoice.date,
                    status: invoice.status,
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                })
            })
            .filter(|listing| {
                needle.is_empty()
                    || [
                        listing.name.to_lowercase(),
                        listing.email.to_lowercase(),
                        listing.amount.to_string(),
                        listing.date.to_string(),
                        listing.status.to_string(),
                    ]
                    .iter()
                    .any(|field| field.contains(&needle))
            })
            .collect();

        listings.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        listings
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.ensure_tables("users")?;
        Ok(read(&self.users)
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.ensure_tables("users")?;
        let mut users = write(&self.users);
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::DatabaseError(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            ));
        }
        let inserted = if users.contains_key(&user.id) {
            0
        } else {
            users.insert(user.id, user.clone());
            1
        };
        self.record_write(inserted);
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryRepository {
    async fn insert_invoice(&self, invoice: &NewInvoice, date: NaiveDate) -> Result<(), AppError> {
        self.ensure_tables("invoices")?;
        self.ensure_customer(invoice.customer_id)?;
        let id = Uuid::new_v4();
        write(&self.invoices).insert(
            id,
            Invoice {
                id,
                customer_id: invoice.customer_id,
                amount: invoice.amount_cents,
                status: invoice.status,
                date,
            },
        );
        self.record_write(1);
        Ok(())
    }

    async fn update_invoice(&self, id: Uuid, invoice: &NewInvoice) -> Result<u64, AppError> {
        self.ensure_tables("invoices")?;
        // Like the foreign key, only checked when a row is actually updated.
        if read(&self.invoices).contains_key(&id) {
            self.ensure_customer(invoice.customer_id)?;
        }
        let updated = match write(&self.invoices).get_mut(&id) {
            Some(existing) => {
                existing.customer_id = invoice.customer_id;
                existing.amount = invoice.amount_cents;
                existing.status = invoice.status;
                1
            }
            None => 0,
        };
        Ok(self.record_write(updated))
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError> {
        self.ensure_tables("invoices")?;
        let deleted = u64::from(write(&self.invoices).remove(&id).is_some());
        Ok(self.record_write(deleted))
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        self.ensure_tables("invoices")?;
        Ok(read(&self.invoices).get(&id).cloned())
    }

    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListing>, AppError> {
        self.ensure_tables("invoices")?;
        let offset = usize::try_from(page_offset(page)).unwrap_or(usize::MAX);
        Ok(self
            .matching_listings(query)
            .into_iter()
            .skip(offset)
            .take(INVOICES_PER_PAGE as usize)
            .collect())
    }

    async fn invoice_pages(&self, query: &str) -> Result<u32, AppError> {
        self.ensure_tables("invoices")?;
        let rows = i64::try_from(self.matching_listings(query).len()).unwrap_or(i64::MAX);
        Ok(page_count(rows))
    }

    async fn invoice_summary(&self) -> Result<InvoiceSummary, AppError> {
        self.ensure_tables("invoices")?;
        let invoices = read(&self.invoices);
        let total = |status: InvoiceStatus| -> i64 {
            invoices
                .values()
                .filter(|invoice| invoice.status == status)
                .map(|invoice| i64::from(invoice.amount))
                .sum()
        };

        Ok(InvoiceSummary {
            invoice_count: invoices.len() as i64,
            customer_count: read(&self.customers).len() as i64,
            total_paid: total(InvoiceStatus::Paid),
            total_pending: total(InvoiceStatus::Pending),
        })
    }
}

#[async_trait]
impl CustomerRepository for InMemoryRepository {
    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.ensure_tables("customers")?;
        let mut customers: Vec<Customer> = read(&self.customers).values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryRepository {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.ensure_tables("users")?;
        let mut users: Vec<User> = read(&self.users).values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn drop_all_tables(&self) -> Result<(), AppError> {
        write(&self.invoices).clear();
        write(&self.customers).clear();
        write(&self.users).clear();
        self.dropped.store(true, Ordering::SeqCst);
        Ok(())
    }
}
