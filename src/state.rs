use std::sync::Arc;

use crate::config::Config;
use crate::repository::{
    CustomerRepository, InvoiceRepository, MaintenanceRepository, Repository, UserRepository,
};
use crate::revalidate::{PathRevalidator, Revalidator};
use crate::session::{SessionCodec, SessionCookies};

/// Shared handles passed to every handler through `web::Data<AppState>`.
///
/// Built once at startup. The repositories usually point at the same `PgRepository`,
/// which owns the process-wide connection pool.
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub maintenance: Arc<dyn MaintenanceRepository>,
    pub codec: SessionCodec,
    pub cookies: SessionCookies,
    pub revalidator: Arc<dyn Revalidator>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new<R>(
        repository: Arc<R>,
        codec: SessionCodec,
        cookies: SessionCookies,
        bcrypt_cost: u32,
    ) -> Self
    where
        R: Repository + 'static,
    {
        Self {
            users: repository.clone(),
            invoices: repository.clone(),
            customers: repository.clone(),
            maintenance: repository,
            codec,
            cookies,
            revalidator: Arc::new(PathRevalidator::new()),
            bcrypt_cost,
        }
    }

    pub fn from_config<R>(repository: Arc<R>, config: &Config) -> Self
    where
        R: Repository + 'static,
    {
        Self::new(
            repository,
            SessionCodec::new(&config.session_secret, config.session_ttl()),
            SessionCookies::new(config.session_ttl(), config.secure_cookies),
            config.bcrypt_cost,
        )
    }
}
