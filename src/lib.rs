#![doc = "The `invoicedash` library crate."]
#![doc = ""]
#![doc = "Session codec, route guard, form actions, data access and routing for the"]
#![doc = "invoicing dashboard. The binary (`main.rs`) wires these into an `HttpServer`."]

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod revalidate;
pub mod routes;
pub mod session;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::AppState;
