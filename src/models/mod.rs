pub mod customer;
pub mod invoice;
pub mod user;

pub use customer::Customer;
pub use invoice::{
    format_currency, Invoice, InvoiceListing, InvoiceStatus, InvoiceSummary, NewInvoice,
    ParseStatusError,
};
pub use user::User;
