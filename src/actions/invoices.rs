use chrono::Utc;
use serde::Deserialize;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{field_errors, ActionOutcome, ActionState, FieldErrors};
use crate::models::{InvoiceStatus, NewInvoice};
use crate::repository::InvoiceRepository;
use crate::revalidate::Revalidator;
use crate::state::AppState;

/// The listing every invoice mutation invalidates and redirects to.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub const CUSTOMER_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_NAN_MESSAGE: &str = "Please enter a valid amount.";
pub const AMOUNT_TOO_LARGE_MESSAGE: &str = "Amount is too large.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";

/// Raw fields of the create/edit invoice form.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct InvoiceForm {
    #[validate(required(message = "Please select a customer."), custom = "validate_customer_id")]
    pub customer_id: Option<String>,
    /// Dollars, as typed.
    #[validate(
        required(message = "Please enter an amount greater than $0."),
        custom = "validate_amount"
    )]
    pub amount: Option<String>,
    #[validate(required(message = "Please select an invoice status."), custom = "validate_status")]
    pub status: Option<String>,
}

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn parse_customer_id(value: &str) -> Result<Uuid, &'static str> {
    Uuid::parse_str(value.trim()).map_err(|_| CUSTOMER_MESSAGE)
}

/// Converts a dollar amount typed into the form to whole cents.
fn parse_amount_cents(value: &str) -> Result<i32, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AMOUNT_MESSAGE);
    }

    let dollars: f64 = value.parse().map_err(|_| AMOUNT_NAN_MESSAGE)?;
    if !dollars.is_finite() {
        return Err(AMOUNT_NAN_MESSAGE);
    }

    let cents = (dollars * 100.0).round();
    if cents < 1.0 {
        return Err(AMOUNT_MESSAGE);
    }
    if cents > f64::from(i32::MAX) {
        return Err(AMOUNT_TOO_LARGE_MESSAGE);
    }
    Ok(cents as i32)
}

fn parse_status(value: &str) -> Result<InvoiceStatus, &'static str> {
    value.trim().parse().map_err(|_| STATUS_MESSAGE)
}

fn validate_customer_id(value: &str) -> Result<(), ValidationError> {
    parse_customer_id(value)
        .map(|_| ())
        .map_err(|message| rejection("customer_id", message))
}

fn validate_amount(value: &str) -> Result<(), ValidationError> {
    parse_amount_cents(value)
        .map(|_| ())
        .map_err(|message| rejection("amount", message))
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    parse_status(value)
        .map(|_| ())
        .map_err(|message| rejection("status", message))
}

impl InvoiceForm {
    /// Validates the form and converts it into typed values.
    pub fn into_draft(self) -> Result<NewInvoice, FieldErrors> {
        self.validate().map_err(|errors| field_errors(&errors))?;

        let mut errors = FieldErrors::new();
        let customer_id = take(
            &mut errors,
            "customer_id",
            self.customer_id,
            CUSTOMER_MESSAGE,
            parse_customer_id,
        );
        let amount_cents = take(
            &mut errors,
            "amount",
            self.amount,
            AMOUNT_MESSAGE,
            parse_amount_cents,
        );
        let status = take(&mut errors, "status", self.status, STATUS_MESSAGE, parse_status);

        match (customer_id, amount_cents, status) {
            (Some(customer_id), Some(amount_cents), Some(status)) => Ok(NewInvoice {
                customer_id,
                amount_cents,
                status,
            }),
            _ => Err(errors),
        }
    }
}

fn take<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    missing: &'static str,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let result = match value {
        Some(value) => parse(&value),
        None => Err(missing),
    };
    match result {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.insert(field.to_string(), vec![message.to_string()]);
            None
        }
    }
}

pub async fn create_invoice(state: &AppState, form: InvoiceForm) -> ActionOutcome {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            log::debug!("Rejected invoice form: {:?}", errors);
            return ActionOutcome::Invalid(ActionState::invalid(
                errors,
                "Missing Fields. Failed to Create Invoice.",
            ));
        }
    };

    let today = Utc::now().date_naive();
    if let Err(e) = state.invoices.insert_invoice(&draft, today).await {
        log::error!("Failed to create invoice: {}", e);
        return ActionOutcome::Failed(ActionState::message(
            "Database Error: Failed to Create Invoice.",
        ));
    }

    state.revalidator.revalidate(INVOICES_PATH);
    ActionOutcome::redirect(INVOICES_PATH)
}

pub async fn update_invoice(state: &AppState, id: Uuid, form: InvoiceForm) -> ActionOutcome {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            return ActionOutcome::Invalid(ActionState::invalid(
                errors,
                "Missing Fields. Failed to Update Invoice.",
            ));
        }
    };

    match state.invoices.update_invoice(id, &draft).await {
        Ok(0) => ActionOutcome::NotFound(ActionState::message("Invoice not found.")),
        Ok(_) => {
            state.revalidator.revalidate(INVOICES_PATH);
            ActionOutcome::redirect(INVOICES_PATH)
        }
        Err(e) => {
            log::error!("Failed to update invoice {}: {}", id, e);
            ActionOutcome::Failed(ActionState::message(
                "Database Error: Failed to Update Invoice.",
            ))
        }
    }
}

pub async fn delete_invoice(state: &AppState, id: Uuid) -> ActionOutcome {
    match state.invoices.delete_invoice(id).await {
        Ok(0) => ActionOutcome::NotFound(ActionState::message("Invoice not found.")),
        Ok(_) => {
            state.revalidator.revalidate(INVOICES_PATH);
            ActionOutcome::redirect(INVOICES_PATH)
        }
        Err(e) => {
            log::error!("Failed to delete invoice {}: {}", id, e);
            ActionOutcome::Failed(ActionState::message(
                "Database Error: Failed to Delete Invoice.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Invoice};
    use crate::repository::{InMemoryRepository, MaintenanceRepository};
    use crate::state::testing::memory_state;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn customer() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Delba de Oliveira".to_string(),
            email: "delba@oliveira.com".to_string(),
            image_url: "/customers/delba-de-oliveira.png".to_string(),
        }
    }

    fn form(customer_id: Option<&str>, amount: Option<&str>, status: Option<&str>) -> InvoiceForm {
        InvoiceForm {
            customer_id: customer_id.map(str::to_string),
            amount: amount.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    fn setup() -> (AppState, Arc<InMemoryRepository>, Customer) {
        let customer = customer();
        let repo = Arc::new(InMemoryRepository::with_customers(vec![customer.clone()]));
        (memory_state(repo.clone()), repo, customer)
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(parse_amount_cents("157.95"), Ok(15795));
        assert_eq!(parse_amount_cents(" 20 "), Ok(2000));
        assert_eq!(parse_amount_cents("0.01"), Ok(1));
        assert_eq!(parse_amount_cents("0"), Err(AMOUNT_MESSAGE));
        assert_eq!(parse_amount_cents("-5"), Err(AMOUNT_MESSAGE));
        assert_eq!(parse_amount_cents("0.001"), Err(AMOUNT_MESSAGE));
        assert_eq!(parse_amount_cents(""), Err(AMOUNT_MESSAGE));
        assert_eq!(parse_amount_cents("ten"), Err(AMOUNT_NAN_MESSAGE));
        assert_eq!(parse_amount_cents("NaN"), Err(AMOUNT_NAN_MESSAGE));
        assert_eq!(parse_amount_cents("1e12"), Err(AMOUNT_TOO_LARGE_MESSAGE));
    }

    #[test]
    fn test_valid_form_converts_to_draft() {
        let id = Uuid::new_v4();
        let draft = form(Some(&id.to_string()), Some("42.50"), Some("paid"))
            .into_draft()
            .unwrap();

        assert_eq!(
            draft,
            NewInvoice {
                customer_id: id,
                amount_cents: 4250,
                status: InvoiceStatus::Paid,
            }
        );
    }

    #[test]
    fn test_invalid_form_reports_every_field() {
        let errors = form(None, Some("0"), Some("overdue")).into_draft().unwrap_err();

        assert_eq!(errors["customer_id"], vec![CUSTOMER_MESSAGE.to_string()]);
        assert_eq!(errors["amount"], vec![AMOUNT_MESSAGE.to_string()]);
        assert_eq!(errors["status"], vec![STATUS_MESSAGE.to_string()]);

        let errors = form(Some("not-a-uuid"), Some("12"), None).into_draft().unwrap_err();
        assert_eq!(errors["customer_id"], vec![CUSTOMER_MESSAGE.to_string()]);
        assert_eq!(errors["status"], vec![STATUS_MESSAGE.to_string()]);
        assert!(!errors.contains_key("amount"));
    }

    #[test]
    fn test_missing_value_reports_the_field_message() {
        let mut errors = FieldErrors::new();

        let parsed = take(&mut errors, "amount", None, AMOUNT_MESSAGE, parse_amount_cents);

        assert_eq!(parsed, None);
        assert_eq!(errors["amount"], vec![AMOUNT_MESSAGE.to_string()]);
    }

    #[actix_rt::test]
    async fn test_create_invoice_inserts_and_redirects() {
        let (state, repo, customer) = setup();

        let outcome = create_invoice(
            &state,
            form(Some(&customer.id.to_string()), Some("99.99"), Some("pending")),
        )
        .await;

        assert_eq!(outcome, ActionOutcome::redirect(INVOICES_PATH));
        let invoices = repo.invoices();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].amount, 9999);
        assert_eq!(invoices[0].status, InvoiceStatus::Pending);
        assert_eq!(invoices[0].date, Utc::now().date_naive());
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 1);
    }

    #[actix_rt::test]
    async fn test_malformed_submissions_never_write() {
        let (state, repo, customer) = setup();
        let customer_id = customer.id.to_string();

        let malformed = [
            form(None, Some("10"), Some("paid")),
            form(Some(&customer_id), Some("-1"), Some("paid")),
            form(Some(&customer_id), Some("0"), Some("paid")),
            form(Some(&customer_id), Some("10"), Some("refunded")),
            form(Some(&customer_id), Some("10"), None),
        ];

        for submission in malformed {
            let outcome = create_invoice(&state, submission.clone()).await;
            match outcome {
                ActionOutcome::Invalid(ref action_state) => {
                    assert!(action_state.errors.as_ref().is_some_and(|e| !e.is_empty()));
                    assert_eq!(
                        action_state.message.as_deref(),
                        Some("Missing Fields. Failed to Create Invoice.")
                    );
                }
                other => panic!("expected field errors for {:?}, got {:?}", submission, other),
            }
        }

        assert_eq!(repo.writes(), 0);
        assert_eq!(repo.invoice_count(), 0);
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 0);
    }

    #[actix_rt::test]
    async fn test_database_failure_collapses_to_generic_message() {
        let (state, repo, customer) = setup();
        repo.drop_all_tables().await.unwrap();

        let outcome = create_invoice(
            &state,
            form(Some(&customer.id.to_string()), Some("10"), Some("paid")),
        )
        .await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ActionState::message(
                "Database Error: Failed to Create Invoice."
            ))
        );
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 0);
    }

    #[actix_rt::test]
    async fn test_update_and_delete_database_failures() {
        let (state, repo, customer) = setup();
        let existing = Invoice {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            amount: 500,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2023, 6, 5).unwrap(),
        };
        repo.add_invoice(existing.clone());
        repo.drop_all_tables().await.unwrap();

        let updated = update_invoice(
            &state,
            existing.id,
            form(Some(&customer.id.to_string()), Some("7.25"), Some("paid")),
        )
        .await;
        let deleted = delete_invoice(&state, existing.id).await;

        assert_eq!(
            updated,
            ActionOutcome::Failed(ActionState::message(
                "Database Error: Failed to Update Invoice."
            ))
        );
        assert_eq!(
            deleted,
            ActionOutcome::Failed(ActionState::message(
                "Database Error: Failed to Delete Invoice."
            ))
        );
        for outcome in [updated, deleted] {
            assert_eq!(
                outcome.into_response(&state.cookies).status(),
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            );
        }
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 0);
    }

    #[actix_rt::test]
    async fn test_update_invoice() {
        let (state, repo, customer) = setup();
        let existing = Invoice {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            amount: 500,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2023, 6, 5).unwrap(),
        };
        repo.add_invoice(existing.clone());

        let outcome = update_invoice(
            &state,
            existing.id,
            form(Some(&customer.id.to_string()), Some("7.25"), Some("paid")),
        )
        .await;
        assert_eq!(outcome, ActionOutcome::redirect(INVOICES_PATH));

        let updated = repo.invoices().pop().unwrap();
        assert_eq!(updated.amount, 725);
        assert_eq!(updated.status, InvoiceStatus::Paid);
        assert_eq!(updated.date, existing.date);

        let outcome = update_invoice(
            &state,
            existing.id,
            form(Some(&customer.id.to_string()), Some("abc"), Some("paid")),
        )
        .await;
        assert_eq!(
            outcome.state().and_then(|s| s.message.as_deref()),
            Some("Missing Fields. Failed to Update Invoice.")
        );

        let outcome = update_invoice(
            &state,
            Uuid::new_v4(),
            form(Some(&customer.id.to_string()), Some("1"), Some("paid")),
        )
        .await;
        assert!(matches!(outcome, ActionOutcome::NotFound(_)));
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 1);
    }

    #[actix_rt::test]
    async fn test_delete_removes_one_row_and_revalidates_once() {
        let (state, repo, customer) = setup();
        let keep = Invoice {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            amount: 100,
            status: InvoiceStatus::Paid,
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        };
        let doomed = Invoice {
            id: Uuid::new_v4(),
            ..keep.clone()
        };
        repo.add_invoice(keep.clone());
        repo.add_invoice(doomed.clone());

        let outcome = delete_invoice(&state, doomed.id).await;

        assert_eq!(outcome, ActionOutcome::redirect(INVOICES_PATH));
        assert_eq!(repo.invoices(), vec![keep]);
        assert_eq!(repo.writes(), 1);
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 1);

        let outcome = delete_invoice(&state, doomed.id).await;
        assert!(matches!(outcome, ActionOutcome::NotFound(_)));
        assert_eq!(state.revalidator.generation(INVOICES_PATH), 1);
    }
}
