use validator::Validate;

use super::state::{FormError, ModalForm, SubmitError};
use crate::schemas::fee::{FeePayment, StudentFees};
use crate::schemas::types::{PaymentAction, PaymentStatus};
use crate::services::gateway::AdminApi;

const DEFAULT_PAYMENT_METHOD: &str = "manual";

/// Review of one pending payment. Opened from a student's payment row.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct PaymentForm {
    #[validate(length(min = 1, message = "Select a payment to review"))]
    pub payment_id: String,
    pub student_name: String,
    pub amount: f64,
    pub transaction_code: Option<String>,
    pub action: PaymentAction,
    pub payment_method: String,
    pub reason: String,
}

impl PaymentForm {
    pub fn title(&self) -> &'static str {
        match self.action {
            PaymentAction::Confirm => "Confirm Payment",
            PaymentAction::Reject => "Reject Payment",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self.action {
            PaymentAction::Confirm => "Payment confirmed successfully",
            PaymentAction::Reject => "Payment rejected successfully",
        }
    }
}

pub type PaymentModal = ModalForm<PaymentForm>;

impl ModalForm<PaymentForm> {
    /// Opens the review for `payment`. Only pending payments can be acted
    /// on; anything else leaves the modal closed and returns false.
    pub fn open_for(
        &mut self,
        student: &StudentFees,
        payment: &FeePayment,
        action: PaymentAction,
    ) -> bool {
        if payment.status != PaymentStatus::Pending || self.is_open() {
            return false;
        }
        self.open();
        match self.edit() {
            Ok(form) => {
                *form = PaymentForm {
                    payment_id: payment.id.clone(),
                    student_name: student.name.clone(),
                    amount: payment.amount,
                    transaction_code: payment.transaction_code.clone(),
                    action,
                    payment_method: payment.payment_method.clone().unwrap_or_default(),
                    reason: String::new(),
                };
                true
            }
            Err(_) => false,
        }
    }

    pub async fn submit<G: AdminApi + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<&'static str, SubmitError> {
        let form = self.prepare(|form| {
            if form.action == PaymentAction::Reject && form.reason.trim().is_empty() {
                return Err(FormError::Invalid(
                    "Please provide a reason for rejection".to_string(),
                ));
            }
            Ok(form.clone())
        })?;

        let outcome = match form.action {
            PaymentAction::Confirm => {
                let method = match form.payment_method.trim() {
                    "" => DEFAULT_PAYMENT_METHOD,
                    method => method,
                };
                gateway.confirm_payment(&form.payment_id, method).await
            }
            PaymentAction::Reject => gateway.reject_payment(&form.payment_id, form.reason.trim()).await,
        };
        let verb = form.action.verb();
        self.settle(outcome.map(|()| form.success_message()), |err| {
            format!("Failed to {verb} payment: {err}")
        })
    }
}
