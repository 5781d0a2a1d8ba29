use super::SectionContext;
use crate::modals::{PaymentModal, SubmitError};
use crate::schemas::fee::{FeeStatistics, StudentFees};
use crate::schemas::types::{PaymentAction, PaymentStatus};
use crate::services::gateway::{AdminApi, GatewayError};
use crate::store::ResourceKind;

/// Totals derived from the loaded fee rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeSummary {
    pub total_collected: f64,
    pub confirmed: usize,
    pub pending: usize,
    pub total: usize,
}

impl FeeSummary {
    pub fn from_students(students: &[StudentFees]) -> Self {
        students.iter().flat_map(|student| &student.fee_payments).fold(
            Self::default(),
            |mut summary, payment| {
                summary.total += 1;
                match payment.status {
                    PaymentStatus::Confirmed => {
                        summary.confirmed += 1;
                        summary.total_collected += payment.amount;
                    }
                    PaymentStatus::Pending => summary.pending += 1,
                    PaymentStatus::Rejected => {}
                }
                summary
            },
        )
    }

    /// `$150` for whole amounts, `$150.50` otherwise.
    pub fn collected_label(&self) -> String {
        if self.total_collected.fract() == 0.0 {
            format!("${:.0}", self.total_collected)
        } else {
            format!("${:.2}", self.total_collected)
        }
    }

    pub fn cards(&self) -> [(&'static str, String); 4] {
        [
            ("Total Collected", self.collected_label()),
            ("Confirmed Payments", self.confirmed.to_string()),
            ("Pending Payments", self.pending.to_string()),
            ("Total Transactions", self.total.to_string()),
        ]
    }
}

pub struct FeesSection<G: ?Sized> {
    ctx: SectionContext<G>,
    payment_modal: PaymentModal,
}

impl<G: AdminApi + ?Sized> FeesSection<G> {
    pub fn new(ctx: SectionContext<G>) -> Self {
        Self { ctx, payment_modal: PaymentModal::default() }
    }

    pub fn students(&self) -> Vec<StudentFees> {
        self.ctx.store.snapshot().fees
    }

    pub fn summary(&self) -> FeeSummary {
        FeeSummary::from_students(&self.ctx.store.snapshot().fees)
    }

    /// Server-side totals, for callers that need rejected counts as well.
    pub async fn statistics(&self) -> Result<FeeStatistics, GatewayError> {
        self.ctx.gateway().fee_statistics().await
    }

    pub fn payment_modal(&mut self) -> &mut PaymentModal {
        &mut self.payment_modal
    }

    /// Opens the review modal for a loaded payment. Returns false when the
    /// payment is unknown or no longer pending.
    pub fn review_payment(&mut self, payment_id: &str, action: PaymentAction) -> bool {
        let students = self.ctx.store.snapshot().fees;
        let found = students.iter().find_map(|student| {
            student
                .fee_payments
                .iter()
                .find(|payment| payment.id == payment_id)
                .map(|payment| (student, payment))
        });
        match found {
            Some((student, payment)) => self.payment_modal.open_for(student, payment, action),
            None => false,
        }
    }

    pub async fn submit_payment(&mut self) -> Result<(), SubmitError> {
        match self.payment_modal.submit(self.ctx.gateway()).await {
            Ok(message) => {
                self.ctx.notifier.success(message);
                self.ctx.store.refresh(&[ResourceKind::Fees]).await;
                Ok(())
            }
            Err(err) => {
                self.ctx.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn refresh(&self) {
        self.ctx.store.refresh(&[ResourceKind::Fees]).await;
    }
}
