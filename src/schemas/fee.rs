use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;
use crate::schemas::teacher::TeacherSummary;
use crate::schemas::types::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeePayment {
    pub id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub transaction_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub payment_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// A student row from `GET /api/admin/fees/students` with its payments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentFees {
    pub id: String,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub teacher: Option<TeacherSummary>,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub fee_payments: Vec<FeePayment>,
}

impl StudentFees {
    pub fn has_payments(&self) -> bool {
        !self.fee_payments.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeeStatistics {
    #[serde(default)]
    pub total_collected: f64,
    #[serde(default)]
    pub confirmed_payments: u64,
    #[serde(default)]
    pub pending_payments: u64,
    #[serde(default)]
    pub rejected_payments: u64,
    #[serde(default)]
    pub total_payments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ConfirmPayment<'a> {
    #[serde(rename = "paymentId")]
    pub(crate) payment_id: &'a str,
    #[serde(rename = "paymentMethod")]
    pub(crate) payment_method: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RejectPayment<'a> {
    #[serde(rename = "paymentId")]
    pub(crate) payment_id: &'a str,
    pub(crate) reason: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_payments_keep_the_student_row() {
        let rows: Vec<StudentFees> = serde_json::from_value(json!([
            {"id": "s1", "name": null, "fee_payments": null},
            {"id": "s2", "name": "Yusuf", "fee_payments": [
                {"id": "p1", "amount": 25.0, "status": "pending"}
            ]}
        ]))
        .expect("fees");

        assert!(!rows[0].has_payments());
        assert_eq!(rows[0].name, "");
        assert!(rows[1].has_payments());
    }
}
