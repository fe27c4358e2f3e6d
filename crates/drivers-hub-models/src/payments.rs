use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use drivers_hub_core::serde::deserialize_optional_uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bank,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Bank => "bank",
            PaymentMethod::Cash => "cash",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(default)]
    pub candidate_name: Option<String>,
    #[sqlx(default)]
    pub candidate_client_number: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreatePaymentDto {
    pub candidate_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdatePaymentDto {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub candidate_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

/// Whether moving from `before` to `after` settles the payment.
pub fn becomes_paid(before: Option<PaymentStatus>, after: PaymentStatus) -> bool {
    after == PaymentStatus::Paid && before != Some(PaymentStatus::Paid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_becomes_paid() {
        assert!(becomes_paid(None, PaymentStatus::Paid));
        assert!(becomes_paid(Some(PaymentStatus::Pending), PaymentStatus::Paid));
        assert!(!becomes_paid(Some(PaymentStatus::Paid), PaymentStatus::Paid));
        assert!(!becomes_paid(None, PaymentStatus::Pending));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let dto: CreatePaymentDto = serde_json::from_value(serde_json::json!({
            "candidate_id": Uuid::new_v4(),
            "amount": 0.0,
            "method": "cash"
        }))
        .unwrap();
        assert!(dto.validate().unwrap_err().field_errors().contains_key("amount"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result = serde_json::from_value::<CreatePaymentDto>(serde_json::json!({
            "candidate_id": Uuid::new_v4(),
            "amount": 10.0,
            "method": "card"
        }));
        assert!(result.is_err());
    }
}
