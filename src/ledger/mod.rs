//! Users, prediction history and contact messages.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppError,
    predict::{disease::DiseaseType, gateway::Outcome},
};

#[cfg(test)]
pub mod memory;
pub mod pg;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string
    pub is_admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub owner_id: Uuid,
    pub prediction_type: DiseaseType,
    pub prediction_result: String,
    pub prediction_label: u8,
    pub prediction_value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub disease: DiseaseType,
    pub label: u8,
    pub result: String,
    pub value: f64,
}

impl From<&Outcome> for NewPrediction {
    fn from(o: &Outcome) -> Self {
        Self {
            disease: o.disease,
            label: o.label,
            result: o.result.to_string(),
            value: o.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactMessage {
    pub id: i64,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub owner_id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total_users: i64,
    pub total_predictions: i64,
    pub predictions_by_type: BTreeMap<DiseaseType, i64>,
}

impl LedgerStats {
    /// Starts every disease at zero so absent types still appear. The total
    /// is the sum of the per-type counts, so the two never disagree.
    pub fn with_counts(
        total_users: i64,
        counts: impl IntoIterator<Item = (DiseaseType, i64)>,
    ) -> Self {
        let mut predictions_by_type: BTreeMap<DiseaseType, i64> =
            DiseaseType::ALL.iter().map(|d| (*d, 0)).collect();
        for (d, n) in counts {
            *predictions_by_type.entry(d).or_default() += n;
        }
        let total_predictions = predictions_by_type.values().sum();
        Self {
            total_users,
            total_predictions,
            predictions_by_type,
        }
    }
}

/// Persistent store behind every use case. Each method is one atomic unit.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fails with `DuplicateEmail` when the address is taken.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn record(&self, owner_id: Uuid, prediction: &NewPrediction) -> Result<i64, AppError>;
    /// Insertion order.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PredictionRecord>, AppError>;
    async fn list_all(&self) -> Result<Vec<PredictionRecord>, AppError>;
    async fn delete_all_by_owner(&self, owner_id: Uuid) -> Result<u64, AppError>;
    /// Removes the owner's history and messages, then the user. Returns the
    /// number of history rows removed; `UserNotFound` leaves everything intact.
    async fn delete_owner_cascade(&self, owner_id: Uuid) -> Result<u64, AppError>;

    async fn stats(&self) -> Result<LedgerStats, AppError>;
    /// Distinct users with at least one positive result for `disease`.
    async fn cohort(&self, disease: DiseaseType) -> Result<Vec<User>, AppError>;

    async fn submit_message(&self, message: &NewContactMessage)
        -> Result<ContactMessage, AppError>;
    /// Newest first.
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, AppError>;
}
