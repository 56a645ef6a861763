use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    ContactMessage, Ledger, LedgerStats, NewContactMessage, NewPrediction, PredictionRecord, User,
};
use crate::{
    error::{AppError, CredentialError},
    predict::disease::DiseaseType,
};

#[derive(Clone)]
pub struct PgLedger {
    db: PgPool,
}

impl PgLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct PredictionRow {
    id: i64,
    owner_id: Uuid,
    prediction_type: String,
    prediction_result: String,
    prediction_label: i16,
    prediction_value: f64,
    created_at: OffsetDateTime,
}

impl TryFrom<PredictionRow> for PredictionRecord {
    type Error = AppError;

    fn try_from(r: PredictionRow) -> Result<Self, Self::Error> {
        let prediction_type = r
            .prediction_type
            .parse::<DiseaseType>()
            .with_context(|| format!("prediction_history row {}", r.id))?;
        Ok(Self {
            id: r.id,
            owner_id: r.owner_id,
            prediction_type,
            prediction_result: r.prediction_result,
            prediction_label: u8::from(r.prediction_label != 0),
            prediction_value: r.prediction_value,
            created_at: r.created_at,
        })
    }
}

fn into_records(rows: Vec<PredictionRow>) -> Result<Vec<PredictionRecord>, AppError> {
    rows.into_iter().map(PredictionRecord::try_from).collect()
}

const USER_COLUMNS: &str = "id, email, password_hash, is_admin, created_at";
const PREDICTION_COLUMNS: &str = "id, owner_id, prediction_type, prediction_result, \
     prediction_label, prediction_value, created_at";

/// Inserts that reference a vanished owner fail the foreign key.
fn owner_missing(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::UserNotFound,
        other => other.into(),
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, AppError> {
        let res = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, is_admin) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(&self.db)
        .await;
        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(CredentialError::DuplicateEmail.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, email ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn record(&self, owner_id: Uuid, p: &NewPrediction) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO prediction_history
                (owner_id, prediction_type, prediction_result, prediction_label, prediction_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(p.disease.as_str())
        .bind(&p.result)
        .bind(i16::from(p.label))
        .bind(p.value)
        .fetch_one(&self.db)
        .await
        .map_err(owner_missing)?;
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PredictionRecord>, AppError> {
        let rows = sqlx::query_as::<_, PredictionRow>(&format!(
            "SELECT {PREDICTION_COLUMNS} FROM prediction_history \
             WHERE owner_id = $1 ORDER BY id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        into_records(rows)
    }

    async fn list_all(&self) -> Result<Vec<PredictionRecord>, AppError> {
        let rows = sqlx::query_as::<_, PredictionRow>(&format!(
            "SELECT {PREDICTION_COLUMNS} FROM prediction_history ORDER BY id ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        into_records(rows)
    }

    async fn delete_all_by_owner(&self, owner_id: Uuid) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM prediction_history WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_owner_cascade(&self, owner_id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM prediction_history WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM contact_messages WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if users == 0 {
            tx.rollback().await?;
            return Err(AppError::UserNotFound);
        }
        tx.commit().await?;
        info!(%owner_id, predictions = removed, "user deleted with history");
        Ok(removed)
    }

    async fn stats(&self) -> Result<LedgerStats, AppError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT prediction_type, COUNT(*) FROM prediction_history GROUP BY prediction_type",
        )
        .fetch_all(&self.db)
        .await?;
        let mut counts = Vec::with_capacity(rows.len());
        for (t, n) in rows {
            let disease = t.parse::<DiseaseType>().context("prediction_type")?;
            counts.push((disease, n));
        }
        Ok(LedgerStats::with_counts(total_users, counts))
    }

    async fn cohort(&self, disease: DiseaseType) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.is_admin, u.created_at
              FROM users u
             WHERE EXISTS (
                   SELECT 1 FROM prediction_history p
                    WHERE p.owner_id = u.id
                      AND p.prediction_type = $1
                      AND p.prediction_label = 1)
             ORDER BY u.email ASC
            "#,
        )
        .bind(disease.as_str())
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn submit_message(&self, m: &NewContactMessage) -> Result<ContactMessage, AppError> {
        let saved = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (owner_id, name, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, email, subject, message, created_at
            "#,
        )
        .bind(m.owner_id)
        .bind(&m.name)
        .bind(&m.email)
        .bind(&m.subject)
        .bind(&m.message)
        .fetch_one(&self.db)
        .await
        .map_err(owner_missing)?;
        Ok(saved)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, owner_id, name, email, subject, message, created_at
              FROM contact_messages
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
