use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ContactMessage, Ledger, LedgerStats, NewContactMessage, NewPrediction, PredictionRecord, User,
};
use crate::{
    error::{AppError, CredentialError},
    predict::disease::DiseaseType,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    predictions: Vec<PredictionRecord>,
    messages: Vec<ContactMessage>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local ledger for tests. One lock per call keeps each call atomic.
#[derive(Default)]
pub struct MemoryLedger {
    tables: RwLock<Tables>,
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, AppError> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email == email) {
            return Err(CredentialError::DuplicateEmail.into());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn record(&self, owner_id: Uuid, p: &NewPrediction) -> Result<i64, AppError> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == owner_id) {
            return Err(AppError::UserNotFound);
        }
        let id = t.next_id();
        t.predictions.push(PredictionRecord {
            id,
            owner_id,
            prediction_type: p.disease,
            prediction_result: p.result.clone(),
            prediction_label: p.label,
            prediction_value: p.value,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PredictionRecord>, AppError> {
        let t = self.tables.read().await;
        Ok(t.predictions
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<PredictionRecord>, AppError> {
        Ok(self.tables.read().await.predictions.clone())
    }

    async fn delete_all_by_owner(&self, owner_id: Uuid) -> Result<u64, AppError> {
        let mut t = self.tables.write().await;
        let before = t.predictions.len();
        t.predictions.retain(|p| p.owner_id != owner_id);
        Ok((before - t.predictions.len()) as u64)
    }

    async fn delete_owner_cascade(&self, owner_id: Uuid) -> Result<u64, AppError> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == owner_id) {
            return Err(AppError::UserNotFound);
        }
        let before = t.predictions.len();
        t.predictions.retain(|p| p.owner_id != owner_id);
        let removed = (before - t.predictions.len()) as u64;
        t.messages.retain(|m| m.owner_id != owner_id);
        t.users.retain(|u| u.id != owner_id);
        Ok(removed)
    }

    async fn stats(&self) -> Result<LedgerStats, AppError> {
        let t = self.tables.read().await;
        Ok(LedgerStats::with_counts(
            t.users.len() as i64,
            t.predictions.iter().map(|p| (p.prediction_type, 1)),
        ))
    }

    async fn cohort(&self, disease: DiseaseType) -> Result<Vec<User>, AppError> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| {
                t.predictions.iter().any(|p| {
                    p.owner_id == u.id && p.prediction_type == disease && p.prediction_label == 1
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn submit_message(&self, m: &NewContactMessage) -> Result<ContactMessage, AppError> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == m.owner_id) {
            return Err(AppError::UserNotFound);
        }
        let saved = ContactMessage {
            id: t.next_id(),
            owner_id: m.owner_id,
            name: m.name.clone(),
            email: m.email.clone(),
            subject: m.subject.clone(),
            message: m.message.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.messages.push(saved.clone());
        Ok(saved)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        let mut out = self.tables.read().await.messages.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPrediction {
        NewPrediction {
            disease: DiseaseType::Stroke,
            label: 1,
            result: DiseaseType::Stroke.result_text(1).into(),
            value: 0.4,
        }
    }

    #[tokio::test]
    async fn record_requires_an_existing_owner() {
        let ledger = MemoryLedger::default();
        let err = ledger.record(Uuid::new_v4(), &sample()).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
        assert!(ledger.list_all().await.unwrap().is_empty());

        let user = ledger.create_user("a@x.com", "hash", false).await.unwrap();
        assert!(ledger.record(user.id, &sample()).await.is_ok());
    }

    #[tokio::test]
    async fn message_requires_an_existing_owner() {
        let ledger = MemoryLedger::default();
        let msg = NewContactMessage {
            owner_id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            subject: "s".into(),
            message: "m".into(),
        };
        let err = ledger.submit_message(&msg).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
        assert!(ledger.list_messages().await.unwrap().is_empty());
    }
}
