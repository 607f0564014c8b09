use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeId, ResumeRecord};
use crate::store::ResumeStore;

/// Process-local store. Keeps insertion order.
#[derive(Default)]
pub struct InMemoryResumeStore {
    records: RwLock<Vec<ResumeRecord>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_records(records: Vec<ResumeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn all(&self) -> Result<Vec<ResumeRecord>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn with_embedding(&self) -> Result<Vec<(ResumeId, Vec<f32>)>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter_map(|r| r.usable_embedding().map(|v| (r.id, v.to_vec())))
            .collect())
    }

    async fn set_hired(&self, id: ResumeId, hired: bool) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.hired = hired;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: ResumeId) -> Result<Option<ResumeRecord>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, AppError> {
        let record = resume.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn set_embedding(&self, id: ResumeId, embedding: Vec<f32>) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.embedding = Some(embedding).filter(|v| !v.is_empty());
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn missing_embeddings(&self) -> Result<Vec<(ResumeId, String)>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.usable_embedding().is_none())
            .map(|r| (r.id, r.raw_text.clone()))
            .collect())
    }

    async fn delete(&self, id: ResumeId) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::{record, with_embedding};

    #[tokio::test]
    async fn test_with_embedding_excludes_absent_and_empty() {
        let embedded = with_embedding(record(None, &[], 0), vec![1.0, 0.0]);
        let empty = with_embedding(record(None, &[], 0), vec![]);
        let absent = record(None, &[], 0);
        let store = InMemoryResumeStore::with_records(vec![embedded.clone(), empty, absent]);

        let candidates = store.with_embedding().await.unwrap();

        assert_eq!(candidates, vec![(embedded.id, vec![1.0, 0.0])]);
    }

    #[tokio::test]
    async fn test_set_hired_on_snapshot_does_not_mutate_previous_snapshot() {
        let r = record(Some(8.0), &[], 1);
        let id = r.id;
        let store = InMemoryResumeStore::with_records(vec![r]);

        let snapshot = store.all().await.unwrap();
        assert!(store.set_hired(id, true).await.unwrap());

        assert!(!snapshot[0].hired);
        assert!(store.get(id).await.unwrap().unwrap().hired);
    }

    #[tokio::test]
    async fn test_set_hired_unknown_id() {
        let store = InMemoryResumeStore::new();
        assert!(!store.set_hired(Uuid::new_v4(), true).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_embed_delete_lifecycle() {
        let store = InMemoryResumeStore::new();
        let record = store
            .insert(NewResume {
                raw_text: "Rust developer".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            store.missing_embeddings().await.unwrap(),
            vec![(record.id, "Rust developer".to_string())]
        );
        assert!(store.set_embedding(record.id, vec![0.1, 0.2]).await.unwrap());
        assert!(store.missing_embeddings().await.unwrap().is_empty());

        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_ids() {
        let a = record(None, &[], 0);
        let b = record(None, &[], 0);
        let store = InMemoryResumeStore::with_records(vec![a.clone(), b]);

        let found = store.get_many(&[a.id, Uuid::new_v4()]).await.unwrap();

        assert_eq!(found, vec![a]);
    }
}
