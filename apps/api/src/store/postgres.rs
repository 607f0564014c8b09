use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{Cgpa, ContactInfo, NewResume, ResumeId, ResumeRecord};
use crate::resumes::validation::normalize_structured;
use crate::store::ResumeStore;

#[derive(Debug, Clone, FromRow)]
struct ResumeRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    structured: Value,
    cgpa: Option<f64>,
    raw_text: String,
    embedding: Option<Vec<f32>>,
    hired: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Rows written by older tooling may carry loosely shaped JSON; it goes
    /// through the same lenient normalization as ingestion.
    fn into_record(self) -> ResumeRecord {
        let (structured, issues) = normalize_structured(&self.structured);
        for issue in &issues {
            warn!(
                resume_id = %self.id,
                field = %issue.field,
                "Malformed stored resume field: {}",
                issue.reason
            );
        }

        ResumeRecord {
            id: self.id,
            contact: ContactInfo {
                name: self.name,
                email: self.email,
                phone: self.phone,
            },
            structured,
            cgpa: self.cgpa.and_then(Cgpa::clamped),
            raw_text: self.raw_text,
            embedding: self.embedding.filter(|v| !v.is_empty()),
            hired: self.hired,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL-backed store over the `resumes` table.
#[derive(Clone)]
pub struct PgResumeStore {
    db: PgPool,
}

impl PgResumeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn all(&self) -> Result<Vec<ResumeRecord>, AppError> {
        let rows: Vec<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes ORDER BY created_at, id")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(ResumeRow::into_record).collect())
    }

    async fn with_embedding(&self) -> Result<Vec<(ResumeId, Vec<f32>)>, AppError> {
        let rows: Vec<(Uuid, Vec<f32>)> = sqlx::query_as(
            r#"
            SELECT id, embedding FROM resumes
            WHERE embedding IS NOT NULL AND cardinality(embedding) > 0
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn set_hired(&self, id: ResumeId, hired: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE resumes SET hired = $1, updated_at = NOW() WHERE id = $2")
            .bind(hired)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: ResumeId) -> Result<Option<ResumeRecord>, AppError> {
        let row: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(ResumeRow::into_record))
    }

    async fn get_many(&self, ids: &[ResumeId]) -> Result<Vec<ResumeRecord>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ResumeRow::into_record).collect())
    }

    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, AppError> {
        let structured = serde_json::to_value(&resume.structured)
            .map_err(|e| AppError::Internal(e.into()))?;

        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes (id, name, email, phone, structured, cgpa, raw_text, embedding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&resume.contact.name)
        .bind(&resume.contact.email)
        .bind(&resume.contact.phone)
        .bind(structured)
        .bind(resume.cgpa.map(Cgpa::value))
        .bind(&resume.raw_text)
        .bind(resume.embedding.filter(|v| !v.is_empty()))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_record())
    }

    async fn set_embedding(&self, id: ResumeId, embedding: Vec<f32>) -> Result<bool, AppError> {
        let embedding = Some(embedding).filter(|v| !v.is_empty());
        let result =
            sqlx::query("UPDATE resumes SET embedding = $1, updated_at = NOW() WHERE id = $2")
                .bind(embedding)
                .bind(id)
                .execute(&self.db)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn missing_embeddings(&self) -> Result<Vec<(ResumeId, String)>, AppError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, raw_text FROM resumes
            WHERE embedding IS NULL OR cardinality(embedding) = 0
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete(&self, id: ResumeId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
