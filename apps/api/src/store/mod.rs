//! Resume Store: the record source for matching and ranking.
//!
//! Readers receive owned snapshots (`Vec<ResumeRecord>`); nothing hands out a
//! live reference into the store. Mutation goes through explicit operations
//! (`set_hired`, `set_embedding`, `insert`, `delete`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeId, ResumeRecord};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryResumeStore;
pub use postgres::PgResumeStore;

pub const DEFAULT_LIST_LIMIT: usize = 50;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Every record, oldest first.
    async fn all(&self) -> Result<Vec<ResumeRecord>, AppError>;

    /// `(id, embedding)` for every record with a non-empty embedding.
    async fn with_embedding(&self) -> Result<Vec<(ResumeId, Vec<f32>)>, AppError>;

    /// Returns `false` when no record has this id.
    async fn set_hired(&self, id: ResumeId, hired: bool) -> Result<bool, AppError>;

    async fn get(&self, id: ResumeId) -> Result<Option<ResumeRecord>, AppError>;

    /// Records for `ids`, in no particular order. Unknown ids are skipped.
    async fn get_many(&self, ids: &[ResumeId]) -> Result<Vec<ResumeRecord>, AppError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get(*id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, AppError>;

    /// Back-fills an embedding. Returns `false` when no record has this id.
    async fn set_embedding(&self, id: ResumeId, embedding: Vec<f32>) -> Result<bool, AppError>;

    /// `(id, raw_text)` for every record without an embedding.
    async fn missing_embeddings(&self) -> Result<Vec<(ResumeId, String)>, AppError>;

    async fn delete(&self, id: ResumeId) -> Result<bool, AppError>;

    async fn search(&self, filter: &ResumeFilter) -> Result<Vec<ResumeRecord>, AppError> {
        Ok(filter.apply(self.all().await?))
    }
}

/// Listing filter. Text filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeFilter {
    /// Matches technical or soft skills.
    pub skill: Option<String>,
    /// Matches the record CGPA or any education CGPA.
    pub min_cgpa: Option<f64>,
    /// Matches any experience entry's company.
    pub company: Option<String>,
    /// Matches any education entry's degree.
    pub degree: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn needle(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

impl ResumeFilter {
    pub fn matches(&self, record: &ResumeRecord) -> bool {
        let structured = &record.structured;

        if let Some(skill) = needle(&self.skill) {
            let hit = structured
                .technical_skills
                .iter()
                .chain(&structured.soft_skills)
                .any(|s| contains_ci(s, &skill));
            if !hit {
                return false;
            }
        }

        if let Some(company) = needle(&self.company) {
            if !structured
                .experience
                .iter()
                .any(|e| contains_ci(&e.company, &company))
            {
                return false;
            }
        }

        if let Some(degree) = needle(&self.degree) {
            if !structured
                .education
                .iter()
                .any(|e| contains_ci(&e.degree, &degree))
            {
                return false;
            }
        }

        if let Some(min_cgpa) = self.min_cgpa {
            let best = record
                .cgpa
                .into_iter()
                .chain(structured.education.iter().filter_map(|e| e.cgpa))
                .map(|c| c.value())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
            if !best.is_some_and(|b| b >= min_cgpa) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, records: Vec<ResumeRecord>) -> Vec<ResumeRecord> {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .collect()
    }
}
