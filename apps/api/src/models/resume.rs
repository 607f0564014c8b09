use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ResumeId = Uuid;

/// Cumulative grade-point average on a 0–10 scale.
///
/// Out-of-range inputs are clamped into [0, 10]; non-finite inputs are rejected.
/// Deserialization goes through the same path, so a stored value can never
/// escape the range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Cgpa(f64);

impl Cgpa {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;

    pub fn clamped(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self(value.clamp(Self::MIN, Self::MAX)))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Cgpa {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Cgpa::clamped(value).ok_or_else(|| format!("CGPA must be a finite number, got {value}"))
    }
}

impl From<Cgpa> for f64 {
    fn from(cgpa: Cgpa) -> Self {
        cgpa.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub cgpa: Option<Cgpa>,
    pub date_range: String,
}

/// Validated structured fields of a resume. Every field is always present;
/// lists keep insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredResume {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

impl StructuredResume {
    /// Highest CGPA across education entries, if any entry carries one.
    pub fn max_education_cgpa(&self) -> Option<Cgpa> {
        self.education
            .iter()
            .filter_map(|e| e.cgpa)
            .max_by(|a, b| a.value().total_cmp(&b.value()))
    }
}

/// One candidate's resume as seen by the matching and ranking code.
///
/// Records are immutable snapshots. `hired` and `embedding` change only through
/// the store (`ResumeStore::set_hired`, `ResumeStore::set_embedding`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: ResumeId,
    pub contact: ContactInfo,
    pub structured: StructuredResume,
    pub cgpa: Option<Cgpa>,
    pub raw_text: String,
    /// `None` until computed. Never zero-filled. Omitted from API output.
    #[serde(skip_serializing, default)]
    pub embedding: Option<Vec<f32>>,
    pub hired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRecord {
    pub fn cgpa_or_zero(&self) -> f64 {
        self.cgpa.map(Cgpa::value).unwrap_or(0.0)
    }

    pub fn technical_skill_count(&self) -> usize {
        self.structured.technical_skills.len()
    }

    pub fn experience_count(&self) -> usize {
        self.structured.experience.len()
    }

    /// The stored embedding, if present and non-empty.
    pub fn usable_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }
}

/// A validated resume that has not been assigned an id yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewResume {
    pub contact: ContactInfo,
    pub structured: StructuredResume,
    pub cgpa: Option<Cgpa>,
    pub raw_text: String,
    pub embedding: Option<Vec<f32>>,
}

impl NewResume {
    pub fn into_record(self, id: ResumeId, now: DateTime<Utc>) -> ResumeRecord {
        ResumeRecord {
            id,
            contact: self.contact,
            structured: self.structured,
            cgpa: self.cgpa,
            raw_text: self.raw_text,
            embedding: self.embedding.filter(|v| !v.is_empty()),
            hired: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Builds a record with `experience` placeholder jobs and the given technical skills.
    pub fn record(cgpa: Option<f64>, skills: &[&str], experience: usize) -> ResumeRecord {
        let structured = StructuredResume {
            technical_skills: skills.iter().map(|s| s.to_string()).collect(),
            soft_skills: vec![],
            experience: (0..experience)
                .map(|i| ExperienceEntry {
                    role: format!("Engineer {i}"),
                    company: format!("Company {i}"),
                    duration: "1 year".to_string(),
                    description: String::new(),
                })
                .collect(),
            education: vec![],
        };
        NewResume {
            contact: ContactInfo::default(),
            structured,
            cgpa: cgpa.and_then(Cgpa::clamped),
            raw_text: String::new(),
            embedding: None,
        }
        .into_record(Uuid::new_v4(), Utc::now())
    }

    pub fn with_embedding(mut record: ResumeRecord, embedding: Vec<f32>) -> ResumeRecord {
        record.embedding = Some(embedding);
        record
    }
}
