//! Rule Ranker: deterministic weighted score over structured resume attributes.
//!
//! score = cgpa × 2 + matched preferred skills × 3 + experience entries × 1

use std::collections::HashSet;

use crate::models::resume::ResumeRecord;

/// Used when the caller supplies no preferred skills.
pub const DEFAULT_PREFERRED_SKILLS: &[&str] = &["AI", "ML"];

#[derive(Debug, Clone)]
pub struct RuleWeights {
    pub cgpa: f64,
    pub skill_match: f64,
    pub experience_entry: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            cgpa: 2.0,
            skill_match: 3.0,
            experience_entry: 1.0,
        }
    }
}

/// Lowercased, de-duplicated preferred skills, falling back to
/// `DEFAULT_PREFERRED_SKILLS` when the input has no non-blank entry.
pub fn normalize_preferred_skills(preferred_skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let normalized: Vec<String> = preferred_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect();

    if normalized.is_empty() {
        DEFAULT_PREFERRED_SKILLS
            .iter()
            .map(|s| s.to_lowercase())
            .collect()
    } else {
        normalized
    }
}

/// Number of `preferred` (already normalized) present in the record's technical skills.
pub fn matched_skill_count(record: &ResumeRecord, preferred: &[String]) -> usize {
    let skills: HashSet<String> = record
        .structured
        .technical_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    preferred.iter().filter(|p| skills.contains(p.as_str())).count()
}

pub fn compute_rule_score(record: &ResumeRecord, preferred: &[String], weights: &RuleWeights) -> f64 {
    record.cgpa_or_zero() * weights.cgpa
        + matched_skill_count(record, preferred) as f64 * weights.skill_match
        + record.experience_count() as f64 * weights.experience_entry
}

/// Scores and sorts `records`, highest first. Equal scores keep input order.
pub fn rank_scored(
    records: Vec<ResumeRecord>,
    preferred_skills: &[String],
    top_n: usize,
) -> Vec<(ResumeRecord, f64)> {
    let preferred = normalize_preferred_skills(preferred_skills);
    let weights = RuleWeights::default();

    let mut scored: Vec<(ResumeRecord, f64)> = records
        .into_iter()
        .map(|record| {
            let score = compute_rule_score(&record, &preferred, &weights);
            (record, score)
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_n);
    scored
}

/// Records only, without scores.
#[cfg(test)]
fn rank(records: Vec<ResumeRecord>, preferred_skills: &[String], top_n: usize) -> Vec<ResumeRecord> {
    rank_scored(records, preferred_skills, top_n)
        .into_iter()
        .map(|(record, _)| record)
        .collect()
}
