//! Record validation boundary.
//!
//! Extracted resume payloads arrive as loose JSON: keys may be missing, lists
//! may be the wrong type, CGPA may be a string like `"8.7/10"`. Everything is
//! normalized here into the total `StructuredResume` model. Each problem is
//! reported as a `MalformedField` and the offending part contributes nothing;
//! nothing in this module fails a whole record.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::models::resume::{
    Cgpa, ContactInfo, EducationEntry, ExperienceEntry, NewResume, StructuredResume,
};

/// A `MalformedRecord` finding for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalformedField {
    pub field: String,
    pub reason: String,
}

impl MalformedField {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Normalizes a full extractor payload into a `NewResume` (no embedding yet).
///
/// CGPA resolution: the top-level `cgpa` if it parses, else the highest
/// education CGPA.
pub fn normalize_extracted(payload: &Value) -> (NewResume, Vec<MalformedField>) {
    let mut issues = Vec::new();

    let contact = ContactInfo {
        name: scalar_string(payload.get("name"), "name", &mut issues),
        email: scalar_string(payload.get("email"), "email", &mut issues),
        phone: scalar_string(payload.get("phone"), "phone", &mut issues),
    };

    let structured = normalize_structured_into(payload, &mut issues);

    let cgpa = read_cgpa(payload.get("cgpa"), "cgpa", &mut issues)
        .or_else(|| structured.max_education_cgpa());

    let raw_text = scalar_string(payload.get("raw_text"), "raw_text", &mut issues);

    (
        NewResume {
            contact,
            structured,
            cgpa,
            raw_text,
            embedding: None,
        },
        issues,
    )
}

/// Normalizes the structured part only. Accepts both the extractor shape
/// (`skills.technical`, `skills.soft`) and the stored shape
/// (`technical_skills`, `soft_skills`).
pub fn normalize_structured(payload: &Value) -> (StructuredResume, Vec<MalformedField>) {
    let mut issues = Vec::new();
    let structured = normalize_structured_into(payload, &mut issues);
    (structured, issues)
}

fn normalize_structured_into(payload: &Value, issues: &mut Vec<MalformedField>) -> StructuredResume {
    let skills = payload.get("skills");
    if let Some(s) = skills {
        if !s.is_object() && !s.is_null() {
            issues.push(MalformedField::new("skills", "expected an object"));
        }
    }

    let technical = payload
        .get("technical_skills")
        .or_else(|| skills.and_then(|s| s.get("technical")));
    let soft = payload
        .get("soft_skills")
        .or_else(|| skills.and_then(|s| s.get("soft")));

    StructuredResume {
        technical_skills: skill_list(technical, "skills.technical", issues),
        soft_skills: skill_list(soft, "skills.soft", issues),
        experience: experience_list(payload.get("experience"), issues),
        education: education_list(payload.get("education"), issues),
    }
}

/// Strings only, trimmed, blank entries dropped, de-duplicated
/// case-insensitively keeping the first spelling.
fn skill_list(value: Option<&Value>, field: &str, issues: &mut Vec<MalformedField>) -> Vec<String> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => {
            // "Rust, Go, SQL"
            return dedup_ci(s.split(',').map(|p| p.trim().to_string()));
        }
        Some(_) => {
            issues.push(MalformedField::new(field, "expected a list of strings"));
            return Vec::new();
        }
    };

    let mut strings = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => strings.push(s.trim().to_string()),
            other => issues.push(MalformedField::new(
                format!("{field}[{i}]"),
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }
    dedup_ci(strings.into_iter())
}

fn dedup_ci(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn experience_list(value: Option<&Value>, issues: &mut Vec<MalformedField>) -> Vec<ExperienceEntry> {
    let Some(items) = list(value, "experience", issues) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let field = format!("experience[{i}]");
            match item {
                Value::Object(_) => Some(ExperienceEntry {
                    role: scalar_string(item.get("role"), &field, issues),
                    company: scalar_string(item.get("company"), &field, issues),
                    duration: scalar_string(item.get("duration"), &field, issues),
                    description: scalar_string(item.get("description"), &field, issues),
                }),
                Value::String(s) if !s.trim().is_empty() => Some(ExperienceEntry {
                    description: s.trim().to_string(),
                    ..Default::default()
                }),
                other => {
                    issues.push(MalformedField::new(
                        field,
                        format!("expected an object, got {}", type_name(other)),
                    ));
                    None
                }
            }
        })
        .collect()
}

fn education_list(value: Option<&Value>, issues: &mut Vec<MalformedField>) -> Vec<EducationEntry> {
    let Some(items) = list(value, "education", issues) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let field = format!("education[{i}]");
            if !item.is_object() {
                issues.push(MalformedField::new(
                    field,
                    format!("expected an object, got {}", type_name(item)),
                ));
                return None;
            }
            Some(EducationEntry {
                degree: scalar_string(item.get("degree"), &field, issues),
                institution: scalar_string(item.get("institution"), &field, issues),
                cgpa: read_cgpa(item.get("cgpa"), &format!("{field}.cgpa"), issues),
                date_range: scalar_string(item.get("date_range"), &field, issues),
            })
        })
        .collect()
}

fn list<'a>(
    value: Option<&'a Value>,
    field: &str,
    issues: &mut Vec<MalformedField>,
) -> Option<&'a Vec<Value>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            issues.push(MalformedField::new(
                field,
                format!("expected a list, got {}", type_name(other)),
            ));
            None
        }
    }
}

/// Strings pass through trimmed, numbers and booleans are stringified,
/// anything else becomes empty.
fn scalar_string(value: Option<&Value>, field: &str, issues: &mut Vec<MalformedField>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            issues.push(MalformedField::new(
                field,
                format!("expected a string, got {}", type_name(other)),
            ));
            String::new()
        }
    }
}

/// Reads a CGPA from a number or from the first numeric token of a string.
/// Values outside [0, 10] are clamped and reported.
fn read_cgpa(value: Option<&Value>, field: &str, issues: &mut Vec<MalformedField>) -> Option<Cgpa> {
    let raw = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(Value::String(s)) => first_number(s),
        Some(_) => None,
    };

    let Some(raw) = raw else {
        issues.push(MalformedField::new(field, "no numeric CGPA value"));
        return None;
    };

    let cgpa = Cgpa::clamped(raw);
    match cgpa {
        Some(c) if c.value() != raw => issues.push(MalformedField::new(
            field,
            format!("CGPA {raw} outside [0, 10], clamped to {}", c.value()),
        )),
        None => issues.push(MalformedField::new(field, "CGPA is not finite")),
        _ => {}
    }
    cgpa
}

/// First unsigned decimal number in `s`: `"CGPA: 8.7/10"` → 8.7.
pub fn first_number(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];

    let int_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let mut end = int_len;

    let after = &rest[int_len..];
    if let Some(frac) = after.strip_prefix('.') {
        let frac_len = frac
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(frac.len());
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    rest[..end].parse().ok()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
