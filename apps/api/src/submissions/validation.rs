//! Schema checks for incoming submission payloads.
//!
//! The validator works on an untyped `serde_json::Value` so that a wrong type
//! or a missing key is reported against the offending field instead of
//! failing the whole body. Each field is checked on its own; a violation
//! never hides problems in sibling fields.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

use crate::submissions::models::{
    NewSubmission, NewTeamMember, ParticipationType, MAX_TEAM_MEMBERS,
};

const PARTICIPATION_TYPES: &[&str] = &["solo", "team"];

/// Inclusive character bounds for a text field.
struct Bounds {
    min: usize,
    max: Option<usize>,
}

const NAME: Bounds = Bounds { min: 2, max: None };
const MOBILE_NUMBER: Bounds = Bounds { min: 10, max: Some(15) };
const CONCEPT: Bounds = Bounds { min: 50, max: Some(1000) };
const OBJECTIVE: Bounds = Bounds { min: 30, max: Some(500) };
const REQUIREMENTS: Bounds = Bounds { min: 10, max: Some(500) };
const TECHNICAL_APPLICATIONS: Bounds = Bounds { min: 20, max: Some(500) };

/// A single rule a field failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Required")]
    Required,

    #[error("Expected {expected}")]
    InvalidType { expected: &'static str },

    #[error("Must contain at least {min} character(s)")]
    TooShort { min: usize },

    #[error("Must contain at most {max} character(s)")]
    TooLong { max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid url")]
    InvalidUrl,

    #[error("Expected one of: {}", .allowed.join(", "))]
    InvalidEnum { allowed: &'static [&'static str] },

    #[error("Must contain at most {max} item(s)")]
    TooManyItems { max: usize },

    #[error("Team name is required for team participation")]
    TeamNameRequired,
}

/// Field-level failures, keyed by wire field name.
///
/// Nested team member fields use `teamMembers[<index>].<field>` keys.
/// Serializes as `{field: [message, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<Violation>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, violation: Violation) {
        self.fields.entry(field.into()).or_default().push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[Violation]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, violations) in &self.fields {
            let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

/// Validates and normalizes a raw submission payload.
pub fn validate_submission(payload: &Value) -> Result<NewSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(object) = payload.as_object() else {
        errors.add("body", Violation::InvalidType { expected: "object" });
        return Err(errors);
    };

    let participation_type = match required_str(object, "participationType", &mut errors) {
        Some(raw) => match raw.parse::<ParticipationType>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.add(
                    "participationType",
                    Violation::InvalidEnum {
                        allowed: PARTICIPATION_TYPES,
                    },
                );
                None
            }
        },
        None => None,
    };

    let contact_person_name = bounded_text(object, "contactPersonName", &NAME, &mut errors);
    let mobile_number = bounded_text(object, "mobileNumber", &MOBILE_NUMBER, &mut errors);
    let email = email_field(object, "email", "email", &mut errors);
    let team_name = optional_str(object, "teamName", &mut errors)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let team_members = team_members(object, &mut errors);
    let concept = bounded_text(object, "concept", &CONCEPT, &mut errors);
    let objective = bounded_text(object, "objective", &OBJECTIVE, &mut errors);
    let requirements = bounded_text(object, "requirements", &REQUIREMENTS, &mut errors);
    let technical_applications = bounded_text(
        object,
        "technicalApplications",
        &TECHNICAL_APPLICATIONS,
        &mut errors,
    );
    let slides_link = url_field(object, "slidesLink", &mut errors);

    if participation_type == Some(ParticipationType::Team) && team_name.is_none() {
        errors.add("teamName", Violation::TeamNameRequired);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every field is `Some` once the error map is empty; the match only
    // avoids unwrapping.
    match (
        participation_type,
        contact_person_name,
        mobile_number,
        email,
        team_members,
        concept,
        objective,
        requirements,
        technical_applications,
        slides_link,
    ) {
        (
            Some(participation_type),
            Some(contact_person_name),
            Some(mobile_number),
            Some(email),
            Some(team_members),
            Some(concept),
            Some(objective),
            Some(requirements),
            Some(technical_applications),
            Some(slides_link),
        ) => {
            let (team_name, team_members) = match participation_type {
                ParticipationType::Solo => (None, Vec::new()),
                ParticipationType::Team => (team_name, team_members),
            };
            Ok(NewSubmission {
                participation_type,
                contact_person_name,
                mobile_number,
                email,
                team_name,
                team_members,
                concept,
                objective,
                requirements,
                technical_applications,
                slides_link,
            })
        }
        _ => {
            errors.add("body", Violation::Required);
            Err(errors)
        }
    }
}

/// Missing and `null` are both "Required"; any other non-string is a type error.
fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.add(field, Violation::Required);
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.add(field, Violation::InvalidType { expected: "string" });
            None
        }
    }
}

fn optional_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.add(field, Violation::InvalidType { expected: "string" });
            None
        }
    }
}

fn bounded_text(
    object: &Map<String, Value>,
    field: &str,
    bounds: &Bounds,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = required_str(object, field, errors)?;
    check_bounds(value, field, bounds, errors).then(|| value.to_string())
}

fn check_bounds(value: &str, key: &str, bounds: &Bounds, errors: &mut ValidationErrors) -> bool {
    let len = value.chars().count();
    if len < bounds.min {
        errors.add(key, Violation::TooShort { min: bounds.min });
        return false;
    }
    if let Some(max) = bounds.max {
        if len > max {
            errors.add(key, Violation::TooLong { max });
            return false;
        }
    }
    true
}

/// `key` is where a failure is reported; it differs from `field` for nested members.
fn email_field(
    object: &Map<String, Value>,
    field: &str,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = match object.get(field) {
        None | Some(Value::Null) => {
            errors.add(key, Violation::Required);
            return None;
        }
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            errors.add(key, Violation::InvalidType { expected: "string" });
            return None;
        }
    };
    if value.validate_email() {
        Some(value.to_string())
    } else {
        errors.add(key, Violation::InvalidEmail);
        None
    }
}

fn url_field(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = required_str(object, field, errors)?;
    if value.validate_url() {
        Some(value.to_string())
    } else {
        errors.add(field, Violation::InvalidUrl);
        None
    }
}

/// Absent or `null` means no additional members.
fn team_members(
    object: &Map<String, Value>,
    errors: &mut ValidationErrors,
) -> Option<Vec<NewTeamMember>> {
    let items = match object.get("teamMembers") {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.add("teamMembers", Violation::InvalidType { expected: "array" });
            return None;
        }
    };

    let mut valid = items.len() <= MAX_TEAM_MEMBERS;
    if !valid {
        errors.add(
            "teamMembers",
            Violation::TooManyItems {
                max: MAX_TEAM_MEMBERS,
            },
        );
    }

    let mut members = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let prefix = format!("teamMembers[{index}]");
        let Some(member) = item.as_object() else {
            errors.add(prefix, Violation::InvalidType { expected: "object" });
            valid = false;
            continue;
        };

        let name_key = format!("{prefix}.name");
        let name = match member.get("name") {
            None | Some(Value::Null) => {
                errors.add(name_key, Violation::Required);
                None
            }
            Some(Value::String(s)) => check_bounds(s, &name_key, &NAME, errors).then(|| s.clone()),
            Some(_) => {
                errors.add(name_key, Violation::InvalidType { expected: "string" });
                None
            }
        };
        let email = email_field(member, "email", &format!("{prefix}.email"), errors);

        match (name, email) {
            (Some(name), Some(email)) => members.push(NewTeamMember { name, email }),
            _ => valid = false,
        }
    }

    valid.then_some(members)
}
