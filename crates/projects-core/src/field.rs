//! Custom board fields and their resolved values.
//!
//! A board's field schema is fetched from the remote API as [`ProjectField`]
//! nodes. A user-supplied textual value is converted into a [`FieldValue`]
//! according to the field's [`FieldDataType`]; the result is what gets
//! submitted when an item's field is updated.

use crate::error::{CoreError, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of a custom board field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
    /// Built-in and unsupported types (`TITLE`, `LABELS`, `ASSIGNEES`, ...).
    #[serde(other)]
    Other,
}

impl fmt::Display for FieldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::SingleSelect => write!(f, "option"),
            Self::Iteration => write!(f, "iteration"),
            Self::Other => write!(f, "value"),
        }
    }
}

/// A selectable option of a single-select field, or an iteration of an
/// iteration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

/// Iteration configuration of an iteration field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationConfiguration {
    #[serde(default)]
    pub iterations: Vec<FieldOption>,
}

/// A field definition as listed in the board's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    pub data_type: FieldDataType,

    /// Options of a single-select field.
    #[serde(default)]
    pub options: Vec<FieldOption>,

    /// Iterations of an iteration field.
    #[serde(default)]
    pub configuration: Option<IterationConfiguration>,
}

impl ProjectField {
    /// Create a field with no options or iterations.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: FieldDataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type,
            options: Vec::new(),
            configuration: None,
        }
    }

    /// Add single-select options.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(id, name)| FieldOption {
                id: id.into(),
                name: name.into(),
            })
            .collect();
        self
    }

    /// Add iterations.
    #[must_use]
    pub fn with_iterations<I, S>(mut self, iterations: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.configuration = Some(IterationConfiguration {
            iterations: iterations
                .into_iter()
                .map(|(id, name)| FieldOption {
                    id: id.into(),
                    name: name.into(),
                })
                .collect(),
        });
        self
    }

    /// Check whether this field's name matches, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    fn iterations(&self) -> &[FieldOption] {
        self.configuration
            .as_ref()
            .map(|c| c.iterations.as_slice())
            .unwrap_or_default()
    }
}

/// A typed value ready to submit for a field.
///
/// Serializes to the remote `ProjectV2FieldValue` input shape, e.g.
/// `{"singleSelectOptionId": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    Date(String),
    Number(f64),
    SingleSelectOptionId(String),
    IterationId(String),
    Text(String),
}

impl FieldValue {
    /// Convert `value` for `field` according to the field's data type.
    ///
    /// `name` is the field name as the user wrote it and is only used in errors.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidFieldValue` if a date or number does not parse,
    /// or `CoreError::UnresolvedOption` if no option or iteration matches.
    pub fn resolve(field: &ProjectField, name: &str, value: &str) -> Result<Self> {
        match field.data_type {
            FieldDataType::Date => {
                if parse_date(value) {
                    Ok(Self::Date(value.to_string()))
                } else {
                    Err(invalid(field, name, value))
                }
            }
            FieldDataType::Number => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number)
                .ok_or_else(|| invalid(field, name, value)),
            FieldDataType::SingleSelect => find_option(&field.options, value)
                .map(|o| Self::SingleSelectOptionId(o.id.clone()))
                .ok_or_else(|| unresolved(name, value)),
            FieldDataType::Iteration => find_option(field.iterations(), value)
                .map(|i| Self::IterationId(i.id.clone()))
                .ok_or_else(|| unresolved(name, value)),
            FieldDataType::Text | FieldDataType::Other => Ok(Self::Text(value.to_string())),
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn parse_date(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn find_option<'a>(options: &'a [FieldOption], value: &str) -> Option<&'a FieldOption> {
    let value = value.to_lowercase();
    options.iter().find(|o| o.name.to_lowercase() == value)
}

fn invalid(field: &ProjectField, name: &str, value: &str) -> CoreError {
    CoreError::InvalidFieldValue {
        name: name.to_string(),
        value: value.to_string(),
        expected: field.data_type,
    }
}

fn unresolved(name: &str, value: &str) -> CoreError {
    CoreError::UnresolvedOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// A field matched against the schema together with its converted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    /// Remote field id.
    pub id: String,
    /// Field name as the user wrote it.
    pub name: String,
    pub value: FieldValue,
}

/// A single `name=value` field assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub name: String,
    pub value: String,
}

impl FieldAssignment {
    /// Create a new assignment.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a "name=value" string.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidAssignment` if there is no `=` or the name is empty.
    pub fn parse(input: &str) -> Result<Self> {
        let (name, value) = input
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidAssignment(input.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidAssignment(input.to_string()));
        }

        Ok(Self::new(name, value.trim()))
    }
}

/// Field assignments in the order they were given; a repeated name keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldAssignments(Vec<FieldAssignment>);

impl FieldAssignments {
    /// Create an empty set of assignments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an assignment.
    pub fn insert(&mut self, assignment: FieldAssignment) {
        match self.0.iter_mut().find(|a| a.name == assignment.name) {
            Some(existing) => existing.value = assignment.value,
            None => self.0.push(assignment),
        }
    }

    /// Parse each "name=value" string.
    ///
    /// # Errors
    /// Returns the first parse failure.
    pub fn parse_all<I, S>(inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut assignments = Self::new();
        for input in inputs {
            assignments.insert(FieldAssignment::parse(input.as_ref())?);
        }
        Ok(assignments)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldAssignment> {
        self.0.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FieldAssignments {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut assignments = Self::new();
        for (name, value) in iter {
            assignments.insert(FieldAssignment::new(name, value));
        }
        assignments
    }
}
