//! Form definitions backing the create and edit sheets.
//!
//! Every form deserializes leniently (all fields are strings with defaults)
//! so a bad submission can always be re-rendered with the values the user
//! typed. Conversion into a typed payload runs the `validator` derive rules
//! first and then the checks that need parsing, collecting every failure
//! into [`FieldErrors`] before any network call is made.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::entity::Resource;
use crate::domain::types::{EntityId, NonEmptyString, TypeConstraintError};

pub mod catalog;
pub mod order;
pub mod partner;
pub mod sample;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("malformed form body: {0}")]
    Malformed(#[from] serde::de::value::Error),

    #[error("validation failed for {0}")]
    Invalid(FieldErrors),
}

/// Per-field error messages keyed by form field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the messages produced by a `validator` derive.
    pub fn from_validation(result: Result<(), ValidationErrors>) -> Self {
        let mut errors = Self::new();
        if let Err(validation) = result {
            for (field, failures) in validation.field_errors() {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| format!("Invalid value ({})", failure.code));
                    errors.add(&field, message);
                }
            }
        }
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Records the error of a value object constructor under `field`.
    pub fn check<T>(
        &mut self,
        field: &str,
        result: Result<T, TypeConstraintError>,
        message: &str,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(_) if self.has(field) => None,
            Err(_) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Parses a required reference id.
    pub fn id(&mut self, field: &str, raw: &str, label: &str) -> Option<EntityId> {
        if raw.trim().is_empty() {
            self.add(field, format!("Select a {label}"));
            return None;
        }
        self.check(field, EntityId::new(raw), &format!("Unknown {label}"))
    }

    /// Parses a required number and checks it lies in `range`.
    pub fn number<N>(&mut self, field: &str, raw: &str, range: RangeInclusive<N>) -> Option<N>
    where
        N: FromStr + PartialOrd + Display,
    {
        let raw = raw.trim();
        if raw.is_empty() {
            self.add(field, "This field is required");
            return None;
        }
        match raw.parse::<N>() {
            Ok(value) if range.contains(&value) => Some(value),
            Ok(_) => {
                self.add(
                    field,
                    format!("Must be between {} and {}", range.start(), range.end()),
                );
                None
            }
            Err(_) => {
                self.add(field, "Must be a number");
                None
            }
        }
    }

    /// Moves every message of `other` into `self`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "{}", fields.join(", "))
    }
}

impl From<FieldErrors> for FormError {
    fn from(errors: FieldErrors) -> Self {
        FormError::Invalid(errors)
    }
}

/// Optional free text: blank input means "not set".
pub fn optional_text(raw: &str) -> Option<NonEmptyString> {
    NonEmptyString::new(raw).ok()
}

/// What a sheet needs to re-render itself after a rejected submission.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct FormState {
    pub values: serde_json::Value,
    pub errors: FieldErrors,
}

impl FormState {
    pub fn new<F: Serialize>(form: &F, errors: FieldErrors) -> Self {
        Self {
            values: serde_json::to_value(form).unwrap_or_default(),
            errors,
        }
    }
}

/// Form backing the create and edit sheets of one resource.
pub trait ResourceForm<R: Resource>: DeserializeOwned + Serialize + Default + Send {
    /// Prefills the edit sheet from an existing record.
    fn from_record(record: &R) -> Self;

    fn to_create(&self) -> Result<R::Create, FieldErrors>;

    /// `current` is the record as last read from the backend.
    fn to_update(&self, current: &R) -> Result<R::Update, FieldErrors>;
}

/// Decodes an url-encoded body. Repeated keys fill `Vec` fields.
pub fn parse_body<F: DeserializeOwned>(body: &[u8]) -> Result<F, FormError> {
    Ok(serde_html_form::from_bytes(body)?)
}
