//! Field descriptors for the create/edit sheets and the filter bar.
//!
//! Screens describe their inputs here and one template renders them, so
//! the same markup serves every entity.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::entity::{EntityKind, EntityRef};
use crate::forms::FieldErrors;

/// `{id, name}` lists loaded for a sheet, keyed by [`EntityKind::name`].
pub type Dropdowns = BTreeMap<&'static str, Arc<Vec<EntityRef>>>;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
            disabled: false,
        }
    }
}

/// One row of the order size breakdown.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SizeRow {
    pub choices: Vec<Choice>,
    pub amount: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
    Text,
    Email,
    Tel,
    Number { step: &'static str },
    Date,
    Textarea,
    Select { choices: Vec<Choice> },
    MultiSelect { choices: Vec<Choice> },
    File { accept: String },
    Sizes { rows: Vec<SizeRow> },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub input: Input,
    pub value: String,
    pub required: bool,
    pub errors: Vec<String>,
}

impl Field {
    pub fn new(name: &'static str, label: &'static str, input: Input) -> Self {
        Self {
            name,
            label,
            input,
            value: String::new(),
            required: false,
            errors: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, Input::Text)
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Options of `kind` with every id in `selected` marked.
pub fn choices<S: AsRef<str>>(dropdowns: &Dropdowns, kind: EntityKind, selected: &[S]) -> Vec<Choice> {
    dropdowns
        .get(kind.name())
        .map(|options| {
            options
                .iter()
                .map(|option| {
                    let picked = selected.iter().any(|id| id.as_ref() == option.id.as_str());
                    Choice::new(option.id.as_str(), option.name.clone(), picked)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Single-choice dropdown over `kind` with a leading blank entry.
pub fn select(
    dropdowns: &Dropdowns,
    name: &'static str,
    label: &'static str,
    kind: EntityKind,
    selected: &str,
) -> Field {
    let mut options = vec![Choice::new("", format!("Select {}", label.to_lowercase()), selected.is_empty())];
    options.extend(choices(dropdowns, kind, &[selected]));
    Field::new(name, label, Input::Select { choices: options })
        .value(selected)
        .required()
}

/// Attaches the messages in `errors` to the fields they belong to.
pub fn attach_errors(fields: &mut [Field], errors: &FieldErrors) {
    for field in fields.iter_mut() {
        field.errors = errors.get(field.name).to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EntityId;

    const SUPPLIER: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

    fn dropdowns() -> Dropdowns {
        let mut dropdowns = Dropdowns::new();
        dropdowns.insert(
            EntityKind::Supplier.name(),
            Arc::new(vec![EntityRef {
                id: EntityId::new(SUPPLIER).unwrap(),
                name: "Mills & Co".to_string(),
            }]),
        );
        dropdowns
    }

    #[test]
    fn select_marks_current_choice() {
        let field = select(&dropdowns(), "supplier_id", "Supplier", EntityKind::Supplier, SUPPLIER);

        let Input::Select { choices } = field.input else {
            panic!("expected a select");
        };
        assert_eq!(choices.len(), 2);
        assert!(!choices[0].selected);
        assert!(choices[1].selected);
        assert_eq!(choices[1].label, "Mills & Co");
    }

    #[test]
    fn missing_dropdown_yields_only_the_blank_entry() {
        let field = select(&Dropdowns::new(), "customer_id", "Customer", EntityKind::Customer, "");

        let Input::Select { choices } = field.input else {
            panic!("expected a select");
        };
        assert_eq!(choices.len(), 1);
        assert!(choices[0].selected);
    }

    #[test]
    fn errors_land_on_their_fields() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required");
        let mut fields = vec![Field::text("name", "Name"), Field::text("email", "Email")];

        attach_errors(&mut fields, &errors);

        assert_eq!(fields[0].errors, ["Name is required"]);
        assert!(fields[1].errors.is_empty());
    }
}
