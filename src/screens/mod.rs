//! Per-entity screen configuration: table columns, sheet fields, filters
//! and row actions. The list/sheet/dialog handlers are generic over
//! [`EntityScreen`] and know nothing about individual entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entity::{EntityKind, Resource};
use crate::forms::ResourceForm;
use crate::sheet::{Dropdowns, Field};
use crate::table::Table;

pub mod catalog;
pub mod order;
pub mod partner;
pub mod sample;

pub const SEARCH_PARAM: &str = "search";

/// Extra per-row button posting `fields` to `action`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RowAction {
    pub label: String,
    pub action: String,
    pub fields: Vec<(&'static str, String)>,
}

pub trait EntityScreen: Resource {
    /// Singular noun used in sheet titles and toasts.
    const NOUN: &'static str;

    /// Query parameters narrowing the list; everything else is dropped.
    const FILTERS: &'static [&'static str] = &[SEARCH_PARAM];

    /// Option lists the sheet and the filter bar need.
    const DROPDOWNS: &'static [EntityKind] = &[];

    /// The sheet posts `multipart/form-data`.
    const MULTIPART: bool = false;

    type Form: ResourceForm<Self>;

    fn path() -> String {
        format!("/{}", Self::KIND.name())
    }

    fn table() -> Table<Self>;

    /// Sheet inputs prefilled from `form`. `current` is the record being
    /// edited, absent when creating.
    fn fields(form: &Self::Form, current: Option<&Self>, dropdowns: &Dropdowns) -> Vec<Field>;

    fn filter_fields(filters: &BTreeMap<String, String>, _dropdowns: &Dropdowns) -> Vec<Field> {
        vec![search_field(filters)]
    }

    fn row_actions(_record: &Self) -> Vec<RowAction> {
        Vec::new()
    }
}

pub fn search_field(filters: &BTreeMap<String, String>) -> Field {
    filter_text(filters, SEARCH_PARAM, "Search")
}

pub fn filter_text(
    filters: &BTreeMap<String, String>,
    name: &'static str,
    label: &'static str,
) -> Field {
    Field::text(name, label).value(filters.get(name).cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Collection, Fabric, Material};
    use crate::domain::order::Order;
    use crate::domain::partner::{Customer, Supplier};
    use crate::domain::sample::Sample;

    fn column_keys<T: EntityScreen>() -> Vec<&'static str> {
        T::table().columns().iter().map(|column| column.key).collect()
    }

    #[test]
    fn every_screen_has_columns_and_a_search_filter() {
        for keys in [
            column_keys::<Collection>(),
            column_keys::<Fabric>(),
            column_keys::<Material>(),
            column_keys::<Supplier>(),
            column_keys::<Customer>(),
            column_keys::<Order>(),
            column_keys::<Sample>(),
        ] {
            assert!(keys.contains(&"name") || keys.contains(&"plm_id"));
        }

        assert!(Collection::FILTERS.contains(&SEARCH_PARAM));
        assert!(Order::FILTERS.contains(&SEARCH_PARAM));
        assert!(Fabric::FILTERS.contains(&"supplierId"));
        assert!(Material::FILTERS.contains(&"supplierId"));
        assert_eq!(Supplier::path(), "/suppliers");
    }

    #[test]
    fn search_field_is_prefilled() {
        let mut filters = BTreeMap::new();
        filters.insert(SEARCH_PARAM.to_string(), "denim".to_string());

        let field = search_field(&filters);
        assert_eq!(field.name, SEARCH_PARAM);
        assert_eq!(field.value, "denim");
    }
}
