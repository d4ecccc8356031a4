use std::collections::BTreeMap;

use crate::domain::catalog::{Collection, Fabric, Material};
use crate::domain::entity::EntityKind;
use crate::forms::catalog::{CollectionForm, FabricForm, MaterialForm};
use crate::screens::{EntityScreen, SEARCH_PARAM, search_field};
use crate::sheet::{Dropdowns, Field, Input, choices, select};
use crate::table::{Cell, Table};

const SUPPLIER_FILTER: &str = "supplierId";

fn supplier_filters(filters: &BTreeMap<String, String>, dropdowns: &Dropdowns) -> Vec<Field> {
    let selected = filters.get(SUPPLIER_FILTER).map(String::as_str).unwrap_or_default();
    let mut supplier = select(dropdowns, SUPPLIER_FILTER, "Supplier", EntityKind::Supplier, selected);
    supplier.required = false;
    vec![search_field(filters), supplier]
}

impl EntityScreen for Collection {
    const NOUN: &'static str = "collection";
    type Form = CollectionForm;

    fn table() -> Table<Self> {
        Table::<Collection>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("season", "Season", |record| record.season.clone().into())
            .column("year", "Year", |record| record.year.into())
            .column("description", "Description", |record| {
                record.description.clone().into()
            })
    }

    fn fields(form: &CollectionForm, _current: Option<&Self>, _dropdowns: &Dropdowns) -> Vec<Field> {
        vec![
            Field::text("name", "Name").value(&form.name).required(),
            Field::text("season", "Season").value(&form.season),
            Field::new("year", "Year", Input::Number { step: "1" })
                .value(&form.year)
                .required(),
            Field::new("description", "Description", Input::Textarea).value(&form.description),
        ]
    }
}

impl EntityScreen for Fabric {
    const NOUN: &'static str = "fabric";
    const FILTERS: &'static [&'static str] = &[SEARCH_PARAM, SUPPLIER_FILTER];
    const DROPDOWNS: &'static [EntityKind] = &[EntityKind::Supplier, EntityKind::Color];
    type Form = FabricForm;

    fn table() -> Table<Self> {
        Table::<Fabric>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("composition", "Composition", |record| {
                record.composition.as_str().into()
            })
            .column("weight_gsm", "Weight (g/m²)", |record| record.weight_gsm.into())
            .column("width_cm", "Width (cm)", |record| record.width_cm.into())
            .column("supplier", "Supplier", |record| record.supplier.name.as_str().into())
            .column("colors", "Colors", |record| {
                Cell::Text(
                    record
                        .colors
                        .iter()
                        .map(|color| color.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })
    }

    fn fields(form: &FabricForm, _current: Option<&Self>, dropdowns: &Dropdowns) -> Vec<Field> {
        vec![
            Field::text("name", "Name").value(&form.name).required(),
            Field::text("composition", "Composition")
                .value(&form.composition)
                .required(),
            Field::new("weight_gsm", "Weight (g/m²)", Input::Number { step: "1" })
                .value(&form.weight_gsm)
                .required(),
            Field::new("width_cm", "Width (cm)", Input::Number { step: "1" })
                .value(&form.width_cm)
                .required(),
            select(dropdowns, "supplier_id", "Supplier", EntityKind::Supplier, &form.supplier_id),
            Field::new(
                "color_ids",
                "Colors",
                Input::MultiSelect {
                    choices: choices(dropdowns, EntityKind::Color, &form.color_ids),
                },
            ),
        ]
    }

    fn filter_fields(filters: &BTreeMap<String, String>, dropdowns: &Dropdowns) -> Vec<Field> {
        supplier_filters(filters, dropdowns)
    }
}

impl EntityScreen for Material {
    const NOUN: &'static str = "material";
    const FILTERS: &'static [&'static str] = &[SEARCH_PARAM, SUPPLIER_FILTER];
    const DROPDOWNS: &'static [EntityKind] = &[EntityKind::Supplier, EntityKind::CostType];
    type Form = MaterialForm;

    fn table() -> Table<Self> {
        Table::<Material>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("unit", "Unit", |record| record.unit.as_str().into())
            .column("unit_cost", "Unit cost", |record| Cell::Decimal(record.unit_cost, 2))
            .column("cost_type", "Cost type", |record| {
                record.cost_type.name.as_str().into()
            })
            .column("supplier", "Supplier", |record| record.supplier.name.as_str().into())
    }

    fn fields(form: &MaterialForm, _current: Option<&Self>, dropdowns: &Dropdowns) -> Vec<Field> {
        vec![
            Field::text("name", "Name").value(&form.name).required(),
            Field::text("unit", "Unit").value(&form.unit).required(),
            Field::new("unit_cost", "Unit cost", Input::Number { step: "0.01" })
                .value(&form.unit_cost)
                .required(),
            select(
                dropdowns,
                "cost_type_id",
                "Cost type",
                EntityKind::CostType,
                &form.cost_type_id,
            ),
            select(dropdowns, "supplier_id", "Supplier", EntityKind::Supplier, &form.supplier_id),
        ]
    }

    fn filter_fields(filters: &BTreeMap<String, String>, dropdowns: &Dropdowns) -> Vec<Field> {
        supplier_filters(filters, dropdowns)
    }
}
