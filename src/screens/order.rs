use std::collections::BTreeMap;

use crate::domain::entity::EntityKind;
use crate::domain::order::{Order, OrderStatus, status_options};
use crate::forms::order::{OrderForm, SIZES_FIELD};
use crate::screens::{EntityScreen, RowAction, SEARCH_PARAM, filter_text, search_field};
use crate::sheet::{Choice, Dropdowns, Field, Input, SizeRow, choices, select};
use crate::table::Table;

const STATUS_FILTER: &str = "status";

/// Size rows shown in the sheet: the entered lines plus one blank row.
fn size_rows(form: &OrderForm, dropdowns: &Dropdowns) -> Vec<SizeRow> {
    let mut rows: Vec<SizeRow> = form
        .size_id
        .iter()
        .zip(form.size_amount.iter().chain(std::iter::repeat(&String::new())))
        .map(|(id, amount)| SizeRow {
            choices: choices(dropdowns, EntityKind::Size, &[id]),
            amount: amount.clone(),
        })
        .collect();
    rows.push(SizeRow {
        choices: choices::<&str>(dropdowns, EntityKind::Size, &[]),
        amount: String::new(),
    });
    rows
}

fn status_field(current: OrderStatus, selected: OrderStatus) -> Field {
    let choices = status_options(current)
        .into_iter()
        .map(|option| Choice {
            value: option.value.to_string(),
            label: option.label.to_string(),
            selected: option.value == selected.ordinal(),
            disabled: option.disabled,
        })
        .collect();
    Field::new("status", "Status", Input::Select { choices })
        .value(selected.ordinal().to_string())
        .required()
}

impl EntityScreen for Order {
    const NOUN: &'static str = "order";
    const FILTERS: &'static [&'static str] = &[SEARCH_PARAM, STATUS_FILTER, "plmId", "customerCode"];
    const DROPDOWNS: &'static [EntityKind] =
        &[EntityKind::Customer, EntityKind::Collection, EntityKind::Size];
    type Form = OrderForm;

    fn table() -> Table<Self> {
        Table::<Order>::new(|record| record.id.to_string())
            .column("plm_id", "PLM id", |record| record.plm_id.as_str().into())
            .column("customer", "Customer", |record| record.customer.name.as_str().into())
            .column("collection", "Collection", |record| {
                record.collection.name.as_str().into()
            })
            .column("amount", "Amount", |record| record.amount.into())
            .column("status", "Status", |record| record.status.label().into())
            .column("tracking_number", "Tracking", |record| {
                record.tracking_number.clone().into()
            })
            .column("production_start", "Production start", |record| {
                record.production_start.into()
            })
            .column("created_at", "Created", |record| record.created_at.into())
    }

    /// The status selector appears only when editing. Tracking number and
    /// production start follow the selected status.
    fn fields(form: &OrderForm, current: Option<&Self>, dropdowns: &Dropdowns) -> Vec<Field> {
        let mut fields = vec![
            Field::text("plm_id", "PLM id").value(&form.plm_id).required(),
            select(dropdowns, "customer_id", "Customer", EntityKind::Customer, &form.customer_id),
            select(
                dropdowns,
                "collection_id",
                "Collection",
                EntityKind::Collection,
                &form.collection_id,
            ),
            Field::new("amount", "Amount", Input::Number { step: "1" })
                .value(&form.amount)
                .required(),
            Field::new(
                SIZES_FIELD,
                "Sizes",
                Input::Sizes {
                    rows: size_rows(form, dropdowns),
                },
            )
            .required(),
        ];

        let Some(current) = current else {
            return fields;
        };
        let selected = form.selected_status(current.status);
        fields.push(status_field(current.status, selected));
        if selected.tracks_production() {
            fields.push(
                Field::new("production_start", "Production start", Input::Date)
                    .value(&form.production_start)
                    .required(),
            );
        }
        if selected.requires_tracking() {
            fields.push(
                Field::text("tracking_number", "Tracking number")
                    .value(&form.tracking_number)
                    .required(),
            );
        }
        fields
    }

    fn filter_fields(filters: &BTreeMap<String, String>, _dropdowns: &Dropdowns) -> Vec<Field> {
        let selected = filters.get(STATUS_FILTER).cloned().unwrap_or_default();
        let mut statuses = vec![Choice::new("", "Any status", selected.is_empty())];
        statuses.extend(OrderStatus::ALL.into_iter().map(|status| {
            let value = status.ordinal().to_string();
            let picked = value == selected;
            Choice::new(value, status.label(), picked)
        }));

        vec![
            search_field(filters),
            Field::new(STATUS_FILTER, "Status", Input::Select { choices: statuses })
                .value(selected),
            filter_text(filters, "plmId", "PLM id"),
            filter_text(filters, "customerCode", "Customer code"),
        ]
    }

    /// Offered only when the next status needs no detail the order lacks;
    /// otherwise the edit sheet is the way forward.
    fn row_actions(record: &Self) -> Vec<RowAction> {
        record
            .status
            .next()
            .filter(|next| record.missing_detail_for(*next).is_none())
            .map(|next| RowAction {
                label: format!("Move to {}", next.label().to_lowercase()),
                action: format!("{}/{}/status", Self::path(), record.id),
                fields: vec![("status", next.ordinal().to_string())],
            })
            .into_iter()
            .collect()
    }
}
