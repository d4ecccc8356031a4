use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::order::{NewOrder, Order, OrderStatus, SizeLine, UpdateOrder};
use crate::domain::types::{EntityId, NonEmptyString, PlmId};
use crate::forms::{FieldErrors, ResourceForm};
use crate::table::DATE_FORMAT;

/// Field that carries every size breakdown error, including the sum rule.
pub const SIZES_FIELD: &str = "sizes";

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing an order.
///
/// The size breakdown arrives as two repeated fields, `size_id` and
/// `size_amount`, paired by position.
pub struct OrderForm {
    #[validate(length(min = 1, max = 50, message = "PLM id must be 1 to 50 characters"))]
    pub plm_id: String,
    pub customer_id: String,
    pub collection_id: String,
    pub amount: String,
    pub size_id: Vec<String>,
    pub size_amount: Vec<String>,
    pub status: String,
    pub tracking_number: String,
    pub production_start: String,
}

/// Fields shared by create and update once validated.
struct OrderCore {
    plm_id: PlmId,
    customer_id: EntityId,
    collection_id: EntityId,
    amount: u32,
    sizes: Vec<SizeLine>,
}

impl OrderForm {
    /// Status currently selected in the form, falling back to `fallback`
    /// when the field is missing or unreadable.
    pub fn selected_status(&self, fallback: OrderStatus) -> OrderStatus {
        self.status
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(OrderStatus::from_ordinal)
            .unwrap_or(fallback)
    }

    /// Parses the breakdown rows. The sum of the amounts is returned whenever
    /// every amount parsed, regardless of the size picks.
    fn size_lines(&self, errors: &mut FieldErrors) -> (Option<Vec<SizeLine>>, Option<u64>) {
        fn cell(values: &[String], row: usize) -> &str {
            values.get(row).map_or("", |value| value.trim())
        }
        let rows = self.size_id.len().max(self.size_amount.len());
        let lines: Vec<(&str, &str)> = (0..rows)
            .map(|row| (cell(&self.size_id, row), cell(&self.size_amount, row)))
            .filter(|(id, amount)| !id.is_empty() || !amount.is_empty())
            .collect();

        if lines.is_empty() {
            errors.add(SIZES_FIELD, "Add at least one size");
            return (None, None);
        }

        let mut sizes = Vec::with_capacity(lines.len());
        let mut total = 0u64;
        let (mut unpicked, mut unknown, mut unreadable) = (false, false, false);
        for (id, amount) in lines {
            let size_id = if id.is_empty() {
                unpicked = true;
                None
            } else {
                let parsed = EntityId::new(id).ok();
                unknown |= parsed.is_none();
                parsed
            };
            let amount = amount.parse::<u32>().ok();
            match amount {
                Some(amount) => total += u64::from(amount),
                None => unreadable = true,
            }
            if let (Some(size_id), Some(amount)) = (size_id, amount) {
                sizes.push(SizeLine { size_id, amount });
            }
        }

        if unpicked {
            errors.add(SIZES_FIELD, "Select a size for every row");
        }
        if unknown {
            errors.add(SIZES_FIELD, "Unknown size");
        }
        if unreadable {
            errors.add(SIZES_FIELD, "Size amounts must be whole numbers of 0 or more");
        }
        let complete = !(unpicked || unknown || unreadable);
        (complete.then_some(sizes), (!unreadable).then_some(total))
    }

    fn core(&self, errors: &mut FieldErrors) -> Option<OrderCore> {
        let plm_id = errors.check("plm_id", PlmId::new(&self.plm_id), "PLM id is required");
        let customer_id = errors.id("customer_id", &self.customer_id, "customer");
        let collection_id = errors.id("collection_id", &self.collection_id, "collection");
        let amount = errors.number("amount", &self.amount, 1u32..=1_000_000);
        let (sizes, total) = self.size_lines(errors);

        if let (Some(amount), Some(total)) = (amount, total) {
            if total != u64::from(amount) {
                errors.add(
                    SIZES_FIELD,
                    format!("Size amounts add up to {total}, expected {amount}"),
                );
            }
        }

        Some(OrderCore {
            plm_id: plm_id?,
            customer_id: customer_id?,
            collection_id: collection_id?,
            amount: amount?,
            sizes: sizes?,
        })
    }

    fn tracking(&self, status: OrderStatus, errors: &mut FieldErrors) -> Option<NonEmptyString> {
        if !status.requires_tracking() {
            return None;
        }
        let tracking = NonEmptyString::new(&self.tracking_number).ok();
        if tracking.is_none() {
            errors.add("tracking_number", "Tracking number is required once shipped");
        }
        tracking
    }

    fn production_start(&self, status: OrderStatus, errors: &mut FieldErrors) -> Option<NaiveDate> {
        if !status.tracks_production() {
            return None;
        }
        let raw = self.production_start.trim();
        if raw.is_empty() {
            errors.add("production_start", "Production start date is required");
            return None;
        }
        let parsed = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok();
        if parsed.is_none() {
            errors.add("production_start", "Enter a date as YYYY-MM-DD");
        }
        parsed
    }
}

impl ResourceForm<Order> for OrderForm {
    fn from_record(record: &Order) -> Self {
        Self {
            plm_id: record.plm_id.clone(),
            customer_id: record.customer.id.to_string(),
            collection_id: record.collection.id.to_string(),
            amount: record.amount.to_string(),
            size_id: record.sizes.iter().map(|line| line.size.id.to_string()).collect(),
            size_amount: record.sizes.iter().map(|line| line.amount.to_string()).collect(),
            status: record.status.ordinal().to_string(),
            tracking_number: record.tracking_number.clone().unwrap_or_default(),
            production_start: record
                .production_start
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    fn to_create(&self) -> Result<NewOrder, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());
        let core = self.core(&mut errors);

        let Some(core) = core else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewOrder {
            plm_id: core.plm_id,
            customer_id: core.customer_id,
            collection_id: core.collection_id,
            amount: core.amount,
            sizes: core.sizes,
        })
    }

    fn to_update(&self, current: &Order) -> Result<UpdateOrder, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());
        let core = self.core(&mut errors);

        let status = self.selected_status(current.status);
        if !current.status.can_transition_to(status) {
            errors.add(
                "status",
                format!(
                    "Status can only move from {} to the next step",
                    current.status
                ),
            );
        }
        let tracking_number = self.tracking(status, &mut errors);
        let production_start = self.production_start(status, &mut errors);

        let Some(core) = core else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(UpdateOrder {
            plm_id: core.plm_id,
            customer_id: core.customer_id,
            collection_id: core.collection_id,
            amount: core.amount,
            sizes: core.sizes,
            status,
            tracking_number,
            production_start,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
/// Form data for advancing an order's status from the list.
pub struct StatusForm {
    pub status: String,
}

impl StatusForm {
    pub fn target(&self) -> Option<OrderStatus> {
        self.status
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(OrderStatus::from_ordinal)
    }
}
