//! Production orders and their forward-only status lifecycle.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntityKind, EntityRef, Resource};
use crate::domain::types::{EntityId, NonEmptyString, PlmId, TypeConstraintError};

/// Order status, transmitted to the backend as its ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    InProduction,
    QualityCheck,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::QualityCheck,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::InProduction => "In production",
            OrderStatus::QualityCheck => "Quality check",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// The single status an order may advance to, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// A status may stay where it is or move exactly one step forward.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        target == self || Some(target) == self.next()
    }

    /// Shipped orders carry a tracking number.
    pub fn requires_tracking(self) -> bool {
        self >= OrderStatus::Shipped
    }

    /// Orders in production or later carry a production start date.
    pub fn tracks_production(self) -> bool {
        self >= OrderStatus::InProduction
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<u8> for OrderStatus {
    type Error = TypeConstraintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("order status {value}")))
    }
}

impl From<OrderStatus> for u8 {
    fn from(value: OrderStatus) -> Self {
        value.ordinal()
    }
}

/// One entry of a status selector.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StatusOption {
    pub value: u8,
    pub label: &'static str,
    pub selected: bool,
    pub disabled: bool,
}

/// Builds the status selector for an order currently in `current`: only the
/// current status and the next one are selectable.
pub fn status_options(current: OrderStatus) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status.ordinal(),
            label: status.label(),
            selected: status == current,
            disabled: !current.can_transition_to(status),
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizeAmount {
    pub size: EntityRef,
    pub amount: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: EntityId,
    pub plm_id: String,
    pub customer: EntityRef,
    pub collection: EntityRef,
    pub amount: u32,
    #[serde(default)]
    pub sizes: Vec<SizeAmount>,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub production_start: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizeLine {
    pub size_id: EntityId,
    pub amount: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub plm_id: PlmId,
    pub customer_id: EntityId,
    pub collection_id: EntityId,
    pub amount: u32,
    pub sizes: Vec<SizeLine>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub plm_id: PlmId,
    pub customer_id: EntityId,
    pub collection_id: EntityId,
    pub amount: u32,
    pub sizes: Vec<SizeLine>,
    pub status: OrderStatus,
    pub tracking_number: Option<NonEmptyString>,
    pub production_start: Option<NaiveDate>,
}

/// Body of the `PATCH /orders/{id}/status` transition.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StatusChange {
    pub status: OrderStatus,
}

impl Order {
    /// Detail the order still lacks before it may enter `target`.
    pub fn missing_detail_for(&self, target: OrderStatus) -> Option<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        if target.tracks_production() && self.production_start.is_none() {
            Some("a production start date")
        } else if target.requires_tracking() && blank(&self.tracking_number) {
            Some("a tracking number")
        } else {
            None
        }
    }
}

impl Resource for Order {
    const KIND: EntityKind = EntityKind::Order;
    type Create = NewOrder;
    type Update = UpdateOrder;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
