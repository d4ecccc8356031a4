//! Business partners: suppliers and customers.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntityKind, Resource};
use crate::domain::types::{
    CustomerCode, EmailAddress, EntityId, EntityName, NonEmptyString, PhoneNumber,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: EntityName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub address: Option<NonEmptyString>,
}

pub type UpdateSupplier = NewSupplier;

impl Resource for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;
    type Create = NewSupplier;
    type Update = UpdateSupplier;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: EntityName,
    pub code: CustomerCode,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
}

pub type UpdateCustomer = NewCustomer;

impl Resource for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    type Create = NewCustomer;
    type Update = UpdateCustomer;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
