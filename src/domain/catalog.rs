//! Product catalog: collections, fabrics and materials.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntityKind, EntityRef, Resource};
use crate::domain::types::{Description, EntityId, EntityName, NonEmptyString};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: EntityId,
    pub name: String,
    pub season: Option<String>,
    pub year: u16,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub name: EntityName,
    pub season: Option<NonEmptyString>,
    pub year: u16,
    pub description: Option<Description>,
}

/// Collections are updated with the same shape they are created with.
pub type UpdateCollection = NewCollection;

impl Resource for Collection {
    const KIND: EntityKind = EntityKind::Collection;
    type Create = NewCollection;
    type Update = UpdateCollection;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fabric {
    pub id: EntityId,
    pub name: String,
    pub composition: String,
    pub weight_gsm: u32,
    pub width_cm: u32,
    pub supplier: EntityRef,
    #[serde(default)]
    pub colors: Vec<EntityRef>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewFabric {
    pub name: EntityName,
    pub composition: NonEmptyString,
    pub weight_gsm: u32,
    pub width_cm: u32,
    pub supplier_id: EntityId,
    pub color_ids: Vec<EntityId>,
}

pub type UpdateFabric = NewFabric;

impl Resource for Fabric {
    const KIND: EntityKind = EntityKind::Fabric;
    type Create = NewFabric;
    type Update = UpdateFabric;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: EntityId,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub cost_type: EntityRef,
    pub supplier: EntityRef,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub name: EntityName,
    pub unit: NonEmptyString,
    pub unit_cost: f64,
    pub cost_type_id: EntityId,
    pub supplier_id: EntityId,
}

pub type UpdateMaterial = NewMaterial;

impl Resource for Material {
    const KIND: EntityKind = EntityKind::Material;
    type Create = NewMaterial;
    type Update = UpdateMaterial;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
