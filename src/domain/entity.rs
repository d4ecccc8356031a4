//! Entity kinds, references and the resource contract shared by every screen.

use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::types::EntityId;

/// Every kind of record the dashboard lists, edits or offers in a dropdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    Fabric,
    Material,
    Supplier,
    Customer,
    Order,
    Sample,
    Color,
    Size,
    CostType,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Collection,
        EntityKind::Fabric,
        EntityKind::Material,
        EntityKind::Supplier,
        EntityKind::Customer,
        EntityKind::Order,
        EntityKind::Sample,
        EntityKind::Color,
        EntityKind::Size,
        EntityKind::CostType,
    ];

    /// Logical name, used as the first element of every cache key and as the
    /// backend path segment.
    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::Collection => "collections",
            EntityKind::Fabric => "fabrics",
            EntityKind::Material => "materials",
            EntityKind::Supplier => "suppliers",
            EntityKind::Customer => "customers",
            EntityKind::Order => "orders",
            EntityKind::Sample => "samples",
            EntityKind::Color => "colors",
            EntityKind::Size => "sizes",
            EntityKind::CostType => "cost-types",
        }
    }

    /// Human readable plural label.
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Collection => "Collections",
            EntityKind::Fabric => "Fabrics",
            EntityKind::Material => "Materials",
            EntityKind::Supplier => "Suppliers",
            EntityKind::Customer => "Customers",
            EntityKind::Order => "Orders",
            EntityKind::Sample => "Samples",
            EntityKind::Color => "Colors",
            EntityKind::Size => "Sizes",
            EntityKind::CostType => "Cost types",
        }
    }

    /// Kinds whose records embed a reference to this kind and therefore go
    /// stale together with it.
    pub const fn dependents(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Supplier => &[EntityKind::Fabric, EntityKind::Material],
            EntityKind::Customer => &[EntityKind::Order, EntityKind::Sample],
            EntityKind::Collection | EntityKind::Size => &[EntityKind::Order],
            EntityKind::Fabric => &[EntityKind::Sample],
            EntityKind::Color => &[EntityKind::Fabric],
            EntityKind::CostType => &[EntityKind::Material],
            EntityKind::Material | EntityKind::Order | EntityKind::Sample => &[],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Minimal `{ id, name }` shape used to populate selection dropdowns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: String,
}

/// A record type served by the backend under [`Resource::KIND`].
///
/// Create payloads never carry an identifier; the server is the source of
/// truth for ids and hands them back in the record.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    fn id(&self) -> &EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EntityKind::from_name("widgets"), None);
    }

    #[test]
    fn no_kind_depends_on_itself() {
        for kind in EntityKind::ALL {
            assert!(!kind.dependents().contains(&kind));
        }
    }
}
