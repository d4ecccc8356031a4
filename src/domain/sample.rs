//! Fabric samples sent to customers for approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntityKind, EntityRef, Resource};
use crate::domain::types::{EntityId, EntityName};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SampleStatus {
    Pending,
    Verified,
}

impl SampleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SampleStatus::Pending => "Pending",
            SampleStatus::Verified => "Verified",
        }
    }
}

impl TryFrom<u8> for SampleStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SampleStatus::Pending),
            1 => Ok(SampleStatus::Verified),
            other => Err(format!("unknown sample status {other}")),
        }
    }
}

impl From<SampleStatus> for u8 {
    fn from(value: SampleStatus) -> Self {
        value as u8
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: EntityId,
    pub name: String,
    pub fabric: EntityRef,
    pub customer: EntityRef,
    pub image_url: Option<String>,
    pub status: SampleStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSample {
    pub name: EntityName,
    pub fabric_id: EntityId,
    pub customer_id: EntityId,
    pub image_url: Option<String>,
}

pub type UpdateSample = NewSample;

impl Resource for Sample {
    const KIND: EntityKind = EntityKind::Sample;
    type Create = NewSample;
    type Update = UpdateSample;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Result of `POST /uploads`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub url: String,
}
