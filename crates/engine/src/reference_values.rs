//! Catalog of suggested human values for common favors.
//!
//! Clients show these next to the human value field so that users price
//! favors consistently. The catalog is keyed by `label`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceValue {
    pub id: Uuid,
    pub label: String,
    pub default_value: Amount,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry of the default catalog: `(label, default value in major units,
/// description)`.
pub type ReferenceSeed = (&'static str, i64, &'static str);

pub const DEFAULT_REFERENCE_VALUES: [ReferenceSeed; 8] = [
    ("Tutoring, 1 hour", 100, "Primary or secondary school tutoring, 1 hour"),
    ("Help moving, once", 200, "Small move, one trip"),
    ("Parcel pickup, once", 10, "Collect a parcel on campus"),
    ("Home-cooked meal", 80, "Regular meal, four dishes and a soup"),
    ("Pet sitting, 1 day", 150, "Small pet, one day"),
    ("Car ride, once", 100, "Ride within the city"),
    ("Translation, 1 page", 30, "Ordinary document, one A4 page"),
    ("Photography, 1 hour", 200, "Ordinary photo session, 1 hour"),
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reference_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub label: String,
    pub default_value_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReferenceValue> for ActiveModel {
    fn from(value: &ReferenceValue) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            label: ActiveValue::Set(value.label.clone()),
            default_value_minor: ActiveValue::Set(value.default_value.minor()),
            description: ActiveValue::Set(value.description.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for ReferenceValue {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "reference value")?,
            label: model.label,
            default_value: Amount::from_minor(model.default_value_minor),
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
