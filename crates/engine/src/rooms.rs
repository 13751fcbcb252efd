//! Room primitives.
//!
//! Rooms are immutable during a booking and referenced by id from
//! reservation slots.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Unavailable,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl TryFrom<&str> for RoomStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Available" => Ok(Self::Available),
            "Unavailable" => Ok(Self::Unavailable),
            other => Err(EngineError::Validation(format!("room status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    /// Sub-room label shown next to the display name (e.g. a lab wing).
    pub sub_room: String,
    pub capacity: i32,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(name: String, sub_room: String, capacity: i32) -> ResultEngine<Self> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation("name".to_string()));
        }
        if capacity <= 0 {
            return Err(EngineError::Validation("capacity".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            sub_room,
            capacity,
            status: RoomStatus::Available,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub sub_room: String,
    pub capacity: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::slots::Entity")]
    ScheduleSlots,
}

impl Related<super::slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleSlots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Room> for ActiveModel {
    fn from(room: &Room) -> Self {
        Self {
            id: ActiveValue::Set(room.id.to_string()),
            name: ActiveValue::Set(room.name.clone()),
            sub_room: ActiveValue::Set(room.sub_room.clone()),
            capacity: ActiveValue::Set(room.capacity),
            status: ActiveValue::Set(room.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Room {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("room not exists".to_string()))?,
            name: model.name,
            sub_room: model.sub_room,
            capacity: model.capacity,
            status: RoomStatus::try_from(model.status.as_str())?,
        })
    }
}
