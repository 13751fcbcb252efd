//! Schedule slot primitives.
//!
//! A slot is a single (room, date, start, end) interval owned by exactly
//! one reservation. The engine treats each slot independently for
//! conflict purposes.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, time::TimeOfDay};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl ScheduleSlot {
    pub fn new(
        reservation_id: Uuid,
        room_id: Uuid,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> ResultEngine<Self> {
        if end <= start {
            return Err(EngineError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            reservation_id,
            room_id,
            date,
            start,
            end,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedule_slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub reservation_id: String,
    pub room_id: String,
    pub date: Date,
    pub start_minute: i32,
    pub end_minute: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservations::Entity",
        from = "Column::ReservationId",
        to = "super::reservations::Column::Id"
    )]
    Reservations,
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id"
    )]
    Rooms,
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ScheduleSlot> for ActiveModel {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            id: ActiveValue::Set(slot.id.to_string()),
            reservation_id: ActiveValue::Set(slot.reservation_id.to_string()),
            room_id: ActiveValue::Set(slot.room_id.to_string()),
            date: ActiveValue::Set(slot.date),
            start_minute: ActiveValue::Set(i32::from(slot.start.minutes())),
            end_minute: ActiveValue::Set(i32::from(slot.end.minutes())),
        }
    }
}

impl TryFrom<Model> for ScheduleSlot {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let start = minute_column(model.start_minute)?;
        let end = minute_column(model.end_minute)?;
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("slot not exists".to_string()))?,
            reservation_id: Uuid::parse_str(&model.reservation_id)
                .map_err(|_| EngineError::KeyNotFound("reservation not exists".to_string()))?,
            room_id: Uuid::parse_str(&model.room_id)
                .map_err(|_| EngineError::KeyNotFound("room not exists".to_string()))?,
            date: model.date,
            start,
            end,
        })
    }
}

fn minute_column(value: i32) -> ResultEngine<TimeOfDay> {
    let minutes = u16::try_from(value)
        .map_err(|_| EngineError::Parse(format!("minute column out of range: {value}")))?;
    TimeOfDay::from_minutes(minutes)
}
