use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod reservation {
    use super::*;

    /// Request body for creating a reservation.
    ///
    /// `purpose` and the time labels are plain strings; the server maps
    /// them onto the engine's vocabulary and rejects unknown values.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReservationNew {
        pub room_ids: Vec<Uuid>,
        pub purpose: String,
        pub dates: Vec<NaiveDate>,
        pub start_time: String,
        pub end_time: String,
        pub advisor: Option<String>,
        pub remarks: String,
        #[serde(default)]
        pub participants: Vec<String>,
        #[serde(default)]
        pub equipments: Vec<String>,
    }

    /// Request body for editing a `Pending` reservation.
    ///
    /// Absent fields are left unchanged; `advisor` distinguishes
    /// "leave as is" (absent) from "clear" (explicit null).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReservationEdit {
        pub purpose: Option<String>,
        #[serde(default, with = "double_option")]
        pub advisor: Option<Option<String>>,
        pub remarks: Option<String>,
        pub participants: Option<Vec<String>>,
        pub equipments: Option<Vec<String>>,
    }

    /// Request body for a status transition.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: String,
    }

    /// Query string for listing reservations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReservationListQuery {
        pub status: Option<String>,
        pub code: Option<String>,
        pub full_name: Option<String>,
        /// Restrict to the authenticated user's own reservations.
        #[serde(default)]
        pub mine: bool,
        pub sort_by: Option<String>,
        pub order: Option<String>,
        #[serde(default)]
        pub page: u64,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotView {
        pub id: Uuid,
        pub room_id: Uuid,
        pub date: NaiveDate,
        pub start_time: String,
        pub end_time: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReservationView {
        pub id: Uuid,
        pub code: String,
        pub user_id: String,
        pub full_name: String,
        pub role: String,
        pub purpose: String,
        pub advisor: Option<String>,
        pub remarks: String,
        pub participants: Vec<String>,
        pub equipments: Vec<String>,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub slots: Vec<SlotView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReservationPage {
        pub reservations: Vec<ReservationView>,
        pub page: u64,
        pub total_pages: u64,
    }

    mod double_option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            T: Serialize,
        {
            match value {
                None => serializer.serialize_none(),
                Some(inner) => inner.serialize(serializer),
            }
        }

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
        where
            D: Deserializer<'de>,
            T: Deserialize<'de>,
        {
            Option::<T>::deserialize(deserializer).map(Some)
        }
    }
}

pub mod room {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomNew {
        pub name: String,
        #[serde(default)]
        pub sub_room: String,
        pub capacity: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomStatusUpdate {
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomView {
        pub id: Uuid,
        pub name: String,
        pub sub_room: String,
        pub capacity: i32,
        pub status: String,
    }

    /// Query string for the availability probe.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailabilityQuery {
        pub room_id: Uuid,
        pub date: NaiveDate,
        pub start_time: String,
        pub end_time: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Availability {
        pub available: bool,
        /// Human-readable reason when the interval is taken.
        pub reason: Option<String>,
    }

    /// Query string for a room's raw schedule, inclusive date range.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleQuery {
        pub from: NaiveDate,
        pub to: NaiveDate,
    }

    /// One occupied interval with its reserving user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleEventView {
        pub slot_id: Uuid,
        pub reservation_id: Uuid,
        pub date: NaiveDate,
        pub start_time: String,
        pub end_time: String,
        pub remarks: String,
        pub owner_id: String,
        pub owner_role: String,
    }
}

pub mod calendar {
    use super::*;

    /// Query string for the weekly calendar projection.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CalendarQuery {
        /// Any date inside the requested week; the server snaps it to
        /// the week's Sunday.
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BlockView {
        pub slot_id: Uuid,
        pub reservation_id: Uuid,
        /// Grid column, Sunday = 0 through Saturday = 6.
        pub day: u32,
        /// Pixel offset from the top of the grid.
        pub top: f64,
        /// Pixel height of the block.
        pub height: f64,
        /// Color bucket: `mine`, `admin`, `instructor` or `other`.
        pub bucket: String,
        pub remarks: String,
        pub start_label: String,
        pub end_label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WeekOptionView {
        pub start: NaiveDate,
        pub label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CalendarView {
        pub week_start: NaiveDate,
        pub blocks: Vec<BlockView>,
        pub week_options: Vec<WeekOptionView>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomUsageView {
        pub room_id: Uuid,
        pub room_name: String,
        pub total_hours: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurposeUsageView {
        pub room_id: Uuid,
        pub room_name: String,
        pub purpose: String,
        pub total_hours: f64,
    }
}
