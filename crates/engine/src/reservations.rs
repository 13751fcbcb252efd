//! Reservation entity and lifecycle state machine.
//!
//! A reservation is created in `Pending` and only ever mutated through
//! the transition operation on the engine; the `status` field has a
//! single writer. `Denied`, `Cancelled` and `Closed` admit no further
//! transition; `Approved` admits exactly `Closed`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, slots::ScheduleSlot};

/// Suggested equipment tags offered by the booking form. Free-form
/// additions are accepted as well.
pub const EQUIPMENT_SUGGESTIONS: [&str; 6] = [
    "Laptop",
    "Router",
    "Projector",
    "Extension Cord",
    "HDMI Cable",
    "Arduino",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Instructor => "Instructor",
            Self::Student => "Student",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Instructor" => Ok(Self::Instructor),
            "Student" => Ok(Self::Student),
            other => Err(EngineError::Validation(format!("role: {other}"))),
        }
    }
}

/// The authenticated principal performing an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Denied,
    Cancelled,
    Closed,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
            Self::Cancelled => "Cancelled",
            Self::Closed => "Closed",
        }
    }

    /// Whether the status still occupies its slots for conflict purposes.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl TryFrom<&str> for ReservationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Denied" => Ok(Self::Denied),
            "Cancelled" => Ok(Self::Cancelled),
            "Closed" => Ok(Self::Closed),
            other => Err(EngineError::Validation(format!("status: {other}"))),
        }
    }
}

/// Who is allowed to perform a legal transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransitionGate {
    Admin,
    Owner,
}

/// Checks `from -> to` against the transition table.
///
/// State legality is decided before actor authority: an illegal source
/// state fails with `IllegalState` no matter who asks.
fn transition_gate(from: ReservationStatus, to: ReservationStatus) -> ResultEngine<TransitionGate> {
    use ReservationStatus::*;
    match (from, to) {
        (Pending, Approved) | (Pending, Denied) => Ok(TransitionGate::Admin),
        (Pending, Cancelled) => Ok(TransitionGate::Owner),
        (Approved, Closed) => Ok(TransitionGate::Owner),
        (from, to) => Err(EngineError::IllegalState(format!(
            "no transition from {} to {}",
            from.as_str(),
            to.as_str()
        ))),
    }
}

/// Validates a status transition for the given actor.
pub fn authorize_transition(
    from: ReservationStatus,
    to: ReservationStatus,
    actor: &Actor,
    owner_id: &str,
) -> ResultEngine<()> {
    match transition_gate(from, to)? {
        TransitionGate::Admin => {
            if actor.role != Role::Admin {
                return Err(EngineError::Forbidden(format!(
                    "only an admin may set status {}",
                    to.as_str()
                )));
            }
        }
        TransitionGate::Owner => {
            if actor.user_id != owner_id {
                return Err(EngineError::Forbidden(format!(
                    "only the owning requester may set status {}",
                    to.as_str()
                )));
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    ItProject,
    Research,
    AcademicRequirement,
    Thesis,
    Event,
    Training,
    Maintenance,
    AdministrativeTask,
    Meeting,
    SystemTesting,
    DepartmentRequest,
    FacilityUse,
    Other,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItProject => "IT Project-Related",
            Self::Research => "Research-Related",
            Self::AcademicRequirement => "Academic Requirement",
            Self::Thesis => "Thesis / Capstone",
            Self::Event => "Event / Activity",
            Self::Training => "Training / Workshop",
            Self::Maintenance => "Maintenance Work",
            Self::AdministrativeTask => "Administrative Task",
            Self::Meeting => "Meeting / Consultation",
            Self::SystemTesting => "System Testing",
            Self::DepartmentRequest => "Department Request",
            Self::FacilityUse => "Facility Use",
            Self::Other => "Other",
        }
    }
}

impl TryFrom<&str> for Purpose {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "IT Project-Related" => Ok(Self::ItProject),
            "Research-Related" => Ok(Self::Research),
            "Academic Requirement" => Ok(Self::AcademicRequirement),
            "Thesis / Capstone" => Ok(Self::Thesis),
            "Event / Activity" => Ok(Self::Event),
            "Training / Workshop" => Ok(Self::Training),
            "Maintenance Work" => Ok(Self::Maintenance),
            "Administrative Task" => Ok(Self::AdministrativeTask),
            "Meeting / Consultation" => Ok(Self::Meeting),
            "System Testing" => Ok(Self::SystemTesting),
            "Department Request" => Ok(Self::DepartmentRequest),
            "Facility Use" => Ok(Self::FacilityUse),
            "Other" => Ok(Self::Other),
            other => Err(EngineError::Validation(format!("purpose: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    /// Human-readable booking code, e.g. `RSV-5F3A9C21`.
    pub code: String,
    pub user_id: String,
    /// Denormalized requester name, kept for the list filter.
    pub full_name: String,
    /// Requester's role at creation time; drives calendar color buckets.
    pub role: Role,
    pub purpose: Purpose,
    pub advisor: Option<String>,
    pub remarks: String,
    pub participants: Vec<String>,
    pub equipments: Vec<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slots: Vec<ScheduleSlot>,
}

impl Reservation {
    /// Room ids covered by this reservation, in slot order, deduplicated.
    pub fn room_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for slot in &self.slots {
            if !ids.contains(&slot.room_id) {
                ids.push(slot.room_id);
            }
        }
        ids
    }
}

/// Fields a requester may change while the reservation is `Pending`.
#[derive(Clone, Debug, Default)]
pub struct ReservationPatch {
    pub purpose: Option<Purpose>,
    pub advisor: Option<Option<String>>,
    pub remarks: Option<String>,
    pub participants: Option<Vec<String>>,
    pub equipments: Option<Vec<String>>,
}

/// Sortable columns for [`ReservationFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationSort {
    Id,
    Code,
    Status,
    CreatedAt,
    FullName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// List query for reservations.
#[derive(Clone, Debug, Default)]
pub struct ReservationFilter {
    pub owner: Option<String>,
    pub status: Option<ReservationStatus>,
    pub code: Option<String>,
    pub full_name_contains: Option<String>,
    pub sort: Option<(ReservationSort, SortOrder)>,
    pub page: u64,
    pub page_size: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub user_id: String,
    pub full_name: String,
    pub user_role: String,
    pub purpose: String,
    pub advisor: Option<String>,
    pub remarks: String,
    pub participants: String,
    pub equipments: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

impl From<&Reservation> for ActiveModel {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: ActiveValue::Set(reservation.id.to_string()),
            code: ActiveValue::Set(reservation.code.clone()),
            user_id: ActiveValue::Set(reservation.user_id.clone()),
            full_name: ActiveValue::Set(reservation.full_name.clone()),
            user_role: ActiveValue::Set(reservation.role.as_str().to_string()),
            purpose: ActiveValue::Set(reservation.purpose.as_str().to_string()),
            advisor: ActiveValue::Set(reservation.advisor.clone()),
            remarks: ActiveValue::Set(reservation.remarks.clone()),
            participants: ActiveValue::Set(to_json_list(&reservation.participants)),
            equipments: ActiveValue::Set(to_json_list(&reservation.equipments)),
            status: ActiveValue::Set(reservation.status.as_str().to_string()),
            created_at: ActiveValue::Set(reservation.created_at),
            updated_at: ActiveValue::Set(reservation.updated_at),
        }
    }
}

impl TryFrom<Model> for Reservation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("reservation not exists".to_string()))?,
            code: model.code,
            user_id: model.user_id,
            full_name: model.full_name,
            role: Role::try_from(model.user_role.as_str())?,
            purpose: Purpose::try_from(model.purpose.as_str())?,
            advisor: model.advisor,
            remarks: model.remarks,
            participants: from_json_list(&model.participants)?,
            equipments: from_json_list(&model.equipments)?,
            status: ReservationStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            slots: Vec::new(),
        })
    }
}

fn to_json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn from_json_list(raw: &str) -> ResultEngine<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|err| EngineError::Validation(format!("stored list column: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor {
            user_id: "admin".to_string(),
            role: Role::Admin,
        }
    }

    fn owner() -> Actor {
        Actor {
            user_id: "alice".to_string(),
            role: Role::Student,
        }
    }

    #[test]
    fn admin_approves_and_denies_pending() {
        use ReservationStatus::*;
        assert!(authorize_transition(Pending, Approved, &admin(), "alice").is_ok());
        assert!(authorize_transition(Pending, Denied, &admin(), "alice").is_ok());
    }

    #[test]
    fn owner_cancels_pending_and_closes_approved() {
        use ReservationStatus::*;
        assert!(authorize_transition(Pending, Cancelled, &owner(), "alice").is_ok());
        assert!(authorize_transition(Approved, Closed, &owner(), "alice").is_ok());
    }

    #[test]
    fn wrong_actor_is_forbidden_on_legal_transitions() {
        use ReservationStatus::*;
        assert!(matches!(
            authorize_transition(Pending, Approved, &owner(), "alice"),
            Err(EngineError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_transition(Pending, Cancelled, &admin(), "alice"),
            Err(EngineError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_transition(Approved, Closed, &admin(), "alice"),
            Err(EngineError::Forbidden(_))
        ));
    }

    #[test]
    fn no_transition_leaves_a_terminal_status() {
        use ReservationStatus::*;
        for from in [Denied, Cancelled, Closed] {
            for to in [Pending, Approved, Denied, Cancelled, Closed] {
                let err = authorize_transition(from, to, &admin(), "alice").unwrap_err();
                assert!(
                    matches!(err, EngineError::IllegalState(_)),
                    "{} -> {} should be illegal",
                    from.as_str(),
                    to.as_str()
                );
            }
        }
    }

    #[test]
    fn approved_only_moves_to_closed() {
        use ReservationStatus::*;
        for to in [Pending, Approved, Denied, Cancelled] {
            assert!(matches!(
                authorize_transition(Approved, to, &admin(), "alice"),
                Err(EngineError::IllegalState(_))
            ));
        }
    }

    #[test]
    fn status_and_purpose_round_trip() {
        use ReservationStatus::*;
        for status in [Pending, Approved, Denied, Cancelled, Closed] {
            assert_eq!(
                ReservationStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
        assert_eq!(
            Purpose::try_from("Thesis / Capstone").unwrap(),
            Purpose::Thesis
        );
        assert!(matches!(
            Purpose::try_from("Karaoke"),
            Err(EngineError::Validation(_))
        ));
    }
}
