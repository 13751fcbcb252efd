use chrono::{NaiveDate, Utc};
use uuid::Uuid;

pub use availability::{CandidateSlot, conflicts, find_conflict, self_conflict};
pub use bus::{ChangeBus, ChangeFeed, ReservationChange};
pub use calendar::{
    CalendarBlock, CalendarWindow, ColorBucket, ScheduleEvent, WeekOption, project_week,
    start_of_week, week_options,
};
pub use error::EngineError;
pub use reservations::{
    Actor, EQUIPMENT_SUGGESTIONS, Purpose, Reservation, ReservationFilter, ReservationPatch,
    ReservationSort, ReservationStatus, Role, SortOrder, authorize_transition,
};
pub use rooms::{Room, RoomStatus};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, TransactionTrait, prelude::*,
};
pub use slots::ScheduleSlot;
pub use time::{CLOSING, OPENING, TimeOfDay, day_index_of, duration_hours};

mod availability;
mod bus;
mod calendar;
mod error;
mod reservations;
mod rooms;
mod slots;
mod time;

type ResultEngine<T> = Result<T, EngineError>;

/// Maximum length of the remarks line on the booking form.
pub const REMARKS_MAX_CHARS: usize = 30;

/// Command for [`Engine::create_reservation`].
///
/// Time labels are parsed by the engine (12-hour or 24-hour form); the
/// single start/end window applies to every requested date on every
/// requested room.
#[derive(Clone, Debug)]
pub struct CreateReservation {
    pub requester: Actor,
    pub full_name: String,
    pub room_ids: Vec<Uuid>,
    pub purpose: Purpose,
    pub dates: Vec<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub advisor: Option<String>,
    pub remarks: String,
    pub participants: Vec<String>,
    pub equipments: Vec<String>,
}

/// Approved usage totals for one room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomUsage {
    pub room_id: Uuid,
    pub room_name: String,
    pub total_hours: f64,
}

/// Approved usage totals for one (room, purpose) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageByPurpose {
    pub room_id: Uuid,
    pub room_name: String,
    pub purpose: Purpose,
    pub total_hours: f64,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    bus: ChangeBus,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Registers a change subscriber. Dropping the feed deregisters it.
    pub fn subscribe(&self) -> ChangeFeed {
        self.bus.subscribe()
    }

    // ── Rooms ───────────────────────────────────────────────────────────

    /// Add a new bookable room.
    pub async fn new_room(
        &self,
        name: &str,
        sub_room: &str,
        capacity: i32,
    ) -> ResultEngine<Room> {
        let room = Room::new(name.to_string(), sub_room.to_string(), capacity)?;
        rooms::ActiveModel::from(&room).insert(&self.database).await?;
        Ok(room)
    }

    /// All rooms, sorted by name.
    pub async fn rooms(&self) -> ResultEngine<Vec<Room>> {
        let models = rooms::Entity::find()
            .order_by_asc(rooms::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Room::try_from).collect()
    }

    pub async fn room(&self, room_id: Uuid) -> ResultEngine<Room> {
        let model = rooms::Entity::find_by_id(room_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))?;
        Room::try_from(model)
    }

    /// Flips a room's operational status.
    ///
    /// Existing reservations are untouched; only new bookings are blocked
    /// while the room is `Unavailable`.
    pub async fn set_room_status(&self, room_id: Uuid, status: RoomStatus) -> ResultEngine<Room> {
        let model = rooms::Entity::find_by_id(room_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))?;

        let update = rooms::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            status: ActiveValue::Set(status.as_str().to_string()),
            ..Default::default()
        };
        Room::try_from(update.update(&self.database).await?)
    }

    // ── Reservations ────────────────────────────────────────────────────

    /// Creates a reservation in `Pending` and publishes a change event.
    ///
    /// Validation order: required fields (the error names the field),
    /// then time parsing, then duration/operating-hours/alignment, then
    /// room existence and availability, then self-overlap of the
    /// requested slots. Overlap with *other* reservations is deliberately
    /// not rejected here: competing requests coexist as `Pending` and the
    /// race is resolved at approval time.
    ///
    /// Re-submitting the same command creates a new reservation each
    /// time; there is no dedup key.
    pub async fn create_reservation(&self, cmd: CreateReservation) -> ResultEngine<Reservation> {
        let (start, end) = validate_create(&cmd)?;

        let db_tx = self.database.begin().await?;

        for room_id in &cmd.room_ids {
            let room_model = rooms::Entity::find_by_id(room_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))?;
            let room = Room::try_from(room_model)?;
            if room.status != RoomStatus::Available {
                return Err(EngineError::Validation(format!(
                    "room_ids: room {} is not available",
                    room.name
                )));
            }
        }

        let candidates: Vec<CandidateSlot> = cmd
            .room_ids
            .iter()
            .flat_map(|room_id| {
                cmd.dates.iter().map(|date| CandidateSlot {
                    room_id: *room_id,
                    date: *date,
                    start,
                    end,
                })
            })
            .collect();
        if self_conflict(&candidates).is_some() {
            return Err(EngineError::Conflict(
                "requested slots overlap each other".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let reservation = Reservation {
            id,
            code: reservation_code(id),
            user_id: cmd.requester.user_id.clone(),
            full_name: cmd.full_name.clone(),
            role: cmd.requester.role,
            purpose: cmd.purpose,
            advisor: normalize_optional(cmd.advisor.as_deref()),
            remarks: cmd.remarks.trim().to_string(),
            participants: filter_blanks(&cmd.participants),
            equipments: filter_blanks(&cmd.equipments),
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
            slots: candidates
                .iter()
                .map(|c| ScheduleSlot::new(id, c.room_id, c.date, c.start, c.end))
                .collect::<ResultEngine<Vec<_>>>()?,
        };

        reservations::ActiveModel::from(&reservation)
            .insert(&db_tx)
            .await?;
        for slot in &reservation.slots {
            slots::ActiveModel::from(slot).insert(&db_tx).await?;
        }
        db_tx.commit().await?;

        tracing::info!(code = %reservation.code, "reservation created");
        self.bus.publish(ReservationChange {
            reservation_id: reservation.id,
            status: reservation.status,
        });
        Ok(reservation)
    }

    /// Moves a reservation through the state machine.
    ///
    /// The sole writer of the `status` field. Approval re-reads the
    /// currently approved slot set inside the same database transaction,
    /// so a racing approval that already won turns this one into a
    /// `Conflict` failure with both reservations' statuses unchanged.
    pub async fn update_reservation_status(
        &self,
        reservation_id: Uuid,
        target: ReservationStatus,
        actor: &Actor,
    ) -> ResultEngine<Reservation> {
        let db_tx = self.database.begin().await?;

        let model = reservations::Entity::find_by_id(reservation_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("reservation not exists".to_string()))?;
        let current = ReservationStatus::try_from(model.status.as_str())?;
        authorize_transition(current, target, actor, &model.user_id)?;

        let own_slots = self.reservation_slots(&db_tx, reservation_id).await?;
        if target == ReservationStatus::Approved {
            self.check_approval_conflicts(&db_tx, reservation_id, &own_slots)
                .await?;
        }

        let update = reservations::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            status: ActiveValue::Set(target.as_str().to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let updated = update.update(&db_tx).await?;
        db_tx.commit().await?;

        tracing::info!(
            code = %updated.code,
            from = current.as_str(),
            to = target.as_str(),
            "reservation transitioned"
        );
        self.bus.publish(ReservationChange {
            reservation_id,
            status: target,
        });

        let mut reservation = Reservation::try_from(updated)?;
        reservation.slots = own_slots;
        Ok(reservation)
    }

    /// Updates the editable details of a `Pending` reservation.
    ///
    /// Only the owning requester may edit, and only while `Pending`.
    pub async fn update_reservation_details(
        &self,
        reservation_id: Uuid,
        patch: ReservationPatch,
        actor: &Actor,
    ) -> ResultEngine<Reservation> {
        let db_tx = self.database.begin().await?;

        let model = reservations::Entity::find_by_id(reservation_id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("reservation not exists".to_string()))?;
        let current = ReservationStatus::try_from(model.status.as_str())?;
        if current != ReservationStatus::Pending {
            return Err(EngineError::IllegalState(format!(
                "details can only change while Pending, not {}",
                current.as_str()
            )));
        }
        if actor.user_id != model.user_id {
            return Err(EngineError::Forbidden(
                "only the owning requester may edit details".to_string(),
            ));
        }

        let mut reservation = Reservation::try_from(model)?;
        if let Some(purpose) = patch.purpose {
            reservation.purpose = purpose;
        }
        if let Some(advisor) = patch.advisor {
            let advisor = normalize_optional(advisor.as_deref());
            if advisor.is_none() && actor.role != Role::Instructor {
                return Err(EngineError::Validation("advisor".to_string()));
            }
            reservation.advisor = advisor;
        }
        if let Some(remarks) = patch.remarks {
            let remarks = remarks.trim().to_string();
            if remarks.is_empty() || remarks.chars().count() > REMARKS_MAX_CHARS {
                return Err(EngineError::Validation("remarks".to_string()));
            }
            reservation.remarks = remarks;
        }
        if let Some(participants) = patch.participants {
            reservation.participants = filter_blanks(&participants);
        }
        if let Some(equipments) = patch.equipments {
            reservation.equipments = filter_blanks(&equipments);
        }
        reservation.updated_at = Utc::now();

        let mut update = reservations::ActiveModel::from(&reservation);
        update.created_at = ActiveValue::NotSet;
        update.status = ActiveValue::NotSet;
        update.update(&db_tx).await?;
        db_tx.commit().await?;

        self.bus.publish(ReservationChange {
            reservation_id,
            status: reservation.status,
        });

        reservation.slots = self.reservation_slots(&self.database, reservation_id).await?;
        Ok(reservation)
    }

    /// Fetches one reservation with its slots.
    pub async fn reservation(&self, reservation_id: Uuid) -> ResultEngine<Reservation> {
        let model = reservations::Entity::find_by_id(reservation_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("reservation not exists".to_string()))?;
        let mut reservation = Reservation::try_from(model)?;
        reservation.slots = self.reservation_slots(&self.database, reservation_id).await?;
        Ok(reservation)
    }

    /// Lists reservations with embedded slots.
    ///
    /// Returns the requested page (0-based) and the total page count.
    pub async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> ResultEngine<(Vec<Reservation>, u64)> {
        let mut query = reservations::Entity::find();

        if let Some(owner) = &filter.owner {
            query = query.filter(reservations::Column::UserId.eq(owner.clone()));
        }
        if let Some(status) = filter.status {
            query = query.filter(reservations::Column::Status.eq(status.as_str()));
        }
        if let Some(code) = &filter.code {
            query = query.filter(reservations::Column::Code.eq(code.clone()));
        }
        if let Some(name) = &filter.full_name_contains {
            query = query.filter(reservations::Column::FullName.contains(name));
        }

        let (sort, order) = filter
            .sort
            .unwrap_or((ReservationSort::CreatedAt, SortOrder::Desc));
        let column = match sort {
            ReservationSort::Id => reservations::Column::Id,
            ReservationSort::Code => reservations::Column::Code,
            ReservationSort::Status => reservations::Column::Status,
            ReservationSort::CreatedAt => reservations::Column::CreatedAt,
            ReservationSort::FullName => reservations::Column::FullName,
        };
        query = match order {
            SortOrder::Asc => query.order_by_asc(column),
            SortOrder::Desc => query.order_by_desc(column),
        };

        let page_size = filter.page_size.unwrap_or(10).max(1);
        let paginator = query.paginate(&self.database, page_size);
        let pages = paginator.num_pages().await?;
        let models = paginator.fetch_page(filter.page).await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let mut reservation = Reservation::try_from(model)?;
            reservation.slots = self
                .reservation_slots(&self.database, reservation.id)
                .await?;
            out.push(reservation);
        }
        Ok((out, pages))
    }

    /// Whether the interval is free on the room against every active
    /// (`Pending` or `Approved`) reservation. `Ok` means free; a taken
    /// interval surfaces as `Conflict` naming the holder.
    pub async fn check_availability(
        &self,
        room_id: Uuid,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> ResultEngine<()> {
        if end <= start {
            return Err(EngineError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
        let candidate = CandidateSlot {
            room_id,
            date,
            start,
            end,
        };
        let active = self
            .slots_with_status(
                &self.database,
                &[ReservationStatus::Pending, ReservationStatus::Approved],
                None,
            )
            .await?;
        match find_conflict(&candidate, &active) {
            None => Ok(()),
            Some(taken) => Err(EngineError::Conflict(format!(
                "room is taken on {} from {} to {}",
                taken.date, taken.start, taken.end
            ))),
        }
    }

    /// Raw occupied slots of one room over an inclusive date range,
    /// annotated with the reserving user. Feeds the calendar projection;
    /// terminal reservations do not occupy anything and are excluded.
    pub async fn room_schedule(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<ScheduleEvent>> {
        // Existence check first so an unknown room is not an empty week.
        self.room(room_id).await?;

        let rows: Vec<(slots::Model, Option<reservations::Model>)> = slots::Entity::find()
            .find_also_related(reservations::Entity)
            .filter(slots::Column::RoomId.eq(room_id.to_string()))
            .filter(slots::Column::Date.gte(from))
            .filter(slots::Column::Date.lte(to))
            .filter(reservations::Column::Status.is_in([
                ReservationStatus::Pending.as_str(),
                ReservationStatus::Approved.as_str(),
            ]))
            .order_by_asc(slots::Column::Date)
            .order_by_asc(slots::Column::StartMinute)
            .all(&self.database)
            .await?;

        let mut events = Vec::with_capacity(rows.len());
        for (slot_model, reservation_model) in rows {
            let Some(reservation_model) = reservation_model else {
                continue;
            };
            let slot = ScheduleSlot::try_from(slot_model)?;
            events.push(ScheduleEvent {
                slot_id: slot.id,
                reservation_id: slot.reservation_id,
                room_id: slot.room_id,
                date: slot.date,
                start: slot.start,
                end: slot.end,
                remarks: reservation_model.remarks.clone(),
                owner_id: reservation_model.user_id.clone(),
                owner_role: Role::try_from(reservation_model.user_role.as_str())?,
            });
        }
        Ok(events)
    }

    // ── Statistics ──────────────────────────────────────────────────────

    /// Total approved hours per room, every room included.
    pub async fn room_usage(&self) -> ResultEngine<Vec<RoomUsage>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT rooms.id AS room_id, rooms.name AS room_name, \
             COALESCE(SUM(CASE WHEN reservations.status = ? \
                 THEN schedule_slots.end_minute - schedule_slots.start_minute \
                 ELSE 0 END), 0) AS total_minutes \
             FROM rooms \
             LEFT JOIN schedule_slots ON schedule_slots.room_id = rooms.id \
             LEFT JOIN reservations ON reservations.id = schedule_slots.reservation_id \
             GROUP BY rooms.id, rooms.name \
             ORDER BY rooms.name",
            vec![ReservationStatus::Approved.as_str().into()],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let room_id: String = row.try_get("", "room_id")?;
            let room_name: String = row.try_get("", "room_name")?;
            let total_minutes: i64 = row.try_get("", "total_minutes")?;
            out.push(RoomUsage {
                room_id: Uuid::parse_str(&room_id)
                    .map_err(|_| EngineError::KeyNotFound("room not exists".to_string()))?,
                room_name,
                total_hours: total_minutes as f64 / 60.0,
            });
        }
        Ok(out)
    }

    /// Approved hours per (room, purpose), rooms without usage omitted.
    pub async fn usage_by_purpose(&self) -> ResultEngine<Vec<UsageByPurpose>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT rooms.id AS room_id, rooms.name AS room_name, \
             reservations.purpose AS purpose, \
             SUM(schedule_slots.end_minute - schedule_slots.start_minute) AS total_minutes \
             FROM schedule_slots \
             INNER JOIN rooms ON rooms.id = schedule_slots.room_id \
             INNER JOIN reservations ON reservations.id = schedule_slots.reservation_id \
             WHERE reservations.status = ? \
             GROUP BY rooms.id, rooms.name, reservations.purpose \
             ORDER BY rooms.name, reservations.purpose",
            vec![ReservationStatus::Approved.as_str().into()],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let room_id: String = row.try_get("", "room_id")?;
            let room_name: String = row.try_get("", "room_name")?;
            let purpose: String = row.try_get("", "purpose")?;
            let total_minutes: i64 = row.try_get("", "total_minutes")?;
            out.push(UsageByPurpose {
                room_id: Uuid::parse_str(&room_id)
                    .map_err(|_| EngineError::KeyNotFound("room not exists".to_string()))?,
                room_name,
                purpose: Purpose::try_from(purpose.as_str())?,
                total_hours: total_minutes as f64 / 60.0,
            });
        }
        Ok(out)
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn reservation_slots<C: ConnectionTrait>(
        &self,
        conn: &C,
        reservation_id: Uuid,
    ) -> ResultEngine<Vec<ScheduleSlot>> {
        let models = slots::Entity::find()
            .filter(slots::Column::ReservationId.eq(reservation_id.to_string()))
            .order_by_asc(slots::Column::Date)
            .order_by_asc(slots::Column::StartMinute)
            .all(conn)
            .await?;
        models.into_iter().map(ScheduleSlot::try_from).collect()
    }

    async fn slots_with_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        statuses: &[ReservationStatus],
        exclude_reservation: Option<Uuid>,
    ) -> ResultEngine<Vec<ScheduleSlot>> {
        let mut query = slots::Entity::find()
            .join(JoinType::InnerJoin, slots::Relation::Reservations.def())
            .filter(
                reservations::Column::Status
                    .is_in(statuses.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
            );
        if let Some(excluded) = exclude_reservation {
            query = query.filter(slots::Column::ReservationId.ne(excluded.to_string()));
        }
        let models = query.all(conn).await?;
        models.into_iter().map(ScheduleSlot::try_from).collect()
    }

    /// Fresh conflict check against every currently approved booking.
    async fn check_approval_conflicts(
        &self,
        db_tx: &DatabaseTransaction,
        reservation_id: Uuid,
        own_slots: &[ScheduleSlot],
    ) -> ResultEngine<()> {
        let approved = self
            .slots_with_status(db_tx, &[ReservationStatus::Approved], Some(reservation_id))
            .await?;

        for slot in own_slots {
            let candidate = CandidateSlot::from(slot);
            if let Some(taken) = find_conflict(&candidate, &approved) {
                return Err(EngineError::Conflict(format!(
                    "an approved booking already holds the room on {} from {} to {}",
                    taken.date, taken.start, taken.end
                )));
            }
        }
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            bus: ChangeBus::new(),
        }
    }
}

fn reservation_code(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("RSV-{}", hex[..8].to_uppercase())
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn filter_blanks(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_create(cmd: &CreateReservation) -> ResultEngine<(TimeOfDay, TimeOfDay)> {
    if cmd.room_ids.is_empty() {
        return Err(EngineError::Validation("room_ids".to_string()));
    }
    if cmd.dates.is_empty() {
        return Err(EngineError::Validation("dates".to_string()));
    }
    if cmd.start_time.trim().is_empty() {
        return Err(EngineError::Validation("start_time".to_string()));
    }
    if cmd.end_time.trim().is_empty() {
        return Err(EngineError::Validation("end_time".to_string()));
    }
    let remarks = cmd.remarks.trim();
    if remarks.is_empty() || remarks.chars().count() > REMARKS_MAX_CHARS {
        return Err(EngineError::Validation("remarks".to_string()));
    }
    if cmd.requester.role != Role::Instructor
        && normalize_optional(cmd.advisor.as_deref()).is_none()
    {
        return Err(EngineError::Validation("advisor".to_string()));
    }

    let start = TimeOfDay::parse(&cmd.start_time)?;
    let end = TimeOfDay::parse(&cmd.end_time)?;
    if duration_hours(start, end) <= 0.0 {
        return Err(EngineError::Validation(
            "time range: end must be after start".to_string(),
        ));
    }
    if start < OPENING || end > CLOSING {
        return Err(EngineError::Validation(format!(
            "time range: outside operating hours {OPENING}\u{2013}{CLOSING}"
        )));
    }
    if !start.is_half_hour_aligned() || !end.is_half_hour_aligned() {
        return Err(EngineError::Validation(
            "time range: times must align to half-hour steps".to_string(),
        ));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateReservation {
        CreateReservation {
            requester: Actor {
                user_id: "alice".to_string(),
                role: Role::Student,
            },
            full_name: "Alice Reyes".to_string(),
            room_ids: vec![Uuid::new_v4()],
            purpose: Purpose::Thesis,
            dates: vec![NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()],
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            advisor: Some("Josephine Dela Cruz".to_string()),
            remarks: "CS 311".to_string(),
            participants: vec![],
            equipments: vec![],
        }
    }

    #[test]
    fn required_fields_are_checked_before_times() {
        let mut cmd = command();
        cmd.room_ids.clear();
        cmd.start_time = "nonsense".to_string();
        // The missing field wins over the broken time label.
        assert_eq!(
            validate_create(&cmd).unwrap_err(),
            EngineError::Validation("room_ids".to_string())
        );
    }

    #[test]
    fn advisor_is_required_unless_instructor() {
        let mut cmd = command();
        cmd.advisor = None;
        assert_eq!(
            validate_create(&cmd).unwrap_err(),
            EngineError::Validation("advisor".to_string())
        );

        cmd.requester.role = Role::Instructor;
        assert!(validate_create(&cmd).is_ok());
    }

    #[test]
    fn rejects_non_positive_duration() {
        let mut cmd = command();
        cmd.end_time = "09:00".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(EngineError::Validation(_))
        ));

        cmd.end_time = "08:30".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn rejects_times_outside_operating_hours() {
        let mut cmd = command();
        cmd.start_time = "07:00".to_string();
        cmd.end_time = "08:00".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(EngineError::Validation(_))
        ));

        let mut cmd = command();
        cmd.start_time = "17:00".to_string();
        cmd.end_time = "18:00".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unaligned_times() {
        let mut cmd = command();
        cmd.start_time = "09:10".to_string();
        cmd.end_time = "10:00".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn rejects_overlong_remarks() {
        let mut cmd = command();
        cmd.remarks = "x".repeat(REMARKS_MAX_CHARS + 1);
        assert_eq!(
            validate_create(&cmd).unwrap_err(),
            EngineError::Validation("remarks".to_string())
        );
    }

    #[test]
    fn malformed_time_label_is_a_parse_error() {
        let mut cmd = command();
        cmd.start_time = "9:99".to_string();
        assert!(matches!(validate_create(&cmd), Err(EngineError::Parse(_))));
    }

    #[test]
    fn reservation_codes_are_prefixed_and_short() {
        let code = reservation_code(Uuid::new_v4());
        assert!(code.starts_with("RSV-"));
        assert_eq!(code.len(), 12);
    }

    #[test]
    fn blank_participants_are_filtered() {
        let filtered = filter_blanks(&[
            "Bea".to_string(),
            "  ".to_string(),
            String::new(),
            "Carlos".to_string(),
        ]);
        assert_eq!(filtered, vec!["Bea".to_string(), "Carlos".to_string()]);
    }
}
