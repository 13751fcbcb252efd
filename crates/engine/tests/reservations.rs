use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    Actor, CreateReservation, Engine, EngineError, Purpose, ReservationFilter, ReservationStatus,
    Role, Room, RoomStatus, TimeOfDay,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, full_name, role) in [
        ("alice", "Alice Reyes", "Student"),
        ("bob", "Roberto Garcia", "Instructor"),
        ("admin", "Dana Cruz", "Admin"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, full_name, role) VALUES (?, ?, ?, ?)",
            vec![username.into(), "password".into(), full_name.into(), role.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

async fn setup_with_room() -> (Engine, DatabaseConnection, Room) {
    let (engine, db) = engine_with_db().await;
    let room = engine.new_room("Room 5", "Main Lab", 30).await.unwrap();
    (engine, db, room)
}

fn student() -> Actor {
    Actor {
        user_id: "alice".to_string(),
        role: Role::Student,
    }
}

fn instructor() -> Actor {
    Actor {
        user_id: "bob".to_string(),
        role: Role::Instructor,
    }
}

fn admin() -> Actor {
    Actor {
        user_id: "admin".to_string(),
        role: Role::Admin,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
}

fn booking(requester: Actor, room_id: Uuid, start: &str, end: &str) -> CreateReservation {
    let advisor = match requester.role {
        Role::Instructor => None,
        _ => Some("Josephine Dela Cruz".to_string()),
    };
    let full_name = match requester.user_id.as_str() {
        "alice" => "Alice Reyes",
        "bob" => "Roberto Garcia",
        _ => "Dana Cruz",
    }
    .to_string();
    CreateReservation {
        requester,
        full_name,
        room_ids: vec![room_id],
        purpose: Purpose::Thesis,
        dates: vec![date()],
        start_time: start.to_string(),
        end_time: end.to_string(),
        advisor,
        remarks: "CS 311 defense".to_string(),
        participants: vec!["Bea".to_string()],
        equipments: vec!["Projector".to_string()],
    }
}

#[tokio::test]
async fn create_persists_pending_reservation_with_slots() {
    let (engine, _db, room) = setup_with_room().await;

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:30"))
        .await
        .unwrap();

    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert!(reservation.code.starts_with("RSV-"));
    assert_eq!(reservation.slots.len(), 1);
    assert_eq!(reservation.slots[0].room_id, room.id);

    let fetched = engine.reservation(reservation.id).await.unwrap();
    assert_eq!(fetched.slots.len(), 1);
    assert_eq!(fetched.purpose, Purpose::Thesis);
    assert_eq!(fetched.participants, vec!["Bea".to_string()]);
}

#[tokio::test]
async fn overlapping_pending_requests_coexist() {
    let (engine, _db, room) = setup_with_room().await;

    let first = engine
        .create_reservation(booking(student(), room.id, "09:00", "11:00"))
        .await
        .unwrap();
    // A competing request for the same interval is accepted as Pending;
    // the race is settled at approval time.
    let second = engine
        .create_reservation(booking(instructor(), room.id, "10:00", "12:00"))
        .await
        .unwrap();

    assert_eq!(first.status, ReservationStatus::Pending);
    assert_eq!(second.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn approval_race_is_settled_by_the_first_approval() {
    let (engine, _db, room) = setup_with_room().await;

    let first = engine
        .create_reservation(booking(student(), room.id, "09:00", "11:00"))
        .await
        .unwrap();
    let second = engine
        .create_reservation(booking(instructor(), room.id, "10:00", "12:00"))
        .await
        .unwrap();

    let approved = engine
        .update_reservation_status(first.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
    assert_eq!(approved.status, ReservationStatus::Approved);

    let err = engine
        .update_reservation_status(second.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // The loser is still Pending and can be denied instead.
    let loser = engine.reservation(second.id).await.unwrap();
    assert_eq!(loser.status, ReservationStatus::Pending);
    engine
        .update_reservation_status(second.id, ReservationStatus::Denied, &admin())
        .await
        .unwrap();
}

#[tokio::test]
async fn adjacent_approvals_do_not_conflict() {
    let (engine, _db, room) = setup_with_room().await;

    let morning = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:30"))
        .await
        .unwrap();
    let afternoon = engine
        .create_reservation(booking(instructor(), room.id, "10:30", "12:00"))
        .await
        .unwrap();

    engine
        .update_reservation_status(morning.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
    engine
        .update_reservation_status(afternoon.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
}

#[tokio::test]
async fn cancellation_frees_the_interval() {
    let (engine, _db, room) = setup_with_room().await;
    let start = TimeOfDay::parse("09:00").unwrap();
    let end = TimeOfDay::parse("10:30").unwrap();

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:30"))
        .await
        .unwrap();
    assert!(matches!(
        engine.check_availability(room.id, date(), start, end).await,
        Err(EngineError::Conflict(_))
    ));

    engine
        .update_reservation_status(reservation.id, ReservationStatus::Cancelled, &student())
        .await
        .unwrap();
    engine
        .check_availability(room.id, date(), start, end)
        .await
        .unwrap();
}

#[tokio::test]
async fn transition_authority_is_enforced() {
    let (engine, _db, room) = setup_with_room().await;

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();

    // An owner cannot approve their own request.
    assert!(matches!(
        engine
            .update_reservation_status(reservation.id, ReservationStatus::Approved, &student())
            .await,
        Err(EngineError::Forbidden(_))
    ));
    // An admin cannot cancel on the owner's behalf.
    assert!(matches!(
        engine
            .update_reservation_status(reservation.id, ReservationStatus::Cancelled, &admin())
            .await,
        Err(EngineError::Forbidden(_))
    ));

    engine
        .update_reservation_status(reservation.id, ReservationStatus::Denied, &admin())
        .await
        .unwrap();

    // Denied is terminal, even for an admin.
    assert!(matches!(
        engine
            .update_reservation_status(reservation.id, ReservationStatus::Pending, &admin())
            .await,
        Err(EngineError::IllegalState(_))
    ));
}

#[tokio::test]
async fn owner_closes_an_approved_reservation() {
    let (engine, _db, room) = setup_with_room().await;

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();
    engine
        .update_reservation_status(reservation.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
    let closed = engine
        .update_reservation_status(reservation.id, ReservationStatus::Closed, &student())
        .await
        .unwrap();
    assert_eq!(closed.status, ReservationStatus::Closed);

    // Closed slots no longer occupy the room.
    engine
        .check_availability(
            room.id,
            date(),
            TimeOfDay::parse("09:00").unwrap(),
            TimeOfDay::parse("10:00").unwrap(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn details_update_is_owner_only_and_pending_only() {
    let (engine, _db, room) = setup_with_room().await;

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();

    let patch = engine::ReservationPatch {
        remarks: Some("Updated remarks".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        engine
            .update_reservation_details(reservation.id, patch.clone(), &instructor())
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let updated = engine
        .update_reservation_details(reservation.id, patch.clone(), &student())
        .await
        .unwrap();
    assert_eq!(updated.remarks, "Updated remarks");

    engine
        .update_reservation_status(reservation.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
    assert!(matches!(
        engine
            .update_reservation_details(reservation.id, patch, &student())
            .await,
        Err(EngineError::IllegalState(_))
    ));
}

#[tokio::test]
async fn student_cannot_drop_the_advisor() {
    let (engine, _db, room) = setup_with_room().await;

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();

    let patch = engine::ReservationPatch {
        advisor: Some(None),
        ..Default::default()
    };
    assert_eq!(
        engine
            .update_reservation_details(reservation.id, patch, &student())
            .await
            .unwrap_err(),
        EngineError::Validation("advisor".to_string())
    );
}

#[tokio::test]
async fn unavailable_room_rejects_new_bookings() {
    let (engine, _db, room) = setup_with_room().await;

    let existing = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();

    engine
        .set_room_status(room.id, RoomStatus::Unavailable)
        .await
        .unwrap();

    assert!(matches!(
        engine
            .create_reservation(booking(instructor(), room.id, "13:00", "14:00"))
            .await,
        Err(EngineError::Validation(_))
    ));

    // Existing reservations are untouched by the flip.
    let untouched = engine.reservation(existing.id).await.unwrap();
    assert_eq!(untouched.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn unknown_ids_report_key_not_found() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.reservation(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.room(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .update_reservation_status(Uuid::new_v4(), ReservationStatus::Approved, &admin())
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn list_filters_by_owner_and_status() {
    let (engine, _db, room) = setup_with_room().await;

    let mine = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();
    let theirs = engine
        .create_reservation(booking(instructor(), room.id, "13:00", "14:00"))
        .await
        .unwrap();
    engine
        .update_reservation_status(theirs.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();

    let filter = ReservationFilter {
        owner: Some("alice".to_string()),
        ..Default::default()
    };
    let (rows, _pages) = engine.list_reservations(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, mine.id);
    assert_eq!(rows[0].slots.len(), 1);

    let filter = ReservationFilter {
        status: Some(ReservationStatus::Approved),
        ..Default::default()
    };
    let (rows, _pages) = engine.list_reservations(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, theirs.id);

    let filter = ReservationFilter {
        full_name_contains: Some("Reyes".to_string()),
        ..Default::default()
    };
    let (rows, _pages) = engine.list_reservations(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_name, "Alice Reyes");
}

#[tokio::test]
async fn list_paginates() {
    let (engine, _db, room) = setup_with_room().await;

    for hour in ["08:00", "09:00", "10:00", "11:00", "13:00"] {
        let end = format!("{}:30", &hour[..2]);
        engine
            .create_reservation(booking(student(), room.id, hour, &end))
            .await
            .unwrap();
    }

    let filter = ReservationFilter {
        page_size: Some(2),
        ..Default::default()
    };
    let (rows, pages) = engine.list_reservations(&filter).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(pages, 3);

    let filter = ReservationFilter {
        page: 2,
        page_size: Some(2),
        ..Default::default()
    };
    let (rows, _pages) = engine.list_reservations(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn room_schedule_excludes_terminal_reservations() {
    let (engine, _db, room) = setup_with_room().await;

    let kept = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();
    let dropped = engine
        .create_reservation(booking(instructor(), room.id, "13:00", "14:00"))
        .await
        .unwrap();
    engine
        .update_reservation_status(dropped.id, ReservationStatus::Cancelled, &instructor())
        .await
        .unwrap();

    let events = engine.room_schedule(room.id, date(), date()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reservation_id, kept.id);
    assert_eq!(events[0].owner_id, "alice");
    assert_eq!(events[0].owner_role, Role::Student);
    assert_eq!(events[0].remarks, "CS 311 defense");

    // Out-of-range dates return nothing.
    let next_week = date() + chrono::Days::new(7);
    let events = engine
        .room_schedule(room.id, next_week, next_week)
        .await
        .unwrap();
    assert!(events.is_empty());

    assert!(matches!(
        engine.room_schedule(Uuid::new_v4(), date(), date()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn change_feed_sees_creations_and_transitions() {
    let (engine, _db, room) = setup_with_room().await;
    let mut feed = engine.subscribe();

    let reservation = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:00"))
        .await
        .unwrap();
    let change = feed.recv().await.unwrap();
    assert_eq!(change.reservation_id, reservation.id);
    assert_eq!(change.status, ReservationStatus::Pending);

    engine
        .update_reservation_status(reservation.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();
    let change = feed.recv().await.unwrap();
    assert_eq!(change.status, ReservationStatus::Approved);
}

#[tokio::test]
async fn usage_counts_only_approved_hours() {
    let (engine, _db, room) = setup_with_room().await;
    let other = engine.new_room("Room 7", "Annex", 20).await.unwrap();

    let approved = engine
        .create_reservation(booking(student(), room.id, "09:00", "10:30"))
        .await
        .unwrap();
    engine
        .update_reservation_status(approved.id, ReservationStatus::Approved, &admin())
        .await
        .unwrap();

    // Pending hours do not count.
    engine
        .create_reservation(booking(instructor(), room.id, "13:00", "15:00"))
        .await
        .unwrap();

    let usage = engine.room_usage().await.unwrap();
    assert_eq!(usage.len(), 2);
    let by_id = |id| usage.iter().find(|u| u.room_id == id).unwrap();
    assert_eq!(by_id(room.id).total_hours, 1.5);
    assert_eq!(by_id(other.id).total_hours, 0.0);

    let by_purpose = engine.usage_by_purpose().await.unwrap();
    assert_eq!(by_purpose.len(), 1);
    assert_eq!(by_purpose[0].room_id, room.id);
    assert_eq!(by_purpose[0].purpose, Purpose::Thesis);
    assert_eq!(by_purpose[0].total_hours, 1.5);
}

#[tokio::test]
async fn multi_room_multi_date_booking_expands_to_all_slots() {
    let (engine, _db, room) = setup_with_room().await;
    let other = engine.new_room("Room 7", "Annex", 20).await.unwrap();

    let mut cmd = booking(student(), room.id, "09:00", "10:00");
    cmd.room_ids = vec![room.id, other.id];
    cmd.dates = vec![date(), date() + chrono::Days::new(1)];

    let reservation = engine.create_reservation(cmd).await.unwrap();
    assert_eq!(reservation.slots.len(), 4);
    assert_eq!(reservation.room_ids().len(), 2);

    // The same room listed twice would overlap itself.
    let mut cmd = booking(instructor(), room.id, "13:00", "14:00");
    cmd.room_ids = vec![other.id, other.id];
    assert!(matches!(
        engine.create_reservation(cmd).await,
        Err(EngineError::Conflict(_))
    ));
}
