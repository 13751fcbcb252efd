//! Room API endpoints

use api_types::room::{
    Availability, AvailabilityQuery, RoomNew, RoomStatusUpdate, RoomView, ScheduleEventView,
    ScheduleQuery,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{EngineError, Room, RoomStatus, TimeOfDay};

fn view(room: &Room) -> RoomView {
    RoomView {
        id: room.id,
        name: room.name.clone(),
        sub_room: room.sub_room.clone(),
        capacity: room.capacity,
        status: room.status.as_str().to_string(),
    }
}

/// Handle requests for listing rooms
pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<RoomView>>, ServerError> {
    let rooms = state.engine.rooms().await?;
    Ok(Json(rooms.iter().map(view).collect()))
}

/// Handle requests for registering a new room
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RoomNew>,
) -> Result<(StatusCode, Json<RoomView>), ServerError> {
    user::require_admin(&user)?;
    let room = state
        .engine
        .new_room(&payload.name, &payload.sub_room, payload.capacity)
        .await?;
    Ok((StatusCode::CREATED, Json(view(&room))))
}

/// Handle requests for flipping a room's operational status
pub async fn update_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoomStatusUpdate>,
) -> Result<Json<RoomView>, ServerError> {
    user::require_admin(&user)?;
    let status = RoomStatus::try_from(payload.status.as_str())?;
    let room = state.engine.set_room_status(id, status).await?;
    Ok(Json(view(&room)))
}

/// Handle requests for a room's occupied intervals over a date range
pub async fn schedule(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleEventView>>, ServerError> {
    let events = state.engine.room_schedule(id, query.from, query.to).await?;
    Ok(Json(
        events
            .into_iter()
            .map(|event| ScheduleEventView {
                slot_id: event.slot_id,
                reservation_id: event.reservation_id,
                date: event.date,
                start_time: event.start.to_string(),
                end_time: event.end.to_string(),
                remarks: event.remarks,
                owner_id: event.owner_id,
                owner_role: event.owner_role.as_str().to_string(),
            })
            .collect(),
    ))
}

/// Handle requests for probing whether an interval is free
pub async fn availability(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, ServerError> {
    let start = TimeOfDay::parse(&query.start_time)?;
    let end = TimeOfDay::parse(&query.end_time)?;

    match state
        .engine
        .check_availability(query.room_id, query.date, start, end)
        .await
    {
        Ok(()) => Ok(Json(Availability {
            available: true,
            reason: None,
        })),
        Err(EngineError::Conflict(reason)) => Ok(Json(Availability {
            available: false,
            reason: Some(reason),
        })),
        Err(other) => Err(other.into()),
    }
}
