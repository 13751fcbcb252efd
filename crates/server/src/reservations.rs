//! Reservation API endpoints

use api_types::reservation::{
    ReservationEdit, ReservationListQuery, ReservationNew, ReservationPage, ReservationView,
    SlotView, StatusUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{
    CreateReservation, Purpose, Reservation, ReservationFilter, ReservationPatch, ReservationSort,
    ReservationStatus, SortOrder,
};

pub fn view(reservation: &Reservation) -> ReservationView {
    ReservationView {
        id: reservation.id,
        code: reservation.code.clone(),
        user_id: reservation.user_id.clone(),
        full_name: reservation.full_name.clone(),
        role: reservation.role.as_str().to_string(),
        purpose: reservation.purpose.as_str().to_string(),
        advisor: reservation.advisor.clone(),
        remarks: reservation.remarks.clone(),
        participants: reservation.participants.clone(),
        equipments: reservation.equipments.clone(),
        status: reservation.status.as_str().to_string(),
        created_at: reservation.created_at,
        updated_at: reservation.updated_at,
        slots: reservation
            .slots
            .iter()
            .map(|slot| SlotView {
                id: slot.id,
                room_id: slot.room_id,
                date: slot.date,
                start_time: slot.start.to_string(),
                end_time: slot.end.to_string(),
            })
            .collect(),
    }
}

/// Handle requests for submitting a new reservation
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ReservationNew>,
) -> Result<(StatusCode, Json<ReservationView>), ServerError> {
    let requester = user::actor(&user)?;
    let purpose = Purpose::try_from(payload.purpose.as_str())?;

    let reservation = state
        .engine
        .create_reservation(CreateReservation {
            requester,
            full_name: user.full_name,
            room_ids: payload.room_ids,
            purpose,
            dates: payload.dates,
            start_time: payload.start_time,
            end_time: payload.end_time,
            advisor: payload.advisor,
            remarks: payload.remarks,
            participants: payload.participants,
            equipments: payload.equipments,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(&reservation))))
}

/// Handle requests for listing reservations
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<ReservationPage>, ServerError> {
    let status = query
        .status
        .as_deref()
        .map(ReservationStatus::try_from)
        .transpose()?;
    let sort = query
        .sort_by
        .as_deref()
        .map(parse_sort)
        .transpose()?
        .map(|column| (column, parse_order(query.order.as_deref())));

    let filter = ReservationFilter {
        owner: query.mine.then_some(user.username),
        status,
        code: query.code,
        full_name_contains: query.full_name,
        sort,
        page: query.page,
        page_size: query.page_size,
    };

    let (reservations, total_pages) = state.engine.list_reservations(&filter).await?;
    Ok(Json(ReservationPage {
        reservations: reservations.iter().map(view).collect(),
        page: filter.page,
        total_pages,
    }))
}

/// Handle requests for a single reservation
pub async fn get_detail(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, ServerError> {
    let reservation = state.engine.reservation(id).await?;
    Ok(Json(view(&reservation)))
}

/// Handle requests for a status transition
pub async fn update_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<ReservationView>, ServerError> {
    let actor = user::actor(&user)?;
    let target = ReservationStatus::try_from(payload.status.as_str())?;

    let reservation = state
        .engine
        .update_reservation_status(id, target, &actor)
        .await?;
    Ok(Json(view(&reservation)))
}

/// Handle requests for editing a pending reservation
pub async fn update_details(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReservationEdit>,
) -> Result<Json<ReservationView>, ServerError> {
    let actor = user::actor(&user)?;
    let purpose = payload
        .purpose
        .as_deref()
        .map(Purpose::try_from)
        .transpose()?;

    let patch = ReservationPatch {
        purpose,
        advisor: payload.advisor,
        remarks: payload.remarks,
        participants: payload.participants,
        equipments: payload.equipments,
    };

    let reservation = state
        .engine
        .update_reservation_details(id, patch, &actor)
        .await?;
    Ok(Json(view(&reservation)))
}

fn parse_sort(raw: &str) -> Result<ReservationSort, ServerError> {
    match raw {
        "id" => Ok(ReservationSort::Id),
        "code" => Ok(ReservationSort::Code),
        "status" => Ok(ReservationSort::Status),
        "created_at" => Ok(ReservationSort::CreatedAt),
        "full_name" => Ok(ReservationSort::FullName),
        other => Err(ServerError::Generic(format!("unknown sort column: {other}"))),
    }
}

fn parse_order(raw: Option<&str>) -> SortOrder {
    match raw {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}
