//! Statistics API endpoints

use api_types::stats::{PurposeUsageView, RoomUsageView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

/// Handle requests for approved hours per room
pub async fn room_usage(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<RoomUsageView>>, ServerError> {
    user::require_admin(&user)?;

    let usage = state.engine.room_usage().await?;
    Ok(Json(
        usage
            .into_iter()
            .map(|row| RoomUsageView {
                room_id: row.room_id,
                room_name: row.room_name,
                total_hours: row.total_hours,
            })
            .collect(),
    ))
}

/// Handle requests for approved hours per room and purpose
pub async fn purpose_usage(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PurposeUsageView>>, ServerError> {
    user::require_admin(&user)?;

    let usage = state.engine.usage_by_purpose().await?;
    Ok(Json(
        usage
            .into_iter()
            .map(|row| PurposeUsageView {
                room_id: row.room_id,
                room_name: row.room_name,
                purpose: row.purpose.as_str().to_string(),
                total_hours: row.total_hours,
            })
            .collect(),
    ))
}
