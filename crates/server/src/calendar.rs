//! Weekly calendar API endpoints

use api_types::calendar::{BlockView, CalendarQuery, CalendarView, WeekOptionView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Days;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{CalendarWindow, project_week, start_of_week, week_options};

/// Displayed hour window of the weekly grid.
const WINDOW: CalendarWindow = CalendarWindow {
    start_hour: 7.0,
    end_hour: 18.0,
};

/// Pixel height of one half-hour row.
const ROW_HEIGHT: f64 = 24.0;

/// Handle requests for one room's weekly calendar
pub async fn week_view(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, ServerError> {
    let week_start = start_of_week(query.date);
    let week_end = week_start + Days::new(6);

    let events = state
        .engine
        .room_schedule(room_id, week_start, week_end)
        .await?;
    let blocks = project_week(WINDOW, ROW_HEIGHT, &user.username, week_start, &events);

    Ok(Json(CalendarView {
        week_start,
        blocks: blocks
            .into_iter()
            .map(|block| BlockView {
                slot_id: block.slot_id,
                reservation_id: block.reservation_id,
                day: block.day,
                top: block.top,
                height: block.height,
                bucket: bucket_label(block.bucket).to_string(),
                remarks: block.remarks,
                start_label: block.start_label,
                end_label: block.end_label,
            })
            .collect(),
        week_options: week_options(query.date)
            .into_iter()
            .map(|option| WeekOptionView {
                start: option.start,
                label: option.label,
            })
            .collect(),
    }))
}

fn bucket_label(bucket: engine::ColorBucket) -> &'static str {
    match bucket {
        engine::ColorBucket::Mine => "mine",
        engine::ColorBucket::Admin => "admin",
        engine::ColorBucket::Instructor => "instructor",
        engine::ColorBucket::Other => "other",
    }
}
