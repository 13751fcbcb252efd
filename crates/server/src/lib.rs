use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod calendar;
mod reservations;
mod rooms;
mod server;
mod statistics;
mod user;

pub mod types {
    pub mod reservation {
        pub use api_types::reservation::{
            ReservationEdit, ReservationListQuery, ReservationNew, ReservationPage,
            ReservationView, SlotView, StatusUpdate,
        };
    }

    pub mod room {
        pub use api_types::room::{
            Availability, AvailabilityQuery, RoomNew, RoomStatusUpdate, RoomView,
        };
    }

    pub mod calendar {
        pub use api_types::calendar::{BlockView, CalendarQuery, CalendarView, WeekOptionView};
    }

    pub mod stats {
        pub use api_types::stats::{PurposeUsageView, RoomUsageView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) | EngineError::IllegalState(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
