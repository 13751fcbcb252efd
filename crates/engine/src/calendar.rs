//! Week-view calendar projection.
//!
//! Turns the schedule slots of one room/week into a renderable layout
//! (grid column, vertical offset, block height, color bucket) without
//! knowing anything about pixels beyond a configurable row height. Pure
//! and synchronous over already-fetched data.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    reservations::Role,
    time::{self, TimeOfDay},
};

/// Displayed hour window of the grid, e.g. 7.0 to 18.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalendarWindow {
    pub start_hour: f64,
    pub end_hour: f64,
}

/// A slot annotated with its reserving user, as fed to the projection
/// and returned by the room-schedule query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub slot_id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub remarks: String,
    pub owner_id: String,
    pub owner_role: Role,
}

/// Color assignment for a block. Ownership wins over role so a viewer
/// always spots their own bookings first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    Mine,
    Admin,
    Instructor,
    Other,
}

fn bucket_for(event: &ScheduleEvent, viewer_id: &str) -> ColorBucket {
    if event.owner_id == viewer_id {
        return ColorBucket::Mine;
    }
    match event.owner_role {
        Role::Admin => ColorBucket::Admin,
        Role::Instructor => ColorBucket::Instructor,
        Role::Student => ColorBucket::Other,
    }
}

/// A positioned block in the week grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarBlock {
    pub slot_id: Uuid,
    pub reservation_id: Uuid,
    /// Grid column, Sunday = 0.
    pub day: u32,
    /// Offset from the top of the grid, in row-height units scaled by
    /// `(hours from window start) * 2`.
    pub top: f64,
    pub height: f64,
    pub bucket: ColorBucket,
    pub remarks: String,
    pub start_label: String,
    pub end_label: String,
}

/// Projects one week of events onto the grid.
///
/// Events outside the displayed week, or fully outside the hour window,
/// are dropped rather than clipped. Overlapping blocks are emitted as-is;
/// only one overlapping reservation can ever reach `Approved`, so no
/// side-by-side resolution is done.
pub fn project_week(
    window: CalendarWindow,
    row_height: f64,
    viewer_id: &str,
    week_start: NaiveDate,
    events: &[ScheduleEvent],
) -> Vec<CalendarBlock> {
    let week_end = week_start + Days::new(7);

    events
        .iter()
        .filter(|event| event.date >= week_start && event.date < week_end)
        .filter(|event| {
            event.start.decimal_hours() < window.end_hour
                && event.end.decimal_hours() > window.start_hour
        })
        .map(|event| CalendarBlock {
            slot_id: event.slot_id,
            reservation_id: event.reservation_id,
            day: time::day_index_of(event.date),
            top: (event.start.decimal_hours() - window.start_hour) * 2.0 * row_height,
            height: time::duration_hours(event.start, event.end) * 2.0 * row_height,
            bucket: bucket_for(event, viewer_id),
            remarks: event.remarks.clone(),
            start_label: event.start.format_12h(),
            end_label: event.end.format_12h(),
        })
        .collect()
}

/// A selectable week in the week dropdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekOption {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// e.g. `November 17 - November 23, 2025`.
    pub label: String,
    pub offset: i64,
}

/// Sunday that starts the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(time::day_index_of(date)))
}

/// Seven week choices centered on the week containing `base`, three
/// weeks back through three weeks ahead.
pub fn week_options(base: NaiveDate) -> Vec<WeekOption> {
    let base_start = start_of_week(base);
    (-3..=3)
        .map(|offset: i64| {
            let start = if offset >= 0 {
                base_start + Days::new(offset as u64 * 7)
            } else {
                base_start - Days::new(offset.unsigned_abs() * 7)
            };
            let end = start + Days::new(6);
            let label = format!(
                "{} - {}",
                start.format("%B %-d"),
                end.format("%B %-d, %Y")
            );
            WeekOption {
                start,
                end,
                label,
                offset,
            }
        })
        .collect()
}
