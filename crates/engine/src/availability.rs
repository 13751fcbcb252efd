//! Availability and conflict math.
//!
//! All functions here are pure and synchronous; the engine fetches the
//! relevant slot set first and runs the interval checks over it. A
//! conflict is a half-open interval overlap on the same room and date:
//! `[a.start, a.end)` overlaps `[b.start, b.end)` iff
//! `a.start < b.end && b.start < a.end`. Adjacent bookings
//! (`a.end == b.start`) never conflict.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{slots::ScheduleSlot, time::TimeOfDay};

/// A candidate interval not yet tied to a reservation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateSlot {
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl From<&ScheduleSlot> for CandidateSlot {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            room_id: slot.room_id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
        }
    }
}

/// Half-open overlap on the same room and date.
pub fn conflicts(a: &CandidateSlot, b: &CandidateSlot) -> bool {
    a.room_id == b.room_id && a.date == b.date && a.start < b.end && b.start < a.end
}

/// First existing slot the candidate collides with, if any.
pub fn find_conflict<'a>(
    candidate: &CandidateSlot,
    existing: &'a [ScheduleSlot],
) -> Option<&'a ScheduleSlot> {
    existing
        .iter()
        .find(|slot| conflicts(candidate, &CandidateSlot::from(*slot)))
}

/// Whether any pair within the candidate set collides with itself.
///
/// Used at creation time: a single command may fan out to several
/// (room, date) slots and must not double-book against itself.
pub fn self_conflict(candidates: &[CandidateSlot]) -> Option<(usize, usize)> {
    for (i, a) in candidates.iter().enumerate() {
        for (j, b) in candidates.iter().enumerate().skip(i + 1) {
            if conflicts(a, b) {
                return Some((i, j));
            }
        }
    }
    None
}
