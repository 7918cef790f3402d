use crate::types::{Booking, Salon, Selection, TimeOfDay};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::HashMap;
use thiserror::Error;

/// Candidate start times are evaluated on a fixed 30-minute grid.
pub const SLOT_STEP_MINUTES: u32 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Selection \"{service}\" has no staff member assigned")]
    InvalidSelection { service: String },
}

/// Everything the engine needs, pre-fetched by the caller. The engine does
/// no I/O and never reads the wall clock; `now` is injected so that the
/// whole computation is deterministic.
#[derive(Debug)]
pub struct AvailabilityQuery<'a> {
    pub selections: &'a [Selection],
    pub date: NaiveDate,
    pub salon: &'a Salon,
    pub bookings: &'a [Booking],
    /// Current date and time in the salon's local timezone. Only used to
    /// reject past slots when `date` is the current date.
    pub now: NaiveDateTime,
}

/// Computes the start times at which every selection can be served by its
/// assigned staff member, all anchored to the same start time.
///
/// Returns an ascending list of feasible starts. An empty list means "no
/// availability" and is a valid outcome; the only error is a selection
/// without a staff assignment. Missing or closed schedule entries degrade
/// to "no availability" instead of failing.
///
/// Selections sharing a staff member are conflict-checked as one combined
/// block starting at the candidate time, and the scan's upper bound uses the
/// sum of all selection durations. Both are deliberate policies of the
/// booking flow, not derived facts; see DESIGN.md.
pub fn available_start_times(
    query: &AvailabilityQuery,
) -> Result<Vec<TimeOfDay>, AvailabilityError> {
    // Per-staff combined workload. Two selections on the same staff member
    // occupy a single block at the candidate start.
    let mut workloads: HashMap<&str, u32> = HashMap::new();
    for selection in query.selections {
        let staff_name =
            selection
                .staff_name
                .as_deref()
                .ok_or_else(|| AvailabilityError::InvalidSelection {
                    service: selection.service.clone(),
                })?;
        *workloads.entry(staff_name).or_insert(0) += u32::from(selection.duration_minutes);
    }
    if workloads.is_empty() {
        return Ok(vec![]);
    }

    let weekday = query.date.weekday();
    if query.salon.weekly_schedule.open_hours(weekday).is_none()
        || query.salon.holidays.contains(&query.date)
    {
        return Ok(vec![]);
    }

    // Resolve each involved staff member's working window. Any staff member
    // who is unknown, off that weekday or on holiday rules out every
    // candidate, so we can stop early with an empty result.
    let mut windows: Vec<(&str, u32, u32, u32)> = Vec::with_capacity(workloads.len());
    for (&staff_name, &workload) in &workloads {
        let Some(staff) = query.salon.staff_member(staff_name) else {
            return Ok(vec![]);
        };
        if staff.holidays.contains(&query.date) {
            return Ok(vec![]);
        }
        let Some(hours) = staff.weekly_schedule.open_hours(weekday) else {
            return Ok(vec![]);
        };
        windows.push((
            staff_name,
            u32::from(hours.start.minutes()),
            u32::from(hours.end.minutes()),
            workload,
        ));
    }

    // Union bound across all involved staff, used only to limit the scan;
    // the per-staff windows are re-checked for every candidate.
    let outer_start = windows.iter().map(|&(_, start, _, _)| start).min().unwrap_or(0);
    let outer_end = windows.iter().map(|&(_, _, end, _)| end).max().unwrap_or(0);
    let total_duration: u32 = workloads.values().sum();

    let now_minutes = query.now.hour() * 60 + query.now.minute();
    let today = query.date == query.now.date();

    let mut slots = vec![];
    let mut candidate = outer_start;
    while candidate + total_duration <= outer_end {
        if (!today || candidate >= now_minutes) && fits_all(candidate, &windows, query) {
            slots.push(TimeOfDay(candidate as u16));
        }
        candidate += SLOT_STEP_MINUTES;
    }
    Ok(slots)
}

/// True when every involved staff member can absorb their combined workload
/// at `candidate` without leaving their window or touching an existing
/// booking.
fn fits_all(candidate: u32, windows: &[(&str, u32, u32, u32)], query: &AvailabilityQuery) -> bool {
    windows.iter().all(|&(staff_name, start, end, workload)| {
        if candidate < start || candidate + workload > end {
            return false;
        }
        query
            .bookings
            .iter()
            .filter(|booking| {
                booking.staff_name == staff_name
                    && booking.date == query.date
                    && booking.salon_id == query.salon.id
            })
            .all(|booking| {
                let booked_start = u32::from(booking.start.minutes());
                let booked_end = booking.end();
                // Half-open overlap test on [candidate, candidate + workload)
                !(candidate < booked_end && candidate + workload > booked_start)
            })
    })
}
