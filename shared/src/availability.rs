//! Slot availability engine
//!
//! Availability is derived on every read from the bookings that currently
//! block a slot (`pending` or `confirmed`). Nothing on the turf records which
//! slots are taken.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingSlot, SlotTemplate, TimeOfDay, Weekday};
use crate::types::DateRange;

/// Availability of one template occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotAvailability {
    pub date: NaiveDate,
    pub day: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_booked: bool,
}

type OccurrenceKey = (NaiveDate, TimeOfDay, TimeOfDay);

fn blocked_occurrences<'a>(
    turf_id: Uuid,
    bookings: impl IntoIterator<Item = &'a Booking>,
) -> HashSet<OccurrenceKey> {
    bookings
        .into_iter()
        .filter(|b| b.turf_id == turf_id && b.status.blocks_slot())
        .map(|b| (b.slot.date, b.slot.start_time, b.slot.end_time))
        .collect()
}

/// Expand templates over `range` and mark each occurrence booked or free.
///
/// Output is template-major: templates keep their listing order, and each
/// template's dates ascend. Bookings for other turfs and rejected bookings
/// are ignored.
pub fn compute_availability(
    turf_id: Uuid,
    templates: &[SlotTemplate],
    bookings: &[Booking],
    range: &DateRange,
) -> Vec<SlotAvailability> {
    let blocked = blocked_occurrences(turf_id, bookings);

    templates
        .iter()
        .flat_map(|template| {
            range
                .dates()
                .filter(move |date| Weekday::of(*date) == template.day)
                .map(move |date| (template, date))
        })
        .map(|(template, date)| SlotAvailability {
            date,
            day: template.day,
            start_time: template.start_time,
            end_time: template.end_time,
            is_booked: blocked.contains(&(date, template.start_time, template.end_time)),
        })
        .collect()
}

/// The booking currently holding `slot` on the turf, if any
pub fn find_blocking_booking<'a>(
    turf_id: Uuid,
    slot: &BookingSlot,
    bookings: &'a [Booking],
) -> Option<&'a Booking> {
    bookings.iter().find(|b| b.holds(turf_id, slot))
}

pub fn is_slot_available(turf_id: Uuid, slot: &BookingSlot, bookings: &[Booking]) -> bool {
    find_blocking_booking(turf_id, slot, bookings).is_none()
}
