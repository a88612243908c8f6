use uuid::Uuid;

use crate::models::{InterviewSlot, TimeRange};

/// Why a candidate range cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// A live BOOKED slot has exactly the same bounds.
    AlreadyBooked,
    /// A live BOOKED slot intersects the candidate.
    OverlapsBooking,
}

impl ConflictReason {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyBooked => "This time slot is already booked",
            ConflictReason::OverlapsBooking => "Overlaps with an existing booking",
        }
    }
}

/// Returns the first live BOOKED slot overlapping `candidate`, ignoring the
/// slot with id `exclude`.
///
/// The four cases of "candidate starts inside", "ends inside", "contains" and
/// "is contained by" an existing booking all reduce to the interval test in
/// [`TimeRange::overlaps`].
pub fn find_conflict<'a, I>(
    slots: I,
    candidate: &TimeRange,
    exclude: Option<Uuid>,
) -> Option<&'a InterviewSlot>
where
    I: IntoIterator<Item = &'a InterviewSlot>,
{
    slots.into_iter().find(|slot| {
        slot.is_booked() && Some(slot.id) != exclude && slot.range().overlaps(candidate)
    })
}

pub fn has_conflict<'a, I>(slots: I, candidate: &TimeRange, exclude: Option<Uuid>) -> bool
where
    I: IntoIterator<Item = &'a InterviewSlot>,
{
    find_conflict(slots, candidate, exclude).is_some()
}

/// Classifies `candidate` against the given slots. An exact booked match
/// takes precedence over a plain overlap.
pub fn classify<'a, I>(slots: I, candidate: &TimeRange) -> Option<ConflictReason>
where
    I: IntoIterator<Item = &'a InterviewSlot> + Clone,
{
    let exact_booked = slots
        .clone()
        .into_iter()
        .any(|slot| slot.is_booked() && slot.range() == *candidate);
    if exact_booked {
        return Some(ConflictReason::AlreadyBooked);
    }
    if has_conflict(slots, candidate, None) {
        return Some(ConflictReason::OverlapsBooking);
    }
    None
}
