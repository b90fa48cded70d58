//! Election scheduling windows and the conflict detector that keeps them
//! pairwise disjoint.

use chrono::{DateTime, SubsecRound, Utc};

use crate::model::mongodb::Id;

use super::Rejection;

/// A closed time interval `[start, end]` with `start < end`.
///
/// Bounds are kept at millisecond precision, the resolution of a BSON
/// datetime, so a window compares the same before and after it is stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// Create a window, rejecting empty or inverted ones.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Rejection> {
        let start = start.trunc_subsecs(3);
        let end = end.trunc_subsecs(3);
        if start >= end {
            return Err(Rejection::InvalidSchedule);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Do the two windows share at least one instant? Touching endpoints count.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Is the instant inside the window, bounds included?
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// The window occupied by an existing election.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: Id,
    pub window: Window,
}

/// Does `candidate` overlap any of the `existing` schedules, ignoring the one
/// with id `exclude` (if given)?
pub fn has_conflict<'a>(
    candidate: &Window,
    existing: impl IntoIterator<Item = &'a Schedule>,
    exclude: Option<Id>,
) -> bool {
    existing
        .into_iter()
        .filter(|schedule| Some(schedule.id) != exclude)
        .any(|schedule| candidate.overlaps(&schedule.window))
}
