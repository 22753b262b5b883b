// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::problem::facility::FacilityIdentifier;
use chrono::NaiveDate;
use league_sched_core::prelude::{ClockInterval, ClockTime};

/// The canonical key of a court-slot: one court at one facility at one
/// start time on one date. Orders by `(date, facility, court, start)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub facility: FacilityIdentifier,
    pub court: u32,
    pub start: ClockTime,
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} at {} court {}",
            self.date, self.start, self.facility, self.court
        )
    }
}

/// A bookable game slot on a single court.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub struct TimeSlot {
    facility: FacilityIdentifier,
    court: u32,
    date: NaiveDate,
    start: ClockTime,
    end: ClockTime,
}

impl TimeSlot {
    #[inline]
    pub fn new(
        facility: FacilityIdentifier,
        court: u32,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    ) -> Self {
        Self {
            facility,
            court,
            date,
            start,
            end,
        }
    }

    #[inline]
    pub fn facility(&self) -> FacilityIdentifier {
        self.facility
    }

    #[inline]
    pub fn court(&self) -> u32 {
        self.court
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn start(&self) -> ClockTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> ClockTime {
        self.end
    }

    #[inline]
    pub fn interval(&self) -> ClockInterval {
        ClockInterval::new(self.start, self.end)
    }

    #[inline]
    pub fn key(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            facility: self.facility,
            court: self.court,
            start: self.start,
        }
    }

    /// Two slots conflict iff they occupy the same court on the same
    /// date and their time spans overlap.
    #[inline]
    pub fn conflicts_with(&self, other: &TimeSlot) -> bool {
        self.facility == other.facility
            && self.court == other.court
            && self.date == other.date
            && self.interval().overlaps(&other.interval())
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}-{} at {} court {}",
            self.date, self.start, self.end, self.facility, self.court
        )
    }
}

/// A run of consecutive slots on one court at one facility on one date.
/// The allocation unit for a school matchup: all its games land inside
/// one block, back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    slots: Vec<TimeSlot>,
}

/// The ways a slot sequence can fail to form a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBlockError {
    Empty,
    MixedCourt,
    NonConsecutive,
}

impl std::fmt::Display for TimeBlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBlockError::Empty => write!(f, "a time block needs at least one slot"),
            TimeBlockError::MixedCourt => {
                write!(f, "all slots of a block must share facility, court, and date")
            }
            TimeBlockError::NonConsecutive => {
                write!(f, "block slots must be consecutive in time")
            }
        }
    }
}

impl std::error::Error for TimeBlockError {}

impl TimeBlock {
    pub fn new(slots: Vec<TimeSlot>) -> Result<Self, TimeBlockError> {
        let first = slots.first().ok_or(TimeBlockError::Empty)?;
        for pair in slots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.facility() != first.facility()
                || b.facility() != first.facility()
                || a.court() != first.court()
                || b.court() != first.court()
                || a.date() != first.date()
                || b.date() != first.date()
            {
                return Err(TimeBlockError::MixedCourt);
            }
            if a.end() != b.start() {
                return Err(TimeBlockError::NonConsecutive);
            }
        }
        Ok(Self { slots })
    }

    #[inline]
    pub fn facility(&self) -> FacilityIdentifier {
        self.slots[0].facility()
    }

    #[inline]
    pub fn court(&self) -> u32 {
        self.slots[0].court()
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.slots[0].date()
    }

    #[inline]
    pub fn first_start(&self) -> ClockTime {
        self.slots[0].start()
    }

    /// How many games fit in this block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }
}

impl std::fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x{} from {} at {} court {}",
            self.date(),
            self.capacity(),
            self.first_start(),
            self.facility(),
            self.court()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn fid(n: u32) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }
    #[inline]
    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }
    #[inline]
    fn ct(h: i32, m: i32) -> ClockTime {
        ClockTime::from_hm(h, m)
    }
    fn slot(fac: u32, court: u32, day: u32, h: i32) -> TimeSlot {
        TimeSlot::new(fid(fac), court, d(day), ct(h, 0), ct(h + 1, 0))
    }

    #[test]
    fn test_conflicts_same_court_overlap() {
        let a = slot(1, 1, 7, 17);
        let b = TimeSlot::new(fid(1), 1, d(7), ct(17, 30), ct(18, 30));
        assert!(a.conflicts_with(&b));
        // Touching only, no conflict.
        assert!(!a.conflicts_with(&slot(1, 1, 7, 18)));
        // Other court, other facility, other date: no conflict.
        assert!(!a.conflicts_with(&slot(1, 2, 7, 17)));
        assert!(!a.conflicts_with(&slot(2, 1, 7, 17)));
        assert!(!a.conflicts_with(&slot(1, 1, 8, 17)));
    }

    #[test]
    fn test_key_ordering() {
        let early = slot(2, 1, 7, 17).key();
        let late = slot(1, 1, 8, 17).key();
        assert!(early < late); // date dominates facility
        assert!(slot(1, 1, 7, 17).key() < slot(1, 1, 7, 18).key());
    }

    #[test]
    fn test_block_accepts_consecutive_run() {
        let block =
            TimeBlock::new(vec![slot(1, 1, 7, 17), slot(1, 1, 7, 18), slot(1, 1, 7, 19)])
                .unwrap();
        assert_eq!(block.capacity(), 3);
        assert_eq!(block.first_start(), ct(17, 0));
        assert_eq!(block.slot(1).unwrap().start(), ct(18, 0));
    }

    #[test]
    fn test_block_rejects_bad_sequences() {
        assert_eq!(TimeBlock::new(vec![]).unwrap_err(), TimeBlockError::Empty);
        assert_eq!(
            TimeBlock::new(vec![slot(1, 1, 7, 17), slot(1, 2, 7, 18)]).unwrap_err(),
            TimeBlockError::MixedCourt
        );
        assert_eq!(
            TimeBlock::new(vec![slot(1, 1, 7, 17), slot(1, 1, 7, 19)]).unwrap_err(),
            TimeBlockError::NonConsecutive
        );
    }
}
