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

//! Materializes every bookable court-slot of the season and groups them
//! into blocks.
//!
//! A block is the run of consecutive slots on one court at one facility
//! on one date; it is the allocation unit for school matchups. Slots are
//! emitted in `(date, facility, court, start)` order and the order never
//! changes afterwards, which is what keeps the rest of the engine
//! deterministic.

use chrono::{Datelike, Weekday};
use league_sched_model::prelude::*;
use std::collections::BTreeMap;

/// All slots and blocks of a season, with per-division eligibility
/// prefiltered. Computed once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct SlotUniverse {
    blocks: Vec<TimeBlock>,
    eligible: BTreeMap<Division, Vec<usize>>,
    slot_count: usize,
}

/// Whether a facility may host games of a division.
#[inline]
pub fn facility_eligible(facility: &Facility, division: Division) -> bool {
    !division.requires_short_rims() || facility.has_short_rims()
}

/// Weeknights are Monday through Friday.
#[inline]
pub fn is_weeknight(date: chrono::NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl SlotUniverse {
    #[tracing::instrument(level = "debug", skip(problem))]
    pub fn build(problem: &Problem) -> Self {
        let rules = problem.rules();
        let duration = rules.game_duration;

        let mut blocks: Vec<TimeBlock> = Vec::new();
        for date in rules.season_days() {
            let Some(window) = rules.window_for(date) else {
                continue;
            };

            // Partition the window into game-length segments once; every
            // court of every open facility gets the same grid.
            let mut starts = Vec::new();
            let mut start = window.start();
            while let Some(end) = start.checked_add(duration) {
                if end > window.end() {
                    break;
                }
                starts.push(start);
                start = end;
            }
            if starts.is_empty() {
                continue;
            }

            for facility in problem.facilities().iter() {
                if !facility.is_available(date) {
                    continue;
                }
                for court in 1..=facility.court_count() {
                    let slots: Vec<TimeSlot> = starts
                        .iter()
                        .map(|&s| TimeSlot::new(facility.id(), court, date, s, s + duration))
                        .collect();
                    match TimeBlock::new(slots) {
                        Ok(block) => blocks.push(block),
                        // Unreachable with a grid partition; skip rather
                        // than poison the run.
                        Err(e) => tracing::warn!("discarding malformed block: {e}"),
                    }
                }
            }
        }

        let mut eligible: BTreeMap<Division, Vec<usize>> = BTreeMap::new();
        for division in Division::ALL {
            let indices = blocks
                .iter()
                .enumerate()
                .filter(|(_, b)| {
                    problem
                        .facility(b.facility())
                        .is_some_and(|f| facility_eligible(f, division))
                })
                .map(|(i, _)| i)
                .collect();
            eligible.insert(division, indices);
        }

        let slot_count = blocks.iter().map(TimeBlock::capacity).sum();
        tracing::debug!(
            blocks = blocks.len(),
            slots = slot_count,
            "slot universe built"
        );

        Self {
            blocks,
            eligible,
            slot_count,
        }
    }

    #[inline]
    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    #[inline]
    pub fn block(&self, index: usize) -> &TimeBlock {
        &self.blocks[index]
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Block indices whose facility may host `division`, in canonical
    /// order.
    #[inline]
    pub fn eligible_blocks(&self, division: Division) -> &[usize] {
        self.eligible
            .get(&division)
            .map_or(&[], Vec::as_slice)
    }

    /// All slots a division may use, in canonical order.
    pub fn eligible_slots(&self, division: Division) -> impl Iterator<Item = &TimeSlot> {
        self.eligible_blocks(division)
            .iter()
            .flat_map(|&i| self.blocks[i].slots().iter())
    }

    #[inline]
    pub fn eligible_slot_count(&self, division: Division) -> usize {
        self.eligible_blocks(division)
            .iter()
            .map(|&i| self.blocks[i].capacity())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use league_sched_core::prelude::ClockTime;

    #[inline]
    fn d(y: i32, m: u32, day: u32) -> chrono::NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn problem(facilities: Vec<Facility>) -> Problem {
        let teams: TeamContainer = [
            Team::new(
                TeamIdentifier::new(1),
                "A JV",
                SchoolIdentifier::new(1),
                Division::BoysJv,
                CoachIdentifier::new(1),
                Tier::Two,
            ),
            Team::new(
                TeamIdentifier::new(2),
                "B JV",
                SchoolIdentifier::new(2),
                Division::BoysJv,
                CoachIdentifier::new(2),
                Tier::Two,
            ),
        ]
        .into_iter()
        .collect();
        let schools = [
            School::new(SchoolIdentifier::new(1), "A"),
            School::new(SchoolIdentifier::new(2), "B"),
        ]
        .into_iter()
        .collect();
        let rules = Rules {
            season_start: d(2026, 1, 5),
            season_end: d(2026, 1, 11),
            ..Rules::default()
        };
        Problem::new(rules, teams, schools, facilities.into_iter().collect()).unwrap()
    }

    use league_sched_model::problem::team::CoachIdentifier;
    use league_sched_model::problem::team::TeamContainer;

    #[test]
    fn test_weeknight_blocks_have_three_slots() {
        // One facility, one court, season Mon Jan 5 .. Sun Jan 11 2026.
        let p = problem(vec![Facility::new(FacilityIdentifier::new(1), "Gym", 1)]);
        let u = SlotUniverse::build(&p);

        // Mon-Fri (5) weeknight blocks + Saturday block; Sunday excluded.
        assert_eq!(u.blocks().len(), 6);

        let monday = &u.blocks()[0];
        assert_eq!(monday.date(), d(2026, 1, 5));
        assert_eq!(monday.capacity(), 3); // 17:00, 18:00, 19:00 fit before 20:30
        assert_eq!(monday.first_start(), ClockTime::from_hm(17, 0));

        let saturday = u
            .blocks()
            .iter()
            .find(|b| b.date() == d(2026, 1, 10))
            .unwrap();
        assert_eq!(saturday.capacity(), 10); // 08:00 .. 17:00 starts
    }

    #[test]
    fn test_blackout_and_courts() {
        let open = Facility::new(FacilityIdentifier::new(1), "Two Courts", 2);
        let dark = Facility::new(FacilityIdentifier::new(2), "Dark", 1)
            .with_blackout_dates([d(2026, 1, 5)]);
        let p = problem(vec![open, dark]);
        let u = SlotUniverse::build(&p);

        let monday_blocks: Vec<_> = u
            .blocks()
            .iter()
            .filter(|b| b.date() == d(2026, 1, 5))
            .collect();
        // Two courts of the open facility only.
        assert_eq!(monday_blocks.len(), 2);
        assert!(monday_blocks
            .iter()
            .all(|b| b.facility() == FacilityIdentifier::new(1)));

        let tuesday_blocks: Vec<_> = u
            .blocks()
            .iter()
            .filter(|b| b.date() == d(2026, 1, 6))
            .collect();
        assert_eq!(tuesday_blocks.len(), 3);
    }

    #[test]
    fn test_short_rim_division_sees_only_short_rim_facilities() {
        let tall = Facility::new(FacilityIdentifier::new(1), "Tall Rims", 2);
        let short = Facility::new(FacilityIdentifier::new(2), "Short Rims", 1)
            .with_short_rims(true);
        let p = problem(vec![tall, short]);
        let u = SlotUniverse::build(&p);

        for &i in u.eligible_blocks(Division::EsK1Rec) {
            assert_eq!(u.block(i).facility(), FacilityIdentifier::new(2));
        }
        // Everyone else can use both facilities.
        assert_eq!(
            u.eligible_blocks(Division::BoysJv).len(),
            u.blocks().len()
        );
        assert!(u.eligible_slot_count(Division::EsK1Rec) > 0);
        assert!(
            u.eligible_slot_count(Division::EsK1Rec) < u.eligible_slot_count(Division::BoysJv)
        );
    }

    #[test]
    fn test_canonical_order() {
        let p = problem(vec![
            Facility::new(FacilityIdentifier::new(2), "B", 1),
            Facility::new(FacilityIdentifier::new(1), "A", 1),
        ]);
        let u = SlotUniverse::build(&p);
        let keys: Vec<_> = u
            .blocks()
            .iter()
            .map(|b| (b.date(), b.facility(), b.court()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
