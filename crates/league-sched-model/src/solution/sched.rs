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

use crate::problem::slot::SlotKey;
use crate::problem::team::{TeamIdentifier, TeamPair};
use crate::solution::game::{Game, GameIdentifier};
use crate::solution::report::Relaxation;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// The season schedule under construction, plus derived indices.
///
/// Owned exclusively by the optimizer during a run. [`Schedule::freeze`]
/// puts the games into canonical `(date, start, facility, court)`
/// order and assigns final game ids; after that the schedule is
/// read-only by convention and ready for validation and the writer.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Schedule {
    games: Vec<Game>,
    relaxations: Vec<Relaxation>,
    #[serde(skip)]
    by_team: BTreeMap<TeamIdentifier, Vec<usize>>,
    #[serde(skip)]
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    #[serde(skip)]
    by_slot: BTreeMap<SlotKey, usize>,
    #[serde(skip)]
    pair_counts: BTreeMap<TeamPair, u32>,
}

impl Schedule {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_game(&mut self, game: Game) {
        let index = self.games.len();
        self.by_team.entry(game.home()).or_default().push(index);
        self.by_team.entry(game.away()).or_default().push(index);
        self.by_date
            .entry(game.slot().date())
            .or_default()
            .push(index);
        self.by_slot.insert(game.slot().key(), index);
        *self.pair_counts.entry(game.pair()).or_default() += 1;
        self.games.push(game);
    }

    #[inline]
    pub fn record_relaxation(&mut self, relaxation: Relaxation) {
        self.relaxations.push(relaxation);
    }

    #[inline]
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    #[inline]
    pub fn relaxations(&self) -> &[Relaxation] {
        &self.relaxations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games_for(&self, team: TeamIdentifier) -> impl Iterator<Item = &Game> {
        self.by_team
            .get(&team)
            .into_iter()
            .flatten()
            .map(|&i| &self.games[i])
    }

    pub fn games_on(&self, date: NaiveDate) -> impl Iterator<Item = &Game> {
        self.by_date
            .get(&date)
            .into_iter()
            .flatten()
            .map(|&i| &self.games[i])
    }

    #[inline]
    pub fn game_at(&self, key: &SlotKey) -> Option<&Game> {
        self.by_slot.get(key).map(|&i| &self.games[i])
    }

    #[inline]
    pub fn slot_taken(&self, key: &SlotKey) -> bool {
        self.by_slot.contains_key(key)
    }

    #[inline]
    pub fn game_count(&self, team: TeamIdentifier) -> u32 {
        self.by_team.get(&team).map_or(0, |v| v.len() as u32)
    }

    /// How often the pair has met so far.
    #[inline]
    pub fn meetings(&self, pair: TeamPair) -> u32 {
        self.pair_counts.get(&pair).copied().unwrap_or(0)
    }

    /// Dates on which `team` plays, ascending, with repeats for
    /// doubleheaders.
    pub fn dates_for(&self, team: TeamIdentifier) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> =
            self.games_for(team).map(|g| g.slot().date()).collect();
        dates.sort();
        dates
    }

    /// Canonical order and final ids. Output contract: games sorted by
    /// `(date, start, facility, court)`, ids dense from zero.
    pub fn freeze(&mut self) {
        self.games.sort_by_key(|g| {
            let s = g.slot();
            (s.date(), s.start(), s.facility(), s.court())
        });
        for (index, game) in self.games.iter_mut().enumerate() {
            game.set_id(GameIdentifier::new(index as u32));
        }
        self.rebuild_indices();
    }

    fn rebuild_indices(&mut self) {
        self.by_team.clear();
        self.by_date.clear();
        self.by_slot.clear();
        self.pair_counts.clear();
        for (index, game) in self.games.iter().enumerate() {
            self.by_team.entry(game.home()).or_default().push(index);
            self.by_team.entry(game.away()).or_default().push(index);
            self.by_date
                .entry(game.slot().date())
                .or_default()
                .push(index);
            self.by_slot.insert(game.slot().key(), index);
            *self.pair_counts.entry(game.pair()).or_default() += 1;
        }
    }
}
