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

use crate::common::{Identifier, IdentifierMarkerName};
use crate::problem::division::Division;
use crate::problem::slot::TimeSlot;
use crate::problem::team::{TeamIdentifier, TeamPair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameIdentifierMarker;

impl IdentifierMarkerName for GameIdentifierMarker {
    const NAME: &'static str = "GameId";
}

pub type GameIdentifier = Identifier<u32, GameIdentifierMarker>;

/// One scheduled game. Immutable once the schedule is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Game {
    id: GameIdentifier,
    home: TeamIdentifier,
    away: TeamIdentifier,
    division: Division,
    slot: TimeSlot,
    /// True iff either side already had a game on this date when this
    /// game was placed.
    is_doubleheader: bool,
    officials: u8,
}

impl Game {
    #[inline]
    pub fn new(
        id: GameIdentifier,
        home: TeamIdentifier,
        away: TeamIdentifier,
        division: Division,
        slot: TimeSlot,
        is_doubleheader: bool,
    ) -> Self {
        Self {
            id,
            home,
            away,
            division,
            slot,
            is_doubleheader,
            officials: division.officials(),
        }
    }

    #[inline]
    pub fn id(&self) -> GameIdentifier {
        self.id
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: GameIdentifier) {
        self.id = id;
    }

    #[inline]
    pub fn home(&self) -> TeamIdentifier {
        self.home
    }

    #[inline]
    pub fn away(&self) -> TeamIdentifier {
        self.away
    }

    #[inline]
    pub fn division(&self) -> Division {
        self.division
    }

    #[inline]
    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    #[inline]
    pub fn is_doubleheader(&self) -> bool {
        self.is_doubleheader
    }

    #[inline]
    pub fn officials(&self) -> u8 {
        self.officials
    }

    #[inline]
    pub fn pair(&self) -> TeamPair {
        TeamPair::new(self.home, self.away)
    }

    #[inline]
    pub fn involves(&self, team: TeamIdentifier) -> bool {
        self.home == team || self.away == team
    }

    #[inline]
    pub fn opponent_of(&self, team: TeamIdentifier) -> Option<TeamIdentifier> {
        if self.home == team {
            Some(self.away)
        } else if self.away == team {
            Some(self.home)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_home_game_for(&self, team: TeamIdentifier) -> bool {
        self.home == team
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} @ {} ({}) on {}",
            self.id, self.away, self.home, self.division, self.slot
        )
    }
}
