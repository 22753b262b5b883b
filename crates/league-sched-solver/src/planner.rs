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

//! The school-matchup planner.
//!
//! The logical work item the optimizer schedules is not a single game
//! but a [`SchoolMatchup`]: every cross-divisional game between two
//! schools, intended to land in one time block so the whole matchup
//! happens back to back on one night. The planner enumerates matchups,
//! ranks them by desirability, and orders each matchup's games so games
//! sharing a coach sit next to each other.

use crate::eval::Evaluator;
use league_sched_core::prelude::Score;
use league_sched_model::prelude::*;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// One division's game inside a school matchup. Sides are unordered
/// until home/away assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchupGame {
    pub a: TeamIdentifier,
    pub b: TeamIdentifier,
    pub division: Division,
}

impl MatchupGame {
    #[inline]
    pub fn pair(&self) -> TeamPair {
        TeamPair::new(self.a, self.b)
    }
}

/// All games between two schools, the indivisible block-allocation
/// unit. Games are pre-ordered for coach adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolMatchup {
    pub school_a: SchoolIdentifier,
    pub school_b: SchoolIdentifier,
    pub games: SmallVec<[MatchupGame; 6]>,
    pub desirability: Score,
}

impl SchoolMatchup {
    /// Block capacity this matchup needs.
    #[inline]
    pub fn games_needed(&self) -> usize {
        self.games.len()
    }

    /// Whether any game forces a short-rim facility.
    #[inline]
    pub fn requires_short_rims(&self) -> bool {
        self.games.iter().any(|g| g.division.requires_short_rims())
    }

    /// The divisions present, each at most once.
    pub fn divisions(&self) -> BTreeSet<Division> {
        self.games.iter().map(|g| g.division).collect()
    }
}

/// Composite desirability of a matchup: average per-game quality
/// (cluster, tier, rivalry, shared coach) minus pressure for pairs that
/// already met.
pub fn desirability<F>(problem: &Problem, games: &[MatchupGame], meetings: F) -> Score
where
    F: Fn(TeamPair) -> u32,
{
    if games.is_empty() {
        return Score::ZERO;
    }
    let eval = Evaluator::new(problem);
    let w = &problem.rules().priority_weights;
    let mut total = Score::ZERO;
    for game in games {
        total += eval.matchup_quality(game.a, game.b);
        total += Score::penalty(w.rival_matchup, meetings(game.pair()));
    }
    Score::new(total.value() / games.len() as i64)
}

/// Reorders a matchup's games so games sharing a coach are adjacent;
/// coaches with the most games in the matchup come first.
pub fn order_for_coaches(problem: &Problem, games: &mut SmallVec<[MatchupGame; 6]>) {
    let coach_of = |id: TeamIdentifier| {
        problem
            .team(id)
            .expect("matchup team exists")
            .coach()
    };

    let mut by_coach: BTreeMap<CoachIdentifier, Vec<usize>> = BTreeMap::new();
    for (index, game) in games.iter().enumerate() {
        let mut coaches = [coach_of(game.a), coach_of(game.b)];
        coaches.sort();
        by_coach.entry(coaches[0]).or_default().push(index);
        if coaches[1] != coaches[0] {
            by_coach.entry(coaches[1]).or_default().push(index);
        }
    }

    let mut coaches: Vec<(CoachIdentifier, Vec<usize>)> = by_coach.into_iter().collect();
    coaches.sort_by_key(|(coach, indices)| (std::cmp::Reverse(indices.len()), *coach));

    let mut ordered: SmallVec<[MatchupGame; 6]> = SmallVec::new();
    let mut used: BTreeSet<usize> = BTreeSet::new();
    for (_, indices) in coaches.iter().filter(|(_, v)| v.len() > 1) {
        for &index in indices {
            if used.insert(index) {
                ordered.push(games[index]);
            }
        }
    }
    for (index, game) in games.iter().enumerate() {
        if used.insert(index) {
            ordered.push(*game);
        }
    }
    *games = ordered;
}

/// Enumerates every school pairing with at least one schedulable game,
/// ranked most desirable first. Do-not-play pairs never produce a game.
#[tracing::instrument(level = "debug", skip(problem))]
pub fn plan(problem: &Problem) -> Vec<SchoolMatchup> {
    let schools: Vec<SchoolIdentifier> = problem.schools().iter().map(School::id).collect();

    let mut matchups = Vec::new();
    for (i, &school_a) in schools.iter().enumerate() {
        for &school_b in schools.iter().skip(i + 1) {
            let mut games: SmallVec<[MatchupGame; 6]> = SmallVec::new();
            for division in Division::ALL {
                let (Some(a), Some(b)) = (
                    problem.team_at(school_a, division),
                    problem.team_at(school_b, division),
                ) else {
                    continue;
                };
                let team_a = problem.team(a).expect("roster team exists");
                if team_a.avoids(b) {
                    continue;
                }
                games.push(MatchupGame { a, b, division });
            }
            if games.is_empty() {
                continue;
            }
            order_for_coaches(problem, &mut games);
            let desirability = desirability(problem, &games, |_| 0);
            matchups.push(SchoolMatchup {
                school_a,
                school_b,
                games,
                desirability,
            });
        }
    }

    matchups.sort_by_key(|m| (std::cmp::Reverse(m.desirability), m.school_a, m.school_b));
    tracing::debug!(matchups = matchups.len(), "school matchups planned");
    matchups
}
