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

//! The second optimizer stage: progressive greedy fill.
//!
//! Runs unconditionally after the search stage; on a complete search
//! result it degenerates to a verification pass that changes nothing.
//! Otherwise it seeds any matchups the search stage left untouched,
//! then walks the relaxation ladder pass by pass, and finally performs
//! the desperate fill. Every liberty taken is recorded on the schedule.
//! Cancellation is honored at pass boundaries.

use crate::engine::state::{self, PlacementPolicy, DESPERATE_PASS};
use crate::engine::CancelToken;
use crate::eval::Evaluator;
use crate::planner::SchoolMatchup;
use crate::slots::SlotUniverse;
use league_sched_model::prelude::*;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Default)]
pub struct GreedyOutcome {
    pub cancelled: bool,
    pub passes_run: u32,
    pub desperate_placements: u32,
}

fn all_at_target(problem: &Problem, schedule: &Schedule) -> bool {
    let target = problem.rules().target_games_per_team;
    problem
        .teams()
        .iter()
        .all(|t| schedule.game_count(t.id()) >= target)
}

#[tracing::instrument(level = "info", skip_all)]
pub fn run(
    problem: &Problem,
    universe: &SlotUniverse,
    matchups: &[SchoolMatchup],
    schedule: &mut Schedule,
    rng: &mut ChaCha8Rng,
    cancel: &CancelToken,
) -> GreedyOutcome {
    let rules = problem.rules();
    let eval = Evaluator::new(problem);
    let mut outcome = GreedyOutcome::default();

    if cancel.is_cancelled() {
        outcome.cancelled = true;
        return outcome;
    }

    // Block seeding for matchups the search stage never realized. On a
    // complete search result this finds nothing to do.
    if !all_at_target(problem, schedule) {
        let policy = PlacementPolicy::strict(rules);
        let target = rules.target_games_per_team;
        for matchup in matchups {
            let untouched = matchup
                .games
                .iter()
                .all(|g| schedule.meetings(g.pair()) == 0);
            let all_need = matchup.games.iter().all(|g| {
                schedule.game_count(g.a) < target && schedule.game_count(g.b) < target
            });
            if !untouched || !all_need {
                continue;
            }
            for block_index in state::blocks_for_matchup(problem, universe, matchup) {
                let block = universe.block(block_index).clone();
                if state::try_seed_block(
                    problem, &eval, schedule, rng, matchup, &block, &policy, 0,
                ) {
                    break;
                }
            }
        }
    }

    // The relaxation ladder.
    for pass in 0..rules.greedy_max_passes {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            return outcome;
        }
        if all_at_target(problem, schedule) {
            break;
        }
        outcome.passes_run = pass + 1;
        let policy = PlacementPolicy::for_pass(pass, rules);
        let placed = state::fill_teams(problem, universe, &eval, schedule, rng, &policy, pass);
        if placed > 0 {
            tracing::debug!(pass, placed, "greedy pass placed games");
        }
    }

    // Desperate fill: anything still short goes into any open slot the
    // structural rules allow.
    if !all_at_target(problem, schedule) {
        let policy = PlacementPolicy::desperate(rules);
        outcome.desperate_placements = state::fill_teams(
            problem,
            universe,
            &eval,
            schedule,
            rng,
            &policy,
            DESPERATE_PASS,
        );
        if outcome.desperate_placements > 0 {
            tracing::warn!(
                placed = outcome.desperate_placements,
                "desperate fill was needed"
            );
        }
    }

    outcome
}
