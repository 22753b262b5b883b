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

//! The first optimizer stage: a time-budgeted, multi-start randomized
//! search over school-matchup block assignments.
//!
//! A small fixed pool of workers each runs a deterministic number of
//! seeded construction restarts and publishes results into the shared
//! incumbent. All hard rules are enforced throughout; no relaxation
//! happens here. The wall-clock budget is checked between restarts; a
//! worker that trips it simply stops early. Whatever teams remain short
//! of target fall through to the greedy stage.

use crate::engine::shared_incumbent::{Proposal, SharedIncumbent};
use crate::engine::state::{self, PlacementPolicy};
use crate::engine::CancelToken;
use crate::eval::Evaluator;
use crate::planner::SchoolMatchup;
use crate::slots::SlotUniverse;
use league_sched_model::prelude::*;
use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Jitter span applied to matchup desirability when diversifying the
/// construction order; roughly one mid-size priority weight.
const RANK_JITTER: i64 = 80;

#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Best construction found, if any worker finished one.
    pub schedule: Option<Schedule>,
    /// Set when a worker failed abnormally; the run continues on the
    /// greedy stage alone and the report carries this note.
    pub note: Option<String>,
}

#[tracing::instrument(level = "info", skip_all, fields(matchups = matchups.len()))]
pub fn run(
    problem: &Problem,
    universe: &SlotUniverse,
    matchups: &[SchoolMatchup],
    seed: u64,
    cancel: &CancelToken,
) -> SearchOutcome {
    let rules = problem.rules();
    let workers = rules.search_workers.max(1);
    let deadline = Instant::now() + rules.cp_time_budget;

    let mut seeder = ChaCha8Rng::seed_from_u64(seed);
    let worker_seeds: Vec<u64> = (0..workers).map(|_| seeder.next_u64()).collect();

    let incumbent = SharedIncumbent::new();
    let failure: Mutex<Option<String>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for (worker, &worker_seed) in worker_seeds.iter().enumerate() {
            let incumbent = &incumbent;
            let failure = &failure;
            scope.spawn(move || {
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    worker_loop(
                        problem, universe, matchups, worker, worker_seed, deadline, cancel,
                        incumbent,
                    );
                }));
                if outcome.is_err() {
                    tracing::error!(worker, "search worker failed abnormally");
                    failure.lock().get_or_insert_with(|| {
                        format!("search worker {worker} failed abnormally")
                    });
                }
            });
        }
    });

    let note = failure.into_inner();
    let best = incumbent.take();
    if let Some(proposal) = &best {
        tracing::info!(
            games = proposal.games,
            score = %proposal.score,
            worker = proposal.worker,
            "search stage finished"
        );
    } else {
        tracing::info!("search stage produced no construction");
    }
    SearchOutcome {
        schedule: best.map(|p| p.schedule),
        note,
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    problem: &Problem,
    universe: &SlotUniverse,
    matchups: &[SchoolMatchup],
    worker: usize,
    worker_seed: u64,
    deadline: Instant,
    cancel: &CancelToken,
    incumbent: &SharedIncumbent,
) {
    let rules = problem.rules();
    let eval = Evaluator::new(problem);
    let mut rng = ChaCha8Rng::seed_from_u64(worker_seed);

    for restart in 0..rules.search_restarts {
        if cancel.is_cancelled() {
            return;
        }
        if Instant::now() >= deadline {
            tracing::warn!(worker, restart, "search budget exhausted before restarts");
            return;
        }

        // Worker 0's first restart is the noise-free baseline; every
        // other construction jitters the matchup order for diversity.
        let baseline = worker == 0 && restart == 0;
        let schedule = construct(problem, universe, matchups, &eval, &mut rng, baseline);
        let proposal = Proposal {
            games: schedule.len(),
            score: eval.soft_score(&schedule),
            worker,
            schedule,
        };
        incumbent.try_publish(proposal);
    }
}

/// One full construction: seed matchups into blocks in (possibly
/// jittered) rank order, then fill every team toward the target count,
/// all under the strict policy.
fn construct(
    problem: &Problem,
    universe: &SlotUniverse,
    matchups: &[SchoolMatchup],
    eval: &Evaluator<'_>,
    rng: &mut ChaCha8Rng,
    baseline: bool,
) -> Schedule {
    let rules = problem.rules();
    let target = rules.target_games_per_team;
    let policy = PlacementPolicy::strict(rules);
    let mut schedule = Schedule::new();

    let mut order: Vec<usize> = (0..matchups.len()).collect();
    if !baseline {
        let noise: Vec<i64> = (0..matchups.len())
            .map(|_| rng.random_range(0..=RANK_JITTER))
            .collect();
        order.sort_by_key(|&i| {
            (
                std::cmp::Reverse(matchups[i].desirability.value() + noise[i]),
                i,
            )
        });
    }

    for &index in &order {
        let matchup = &matchups[index];
        if matchup.games.iter().any(|g| {
            schedule.game_count(g.a) >= target || schedule.game_count(g.b) >= target
        }) {
            continue;
        }

        let blocks = state::blocks_for_matchup(problem, universe, matchup);
        if blocks.is_empty() {
            continue;
        }
        // Rotate the scan start for diversity; the baseline starts at
        // the canonical front.
        let offset = if baseline {
            0
        } else {
            rng.random_range(0..blocks.len())
        };
        for i in 0..blocks.len() {
            let block_index = blocks[(offset + i) % blocks.len()];
            let block = universe.block(block_index).clone();
            if state::try_seed_block(
                problem, eval, &mut schedule, rng, matchup, &block, &policy, 0,
            ) {
                break;
            }
        }
    }

    state::fill_teams(problem, universe, eval, &mut schedule, rng, &policy, 0);
    schedule
}
