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

//! The engine's one entry point: [`generate`].
//!
//! A generation run is synchronous and purely functional over its
//! inputs: slot universe, matchup plan, search stage, greedy stage,
//! freeze, revalidate. Structural input problems surface as
//! [`GenerateError::InvalidInput`] before any search begins. Everything
//! data-driven (shortfalls, relaxations, cancellation) is reported,
//! never raised.

pub mod greedy;
pub mod homeaway;
pub mod search;
pub mod shared_incumbent;
pub mod state;

use crate::eval::Evaluator;
use crate::planner;
use crate::slots::SlotUniverse;
use league_sched_model::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation. Checked between search restarts and at
/// greedy pass boundaries; on cancellation the engine returns the best
/// schedule it has, flagged in the report.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The engine refuses to run only on structurally invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    InvalidInput(ProblemError),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::InvalidInput(e) => write!(f, "invalid input: {e}"),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<ProblemError> for GenerateError {
    fn from(err: ProblemError) -> Self {
        GenerateError::InvalidInput(err)
    }
}

/// Generates a season schedule. Deterministic for a fixed
/// `(problem, seed)`.
#[inline]
pub fn generate(problem: &Problem, seed: Option<u64>) -> (Schedule, ValidationReport) {
    generate_with(problem, seed, &CancelToken::new())
}

/// The loader-facing surface: assembles and validates the problem
/// (duplicate ids included), then generates. Fails fast on structural
/// input errors.
pub fn generate_from_parts(
    rules: Rules,
    teams: impl IntoIterator<Item = Team>,
    schools: impl IntoIterator<Item = School>,
    facilities: impl IntoIterator<Item = Facility>,
    seed: Option<u64>,
) -> Result<(Schedule, ValidationReport), GenerateError> {
    let mut builder = ProblemBuilder::new().with_rules(rules);
    for team in teams {
        builder.add_team(team);
    }
    for school in schools {
        builder.add_school(school);
    }
    for facility in facilities {
        builder.add_facility(facility);
    }
    let problem = builder.build()?;
    Ok(generate(&problem, seed))
}

/// [`generate`], with cooperative cancellation.
#[tracing::instrument(level = "info", skip(problem, cancel), fields(teams = problem.teams().len()))]
pub fn generate_with(
    problem: &Problem,
    seed: Option<u64>,
    cancel: &CancelToken,
) -> (Schedule, ValidationReport) {
    let rules = problem.rules();
    let eval = Evaluator::new(problem);
    let universe = SlotUniverse::build(problem);
    let matchups = planner::plan(problem);

    let mut master = ChaCha8Rng::seed_from_u64(seed.unwrap_or(0));
    let search_seed = master.next_u64();
    let greedy_seed = master.next_u64();

    let mut schedule = Schedule::new();
    let mut search_note = None;
    if !cancel.is_cancelled() {
        let outcome = search::run(problem, &universe, &matchups, search_seed, cancel);
        search_note = outcome.note;
        if let Some(found) = outcome.schedule {
            schedule = found;
        }
    }

    let mut greedy_rng = ChaCha8Rng::seed_from_u64(greedy_seed);
    let greedy = greedy::run(
        problem,
        &universe,
        &matchups,
        &mut schedule,
        &mut greedy_rng,
        cancel,
    );

    schedule.freeze();

    let mut report = eval.validate(&schedule);
    report.cancelled = greedy.cancelled || cancel.is_cancelled();
    report.search_note = search_note;
    for team in problem.teams().iter() {
        let count = schedule.game_count(team.id());
        if count < rules.target_games_per_team {
            report.shortfalls.push(Shortfall {
                team: team.id(),
                missing: rules.target_games_per_team - count,
                reason: shortfall_reason(problem, &universe, team),
            });
        }
    }

    tracing::info!(
        games = schedule.len(),
        shortfalls = report.shortfalls.len(),
        relaxations = report.relaxations.len(),
        soft_score = %report.soft_score,
        "generation finished"
    );
    (schedule, report)
}

/// The most likely cause of a team's shortfall, in diagnostic priority
/// order: no hostable facility at all, the school's blackouts dominate
/// the season, do-not-play rules exclude most of the division, or plain
/// slot contention.
fn shortfall_reason(problem: &Problem, universe: &SlotUniverse, team: &Team) -> ShortfallReason {
    if universe.eligible_slot_count(team.division()) == 0 {
        return ShortfallReason::NoEligibleFacility;
    }

    if let Some(school) = problem.school(team.school()) {
        let playable: Vec<chrono::NaiveDate> = problem
            .rules()
            .season_days()
            .filter(|&d| problem.rules().is_playable(d))
            .collect();
        if !playable.is_empty() {
            let blacked = playable
                .iter()
                .filter(|&&d| school.is_blacked_out(d))
                .count();
            if blacked * 2 > playable.len() {
                return ShortfallReason::BlackoutDominance;
            }
        }
    }

    let opponents: Vec<&Team> = problem
        .teams()
        .in_division(team.division())
        .filter(|o| o.id() != team.id() && o.school() != team.school())
        .collect();
    let avoided = opponents.iter().filter(|o| team.avoids(o.id())).count();
    if opponents.is_empty() || avoided * 2 >= opponents.len() {
        return ShortfallReason::DoNotPlaySaturation;
    }

    ShortfallReason::SlotContention
}
