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

//! The stateless constraint evaluator.
//!
//! Two call patterns: [`Evaluator::violations_for`] answers "which hard
//! rules would this one placement break right now" for the optimizer's
//! local decisions, and [`Evaluator::validate`] re-checks a frozen
//! schedule from scratch, producing the final report. A violation whose
//! placement carries a recorded relaxation counts as "scheduled under
//! relaxation", not as a fresh violation.

use crate::slots::{facility_eligible, is_weeknight};
use chrono::NaiveDate;
use league_sched_core::prelude::Score;
use league_sched_model::prelude::*;
use league_sched_model::problem::school::Cluster;
use std::collections::{BTreeMap, BTreeSet};

/// A placement under consideration: an unordered team pairing in one
/// division at one slot. Home/away is decided only after the placement
/// is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub a: TeamIdentifier,
    pub b: TeamIdentifier,
    pub division: Division,
    pub slot: TimeSlot,
}

impl Candidate {
    #[inline]
    pub fn pair(&self) -> TeamPair {
        TeamPair::new(self.a, self.b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'p> {
    problem: &'p Problem,
}

impl<'p> Evaluator<'p> {
    #[inline]
    pub fn new(problem: &'p Problem) -> Self {
        Self { problem }
    }

    #[inline]
    fn team(&self, id: TeamIdentifier) -> &Team {
        self.problem.team(id).expect("candidate team exists")
    }

    #[inline]
    fn facility(&self, id: FacilityIdentifier) -> &Facility {
        self.problem.facility(id).expect("slot facility exists")
    }

    /// A team's cluster, falling back to its school's.
    fn effective_cluster(&self, team: &Team) -> Option<Cluster> {
        team.cluster()
            .or_else(|| self.problem.school(team.school()).and_then(School::cluster))
    }

    /// Every hard rule the candidate would break against the current
    /// schedule. Structural rules come first so callers can reject
    /// early; an empty result means the placement is clean.
    pub fn violations_for(
        &self,
        schedule: &Schedule,
        c: &Candidate,
        rematch_cap: u32,
    ) -> Vec<RuleId> {
        let mut violations = Vec::new();
        let rules = self.problem.rules();
        let team_a = self.team(c.a);
        let team_b = self.team(c.b);
        let date = c.slot.date();
        let facility = self.facility(c.slot.facility());

        if team_a.school() == team_b.school() {
            violations.push(RuleId::SameSchoolMatchup);
        }
        if !facility_eligible(facility, c.division) {
            violations.push(RuleId::FacilityEligibility);
        }
        if !rules.is_playable(date)
            || !facility.is_available(date)
            || !self.problem.school_open_on(team_a.school(), date)
            || !self.problem.school_open_on(team_b.school(), date)
        {
            violations.push(RuleId::ExcludedDate);
        }

        let mut slot_conflict = false;
        let mut team_overlap = false;
        let mut school_overlap = false;
        for game in schedule.games_on(date) {
            let other = game.slot();
            if !c.slot.interval().overlaps(&other.interval()) {
                continue;
            }
            if other.facility() == c.slot.facility() && other.court() == c.slot.court() {
                slot_conflict = true;
            }
            if game.involves(c.a) || game.involves(c.b) {
                team_overlap = true;
            }
            for participant in [game.home(), game.away()] {
                let school = self.team(participant).school();
                if school == team_a.school() || school == team_b.school() {
                    school_overlap = true;
                }
            }
        }
        if slot_conflict {
            violations.push(RuleId::SlotConflict);
        }
        if team_overlap {
            violations.push(RuleId::TeamTimeOverlap);
        }
        if school_overlap {
            violations.push(RuleId::SchoolSimultaneity);
        }

        if team_a.avoids(c.b) {
            violations.push(RuleId::DoNotPlay);
        }
        if schedule.meetings(c.pair()) >= rematch_cap {
            violations.push(RuleId::RematchCap);
        }

        for &team in &[c.a, c.b] {
            let mut dates = schedule.dates_for(team);
            dates.push(date);
            dates.sort();
            if exceeds_window(&dates, 7, rules.max_games_per_7_days)
                && !violations.contains(&RuleId::FrequencyCap7Days)
            {
                violations.push(RuleId::FrequencyCap7Days);
            }
            if exceeds_window(&dates, 14, rules.max_games_per_14_days)
                && !violations.contains(&RuleId::FrequencyCap14Days)
            {
                violations.push(RuleId::FrequencyCap14Days);
            }

            let same_day: Vec<&Game> = schedule
                .games_for(team)
                .filter(|g| g.slot().date() == date)
                .collect();
            if !same_day.is_empty() {
                let dh_dates = doubleheader_dates(schedule, team);
                if !dh_dates.contains(&date)
                    && dh_dates.len() as u32 >= rules.max_doubleheaders_per_season
                    && !violations.contains(&RuleId::DoubleheaderCap)
                {
                    violations.push(RuleId::DoubleheaderCap);
                }
                for game in same_day {
                    let other = game.slot();
                    let gap = if c.slot.start() >= other.end() {
                        c.slot.start() - other.end()
                    } else if other.start() >= c.slot.end() {
                        other.start() - c.slot.end()
                    } else {
                        continue; // overlap, reported above
                    };
                    if gap < rules.doubleheader_break
                        && !violations.contains(&RuleId::DoubleheaderBreak)
                    {
                        violations.push(RuleId::DoubleheaderBreak);
                    }
                }
            }
        }

        violations
    }

    /// The matchup-quality part of the soft objective: geographic
    /// cluster, tier affinity, rivalry, shared coach.
    pub fn matchup_quality(&self, a: TeamIdentifier, b: TeamIdentifier) -> Score {
        let w = &self.problem.rules().priority_weights;
        let team_a = self.team(a);
        let team_b = self.team(b);
        let mut score = Score::ZERO;

        if let (Some(ca), Some(cb)) = (
            self.effective_cluster(team_a),
            self.effective_cluster(team_b),
        ) {
            if ca == cb {
                score += Score::reward(w.geographic_cluster, 1);
            }
        }
        score += self
            .problem
            .rules()
            .tier_shape
            .reward(w.tier_matching, team_a.tier(), team_b.tier());
        if team_a.is_rival_of(b) {
            score += Score::reward(w.rival_matchup, 1);
        }
        if team_a.coach() == team_b.coach() {
            score += Score::reward(w.coach_clustering, 1);
        }
        score
    }

    /// Slot-side preference: weeknights over Saturdays.
    pub fn slot_preference(&self, slot: &TimeSlot) -> Score {
        let w = &self.problem.rules().priority_weights;
        if is_weeknight(slot.date()) {
            Score::reward(w.weeknight_fill, 1)
        } else {
            Score::ZERO
        }
    }

    /// Local decision helper: whether the placement is hard-clean, and
    /// the approximate soft gain of taking it.
    pub fn delta(
        &self,
        schedule: &Schedule,
        c: &Candidate,
        rematch_cap: u32,
    ) -> (bool, Score) {
        let hard_ok = self.violations_for(schedule, c, rematch_cap).is_empty();
        let score = self.matchup_quality(c.a, c.b) + self.placement_score(schedule, c);
        (hard_ok, score)
    }

    /// The slot-dependent part of a placement's soft gain: weeknight
    /// preference, host-facility preference, and adjacency to neighbors
    /// that continue a school matchup or a coach's day.
    pub fn placement_score(&self, schedule: &Schedule, c: &Candidate) -> Score {
        let w = &self.problem.rules().priority_weights;
        let mut score = self.slot_preference(&c.slot);

        // Host-facility preference: realized precisely after home/away
        // assignment; at decision time either side may claim it.
        let at_home_of = |id: TeamIdentifier| self.team(id).home_facility() == Some(c.slot.facility());
        if at_home_of(c.a) || at_home_of(c.b) {
            score += Score::reward(w.host_home, 1);
        }

        // Adjacency rewards: placing next to a neighbor that continues a
        // school matchup or a coach's day.
        let schools = (self.team(c.a).school(), self.team(c.b).school());
        let coaches = (self.team(c.a).coach(), self.team(c.b).coach());
        for neighbor in self.neighbor_games(schedule, &c.slot) {
            let ns = (
                self.team(neighbor.home()).school(),
                self.team(neighbor.away()).school(),
            );
            if (ns.0 == schools.0 && ns.1 == schools.1) || (ns.0 == schools.1 && ns.1 == schools.0)
            {
                score += Score::reward(w.school_clustering, 1);
            }
            let nc = (
                self.team(neighbor.home()).coach(),
                self.team(neighbor.away()).coach(),
            );
            if nc.0 == coaches.0 || nc.0 == coaches.1 || nc.1 == coaches.0 || nc.1 == coaches.1 {
                score += Score::reward(w.coach_clustering, 1);
            }
        }

        score
    }

    fn neighbor_games<'s>(
        &self,
        schedule: &'s Schedule,
        slot: &TimeSlot,
    ) -> impl Iterator<Item = &'s Game> {
        let duration = self.problem.rules().game_duration;
        let before = slot.start().checked_sub(duration).map(|start| SlotKey {
            date: slot.date(),
            facility: slot.facility(),
            court: slot.court(),
            start,
        });
        let after = slot.start().checked_add(duration).map(|start| SlotKey {
            date: slot.date(),
            facility: slot.facility(),
            court: slot.court(),
            start,
        });
        before
            .and_then(|k| schedule.game_at(&k))
            .into_iter()
            .chain(after.and_then(|k| schedule.game_at(&k)))
    }

    /// The whole-schedule soft objective.
    pub fn soft_score(&self, schedule: &Schedule) -> Score {
        let rules = self.problem.rules();
        let w = &rules.priority_weights;
        let mut score = Score::ZERO;

        for game in schedule.games() {
            let home = self.team(game.home());
            let away = self.team(game.away());

            if let (Some(ch), Some(ca)) =
                (self.effective_cluster(home), self.effective_cluster(away))
            {
                if ch == ca {
                    score += Score::reward(w.geographic_cluster, 1);
                }
            }
            score += rules
                .tier_shape
                .reward(w.tier_matching, home.tier(), away.tier());
            if is_weeknight(game.slot().date()) {
                score += Score::reward(w.weeknight_fill, 1);
            }
            if home.home_facility() == Some(game.slot().facility()) {
                score += Score::reward(w.host_home, 1);
            }
            if home.avoids(game.away()) {
                // The large penalty for a forced do-not-play pairing.
                score += Score::penalty(w.do_not_play, 100);
            }
        }

        // Rival pairings realized, rewarded once per pair.
        let mut rewarded: BTreeSet<TeamPair> = BTreeSet::new();
        for game in schedule.games() {
            let pair = game.pair();
            if rewarded.contains(&pair) {
                continue;
            }
            if self.team(game.home()).is_rival_of(game.away()) {
                score += Score::reward(w.rival_matchup, 1);
                rewarded.insert(pair);
            }
        }

        // Home/away balance penalty per team.
        for team in self.problem.teams().iter() {
            let mut home = 0u32;
            let mut away = 0u32;
            for game in schedule.games_for(team.id()) {
                if game.is_home_game_for(team.id()) {
                    home += 1;
                } else {
                    away += 1;
                }
            }
            score += Score::penalty(w.home_away_balance, home.abs_diff(away));
        }

        score += self.school_clustering_reward(schedule);
        score += self.coach_clustering_reward(schedule);
        score
    }

    /// Reward each school pairing whose games on a date form one
    /// contiguous run on a single court.
    fn school_clustering_reward(&self, schedule: &Schedule) -> Score {
        let w = &self.problem.rules().priority_weights;
        let mut by_pairing: BTreeMap<(SchoolIdentifier, SchoolIdentifier, NaiveDate), Vec<&Game>> =
            BTreeMap::new();
        for game in schedule.games() {
            let (sa, sb) = (
                self.team(game.home()).school(),
                self.team(game.away()).school(),
            );
            let key = if sa <= sb { (sa, sb) } else { (sb, sa) };
            by_pairing
                .entry((key.0, key.1, game.slot().date()))
                .or_default()
                .push(game);
        }

        let mut score = Score::ZERO;
        for games in by_pairing.values() {
            if games.len() < 2 {
                continue;
            }
            let first = games[0].slot();
            let same_court = games
                .iter()
                .all(|g| {
                    g.slot().facility() == first.facility() && g.slot().court() == first.court()
                });
            if !same_court {
                continue;
            }
            let mut starts: Vec<_> = games.iter().map(|g| g.slot()).collect();
            starts.sort_by_key(|s| s.start());
            let contiguous = starts.windows(2).all(|p| p[0].end() == p[1].start());
            if contiguous {
                score += Score::reward(w.school_clustering, 1);
            }
        }
        score
    }

    /// Reward adjacent same-court placements of games sharing a coach.
    fn coach_clustering_reward(&self, schedule: &Schedule) -> Score {
        let w = &self.problem.rules().priority_weights;
        let mut by_coach: BTreeMap<(CoachIdentifier, NaiveDate), Vec<&Game>> = BTreeMap::new();
        for game in schedule.games() {
            let date = game.slot().date();
            for coach in [self.team(game.home()).coach(), self.team(game.away()).coach()] {
                let entry = by_coach.entry((coach, date)).or_default();
                if !entry.iter().any(|g| g.id() == game.id()) {
                    entry.push(game);
                }
            }
        }

        let mut score = Score::ZERO;
        for games in by_coach.values() {
            if games.len() < 2 {
                continue;
            }
            let mut slots: Vec<_> = games.iter().map(|g| g.slot()).collect();
            slots.sort_by_key(|s| (s.facility(), s.court(), s.start()));
            for pair in slots.windows(2) {
                if pair[0].facility() == pair[1].facility()
                    && pair[0].court() == pair[1].court()
                    && pair[0].end() == pair[1].start()
                {
                    score += Score::reward(w.coach_clustering, 1);
                }
            }
        }
        score
    }

    /// Per-team season statistics.
    pub fn team_stats(&self, schedule: &Schedule) -> BTreeMap<TeamIdentifier, TeamStats> {
        let season_start = self.problem.rules().season_start;
        let mut stats: BTreeMap<TeamIdentifier, TeamStats> = BTreeMap::new();
        for team in self.problem.teams().iter() {
            let mut entry = TeamStats::default();
            for game in schedule.games_for(team.id()) {
                entry.games += 1;
                if game.is_home_game_for(team.id()) {
                    entry.home += 1;
                } else {
                    entry.away += 1;
                }
                entry.divisions_present.insert(game.division());
                let week = (game.slot().date() - season_start).num_days().div_euclid(7);
                *entry.games_by_week.entry(week).or_default() += 1;
            }
            entry.doubleheaders = doubleheader_dates(schedule, team.id()).len() as u32;
            stats.insert(team.id(), entry);
        }
        stats
    }

    /// Full revalidation of a frozen schedule. Violations excused by a
    /// recorded relaxation stay out of `hard_violations`; everything
    /// else lands there.
    #[tracing::instrument(level = "debug", skip(self, schedule))]
    pub fn validate(&self, schedule: &Schedule) -> ValidationReport {
        let rules = self.problem.rules();
        let relaxations = schedule.relaxations();
        let mut report = ValidationReport::new();
        report.relaxations = relaxations.to_vec();

        let excused = |rule: RuleId, slot: &SlotKey, team: TeamIdentifier| {
            relaxations.iter().any(|r| r.excuses(rule, slot, team))
        };

        // Court double-booking.
        let mut by_court: BTreeMap<(FacilityIdentifier, u32, NaiveDate), Vec<&Game>> =
            BTreeMap::new();
        for game in schedule.games() {
            let s = game.slot();
            by_court
                .entry((s.facility(), s.court(), s.date()))
                .or_default()
                .push(game);
        }
        for games in by_court.values() {
            for (i, a) in games.iter().enumerate() {
                for b in games.iter().skip(i + 1) {
                    if a.slot().interval().overlaps(&b.slot().interval()) {
                        report.hard_violations.push(HardViolation {
                            rule: RuleId::SlotConflict,
                            description: format!(
                                "two games share {}",
                                a.slot()
                            ),
                            games: vec![a.id(), b.id()],
                            teams: vec![a.home(), a.away(), b.home(), b.away()],
                        });
                    }
                }
            }
        }

        // Per-game structural rules.
        for game in schedule.games() {
            let home = self.team(game.home());
            let away = self.team(game.away());
            let slot = game.slot();

            if home.school() == away.school() {
                report.hard_violations.push(HardViolation {
                    rule: RuleId::SameSchoolMatchup,
                    description: format!("{} matches two teams of one school", game.id()),
                    games: vec![game.id()],
                    teams: vec![game.home(), game.away()],
                });
            }
            if !facility_eligible(self.facility(slot.facility()), game.division()) {
                report.hard_violations.push(HardViolation {
                    rule: RuleId::FacilityEligibility,
                    description: format!(
                        "{} hosts {} without the required rims",
                        slot.facility(),
                        game.division()
                    ),
                    games: vec![game.id()],
                    teams: vec![game.home(), game.away()],
                });
            }
            if !rules.is_playable(slot.date())
                || !self.facility(slot.facility()).is_available(slot.date())
                || !self.problem.school_open_on(home.school(), slot.date())
                || !self.problem.school_open_on(away.school(), slot.date())
            {
                report.hard_violations.push(HardViolation {
                    rule: RuleId::ExcludedDate,
                    description: format!("{} falls on an excluded date {}", game.id(), slot.date()),
                    games: vec![game.id()],
                    teams: vec![game.home(), game.away()],
                });
            }
            if home.avoids(game.away())
                && !excused(RuleId::DoNotPlay, &slot.key(), game.home())
            {
                report.hard_violations.push(HardViolation {
                    rule: RuleId::DoNotPlay,
                    description: format!(
                        "{} pairs do-not-play teams {} and {}",
                        game.id(),
                        game.home(),
                        game.away()
                    ),
                    games: vec![game.id()],
                    teams: vec![game.home(), game.away()],
                });
            }
        }

        // Team and school simultaneity, by date.
        let dates: BTreeSet<NaiveDate> =
            schedule.games().iter().map(|g| g.slot().date()).collect();
        for &date in &dates {
            let games: Vec<&Game> = schedule.games_on(date).collect();
            for (i, a) in games.iter().enumerate() {
                for b in games.iter().skip(i + 1) {
                    if !a.slot().interval().overlaps(&b.slot().interval()) {
                        continue;
                    }
                    for team in [a.home(), a.away()] {
                        if b.involves(team) {
                            report.hard_violations.push(HardViolation {
                                rule: RuleId::TeamTimeOverlap,
                                description: format!(
                                    "{} plays two overlapping games on {}",
                                    team, date
                                ),
                                games: vec![a.id(), b.id()],
                                teams: vec![team],
                            });
                        }
                    }
                    let schools_a: BTreeSet<SchoolIdentifier> = [a.home(), a.away()]
                        .into_iter()
                        .map(|t| self.team(t).school())
                        .collect();
                    let overlap_school = [b.home(), b.away()]
                        .into_iter()
                        .map(|t| self.team(t).school())
                        .find(|s| schools_a.contains(s));
                    let involves_same_team =
                        b.involves(a.home()) || b.involves(a.away());
                    if let (Some(school), false) = (overlap_school, involves_same_team) {
                        report.hard_violations.push(HardViolation {
                            rule: RuleId::SchoolSimultaneity,
                            description: format!(
                                "{} has two teams playing at the same time on {}",
                                school, date
                            ),
                            games: vec![a.id(), b.id()],
                            teams: vec![a.home(), a.away(), b.home(), b.away()],
                        });
                    }
                }
            }
        }

        // Rematch cap per pair.
        let mut pairs: BTreeMap<TeamPair, Vec<GameIdentifier>> = BTreeMap::new();
        for game in schedule.games() {
            pairs.entry(game.pair()).or_default().push(game.id());
        }
        for (pair, games) in &pairs {
            if games.len() as u32 > rules.max_rematches {
                let pair_excused = relaxations
                    .iter()
                    .any(|r| r.rule == RuleId::RematchCap && r.teams == *pair);
                if !pair_excused {
                    report.hard_violations.push(HardViolation {
                        rule: RuleId::RematchCap,
                        description: format!(
                            "pair {} meets {} times (cap {})",
                            pair,
                            games.len(),
                            rules.max_rematches
                        ),
                        games: games.clone(),
                        teams: vec![pair.lo(), pair.hi()],
                    });
                }
            }
        }

        // Frequency caps and doubleheader rules, per team.
        for team in self.problem.teams().iter() {
            let id = team.id();
            let team_games: Vec<&Game> = schedule.games_for(id).collect();
            if team_games.is_empty() {
                continue;
            }
            let mut team_dates: Vec<NaiveDate> =
                team_games.iter().map(|g| g.slot().date()).collect();
            team_dates.sort();

            for (window, cap, rule) in [
                (7i64, rules.max_games_per_7_days, RuleId::FrequencyCap7Days),
                (
                    14,
                    rules.max_games_per_14_days,
                    RuleId::FrequencyCap14Days,
                ),
            ] {
                for &window_start in &team_dates {
                    let in_window = |d: NaiveDate| {
                        d >= window_start && (d - window_start).num_days() < window
                    };
                    let count = team_dates.iter().filter(|&&d| in_window(d)).count() as u32;
                    if count > cap {
                        let any_excused = team_games.iter().any(|g| {
                            in_window(g.slot().date())
                                && excused(rule, &g.slot().key(), id)
                        });
                        if !any_excused {
                            report.hard_violations.push(HardViolation {
                                rule,
                                description: format!(
                                    "{} has {} games in the {} days from {}",
                                    id, count, window, window_start
                                ),
                                games: Vec::new(),
                                teams: vec![id],
                            });
                        }
                        break; // one report per team and rule
                    }
                }
            }

            let dh_dates = doubleheader_dates(schedule, id);
            if dh_dates.len() as u32 > rules.max_doubleheaders_per_season {
                let any_excused = team_games
                    .iter()
                    .any(|g| excused(RuleId::DoubleheaderCap, &g.slot().key(), id));
                if !any_excused {
                    report.hard_violations.push(HardViolation {
                        rule: RuleId::DoubleheaderCap,
                        description: format!(
                            "{} has {} doubleheader dates (cap {})",
                            id,
                            dh_dates.len(),
                            rules.max_doubleheaders_per_season
                        ),
                        games: Vec::new(),
                        teams: vec![id],
                    });
                }
            }
            for &date in &dh_dates {
                let mut same_day: Vec<&&Game> = team_games
                    .iter()
                    .filter(|g| g.slot().date() == date)
                    .collect();
                same_day.sort_by_key(|g| g.slot().start());
                for pair in same_day.windows(2) {
                    let (first, second) = (pair[0], pair[1]);
                    if second.slot().start() < first.slot().end() {
                        continue; // overlap already reported
                    }
                    let gap = second.slot().start() - first.slot().end();
                    let pair_excused = excused(RuleId::DoubleheaderBreak, &second.slot().key(), id)
                        || excused(RuleId::DoubleheaderBreak, &first.slot().key(), id);
                    if gap < rules.doubleheader_break && !pair_excused {
                        report.hard_violations.push(HardViolation {
                            rule: RuleId::DoubleheaderBreak,
                            description: format!(
                                "{} doubleheader on {} has only {} of rest",
                                id, date, gap
                            ),
                            games: vec![first.id(), second.id()],
                            teams: vec![id],
                        });
                    }
                }
            }
        }

        report.soft_score = self.soft_score(schedule);
        report.per_team_stats = self.team_stats(schedule);
        report
    }
}

/// Dates on which `team` plays more than once.
pub fn doubleheader_dates(schedule: &Schedule, team: TeamIdentifier) -> BTreeSet<NaiveDate> {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for game in schedule.games_for(team) {
        *counts.entry(game.slot().date()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(d, _)| d)
        .collect()
}

/// Whether any rolling window of `window_days` consecutive days holds
/// more than `cap` of the (sorted) dates.
fn exceeds_window(dates: &[NaiveDate], window_days: i64, cap: u32) -> bool {
    for (i, &start) in dates.iter().enumerate() {
        let count = dates[i..]
            .iter()
            .take_while(|&&d| (d - start).num_days() < window_days)
            .count() as u32;
        if count > cap {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_sched_model::problem::school::Tier;
    use league_sched_model::problem::team::TeamContainer;

    #[inline]
    fn tid(n: u32) -> TeamIdentifier {
        TeamIdentifier::new(n)
    }
    #[inline]
    fn sid(n: u32) -> SchoolIdentifier {
        SchoolIdentifier::new(n)
    }
    #[inline]
    fn fid(n: u32) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }
    #[inline]
    fn cid(n: u32) -> CoachIdentifier {
        CoachIdentifier::new(n)
    }
    #[inline]
    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }
    fn slot(fac: u32, court: u32, day: u32, h: i32) -> TimeSlot {
        TimeSlot::new(
            fid(fac),
            court,
            d(day),
            league_sched_core::prelude::ClockTime::from_hm(h, 0),
            league_sched_core::prelude::ClockTime::from_hm(h + 1, 0),
        )
    }
    fn game(id: u32, home: u32, away: u32, division: Division, s: TimeSlot) -> Game {
        Game::new(GameIdentifier::new(id), tid(home), tid(away), division, s, false)
    }

    /// Four schools, two divisions each, two facilities (one short-rim).
    fn fixture() -> Problem {
        let mut teams = TeamContainer::new();
        let mut next = 1u32;
        for school in 1..=4u32 {
            for division in [Division::BoysJv, Division::EsK1Rec] {
                let mut team = Team::new(
                    tid(next),
                    format!("S{school} {division}"),
                    sid(school),
                    division,
                    cid(school),
                    Tier::Two,
                );
                if school == 1 {
                    team = team.with_home_facility(fid(1));
                }
                teams.insert(team);
                next += 1;
            }
        }
        let schools = (1..=4)
            .map(|n| School::new(sid(n), format!("School {n}")).with_cluster(Cluster::East))
            .collect();
        let facilities = [
            Facility::new(fid(1), "Main", 2),
            Facility::new(fid(2), "Short", 1).with_short_rims(true),
        ]
        .into_iter()
        .collect();
        Problem::new(Rules::default(), teams, schools, facilities).unwrap()
    }

    // Fixture team ids: school s fields BoysJv at 2s-1, EsK1Rec at 2s.

    #[test]
    fn test_clean_candidate_has_no_violations() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let schedule = Schedule::new();
        let c = Candidate {
            a: tid(1),
            b: tid(3),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 17),
        };
        assert!(eval.violations_for(&schedule, &c, 2).is_empty());
    }

    #[test]
    fn test_same_school_and_short_rims() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let schedule = Schedule::new();

        let same_school = Candidate {
            a: tid(1),
            b: tid(2),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 17),
        };
        assert!(eval
            .violations_for(&schedule, &same_school, 2)
            .contains(&RuleId::SameSchoolMatchup));

        let k1_at_tall_rims = Candidate {
            a: tid(2),
            b: tid(4),
            division: Division::EsK1Rec,
            slot: slot(1, 1, 7, 17),
        };
        assert!(eval
            .violations_for(&schedule, &k1_at_tall_rims, 2)
            .contains(&RuleId::FacilityEligibility));

        let k1_at_short_rims = Candidate {
            a: tid(2),
            b: tid(4),
            division: Division::EsK1Rec,
            slot: slot(2, 1, 7, 17),
        };
        assert!(eval
            .violations_for(&schedule, &k1_at_short_rims, 2)
            .is_empty());
    }

    #[test]
    fn test_excluded_dates() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let schedule = Schedule::new();
        // Sunday Jan 11 and MLK Day Jan 19.
        for day in [11, 19] {
            let c = Candidate {
                a: tid(1),
                b: tid(3),
                division: Division::BoysJv,
                slot: slot(1, 1, day, 17),
            };
            assert!(eval
                .violations_for(&schedule, &c, 2)
                .contains(&RuleId::ExcludedDate));
        }
    }

    #[test]
    fn test_slot_team_and_school_overlaps() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();
        schedule.push_game(game(0, 1, 3, Division::BoysJv, slot(1, 1, 7, 17)));

        // Same court, same time.
        let same_court = Candidate {
            a: tid(5),
            b: tid(7),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 17),
        };
        let v = eval.violations_for(&schedule, &same_court, 2);
        assert!(v.contains(&RuleId::SlotConflict));

        // Other court, same time, but team 1 is already on the floor.
        let busy_team = Candidate {
            a: tid(1),
            b: tid(5),
            division: Division::BoysJv,
            slot: slot(1, 2, 7, 17),
        };
        let v = eval.violations_for(&schedule, &busy_team, 2);
        assert!(v.contains(&RuleId::TeamTimeOverlap));

        // Other court, same time, sibling team of school 1 (team 2).
        let sibling = Candidate {
            a: tid(2),
            b: tid(6),
            division: Division::EsK1Rec,
            slot: slot(1, 2, 7, 17),
        };
        let v = eval.violations_for(&schedule, &sibling, 2);
        assert!(v.contains(&RuleId::SchoolSimultaneity));
        assert!(!v.contains(&RuleId::TeamTimeOverlap));

        // Next slot on the same court is clean.
        let next_slot = Candidate {
            a: tid(5),
            b: tid(7),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 18),
        };
        assert!(eval.violations_for(&schedule, &next_slot, 2).is_empty());
    }

    #[test]
    fn test_do_not_play_and_rematch_cap() {
        let mut teams = TeamContainer::new();
        teams.insert(
            Team::new(tid(1), "A", sid(1), Division::BoysJv, cid(1), Tier::One)
                .with_do_not_play([tid(3)]),
        );
        teams.insert(Team::new(tid(2), "B", sid(2), Division::BoysJv, cid(2), Tier::One));
        teams.insert(
            Team::new(tid(3), "C", sid(3), Division::BoysJv, cid(3), Tier::One)
                .with_do_not_play([tid(1)]),
        );
        let schools = (1..=3).map(|n| School::new(sid(n), format!("S{n}"))).collect();
        let facilities = [Facility::new(fid(1), "Gym", 1)].into_iter().collect();
        let p = Problem::new(Rules::default(), teams, schools, facilities).unwrap();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();

        let dnp = Candidate {
            a: tid(1),
            b: tid(3),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 17),
        };
        assert!(eval
            .violations_for(&schedule, &dnp, 2)
            .contains(&RuleId::DoNotPlay));

        // Two meetings recorded: a third is over the cap.
        schedule.push_game(game(0, 1, 2, Division::BoysJv, slot(1, 1, 7, 17)));
        schedule.push_game(game(1, 1, 2, Division::BoysJv, slot(1, 1, 14, 17)));
        let rematch = Candidate {
            a: tid(1),
            b: tid(2),
            division: Division::BoysJv,
            slot: slot(1, 1, 28, 17),
        };
        assert!(eval
            .violations_for(&schedule, &rematch, 2)
            .contains(&RuleId::RematchCap));
        // A raised cap tolerates it.
        assert!(!eval
            .violations_for(&schedule, &rematch, 3)
            .contains(&RuleId::RematchCap));
    }

    #[test]
    fn test_frequency_caps() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();
        // Two games in the same week for team 1.
        schedule.push_game(game(0, 1, 3, Division::BoysJv, slot(1, 1, 5, 17)));
        schedule.push_game(game(1, 1, 5, Division::BoysJv, slot(1, 1, 8, 17)));

        // A third inside the 7-day window breaks the cap of two.
        let third = Candidate {
            a: tid(1),
            b: tid(7),
            division: Division::BoysJv,
            slot: slot(1, 1, 10, 10),
        };
        assert!(eval
            .violations_for(&schedule, &third, 2)
            .contains(&RuleId::FrequencyCap7Days));

        // Outside the 7-day window but within 14 days the cap of three
        // still has room.
        let later = Candidate {
            a: tid(1),
            b: tid(7),
            division: Division::BoysJv,
            slot: slot(1, 1, 13, 17),
        };
        let v = eval.violations_for(&schedule, &later, 2);
        assert!(!v.contains(&RuleId::FrequencyCap7Days));
        assert!(!v.contains(&RuleId::FrequencyCap14Days));
    }

    #[test]
    fn test_doubleheader_rules() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();
        schedule.push_game(game(0, 1, 3, Division::BoysJv, slot(1, 1, 10, 8)));

        // Back-to-back same-day game: break is too short.
        let no_break = Candidate {
            a: tid(1),
            b: tid(5),
            division: Division::BoysJv,
            slot: slot(1, 1, 10, 9),
        };
        assert!(eval
            .violations_for(&schedule, &no_break, 2)
            .contains(&RuleId::DoubleheaderBreak));

        // A 60-minute break satisfies the rule (first doubleheader).
        let with_break = Candidate {
            a: tid(1),
            b: tid(5),
            division: Division::BoysJv,
            slot: slot(1, 1, 10, 10),
        };
        let v = eval.violations_for(&schedule, &with_break, 2);
        assert!(!v.contains(&RuleId::DoubleheaderBreak));
        assert!(!v.contains(&RuleId::DoubleheaderCap));

        // A second doubleheader date exceeds the season cap of one.
        schedule.push_game(game(1, 1, 5, Division::BoysJv, slot(1, 1, 10, 10)));
        schedule.push_game(game(2, 1, 7, Division::BoysJv, slot(1, 1, 24, 8)));
        let second_dh = Candidate {
            a: tid(1),
            b: tid(3),
            division: Division::BoysJv,
            slot: slot(1, 1, 24, 10),
        };
        assert!(eval
            .violations_for(&schedule, &second_dh, 3)
            .contains(&RuleId::DoubleheaderCap));
    }

    #[test]
    fn test_validate_reports_and_excuses() {
        let p = fixture();
        let eval = Evaluator::new(&p);

        let mut schedule = Schedule::new();
        // Do-not-play pairing is not in the fixture; craft a same-school
        // game instead plus a slot conflict.
        schedule.push_game(game(0, 1, 2, Division::BoysJv, slot(1, 1, 7, 17)));
        schedule.push_game(game(1, 3, 5, Division::BoysJv, slot(1, 1, 7, 17)));
        schedule.freeze();

        let report = eval.validate(&schedule);
        let rules_hit: BTreeSet<_> =
            report.hard_violations.iter().map(|v| v.rule).collect();
        assert!(rules_hit.contains(&RuleId::SameSchoolMatchup));
        assert!(rules_hit.contains(&RuleId::SlotConflict));
    }

    #[test]
    fn test_validate_excuses_recorded_relaxation() {
        let mut teams = TeamContainer::new();
        teams.insert(
            Team::new(tid(1), "A", sid(1), Division::BoysJv, cid(1), Tier::One)
                .with_do_not_play([tid(2)]),
        );
        teams.insert(
            Team::new(tid(2), "B", sid(2), Division::BoysJv, cid(2), Tier::One)
                .with_do_not_play([tid(1)]),
        );
        let schools = (1..=2).map(|n| School::new(sid(n), format!("S{n}"))).collect();
        let facilities = [Facility::new(fid(1), "Gym", 1)].into_iter().collect();
        let p = Problem::new(Rules::default(), teams, schools, facilities).unwrap();
        let eval = Evaluator::new(&p);

        let s = slot(1, 1, 7, 17);
        let mut schedule = Schedule::new();
        schedule.push_game(game(0, 1, 2, Division::BoysJv, s));
        schedule.record_relaxation(Relaxation {
            rule: RuleId::DoNotPlay,
            pass: 16,
            slot: s.key(),
            teams: TeamPair::new(tid(1), tid(2)),
        });
        schedule.freeze();

        let report = eval.validate(&schedule);
        assert!(report
            .hard_violations
            .iter()
            .all(|v| v.rule != RuleId::DoNotPlay));
        assert_eq!(report.relaxations.len(), 1);
        // The forced pairing still costs its soft penalty.
        assert!(report.soft_score < Score::ZERO);
    }

    #[test]
    fn test_soft_score_rewards_clustered_schedule() {
        let p = fixture();
        let eval = Evaluator::new(&p);

        // School 1 vs school 2 on one court back to back (both
        // divisions), a clean block.
        let mut clustered = Schedule::new();
        clustered.push_game(game(0, 1, 3, Division::BoysJv, slot(2, 1, 7, 17)));
        clustered.push_game(game(1, 2, 4, Division::EsK1Rec, slot(2, 1, 7, 18)));

        // The same games scattered over two dates.
        let mut scattered = Schedule::new();
        scattered.push_game(game(0, 1, 3, Division::BoysJv, slot(2, 1, 7, 17)));
        scattered.push_game(game(1, 2, 4, Division::EsK1Rec, slot(2, 1, 9, 18)));

        assert!(eval.soft_score(&clustered) > eval.soft_score(&scattered));
    }

    #[test]
    fn test_team_stats() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();
        schedule.push_game(game(0, 1, 3, Division::BoysJv, slot(1, 1, 7, 17)));
        schedule.push_game(game(1, 5, 1, Division::BoysJv, slot(1, 1, 14, 17)));
        schedule.freeze();

        let stats = eval.team_stats(&schedule);
        let s1 = &stats[&tid(1)];
        assert_eq!(s1.games, 2);
        assert_eq!(s1.home, 1);
        assert_eq!(s1.away, 1);
        assert_eq!(s1.doubleheaders, 0);
        assert_eq!(s1.balance(), 0);
        assert!(s1.divisions_present.contains(&Division::BoysJv));
        assert_eq!(s1.games_by_week.len(), 2);
        assert_eq!(stats[&tid(7)].games, 0);
    }

    #[test]
    fn test_delta_flags_hard_and_scores() {
        let p = fixture();
        let eval = Evaluator::new(&p);
        let mut schedule = Schedule::new();
        schedule.push_game(game(0, 1, 3, Division::BoysJv, slot(1, 1, 7, 17)));

        // Two clean weeknight candidates at the short-rim site score
        // identically: same matchup, same slot preference, no neighbor
        // on either court.
        let wednesday = Candidate {
            a: tid(2),
            b: tid(4),
            division: Division::EsK1Rec,
            slot: slot(2, 1, 7, 18),
        };
        let friday = Candidate {
            a: tid(2),
            b: tid(4),
            division: Division::EsK1Rec,
            slot: slot(2, 1, 9, 17),
        };
        let (ok_a, score_a) = eval.delta(&schedule, &wednesday, 2);
        let (ok_b, score_b) = eval.delta(&schedule, &friday, 2);
        assert!(ok_a && ok_b);
        assert_eq!(score_a, score_b);
        assert!(score_a > Score::ZERO);

        // A hard violation flips the flag but still scores.
        let conflicting = Candidate {
            a: tid(5),
            b: tid(7),
            division: Division::BoysJv,
            slot: slot(1, 1, 7, 17),
        };
        let (ok_c, _) = eval.delta(&schedule, &conflicting, 2);
        assert!(!ok_c);
    }

    #[test]
    fn test_exceeds_window_helper() {
        let dates = [d(5), d(8), d(10)];
        assert!(exceeds_window(&dates, 7, 2));
        assert!(!exceeds_window(&dates, 7, 3));
        assert!(!exceeds_window(&[d(5), d(12)], 7, 1));
        assert!(exceeds_window(&[d(5), d(11)], 7, 1));
    }
}
