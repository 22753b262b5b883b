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

//! What a generation run reports back.
//!
//! The engine never raises for data-driven infeasibility; everything a
//! caller needs to judge a schedule (hard violations, recorded
//! relaxations, soft score, per-team statistics, shortfalls) travels in
//! the [`ValidationReport`].

use crate::problem::division::Division;
use crate::problem::slot::SlotKey;
use crate::problem::team::{TeamIdentifier, TeamPair};
use crate::solution::game::GameIdentifier;
use league_sched_core::prelude::Score;
use std::collections::{BTreeMap, BTreeSet};

/// The scheduling rules a schedule can break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub enum RuleId {
    /// Two games in one court-slot.
    SlotConflict,
    /// One team in two games at overlapping times.
    TeamTimeOverlap,
    /// More games in a rolling 7-day window than allowed.
    FrequencyCap7Days,
    /// More games in a rolling 14-day window than allowed.
    FrequencyCap14Days,
    /// More doubleheader dates in a season than allowed.
    DoubleheaderCap,
    /// Same-day games closer together than the required break.
    DoubleheaderBreak,
    /// A do-not-play pairing was matched.
    DoNotPlay,
    /// A division placed at a facility that cannot host it.
    FacilityEligibility,
    /// A game on a holiday, blacked-out, or otherwise excluded date.
    ExcludedDate,
    /// Two teams of one school matched against each other.
    SameSchoolMatchup,
    /// Two teams of one school playing at the same time.
    SchoolSimultaneity,
    /// A pair of teams meeting more often than the rematch cap.
    RematchCap,
    /// The greedy stage's minimum-gap policy was reduced. Never a
    /// validation failure on its own; exists so relaxations can name it.
    MinimumGap,
}

impl RuleId {
    /// Structural rules are never relaxed, in any pass.
    #[inline]
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            RuleId::SlotConflict
                | RuleId::TeamTimeOverlap
                | RuleId::FacilityEligibility
                | RuleId::ExcludedDate
                | RuleId::SameSchoolMatchup
                | RuleId::SchoolSimultaneity
        )
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RuleId::SlotConflict => "slot_conflict",
            RuleId::TeamTimeOverlap => "team_time_overlap",
            RuleId::FrequencyCap7Days => "frequency_cap_7_days",
            RuleId::FrequencyCap14Days => "frequency_cap_14_days",
            RuleId::DoubleheaderCap => "doubleheader_cap",
            RuleId::DoubleheaderBreak => "doubleheader_break",
            RuleId::DoNotPlay => "do_not_play",
            RuleId::FacilityEligibility => "facility_eligibility",
            RuleId::ExcludedDate => "excluded_date",
            RuleId::SameSchoolMatchup => "same_school_matchup",
            RuleId::SchoolSimultaneity => "school_simultaneity",
            RuleId::RematchCap => "rematch_cap",
            RuleId::MinimumGap => "minimum_gap",
        };
        f.write_str(name)
    }
}

/// A rule knowingly waived for one placement during the greedy stage.
/// Distinguishes "scheduled under relaxation" from "scheduled cleanly".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Relaxation {
    pub rule: RuleId,
    /// Greedy pass that took the liberty (`u32::MAX` = desperate fill).
    pub pass: u32,
    pub slot: SlotKey,
    pub teams: TeamPair,
}

impl Relaxation {
    /// Whether this record excuses a violation of `rule` at `slot`
    /// involving `team`.
    #[inline]
    pub fn excuses(&self, rule: RuleId, slot: &SlotKey, team: TeamIdentifier) -> bool {
        self.rule == rule && self.slot == *slot && self.teams.involves(team)
    }
}

/// A hard-rule violation found by revalidation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HardViolation {
    pub rule: RuleId,
    pub description: String,
    pub games: Vec<GameIdentifier>,
    pub teams: Vec<TeamIdentifier>,
}

/// Why a team ended short of the target game count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ShortfallReason {
    /// No facility in the pool can host the team's division.
    NoEligibleFacility,
    /// Do-not-play rules exclude most of the division.
    DoNotPlaySaturation,
    /// The school's blackout dates dominate the season.
    BlackoutDominance,
    /// Slots exist but other games consumed them.
    SlotContention,
}

impl std::fmt::Display for ShortfallReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortfallReason::NoEligibleFacility => write!(f, "no eligible facility"),
            ShortfallReason::DoNotPlaySaturation => write!(f, "do_not_play saturation"),
            ShortfallReason::BlackoutDominance => {
                write!(f, "blackout_ratio > feasibility_threshold")
            }
            ShortfallReason::SlotContention => write!(f, "slot contention"),
        }
    }
}

/// A team that did not reach the target game count, and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Shortfall {
    pub team: TeamIdentifier,
    pub missing: u32,
    pub reason: ShortfallReason,
}

/// Per-team season statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct TeamStats {
    pub games: u32,
    pub home: u32,
    pub away: u32,
    pub doubleheaders: u32,
    pub divisions_present: BTreeSet<Division>,
    pub games_by_week: BTreeMap<i64, u32>,
}

impl TeamStats {
    /// Home/away imbalance; zero is perfectly balanced.
    #[inline]
    pub fn balance(&self) -> u32 {
        self.home.abs_diff(self.away)
    }
}

/// The full outcome of a generation run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationReport {
    pub hard_violations: Vec<HardViolation>,
    pub relaxations: Vec<Relaxation>,
    pub soft_score: Score,
    pub per_team_stats: BTreeMap<TeamIdentifier, TeamStats>,
    pub shortfalls: Vec<Shortfall>,
    pub cancelled: bool,
    /// Set when the search stage failed abnormally and the greedy stage
    /// carried the run alone.
    pub search_note: Option<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            hard_violations: Vec::new(),
            relaxations: Vec::new(),
            soft_score: Score::ZERO,
            per_team_stats: BTreeMap::new(),
            shortfalls: Vec::new(),
            cancelled: false,
            search_note: None,
        }
    }

    /// A clean run: no hard violations, nobody short, not cancelled.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.hard_violations.is_empty() && self.shortfalls.is_empty() && !self.cancelled
    }

    /// Human-readable season summary.
    pub fn summary(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "schedule report");
        let _ = writeln!(out, "  soft score: {}", self.soft_score);
        let _ = writeln!(out, "  hard violations: {}", self.hard_violations.len());
        for v in &self.hard_violations {
            let _ = writeln!(out, "    [{}] {}", v.rule, v.description);
        }
        let _ = writeln!(out, "  recorded relaxations: {}", self.relaxations.len());
        for r in &self.relaxations {
            let _ = writeln!(
                out,
                "    [{}] pass {} at {} for {}",
                r.rule, r.pass, r.slot, r.teams
            );
        }
        if self.shortfalls.is_empty() {
            let _ = writeln!(out, "  all teams reached their target game count");
        } else {
            let _ = writeln!(out, "  shortfalls: {}", self.shortfalls.len());
            for s in &self.shortfalls {
                let _ = writeln!(
                    out,
                    "    {} short by {} ({})",
                    s.team, s.missing, s.reason
                );
            }
        }
        for (team, stats) in &self.per_team_stats {
            let _ = writeln!(
                out,
                "  {}: {} games ({} home, {} away, {} doubleheaders)",
                team, stats.games, stats.home, stats.away, stats.doubleheaders
            );
        }
        if self.cancelled {
            let _ = writeln!(out, "  run was cancelled; schedule may be partial");
        }
        if let Some(note) = &self.search_note {
            let _ = writeln!(out, "  search stage note: {note}");
        }
        out
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::facility::FacilityIdentifier;
    use chrono::NaiveDate;
    use league_sched_core::prelude::ClockTime;

    #[inline]
    fn tid(n: u32) -> TeamIdentifier {
        TeamIdentifier::new(n)
    }

    fn key() -> SlotKey {
        SlotKey {
            date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
            facility: FacilityIdentifier::new(1),
            court: 1,
            start: ClockTime::from_hm(17, 0),
        }
    }

    #[test]
    fn test_structural_rules() {
        assert!(RuleId::SlotConflict.is_structural());
        assert!(RuleId::SameSchoolMatchup.is_structural());
        assert!(RuleId::SchoolSimultaneity.is_structural());
        assert!(!RuleId::DoNotPlay.is_structural());
        assert!(!RuleId::FrequencyCap7Days.is_structural());
        assert!(!RuleId::RematchCap.is_structural());
    }

    #[test]
    fn test_relaxation_excuses_matching_violation() {
        let r = Relaxation {
            rule: RuleId::DoNotPlay,
            pass: 16,
            slot: key(),
            teams: TeamPair::new(tid(1), tid(2)),
        };
        assert!(r.excuses(RuleId::DoNotPlay, &key(), tid(1)));
        assert!(r.excuses(RuleId::DoNotPlay, &key(), tid(2)));
        assert!(!r.excuses(RuleId::DoNotPlay, &key(), tid(3)));
        assert!(!r.excuses(RuleId::RematchCap, &key(), tid(1)));
        let other = SlotKey {
            court: 2,
            ..key()
        };
        assert!(!r.excuses(RuleId::DoNotPlay, &other, tid(1)));
    }

    #[test]
    fn test_report_cleanliness() {
        let mut report = ValidationReport::new();
        assert!(report.is_clean());
        report.shortfalls.push(Shortfall {
            team: tid(1),
            missing: 2,
            reason: ShortfallReason::SlotContention,
        });
        assert!(!report.is_clean());
    }

    #[test]
    fn test_summary_mentions_shortfall_reason() {
        let mut report = ValidationReport::new();
        report.shortfalls.push(Shortfall {
            team: tid(7),
            missing: 3,
            reason: ShortfallReason::BlackoutDominance,
        });
        let text = report.summary();
        assert!(text.contains("short by 3"));
        assert!(text.contains("blackout_ratio > feasibility_threshold"));
    }

    #[test]
    fn test_report_serializes() {
        let report = ValidationReport::new();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"hard_violations\":[]"));
        assert!(json.contains("\"cancelled\":false"));
    }
}
