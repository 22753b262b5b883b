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

//! The immutable rules bundle.
//!
//! Built once at the start of a generation run, read-only until the run
//! returns. There is deliberately no global configuration anywhere;
//! every component receives the `Rules` value it needs.

use crate::problem::err::RulesError;
use crate::problem::school::Tier;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use league_sched_core::prelude::{ClockDelta, ClockInterval, ClockTime, Score};
use std::collections::BTreeSet;
use std::time::Duration;

/// Soft-preference weights. All rewards and penalties scale linearly
/// with these; a deployer tunes them per league, the defaults are the
/// league office's production numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PriorityWeights {
    /// All games between two schools on one night, one court, back to back.
    pub school_clustering: u32,
    /// Games sharing a coach on one date run consecutively.
    pub coach_clustering: u32,
    /// A required rival pairing was realized.
    pub rival_matchup: u32,
    /// Penalty scale applied when a do-not-play pairing is forced in.
    pub do_not_play: u32,
    /// Closer competitive tiers.
    pub tier_matching: u32,
    /// Same geographic cluster.
    pub geographic_cluster: u32,
    /// Penalty scale per game of home/away imbalance.
    pub home_away_balance: u32,
    /// Prefer weeknight slots over Saturdays.
    pub weeknight_fill: u32,
    /// The hosting school's team takes the home side.
    pub host_home: u32,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            school_clustering: 100,
            coach_clustering: 90,
            rival_matchup: 80,
            do_not_play: 100,
            tier_matching: 70,
            geographic_cluster: 60,
            home_away_balance: 50,
            weeknight_fill: 75,
            host_home: 90,
        }
    }
}

/// How the tier-affinity reward decays with tier distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum TierShape {
    /// Reward equal tiers only.
    Exact,
    /// Full reward at distance zero, losing a quarter per tier step.
    #[default]
    Linear,
}

impl TierShape {
    #[inline]
    pub fn reward(self, weight: u32, a: Tier, b: Tier) -> Score {
        let d = a.distance(b) as u32;
        match self {
            TierShape::Exact => {
                if d == 0 {
                    Score::reward(weight, 1)
                } else {
                    Score::ZERO
                }
            }
            TierShape::Linear => Score::reward(weight.saturating_sub(weight / 4 * d), 1),
        }
    }
}

/// Season-wide scheduling rules. See [`Rules::default`] for the league
/// defaults this engine ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub season_start: NaiveDate,
    pub season_end: NaiveDate,
    pub holidays: BTreeSet<NaiveDate>,
    pub play_on_sunday: bool,
    pub game_duration: ClockDelta,
    pub weeknight_window: ClockInterval,
    pub saturday_window: ClockInterval,
    pub target_games_per_team: u32,
    pub max_games_per_7_days: u32,
    pub max_games_per_14_days: u32,
    pub max_rematches: u32,
    pub max_doubleheaders_per_season: u32,
    pub doubleheader_break: ClockDelta,
    pub priority_weights: PriorityWeights,
    pub tier_shape: TierShape,
    /// Wall-clock budget for the first optimizer stage.
    pub cp_time_budget: Duration,
    /// Fixed worker pool size for the first optimizer stage.
    pub search_workers: usize,
    /// Deterministic restart budget per search worker.
    pub search_restarts: usize,
    pub greedy_max_passes: u32,
}

impl Default for Rules {
    fn default() -> Self {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid rule date");
        Self {
            season_start: ymd(2026, 1, 5),
            season_end: ymd(2026, 2, 28),
            // MLK Day and Presidents' Day.
            holidays: [ymd(2026, 1, 19), ymd(2026, 2, 16)].into_iter().collect(),
            play_on_sunday: false,
            game_duration: ClockDelta::from_minutes(60),
            weeknight_window: ClockInterval::new(
                ClockTime::from_hm(17, 0),
                ClockTime::from_hm(20, 30),
            ),
            saturday_window: ClockInterval::new(
                ClockTime::from_hm(8, 0),
                ClockTime::from_hm(18, 0),
            ),
            target_games_per_team: 8,
            max_games_per_7_days: 2,
            max_games_per_14_days: 3,
            max_rematches: 2,
            max_doubleheaders_per_season: 1,
            doubleheader_break: ClockDelta::from_minutes(60),
            priority_weights: PriorityWeights::default(),
            tier_shape: TierShape::default(),
            cp_time_budget: Duration::from_secs(30),
            search_workers: 4,
            search_restarts: 4,
            greedy_max_passes: 20,
        }
    }
}

impl Rules {
    /// Structural sanity of the bundle itself; runs before any search.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.season_end < self.season_start {
            return Err(RulesError::SeasonInverted {
                start: self.season_start,
                end: self.season_end,
            });
        }
        if !self.game_duration.is_positive() {
            return Err(RulesError::NonPositiveGameDuration);
        }
        if self.weeknight_window.is_empty() {
            return Err(RulesError::EmptyWindow { saturday: false });
        }
        if self.saturday_window.is_empty() {
            return Err(RulesError::EmptyWindow { saturday: true });
        }
        if self.target_games_per_team == 0 {
            return Err(RulesError::ZeroTargetGames);
        }
        if self.max_games_per_7_days == 0 || self.max_games_per_14_days == 0 {
            return Err(RulesError::ZeroFrequencyCap);
        }
        if self.greedy_max_passes == 0 {
            return Err(RulesError::ZeroPasses);
        }
        if self.search_workers == 0 {
            return Err(RulesError::ZeroWorkers);
        }
        Ok(())
    }

    /// The play window that applies on `date`, or `None` if the league
    /// calendar excludes the date (holiday, Sunday, off-season).
    pub fn window_for(&self, date: NaiveDate) -> Option<ClockInterval> {
        if date < self.season_start || date > self.season_end {
            return None;
        }
        if self.holidays.contains(&date) {
            return None;
        }
        match date.weekday() {
            Weekday::Sat => Some(self.saturday_window),
            Weekday::Sun => self.play_on_sunday.then_some(self.saturday_window),
            _ => Some(self.weeknight_window),
        }
    }

    /// Whether any games may happen on `date`.
    #[inline]
    pub fn is_playable(&self, date: NaiveDate) -> bool {
        self.window_for(date).is_some()
    }

    /// Every date of the season, inclusive, in order.
    pub fn season_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let mut current = Some(self.season_start);
        let end = self.season_end;
        std::iter::from_fn(move || {
            let date = current?;
            if date > end {
                return None;
            }
            current = date.checked_add_days(Days::new(1));
            Some(date)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_defaults_are_the_league_constants() {
        let r = Rules::default();
        assert_eq!(r.season_start, d(2026, 1, 5));
        assert_eq!(r.season_end, d(2026, 2, 28));
        assert_eq!(r.target_games_per_team, 8);
        assert_eq!(r.max_games_per_7_days, 2);
        assert_eq!(r.max_games_per_14_days, 3);
        assert_eq!(r.max_doubleheaders_per_season, 1);
        assert_eq!(r.game_duration.minutes(), 60);
        assert!(r.holidays.contains(&d(2026, 1, 19)));
        assert!(!r.play_on_sunday);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_window_for_weekday_kinds() {
        let r = Rules::default();
        // 2026-01-07 is a Wednesday, 2026-01-10 a Saturday, 2026-01-11 a Sunday.
        assert_eq!(r.window_for(d(2026, 1, 7)), Some(r.weeknight_window));
        assert_eq!(r.window_for(d(2026, 1, 10)), Some(r.saturday_window));
        assert_eq!(r.window_for(d(2026, 1, 11)), None);
        // Holiday (MLK Day, a Monday).
        assert_eq!(r.window_for(d(2026, 1, 19)), None);
        // Out of season.
        assert_eq!(r.window_for(d(2026, 3, 1)), None);
    }

    #[test]
    fn test_sunday_play_can_be_enabled() {
        let r = Rules {
            play_on_sunday: true,
            ..Rules::default()
        };
        assert_eq!(r.window_for(d(2026, 1, 11)), Some(r.saturday_window));
    }

    #[test]
    fn test_validate_rejects_inverted_season() {
        let r = Rules {
            season_start: d(2026, 2, 1),
            season_end: d(2026, 1, 1),
            ..Rules::default()
        };
        assert!(matches!(
            r.validate(),
            Err(RulesError::SeasonInverted { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_degenerate_knobs() {
        let base = Rules::default();
        let broken = [
            Rules {
                game_duration: ClockDelta::ZERO,
                ..base.clone()
            },
            Rules {
                target_games_per_team: 0,
                ..base.clone()
            },
            Rules {
                max_games_per_7_days: 0,
                ..base.clone()
            },
            Rules {
                greedy_max_passes: 0,
                ..base.clone()
            },
            Rules {
                search_workers: 0,
                ..base.clone()
            },
        ];
        for r in broken {
            assert!(r.validate().is_err());
        }
    }

    #[test]
    fn test_season_days_is_inclusive_and_ordered() {
        let r = Rules {
            season_start: d(2026, 1, 5),
            season_end: d(2026, 1, 8),
            ..Rules::default()
        };
        let days: Vec<_> = r.season_days().collect();
        assert_eq!(
            days,
            vec![d(2026, 1, 5), d(2026, 1, 6), d(2026, 1, 7), d(2026, 1, 8)]
        );
    }

    #[test]
    fn test_tier_shape_rewards() {
        let w = 70;
        assert_eq!(
            TierShape::Exact.reward(w, Tier::Two, Tier::Two),
            Score::new(70)
        );
        assert_eq!(
            TierShape::Exact.reward(w, Tier::One, Tier::Two),
            Score::ZERO
        );
        assert_eq!(
            TierShape::Linear.reward(w, Tier::Two, Tier::Two),
            Score::new(70)
        );
        assert_eq!(
            TierShape::Linear.reward(w, Tier::One, Tier::Four),
            Score::new(70 - 17 * 3)
        );
    }
}
