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
use crate::problem::facility::FacilityIdentifier;
use crate::problem::school::{Cluster, SchoolIdentifier, Tier};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamIdentifierMarker;

impl IdentifierMarkerName for TeamIdentifierMarker {
    const NAME: &'static str = "TeamId";
}

pub type TeamIdentifier = Identifier<u32, TeamIdentifierMarker>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoachIdentifierMarker;

impl IdentifierMarkerName for CoachIdentifierMarker {
    const NAME: &'static str = "CoachId";
}

pub type CoachIdentifier = Identifier<u32, CoachIdentifierMarker>;

/// An unordered pair of team ids. The canonical key for matchup and
/// rematch bookkeeping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub struct TeamPair {
    lo: TeamIdentifier,
    hi: TeamIdentifier,
}

impl TeamPair {
    #[inline]
    pub fn new(a: TeamIdentifier, b: TeamIdentifier) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    #[inline]
    pub fn lo(&self) -> TeamIdentifier {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> TeamIdentifier {
        self.hi
    }

    #[inline]
    pub fn involves(&self, team: TeamIdentifier) -> bool {
        self.lo == team || self.hi == team
    }
}

impl std::fmt::Display for TeamPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}}}", self.lo, self.hi)
    }
}

/// A team: one school's entry in one division.
///
/// `rivals` and `do_not_play` are kept as symmetric id sets, not object
/// references; symmetry and referential integrity are enforced when the
/// problem is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: TeamIdentifier,
    name: String,
    school: SchoolIdentifier,
    division: Division,
    coach: CoachIdentifier,
    tier: Tier,
    cluster: Option<Cluster>,
    home_facility: Option<FacilityIdentifier>,
    rivals: BTreeSet<TeamIdentifier>,
    do_not_play: BTreeSet<TeamIdentifier>,
}

impl Team {
    #[inline]
    pub fn new(
        id: TeamIdentifier,
        name: impl Into<String>,
        school: SchoolIdentifier,
        division: Division,
        coach: CoachIdentifier,
        tier: Tier,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            school,
            division,
            coach,
            tier,
            cluster: None,
            home_facility: None,
            rivals: BTreeSet::new(),
            do_not_play: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    #[inline]
    pub fn with_home_facility(mut self, facility: FacilityIdentifier) -> Self {
        self.home_facility = Some(facility);
        self
    }

    #[inline]
    pub fn with_rivals<I: IntoIterator<Item = TeamIdentifier>>(mut self, rivals: I) -> Self {
        self.rivals = rivals.into_iter().collect();
        self
    }

    #[inline]
    pub fn with_do_not_play<I: IntoIterator<Item = TeamIdentifier>>(mut self, teams: I) -> Self {
        self.do_not_play = teams.into_iter().collect();
        self
    }

    #[inline]
    pub fn id(&self) -> TeamIdentifier {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn school(&self) -> SchoolIdentifier {
        self.school
    }

    #[inline]
    pub fn division(&self) -> Division {
        self.division
    }

    #[inline]
    pub fn coach(&self) -> CoachIdentifier {
        self.coach
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn cluster(&self) -> Option<Cluster> {
        self.cluster
    }

    #[inline]
    pub fn home_facility(&self) -> Option<FacilityIdentifier> {
        self.home_facility
    }

    #[inline]
    pub fn rivals(&self) -> &BTreeSet<TeamIdentifier> {
        &self.rivals
    }

    #[inline]
    pub fn do_not_play(&self) -> &BTreeSet<TeamIdentifier> {
        &self.do_not_play
    }

    #[inline]
    pub fn is_rival_of(&self, other: TeamIdentifier) -> bool {
        self.rivals.contains(&other)
    }

    #[inline]
    pub fn avoids(&self, other: TeamIdentifier) -> bool {
        self.do_not_play.contains(&other)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct TeamContainer(BTreeMap<TeamIdentifier, Team>);

impl TeamContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, team: Team) -> Option<Team> {
        self.0.insert(team.id(), team)
    }

    #[inline]
    pub fn get(&self, id: TeamIdentifier) -> Option<&Team> {
        self.0.get(&id)
    }

    #[inline]
    pub fn contains_id(&self, id: TeamIdentifier) -> bool {
        self.0.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.0.values()
    }

    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = TeamIdentifier> + '_ {
        self.0.keys().copied()
    }

    #[inline]
    pub fn in_division(&self, division: Division) -> impl Iterator<Item = &Team> {
        self.iter().filter(move |t| t.division() == division)
    }
}

impl FromIterator<Team> for TeamContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Team>>(iter: I) -> Self {
        let mut c = Self::new();
        for t in iter {
            c.insert(t);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn tid(n: u32) -> TeamIdentifier {
        TeamIdentifier::new(n)
    }
    #[inline]
    fn sid(n: u32) -> SchoolIdentifier {
        SchoolIdentifier::new(n)
    }
    #[inline]
    fn cid(n: u32) -> CoachIdentifier {
        CoachIdentifier::new(n)
    }

    fn team(id: u32, school: u32, division: Division) -> Team {
        Team::new(
            tid(id),
            format!("Team {id}"),
            sid(school),
            division,
            cid(id),
            Tier::Two,
        )
    }

    #[test]
    fn test_pair_is_unordered() {
        let p = TeamPair::new(tid(9), tid(3));
        assert_eq!(p.lo(), tid(3));
        assert_eq!(p.hi(), tid(9));
        assert_eq!(p, TeamPair::new(tid(3), tid(9)));
        assert!(p.involves(tid(9)));
        assert!(!p.involves(tid(5)));
    }

    #[test]
    fn test_relations() {
        let t = team(1, 1, Division::BoysJv)
            .with_rivals([tid(2), tid(3)])
            .with_do_not_play([tid(4)]);
        assert!(t.is_rival_of(tid(2)));
        assert!(!t.is_rival_of(tid(4)));
        assert!(t.avoids(tid(4)));
        assert!(!t.avoids(tid(2)));
    }

    #[test]
    fn test_container_division_filter() {
        let teams: TeamContainer = [
            team(1, 1, Division::BoysJv),
            team(2, 2, Division::BoysJv),
            team(3, 1, Division::GirlsJv),
        ]
        .into_iter()
        .collect();
        let jv: Vec<_> = teams.in_division(Division::BoysJv).map(Team::id).collect();
        assert_eq!(jv, vec![tid(1), tid(2)]);
    }

    #[test]
    fn test_container_iterates_in_id_order() {
        let teams: TeamContainer = [
            team(5, 1, Division::BoysJv),
            team(1, 1, Division::GirlsJv),
            team(3, 2, Division::BoysJv),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = teams.ids().collect();
        assert_eq!(ids, vec![tid(1), tid(3), tid(5)]);
    }
}
