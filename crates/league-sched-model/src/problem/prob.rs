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

use crate::problem::division::Division;
use crate::problem::err::{
    AsymmetricRelationError, DuplicateDivisionEntryError, ProblemError, RelationKind,
    SelfPairingError, UnknownFacilityError, UnknownSchoolError, UnknownTeamReferenceError,
    ZeroCourtsError,
};
use crate::problem::facility::{Facility, FacilityContainer, FacilityIdentifier};
use crate::problem::rules::Rules;
use crate::problem::school::{School, SchoolContainer, SchoolIdentifier};
use crate::problem::team::{Team, TeamContainer, TeamIdentifier};
use std::collections::{BTreeMap, BTreeSet};

/// One fully validated scheduling instance.
///
/// Construction fails fast on every structural input problem; anything
/// data-driven (too few slots, blackout pressure, do-not-play
/// saturation) is not an error here and surfaces later in the
/// validation report instead.
#[derive(Debug, Clone)]
pub struct Problem {
    rules: Rules,
    teams: TeamContainer,
    schools: SchoolContainer,
    facilities: FacilityContainer,
    roster: BTreeMap<(SchoolIdentifier, Division), TeamIdentifier>,
}

impl Problem {
    pub fn new(
        rules: Rules,
        teams: TeamContainer,
        schools: SchoolContainer,
        facilities: FacilityContainer,
    ) -> Result<Self, ProblemError> {
        rules.validate()?;

        if teams.is_empty() {
            return Err(ProblemError::EmptyTeams);
        }
        if facilities.is_empty() {
            return Err(ProblemError::EmptyFacilities);
        }
        for facility in facilities.iter() {
            if facility.court_count() == 0 {
                return Err(ZeroCourtsError::new(facility.id()).into());
            }
        }

        // Referential integrity, one team per (school, division).
        let mut roster: BTreeMap<(SchoolIdentifier, Division), TeamIdentifier> = BTreeMap::new();
        for team in teams.iter() {
            if !schools.contains_id(team.school()) {
                return Err(UnknownSchoolError::new(team.id(), team.school()).into());
            }
            if let Some(facility) = team.home_facility() {
                if !facilities.contains_id(facility) {
                    return Err(UnknownFacilityError::new(team.id(), facility).into());
                }
            }
            if roster
                .insert((team.school(), team.division()), team.id())
                .is_some()
            {
                return Err(
                    DuplicateDivisionEntryError::new(team.school(), team.division()).into(),
                );
            }
        }

        // Rival and do-not-play sets must reference known teams, never
        // the team itself, and must be symmetric.
        for team in teams.iter() {
            for (relation, set) in [
                (RelationKind::Rivals, team.rivals()),
                (RelationKind::DoNotPlay, team.do_not_play()),
            ] {
                for &other_id in set {
                    if other_id == team.id() {
                        return Err(SelfPairingError::new(team.id()).into());
                    }
                    let other = teams
                        .get(other_id)
                        .ok_or_else(|| UnknownTeamReferenceError::new(team.id(), other_id))?;
                    let reciprocated = match relation {
                        RelationKind::Rivals => other.is_rival_of(team.id()),
                        RelationKind::DoNotPlay => other.avoids(team.id()),
                    };
                    if !reciprocated {
                        return Err(
                            AsymmetricRelationError::new(relation, team.id(), other_id).into()
                        );
                    }
                }
            }
        }

        Ok(Self {
            rules,
            teams,
            schools,
            facilities,
            roster,
        })
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn teams(&self) -> &TeamContainer {
        &self.teams
    }

    #[inline]
    pub fn schools(&self) -> &SchoolContainer {
        &self.schools
    }

    #[inline]
    pub fn facilities(&self) -> &FacilityContainer {
        &self.facilities
    }

    #[inline]
    pub fn team(&self, id: TeamIdentifier) -> Option<&Team> {
        self.teams.get(id)
    }

    #[inline]
    pub fn school(&self, id: SchoolIdentifier) -> Option<&School> {
        self.schools.get(id)
    }

    #[inline]
    pub fn facility(&self, id: FacilityIdentifier) -> Option<&Facility> {
        self.facilities.get(id)
    }

    /// The team a school fields in a division, if any.
    #[inline]
    pub fn team_at(&self, school: SchoolIdentifier, division: Division) -> Option<TeamIdentifier> {
        self.roster.get(&(school, division)).copied()
    }

    /// Divisions in which a school fields a team, in division order.
    pub fn divisions_of(&self, school: SchoolIdentifier) -> BTreeSet<Division> {
        Division::ALL
            .into_iter()
            .filter(|d| self.roster.contains_key(&(school, *d)))
            .collect()
    }

    /// Whether a school may host or play on `date`.
    #[inline]
    pub fn school_open_on(&self, school: SchoolIdentifier, date: chrono::NaiveDate) -> bool {
        self.school(school).is_some_and(|s| !s.is_blacked_out(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::school::Tier;
    use crate::problem::team::CoachIdentifier;

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

    fn base_parts() -> (TeamContainer, SchoolContainer, FacilityContainer) {
        let teams = [team(1, 1, Division::BoysJv), team(2, 2, Division::BoysJv)]
            .into_iter()
            .collect();
        let schools = [School::new(sid(1), "A"), School::new(sid(2), "B")]
            .into_iter()
            .collect();
        let facilities = [Facility::new(fid(1), "Gym", 2)].into_iter().collect();
        (teams, schools, facilities)
    }

    #[test]
    fn test_valid_problem_builds() {
        let (teams, schools, facilities) = base_parts();
        let p = Problem::new(Rules::default(), teams, schools, facilities).unwrap();
        assert_eq!(p.teams().len(), 2);
        assert_eq!(p.team_at(sid(1), Division::BoysJv), Some(tid(1)));
        assert_eq!(p.team_at(sid(1), Division::GirlsJv), None);
        assert_eq!(
            p.divisions_of(sid(2)).into_iter().collect::<Vec<_>>(),
            vec![Division::BoysJv]
        );
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let (teams, schools, facilities) = base_parts();
        assert!(matches!(
            Problem::new(
                Rules::default(),
                TeamContainer::new(),
                schools.clone(),
                facilities.clone()
            ),
            Err(ProblemError::EmptyTeams)
        ));
        assert!(matches!(
            Problem::new(Rules::default(), teams, schools, FacilityContainer::new()),
            Err(ProblemError::EmptyFacilities)
        ));
    }

    #[test]
    fn test_rejects_unknown_school() {
        let (mut teams, schools, facilities) = base_parts();
        teams.insert(team(3, 9, Division::GirlsJv));
        assert!(matches!(
            Problem::new(Rules::default(), teams, schools, facilities),
            Err(ProblemError::UnknownSchool(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_home_facility() {
        let (mut teams, schools, facilities) = base_parts();
        teams.insert(team(3, 1, Division::GirlsJv).with_home_facility(fid(9)));
        assert!(matches!(
            Problem::new(Rules::default(), teams, schools, facilities),
            Err(ProblemError::UnknownFacility(_))
        ));
    }

    #[test]
    fn test_rejects_two_teams_per_school_division() {
        let (mut teams, schools, facilities) = base_parts();
        teams.insert(team(3, 1, Division::BoysJv));
        assert!(matches!(
            Problem::new(Rules::default(), teams, schools, facilities),
            Err(ProblemError::DuplicateDivisionEntry(_))
        ));
    }

    #[test]
    fn test_rejects_self_pairing_and_asymmetry() {
        let (_, schools, facilities) = base_parts();

        let self_rival: TeamContainer = [
            team(1, 1, Division::BoysJv).with_rivals([tid(1)]),
            team(2, 2, Division::BoysJv),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            Problem::new(
                Rules::default(),
                self_rival,
                schools.clone(),
                facilities.clone()
            ),
            Err(ProblemError::SelfPairing(_))
        ));

        let one_sided: TeamContainer = [
            team(1, 1, Division::BoysJv).with_do_not_play([tid(2)]),
            team(2, 2, Division::BoysJv),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            Problem::new(Rules::default(), one_sided, schools, facilities),
            Err(ProblemError::AsymmetricRelation(_))
        ));
    }

    #[test]
    fn test_rejects_zero_courts() {
        let (teams, schools, _) = base_parts();
        let facilities = [Facility::new(fid(1), "Gym", 0)].into_iter().collect();
        assert!(matches!(
            Problem::new(Rules::default(), teams, schools, facilities),
            Err(ProblemError::ZeroCourts(_))
        ));
    }

    #[test]
    fn test_symmetric_relations_accepted() {
        let (_, schools, facilities) = base_parts();
        let teams: TeamContainer = [
            team(1, 1, Division::BoysJv).with_rivals([tid(2)]),
            team(2, 2, Division::BoysJv).with_rivals([tid(1)]),
        ]
        .into_iter()
        .collect();
        assert!(Problem::new(Rules::default(), teams, schools, facilities).is_ok());
    }
}
