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

use crate::problem::err::{
    DuplicateFacilityError, DuplicateSchoolError, DuplicateTeamError, ProblemError,
};
use crate::problem::facility::{Facility, FacilityContainer};
use crate::problem::prob::Problem;
use crate::problem::rules::Rules;
use crate::problem::school::{School, SchoolContainer};
use crate::problem::team::{Team, TeamContainer};

/// Assembles a [`Problem`] from loader output, catching duplicate ids
/// on the way in. All deeper validation happens in [`Problem::new`].
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    rules: Rules,
    teams: Vec<Team>,
    schools: Vec<School>,
    facilities: Vec<Facility>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    #[inline]
    pub fn add_team(&mut self, team: Team) -> &mut Self {
        self.teams.push(team);
        self
    }

    #[inline]
    pub fn add_school(&mut self, school: School) -> &mut Self {
        self.schools.push(school);
        self
    }

    #[inline]
    pub fn add_facility(&mut self, facility: Facility) -> &mut Self {
        self.facilities.push(facility);
        self
    }

    pub fn build(self) -> Result<Problem, ProblemError> {
        let mut teams = TeamContainer::new();
        for team in self.teams {
            let id = team.id();
            if teams.insert(team).is_some() {
                return Err(DuplicateTeamError::new(id).into());
            }
        }

        let mut schools = SchoolContainer::new();
        for school in self.schools {
            let id = school.id();
            if schools.insert(school).is_some() {
                return Err(DuplicateSchoolError::new(id).into());
            }
        }

        let mut facilities = FacilityContainer::new();
        for facility in self.facilities {
            let id = facility.id();
            if facilities.insert(facility).is_some() {
                return Err(DuplicateFacilityError::new(id).into());
            }
        }

        Problem::new(self.rules, teams, schools, facilities)
    }
}
