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

//! Structural input errors. These are the only conditions under which
//! the engine refuses to run; data-driven infeasibility is reported, not
//! raised.

use crate::problem::division::Division;
use crate::problem::facility::FacilityIdentifier;
use crate::problem::school::SchoolIdentifier;
use crate::problem::team::TeamIdentifier;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesError {
    SeasonInverted { start: NaiveDate, end: NaiveDate },
    NonPositiveGameDuration,
    EmptyWindow { saturday: bool },
    ZeroTargetGames,
    ZeroFrequencyCap,
    ZeroPasses,
    ZeroWorkers,
}

impl std::fmt::Display for RulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesError::SeasonInverted { start, end } => {
                write!(f, "season ends ({end}) before it starts ({start})")
            }
            RulesError::NonPositiveGameDuration => {
                write!(f, "game duration must be positive")
            }
            RulesError::EmptyWindow { saturday: true } => {
                write!(f, "the Saturday play window is empty")
            }
            RulesError::EmptyWindow { saturday: false } => {
                write!(f, "the weeknight play window is empty")
            }
            RulesError::ZeroTargetGames => write!(f, "target games per team must be at least 1"),
            RulesError::ZeroFrequencyCap => {
                write!(f, "frequency caps must be at least 1 game per window")
            }
            RulesError::ZeroPasses => write!(f, "the greedy stage needs at least one pass"),
            RulesError::ZeroWorkers => write!(f, "the search stage needs at least one worker"),
        }
    }
}

impl std::error::Error for RulesError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateTeamError {
    id: TeamIdentifier,
}

impl DuplicateTeamError {
    pub fn new(id: TeamIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> TeamIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateTeamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate team id {}", self.id)
    }
}

impl std::error::Error for DuplicateTeamError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateSchoolError {
    id: SchoolIdentifier,
}

impl DuplicateSchoolError {
    pub fn new(id: SchoolIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SchoolIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateSchoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate school id {}", self.id)
    }
}

impl std::error::Error for DuplicateSchoolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateFacilityError {
    id: FacilityIdentifier,
}

impl DuplicateFacilityError {
    pub fn new(id: FacilityIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> FacilityIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateFacilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate facility id {}", self.id)
    }
}

impl std::error::Error for DuplicateFacilityError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownSchoolError {
    team: TeamIdentifier,
    school: SchoolIdentifier,
}

impl UnknownSchoolError {
    pub fn new(team: TeamIdentifier, school: SchoolIdentifier) -> Self {
        Self { team, school }
    }

    pub fn team(&self) -> TeamIdentifier {
        self.team
    }

    pub fn school(&self) -> SchoolIdentifier {
        self.school
    }
}

impl std::fmt::Display for UnknownSchoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team {} references unknown school {}", self.team, self.school)
    }
}

impl std::error::Error for UnknownSchoolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownFacilityError {
    team: TeamIdentifier,
    facility: FacilityIdentifier,
}

impl UnknownFacilityError {
    pub fn new(team: TeamIdentifier, facility: FacilityIdentifier) -> Self {
        Self { team, facility }
    }

    pub fn team(&self) -> TeamIdentifier {
        self.team
    }

    pub fn facility(&self) -> FacilityIdentifier {
        self.facility
    }
}

impl std::fmt::Display for UnknownFacilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "team {} references unknown home facility {}",
            self.team, self.facility
        )
    }
}

impl std::error::Error for UnknownFacilityError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownTeamReferenceError {
    team: TeamIdentifier,
    referenced: TeamIdentifier,
}

impl UnknownTeamReferenceError {
    pub fn new(team: TeamIdentifier, referenced: TeamIdentifier) -> Self {
        Self { team, referenced }
    }

    pub fn team(&self) -> TeamIdentifier {
        self.team
    }

    pub fn referenced(&self) -> TeamIdentifier {
        self.referenced
    }
}

impl std::fmt::Display for UnknownTeamReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "team {} references unknown team {}",
            self.team, self.referenced
        )
    }
}

impl std::error::Error for UnknownTeamReferenceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelfPairingError {
    team: TeamIdentifier,
}

impl SelfPairingError {
    pub fn new(team: TeamIdentifier) -> Self {
        Self { team }
    }

    pub fn team(&self) -> TeamIdentifier {
        self.team
    }
}

impl std::fmt::Display for SelfPairingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team {} lists itself as rival or do-not-play", self.team)
    }
}

impl std::error::Error for SelfPairingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Rivals,
    DoNotPlay,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Rivals => write!(f, "rivals"),
            RelationKind::DoNotPlay => write!(f, "do-not-play"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsymmetricRelationError {
    relation: RelationKind,
    from: TeamIdentifier,
    to: TeamIdentifier,
}

impl AsymmetricRelationError {
    pub fn new(relation: RelationKind, from: TeamIdentifier, to: TeamIdentifier) -> Self {
        Self { relation, from, to }
    }

    pub fn relation(&self) -> RelationKind {
        self.relation
    }

    pub fn from(&self) -> TeamIdentifier {
        self.from
    }

    pub fn to(&self) -> TeamIdentifier {
        self.to
    }
}

impl std::fmt::Display for AsymmetricRelationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} relation of {} to {} is not reciprocated",
            self.relation, self.from, self.to
        )
    }
}

impl std::error::Error for AsymmetricRelationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateDivisionEntryError {
    school: SchoolIdentifier,
    division: Division,
}

impl DuplicateDivisionEntryError {
    pub fn new(school: SchoolIdentifier, division: Division) -> Self {
        Self { school, division }
    }

    pub fn school(&self) -> SchoolIdentifier {
        self.school
    }

    pub fn division(&self) -> Division {
        self.division
    }
}

impl std::fmt::Display for DuplicateDivisionEntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "school {} fields more than one team in {}",
            self.school, self.division
        )
    }
}

impl std::error::Error for DuplicateDivisionEntryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZeroCourtsError {
    facility: FacilityIdentifier,
}

impl ZeroCourtsError {
    pub fn new(facility: FacilityIdentifier) -> Self {
        Self { facility }
    }

    pub fn facility(&self) -> FacilityIdentifier {
        self.facility
    }
}

impl std::fmt::Display for ZeroCourtsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "facility {} has no courts", self.facility)
    }
}

impl std::error::Error for ZeroCourtsError {}

/// Everything that makes an input structurally unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    Rules(RulesError),
    EmptyTeams,
    EmptyFacilities,
    DuplicateTeam(DuplicateTeamError),
    DuplicateSchool(DuplicateSchoolError),
    DuplicateFacility(DuplicateFacilityError),
    UnknownSchool(UnknownSchoolError),
    UnknownFacility(UnknownFacilityError),
    UnknownTeamReference(UnknownTeamReferenceError),
    SelfPairing(SelfPairingError),
    AsymmetricRelation(AsymmetricRelationError),
    DuplicateDivisionEntry(DuplicateDivisionEntryError),
    ZeroCourts(ZeroCourtsError),
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::Rules(e) => write!(f, "invalid rules: {e}"),
            ProblemError::EmptyTeams => write!(f, "no teams to schedule"),
            ProblemError::EmptyFacilities => write!(f, "no facilities to schedule into"),
            ProblemError::DuplicateTeam(e) => write!(f, "{e}"),
            ProblemError::DuplicateSchool(e) => write!(f, "{e}"),
            ProblemError::DuplicateFacility(e) => write!(f, "{e}"),
            ProblemError::UnknownSchool(e) => write!(f, "{e}"),
            ProblemError::UnknownFacility(e) => write!(f, "{e}"),
            ProblemError::UnknownTeamReference(e) => write!(f, "{e}"),
            ProblemError::SelfPairing(e) => write!(f, "{e}"),
            ProblemError::AsymmetricRelation(e) => write!(f, "{e}"),
            ProblemError::DuplicateDivisionEntry(e) => write!(f, "{e}"),
            ProblemError::ZeroCourts(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ProblemError {}

impl From<RulesError> for ProblemError {
    fn from(err: RulesError) -> Self {
        ProblemError::Rules(err)
    }
}

impl From<DuplicateTeamError> for ProblemError {
    fn from(err: DuplicateTeamError) -> Self {
        ProblemError::DuplicateTeam(err)
    }
}

impl From<DuplicateSchoolError> for ProblemError {
    fn from(err: DuplicateSchoolError) -> Self {
        ProblemError::DuplicateSchool(err)
    }
}

impl From<DuplicateFacilityError> for ProblemError {
    fn from(err: DuplicateFacilityError) -> Self {
        ProblemError::DuplicateFacility(err)
    }
}

impl From<UnknownSchoolError> for ProblemError {
    fn from(err: UnknownSchoolError) -> Self {
        ProblemError::UnknownSchool(err)
    }
}

impl From<UnknownFacilityError> for ProblemError {
    fn from(err: UnknownFacilityError) -> Self {
        ProblemError::UnknownFacility(err)
    }
}

impl From<UnknownTeamReferenceError> for ProblemError {
    fn from(err: UnknownTeamReferenceError) -> Self {
        ProblemError::UnknownTeamReference(err)
    }
}

impl From<SelfPairingError> for ProblemError {
    fn from(err: SelfPairingError) -> Self {
        ProblemError::SelfPairing(err)
    }
}

impl From<AsymmetricRelationError> for ProblemError {
    fn from(err: AsymmetricRelationError) -> Self {
        ProblemError::AsymmetricRelation(err)
    }
}

impl From<DuplicateDivisionEntryError> for ProblemError {
    fn from(err: DuplicateDivisionEntryError) -> Self {
        ProblemError::DuplicateDivisionEntry(err)
    }
}

impl From<ZeroCourtsError> for ProblemError {
    fn from(err: ZeroCourtsError) -> Self {
        ProblemError::ZeroCourts(err)
    }
}
