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

//! The problem model for the league scheduling engine.
//!
//! Everything the optimizer consumes lives here: the entities a loader
//! builds (`Team`, `School`, `Facility`), the immutable [`problem::Rules`]
//! bundle, the validated [`problem::Problem`] container, and the solution
//! side (`Game`, `Schedule`, `ValidationReport`). Entities are immutable
//! once a `Problem` is built; only `Schedule` mutates, and only inside the
//! optimizer.

pub mod common;
pub mod problem;
pub mod solution;

pub mod prelude {
    pub use crate::common::Identifier;
    pub use crate::problem::builder::ProblemBuilder;
    pub use crate::problem::division::{Division, DivisionInfo};
    pub use crate::problem::err::ProblemError;
    pub use crate::problem::facility::{Facility, FacilityIdentifier};
    pub use crate::problem::prob::Problem;
    pub use crate::problem::rules::{PriorityWeights, Rules, TierShape};
    pub use crate::problem::school::{Cluster, School, SchoolIdentifier, Tier};
    pub use crate::problem::slot::{SlotKey, TimeBlock, TimeSlot};
    pub use crate::problem::team::{CoachIdentifier, Team, TeamIdentifier, TeamPair};
    pub use crate::solution::game::{Game, GameIdentifier};
    pub use crate::solution::report::{
        HardViolation, Relaxation, RuleId, Shortfall, ShortfallReason, TeamStats,
        ValidationReport,
    };
    pub use crate::solution::sched::Schedule;
}
