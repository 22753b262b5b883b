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
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchoolIdentifierMarker;

impl IdentifierMarkerName for SchoolIdentifierMarker {
    const NAME: &'static str = "SchoolId";
}

pub type SchoolIdentifier = Identifier<u32, SchoolIdentifierMarker>;

/// Competitive skill level; lower is stronger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub enum Tier {
    One,
    Two,
    Three,
    Four,
}

impl Tier {
    #[inline]
    pub const fn level(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
            Tier::Four => 4,
        }
    }

    #[inline]
    pub const fn distance(self, other: Tier) -> u8 {
        self.level().abs_diff(other.level())
    }

    /// Whether `self` is the stronger of the two (lower level wins).
    #[inline]
    pub fn stronger_than(self, other: Tier) -> bool {
        self.level() < other.level()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tier {}", self.level())
    }
}

/// Geographic region tag used to keep travel short.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub enum Cluster {
    East,
    West,
    North,
    Henderson,
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Cluster::East => "East",
            Cluster::West => "West",
            Cluster::North => "North",
            Cluster::Henderson => "Henderson",
        };
        f.write_str(name)
    }
}

/// A member school. Owns up to one team per division (enforced when the
/// problem is assembled). Blackout dates apply to every team the school
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
    id: SchoolIdentifier,
    name: String,
    cluster: Option<Cluster>,
    tier: Option<Tier>,
    blackout_dates: BTreeSet<NaiveDate>,
}

impl School {
    #[inline]
    pub fn new(id: SchoolIdentifier, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cluster: None,
            tier: None,
            blackout_dates: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    #[inline]
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    #[inline]
    pub fn with_blackout_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.blackout_dates = dates.into_iter().collect();
        self
    }

    #[inline]
    pub fn id(&self) -> SchoolIdentifier {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn cluster(&self) -> Option<Cluster> {
        self.cluster
    }

    #[inline]
    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    #[inline]
    pub fn blackout_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.blackout_dates
    }

    #[inline]
    pub fn is_blacked_out(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct SchoolContainer(BTreeMap<SchoolIdentifier, School>);

impl SchoolContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, school: School) -> Option<School> {
        self.0.insert(school.id(), school)
    }

    #[inline]
    pub fn get(&self, id: SchoolIdentifier) -> Option<&School> {
        self.0.get(&id)
    }

    #[inline]
    pub fn contains_id(&self, id: SchoolIdentifier) -> bool {
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
    pub fn iter(&self) -> impl Iterator<Item = &School> {
        self.0.values()
    }
}

impl FromIterator<School> for SchoolContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = School>>(iter: I) -> Self {
        let mut c = Self::new();
        for s in iter {
            c.insert(s);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn sid(n: u32) -> SchoolIdentifier {
        SchoolIdentifier::new(n)
    }
    #[inline]
    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_tier_distance_and_strength() {
        assert_eq!(Tier::One.distance(Tier::Four), 3);
        assert_eq!(Tier::Two.distance(Tier::Two), 0);
        assert!(Tier::One.stronger_than(Tier::Three));
        assert!(!Tier::Three.stronger_than(Tier::Three));
    }

    #[test]
    fn test_school_blackouts() {
        let s = School::new(sid(1), "Somerset Skye Canyon")
            .with_cluster(Cluster::North)
            .with_tier(Tier::Two)
            .with_blackout_dates([d(2026, 1, 12), d(2026, 1, 13)]);
        assert!(s.is_blacked_out(d(2026, 1, 12)));
        assert!(!s.is_blacked_out(d(2026, 1, 14)));
        assert_eq!(s.cluster(), Some(Cluster::North));
        assert_eq!(s.tier(), Some(Tier::Two));
    }

    #[test]
    fn test_container_iterates_in_id_order() {
        let schools: SchoolContainer = [
            School::new(sid(3), "C"),
            School::new(sid(1), "A"),
            School::new(sid(2), "B"),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = schools.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(schools.contains_id(sid(2)));
        assert_eq!(schools.len(), 3);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut schools = SchoolContainer::new();
        assert!(schools.insert(School::new(sid(1), "First")).is_none());
        let old = schools.insert(School::new(sid(1), "Second")).unwrap();
        assert_eq!(old.name(), "First");
        assert_eq!(schools.get(sid(1)).unwrap().name(), "Second");
    }
}
