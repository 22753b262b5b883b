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
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityIdentifierMarker;

impl IdentifierMarkerName for FacilityIdentifierMarker {
    const NAME: &'static str = "FacilityId";
}

pub type FacilityIdentifier = Identifier<u32, FacilityIdentifierMarker>;

/// A game venue with one or more courts.
///
/// Availability is an explicit date set: an empty set means "open on any
/// playable date", a non-empty set restricts play to exactly those
/// dates. Blackout dates always win. Season bounds, holidays, and the
/// Sunday rule are checked by [`crate::problem::rules::Rules`], not
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    id: FacilityIdentifier,
    name: String,
    court_count: u32,
    has_short_rims: bool,
    available_dates: BTreeSet<NaiveDate>,
    blackout_dates: BTreeSet<NaiveDate>,
}

impl Facility {
    #[inline]
    pub fn new(id: FacilityIdentifier, name: impl Into<String>, court_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            court_count,
            has_short_rims: false,
            available_dates: BTreeSet::new(),
            blackout_dates: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn with_short_rims(mut self, has_short_rims: bool) -> Self {
        self.has_short_rims = has_short_rims;
        self
    }

    #[inline]
    pub fn with_available_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.available_dates = dates.into_iter().collect();
        self
    }

    #[inline]
    pub fn with_blackout_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.blackout_dates = dates.into_iter().collect();
        self
    }

    #[inline]
    pub fn id(&self) -> FacilityIdentifier {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn court_count(&self) -> u32 {
        self.court_count
    }

    #[inline]
    pub fn has_short_rims(&self) -> bool {
        self.has_short_rims
    }

    #[inline]
    pub fn available_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.available_dates
    }

    #[inline]
    pub fn blackout_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.blackout_dates
    }

    /// Whether this facility can host games on `date`, ignoring
    /// league-level calendar rules.
    #[inline]
    pub fn is_available(&self, date: NaiveDate) -> bool {
        if self.blackout_dates.contains(&date) {
            return false;
        }
        self.available_dates.is_empty() || self.available_dates.contains(&date)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct FacilityContainer(BTreeMap<FacilityIdentifier, Facility>);

impl FacilityContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, facility: Facility) -> Option<Facility> {
        self.0.insert(facility.id(), facility)
    }

    #[inline]
    pub fn get(&self, id: FacilityIdentifier) -> Option<&Facility> {
        self.0.get(&id)
    }

    #[inline]
    pub fn contains_id(&self, id: FacilityIdentifier) -> bool {
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
    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.0.values()
    }
}

impl FromIterator<Facility> for FacilityContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        let mut c = Self::new();
        for f in iter {
            c.insert(f);
        }
        c
    }
}
