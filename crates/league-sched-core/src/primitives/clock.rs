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

//! Affine minute-of-day arithmetic.
//!
//! `ClockTime` is a point on the day's clock (minutes since midnight),
//! `ClockDelta` a signed span of minutes. Points and deltas do not mix:
//! point + delta = point, point − point = delta. Unlike `chrono`'s
//! `NaiveTime`, adding past midnight does not wrap; it is an error the
//! caller must rule out, which is exactly what the slot generator's
//! window partitioning does.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A point on the clock, in minutes since midnight.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(i32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    #[inline]
    pub const fn from_minutes(minutes: i32) -> Self {
        ClockTime(minutes)
    }

    #[inline]
    pub const fn from_hm(hour: i32, minute: i32) -> Self {
        ClockTime(hour * 60 + minute)
    }

    #[inline]
    pub const fn minutes(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn hour(self) -> i32 {
        self.0.div_euclid(60)
    }

    #[inline]
    pub const fn minute(self) -> i32 {
        self.0.rem_euclid(60)
    }

    #[inline]
    pub fn checked_add(self, d: ClockDelta) -> Option<Self> {
        self.0.checked_add(d.0).map(ClockTime)
    }

    #[inline]
    pub fn checked_sub(self, d: ClockDelta) -> Option<Self> {
        self.0.checked_sub(d.0).map(ClockTime)
    }

    /// Signed distance from `earlier` to `self`, in minutes.
    #[inline]
    pub fn since(self, earlier: ClockTime) -> ClockDelta {
        ClockDelta(self.0 - earlier.0)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl serde::Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add<ClockDelta> for ClockTime {
    type Output = ClockTime;

    #[inline]
    fn add(self, rhs: ClockDelta) -> Self::Output {
        ClockTime(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in ClockTime + ClockDelta"),
        )
    }
}

impl AddAssign<ClockDelta> for ClockTime {
    #[inline]
    fn add_assign(&mut self, rhs: ClockDelta) {
        *self = *self + rhs;
    }
}

impl Sub<ClockDelta> for ClockTime {
    type Output = ClockTime;

    #[inline]
    fn sub(self, rhs: ClockDelta) -> Self::Output {
        ClockTime(
            self.0
                .checked_sub(rhs.0)
                .expect("overflow in ClockTime - ClockDelta"),
        )
    }
}

impl Sub<ClockTime> for ClockTime {
    type Output = ClockDelta;

    #[inline]
    fn sub(self, rhs: ClockTime) -> Self::Output {
        ClockDelta(self.0 - rhs.0)
    }
}

/// A signed span of minutes.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClockDelta(i32);

impl ClockDelta {
    pub const ZERO: ClockDelta = ClockDelta(0);

    #[inline]
    pub const fn from_minutes(minutes: i32) -> Self {
        ClockDelta(minutes)
    }

    #[inline]
    pub const fn minutes(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn abs(self) -> Self {
        ClockDelta(self.0.abs())
    }

    #[inline]
    pub fn checked_mul(self, n: i32) -> Option<Self> {
        self.0.checked_mul(n).map(ClockDelta)
    }
}

impl std::fmt::Display for ClockDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}min", self.0)
    }
}

impl Add for ClockDelta {
    type Output = ClockDelta;

    #[inline]
    fn add(self, rhs: ClockDelta) -> Self::Output {
        ClockDelta(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in ClockDelta + ClockDelta"),
        )
    }
}

impl AddAssign for ClockDelta {
    #[inline]
    fn add_assign(&mut self, rhs: ClockDelta) {
        *self = *self + rhs;
    }
}

impl Sub for ClockDelta {
    type Output = ClockDelta;

    #[inline]
    fn sub(self, rhs: ClockDelta) -> Self::Output {
        ClockDelta(
            self.0
                .checked_sub(rhs.0)
                .expect("overflow in ClockDelta - ClockDelta"),
        )
    }
}

impl SubAssign for ClockDelta {
    #[inline]
    fn sub_assign(&mut self, rhs: ClockDelta) {
        *self = *self - rhs;
    }
}

impl Neg for ClockDelta {
    type Output = ClockDelta;

    #[inline]
    fn neg(self) -> Self::Output {
        ClockDelta(-self.0)
    }
}

impl Sum for ClockDelta {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ClockDelta::ZERO, |acc, d| acc + d)
    }
}
