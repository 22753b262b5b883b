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

//! The league's competitive divisions and their per-division traits.
//!
//! Divisions differ in officiating, rim height, and site requirements,
//! but the differences are pure data, so they live in a table rather
//! than a type hierarchy.

/// A competitive category (age/gender/level).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
)]
pub enum Division {
    EsK1Rec,
    Es23Rec,
    EsBoysComp,
    EsGirlsComp,
    BoysJv,
    GirlsJv,
}

/// Per-division traits: officiating, rim height, and site constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionInfo {
    pub officials: u8,
    pub rim_height_ft: u8,
    /// Only facilities with short (8 ft) rims may host this division.
    pub requires_short_rims: bool,
    /// Recreational divisions do not keep standings.
    pub recreational: bool,
    /// Facility names the league prefers for this division, best first.
    pub priority_sites: &'static [&'static str],
}

const ES_K1_REC_INFO: DivisionInfo = DivisionInfo {
    officials: 1,
    rim_height_ft: 8,
    requires_short_rims: true,
    recreational: true,
    priority_sites: &[
        "Pinecrest Sloan Canyon K-1 Court",
        "Las Vegas Basketball Center",
        "Somerset Skye Canyon",
        "Freedom Classical",
    ],
};

const STANDARD_REC_INFO: DivisionInfo = DivisionInfo {
    officials: 2,
    rim_height_ft: 10,
    requires_short_rims: false,
    recreational: true,
    priority_sites: &[],
};

const COMPETITIVE_INFO: DivisionInfo = DivisionInfo {
    officials: 2,
    rim_height_ft: 10,
    requires_short_rims: false,
    recreational: false,
    priority_sites: &[],
};

impl Division {
    pub const ALL: [Division; 6] = [
        Division::EsK1Rec,
        Division::Es23Rec,
        Division::EsBoysComp,
        Division::EsGirlsComp,
        Division::BoysJv,
        Division::GirlsJv,
    ];

    /// The league's display name for this division.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Division::EsK1Rec => "ES K-1 REC",
            Division::Es23Rec => "ES 2-3 REC",
            Division::EsBoysComp => "ES BOY'S COMP",
            Division::EsGirlsComp => "ES GIRL'S COMP",
            Division::BoysJv => "BOY'S JV",
            Division::GirlsJv => "GIRL'S JV",
        }
    }

    #[inline]
    pub const fn info(self) -> &'static DivisionInfo {
        match self {
            Division::EsK1Rec => &ES_K1_REC_INFO,
            Division::Es23Rec => &STANDARD_REC_INFO,
            Division::EsBoysComp | Division::EsGirlsComp => &COMPETITIVE_INFO,
            Division::BoysJv | Division::GirlsJv => &COMPETITIVE_INFO,
        }
    }

    #[inline]
    pub const fn requires_short_rims(self) -> bool {
        self.info().requires_short_rims
    }

    #[inline]
    pub const fn officials(self) -> u8 {
        self.info().officials
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
