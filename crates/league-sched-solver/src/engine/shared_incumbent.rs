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

//! The best schedule found so far, shared across search workers.
//!
//! Acceptance is a total order over `(games placed, soft score, worker
//! index)`, so the final incumbent is the same no matter how the worker
//! threads interleave; worker parallelism stays unobservable from the
//! outside.

use league_sched_core::prelude::Score;
use league_sched_model::prelude::Schedule;
use parking_lot::Mutex;

/// One worker's finished construction.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub games: usize,
    pub score: Score,
    pub worker: usize,
    pub schedule: Schedule,
}

impl Proposal {
    /// More games first, then score, then the lower worker index.
    fn beats(&self, other: &Proposal) -> bool {
        (self.games, self.score, std::cmp::Reverse(self.worker))
            > (other.games, other.score, std::cmp::Reverse(other.worker))
    }
}

#[derive(Debug, Default)]
pub struct SharedIncumbent {
    best: Mutex<Option<Proposal>>,
}

impl SharedIncumbent {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `proposal` if it beats the current best. Returns
    /// whether it was installed.
    pub fn try_publish(&self, proposal: Proposal) -> bool {
        let mut guard = self.best.lock();
        let accept = guard.as_ref().is_none_or(|best| proposal.beats(best));
        if accept {
            tracing::debug!(
                games = proposal.games,
                score = %proposal.score,
                worker = proposal.worker,
                "incumbent improved"
            );
            *guard = Some(proposal);
        }
        accept
    }

    /// Consumes the incumbent.
    pub fn take(self) -> Option<Proposal> {
        self.best.into_inner()
    }
}
