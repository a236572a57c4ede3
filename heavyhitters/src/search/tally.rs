// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Vote collection for one round.
//!
//! Each member of a group answers independently, with its own random stream, and the votes
//! are combined by a commutative sum. With the `rayon` feature the members of a group answer
//! in parallel; the tally is the same either way.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use rand_chacha::ChaCha8Rng;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::participant::NEITHER;
use crate::participant::Participant;
use crate::participant::QueryFingerprint;

/// Votes of one candidate's group.
///
/// Slot `b` counts answers and votes about extension bit `b`. An extension question informs
/// both slots; a binary question informs the one slot it asked about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GroupTally {
    pub(crate) answers: [u64; 2],
    pub(crate) votes: [u64; 2],
    pub(crate) excluded: u64,
}

impl GroupTally {
    /// Records a yes/no answer about slot `slot`.
    pub(crate) fn contains(slot: usize, answer: u32) -> Self {
        let mut tally = Self::default();
        tally.answers[slot] = 1;
        tally.votes[slot] = u64::from(answer == 1);
        tally
    }

    /// Records an answer of 0, 1, or [`NEITHER`].
    pub(crate) fn extension(answer: u32) -> Self {
        let mut tally = Self {
            answers: [1, 1],
            ..Self::default()
        };
        if answer != NEITHER {
            tally.votes[answer as usize] = 1;
        }
        tally
    }

    /// Records a participant whose answer could not be obtained.
    pub(crate) fn excluded() -> Self {
        Self {
            excluded: 1,
            ..Self::default()
        }
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            answers: [
                self.answers[0] + other.answers[0],
                self.answers[1] + other.answers[1],
            ],
            votes: [
                self.votes[0] + other.votes[0],
                self.votes[1] + other.votes[1],
            ],
            excluded: self.excluded + other.excluded,
        }
    }
}

/// Asks one participant and turns its answer into a tally.
///
/// A participant out of budget is excluded; any other error aborts the round.
pub(crate) fn ballot<F>(
    participant: &Participant,
    fingerprint: QueryFingerprint,
    epsilon: f64,
    rng: &mut ChaCha8Rng,
    record: F,
) -> Result<GroupTally, Error>
where
    F: FnOnce(u32) -> GroupTally,
{
    match participant.answer(fingerprint, epsilon, rng) {
        Ok(answer) => Ok(record(answer)),
        Err(err) if err.kind() == ErrorKind::BudgetExhausted => Ok(GroupTally::excluded()),
        Err(err) => Err(err),
    }
}

/// Collects the tally of `members`, calling `ask(position, participant_index)` for each.
#[cfg(feature = "rayon")]
pub(crate) fn tally_group<F>(members: &[usize], ask: F) -> Result<GroupTally, Error>
where
    F: Fn(usize, usize) -> Result<GroupTally, Error> + Send + Sync,
{
    members
        .par_iter()
        .enumerate()
        .map(|(position, &index)| ask(position, index))
        .try_reduce(GroupTally::default, |a, b| Ok(a.merge(b)))
}

/// Collects the tally of `members`, calling `ask(position, participant_index)` for each.
#[cfg(not(feature = "rayon"))]
pub(crate) fn tally_group<F>(members: &[usize], ask: F) -> Result<GroupTally, Error>
where
    F: Fn(usize, usize) -> Result<GroupTally, Error>,
{
    members
        .iter()
        .enumerate()
        .try_fold(GroupTally::default(), |tally, (position, &index)| {
            Ok(tally.merge(ask(position, index)?))
        })
}
