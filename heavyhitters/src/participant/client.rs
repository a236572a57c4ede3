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

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use rand::Rng;

use crate::domain::BitString;
use crate::domain::Domain;
use crate::error::Error;
use crate::mechanism;
use crate::participant::QueryFingerprint;
use crate::participant::ValueSource;

// Absorbs rounding when a budget is split into equal slices.
const BUDGET_SLACK: f64 = 1e-9;

#[derive(Debug, Default)]
struct ResponseState {
    spent: f64,
    answers: HashMap<QueryFingerprint, u32>,
}

/// A participant holding one private value.
///
/// The value never leaves the participant: every answer goes through randomized response, and
/// every distinct question spends a slice of the participant's privacy budget. Asking the same
/// question again (same [`QueryFingerprint`]) returns the memoized answer and spends nothing, so
/// repeated polling cannot average the noise away.
///
/// The response cache sits behind a lock, so a participant may be asked from several threads.
pub struct Participant {
    id: u64,
    value: BitString,
    budget: f64,
    state: Mutex<ResponseState>,
}

impl Participant {
    /// Creates a participant holding `value` with a total privacy budget of `budget`.
    pub fn new(id: u64, value: BitString, budget: f64) -> Result<Self, Error> {
        if !(budget.is_finite() && budget > 0.0) {
            return Err(Error::invalid_budget(format!(
                "privacy budget must be positive and finite, got {budget}"
            )));
        }
        Ok(Self {
            id,
            value,
            budget,
            state: Mutex::new(ResponseState::default()),
        })
    }

    /// Creates a participant whose value is drawn from `source`.
    pub fn from_source<S, R>(
        id: u64,
        budget: f64,
        source: &mut S,
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        S: ValueSource + ?Sized,
        R: Rng + ?Sized,
    {
        Self::new(id, source.sample(rng), budget)
    }

    /// Returns an error unless the private value belongs to `domain`.
    ///
    /// Only the length of the value is compared, which the domain makes public anyway.
    pub fn check_domain(&self, domain: &Domain) -> Result<(), Error> {
        domain
            .check(&self.value)
            .map_err(|err| err.with_context("participant", self.id))
    }

    /// Returns an error unless the total budget covers at least one answer drawn at `epsilon`.
    pub fn check_budget(&self, epsilon: f64) -> Result<(), Error> {
        if epsilon > self.budget * (1.0 + BUDGET_SLACK) {
            return Err(Error::invalid_budget(format!(
                "budget slice {epsilon} exceeds the total budget {}",
                self.budget
            ))
            .with_context("participant", self.id));
        }
        Ok(())
    }

    /// Returns the participant identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the total privacy budget for a run.
    pub fn total_budget(&self) -> f64 {
        self.budget
    }

    /// Returns the budget spent so far in this run.
    pub fn spent_budget(&self) -> f64 {
        self.state.lock().spent
    }

    /// Returns the budget left in this run.
    pub fn remaining_budget(&self) -> f64 {
        (self.budget - self.spent_budget()).max(0.0)
    }

    /// Returns the number of distinct questions answered in this run.
    pub fn answered(&self) -> usize {
        self.state.lock().answers.len()
    }

    /// Forgets every answer and restores the full budget, for a new run.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.spent = 0.0;
        state.answers.clear();
    }

    /// Answers `fingerprint`'s query about this participant's own value.
    ///
    /// See [`Participant::respond`] for memoization and budget accounting.
    pub fn answer<R: Rng + ?Sized>(
        &self,
        fingerprint: QueryFingerprint,
        epsilon: f64,
        rng: &mut R,
    ) -> Result<u32, Error> {
        let query = fingerprint.query();
        let truth = query.true_symbol(&self.value);
        self.respond(fingerprint, truth, query.symbols(), epsilon, rng)
    }

    /// Releases `true_symbol` perturbed with `k`-ary randomized response at budget `epsilon`.
    ///
    /// The first time a fingerprint is seen the answer is drawn, `epsilon` is charged against
    /// the budget, and the answer is cached. Later calls with the same fingerprint return the
    /// cached answer without charging again.
    ///
    /// Returns [`ErrorKind::BudgetExhausted`](crate::error::ErrorKind::BudgetExhausted) when a
    /// fresh fingerprint would push the spent budget past the total.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        fingerprint: QueryFingerprint,
        true_symbol: u32,
        k: u32,
        epsilon: f64,
        rng: &mut R,
    ) -> Result<u32, Error> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::invalid_budget(format!(
                "budget slice must be positive and finite, got {epsilon}"
            )));
        }
        if k < 2 || true_symbol >= k {
            return Err(Error::invalid_argument(format!(
                "symbol {true_symbol} out of range for {k} symbols"
            )));
        }

        let mut state = self.state.lock();
        if let Some(&answer) = state.answers.get(&fingerprint) {
            return Ok(answer);
        }
        if state.spent + epsilon > self.budget * (1.0 + BUDGET_SLACK) {
            return Err(Error::budget_exhausted(state.spent, epsilon, self.budget)
                .with_context("participant", self.id));
        }
        let answer = mechanism::respond(true_symbol, epsilon, k, rng);
        state.spent += epsilon;
        state.answers.insert(fingerprint, answer);
        Ok(answer)
    }
}

impl fmt::Debug for Participant {
    // Omits the private value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("budget", &self.budget)
            .field("spent", &state.spent)
            .field("answered", &state.answers.len())
            .finish()
    }
}
