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

use crate::domain::BitString;
use crate::estimator::Estimate;
use crate::search::LevelSummary;

/// A reported value with its estimated frequency.
///
/// The estimate comes with a confidence interval on the true frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeavyHitter {
    value: BitString,
    estimate: Estimate,
}

impl HeavyHitter {
    pub(crate) fn new(value: BitString, estimate: Estimate) -> Self {
        Self { value, estimate }
    }

    /// Returns the value.
    pub fn value(&self) -> &BitString {
        &self.value
    }

    /// Returns the estimated frequency, in `[0, 1]`.
    pub fn frequency(&self) -> f64 {
        self.estimate.frequency()
    }

    /// Returns the lower bound for the frequency.
    pub fn lower_bound(&self) -> f64 {
        self.estimate.lower_bound()
    }

    /// Returns the upper bound for the frequency.
    pub fn upper_bound(&self) -> f64 {
        self.estimate.upper_bound()
    }

    /// Returns the full estimate.
    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }
}

/// Result of a run: the values estimated at or above the threshold, most frequent first.
#[derive(Debug, Clone, PartialEq)]
pub struct HeavyHitterReport {
    hitters: Vec<HeavyHitter>,
    levels: Vec<LevelSummary>,
    participants_used: usize,
    population: usize,
}

impl HeavyHitterReport {
    pub(crate) fn new(
        hitters: Vec<HeavyHitter>,
        levels: Vec<LevelSummary>,
        participants_used: usize,
        population: usize,
    ) -> Self {
        Self {
            hitters,
            levels,
            participants_used,
            population,
        }
    }

    /// Returns the reported values, sorted by descending frequency, then ascending value.
    pub fn hitters(&self) -> &[HeavyHitter] {
        &self.hitters
    }

    /// Returns an iterator over the reported values.
    pub fn iter(&self) -> impl Iterator<Item = &HeavyHitter> + '_ {
        self.hitters.iter()
    }

    /// Returns the number of reported values.
    pub fn len(&self) -> usize {
        self.hitters.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.hitters.is_empty()
    }

    /// Returns the row for `value`, if it was reported.
    pub fn get(&self, value: &BitString) -> Option<&HeavyHitter> {
        self.hitters.iter().find(|hitter| hitter.value() == value)
    }

    /// Returns the per-level summaries of the search.
    pub fn levels(&self) -> &[LevelSummary] {
        &self.levels
    }

    /// Returns how many participants answered at least once.
    pub fn participants_used(&self) -> usize {
        self.participants_used
    }

    /// Returns the size of the population the run drew from.
    pub fn population(&self) -> usize {
        self.population
    }
}

impl<'a> IntoIterator for &'a HeavyHitterReport {
    type Item = &'a HeavyHitter;
    type IntoIter = std::slice::Iter<'a, HeavyHitter>;

    fn into_iter(self) -> Self::IntoIter {
        self.hitters.iter()
    }
}
