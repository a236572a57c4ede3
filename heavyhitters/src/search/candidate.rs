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

use std::fmt;

use crate::domain::BitString;
use crate::estimator::Estimate;

/// A prefix under consideration, with the estimate that admitted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    prefix: BitString,
    estimate: Option<Estimate>,
}

impl Candidate {
    /// Returns the root candidate, the empty prefix every value extends.
    pub fn root() -> Self {
        Self {
            prefix: BitString::root(),
            estimate: None,
        }
    }

    pub(crate) fn new(prefix: BitString, estimate: Estimate) -> Self {
        Self {
            prefix,
            estimate: Some(estimate),
        }
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &BitString {
        &self.prefix
    }

    /// Returns the estimated frequency of the prefix, `None` for the root.
    pub fn estimate(&self) -> Option<&Estimate> {
        self.estimate.as_ref()
    }

    /// Returns the point estimate, 1 for the root.
    pub fn frequency(&self) -> f64 {
        self.estimate.map_or(1.0, |estimate| estimate.frequency())
    }
}

/// Summary of one pruned level, as passed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub(crate) depth: u8,
    pub(crate) threshold: f64,
    pub(crate) candidates: usize,
    pub(crate) kept: usize,
    pub(crate) dropped: Vec<BitString>,
    pub(crate) sample_size: usize,
    pub(crate) excluded: u64,
}

impl LevelSummary {
    /// Returns the prefix length of the children estimated at this level.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the threshold τ the children were pruned against.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the number of children estimated.
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// Returns the number of children carried to the next level.
    pub fn kept(&self) -> usize {
        self.kept
    }

    /// Returns the children dropped at this level, by pruning or frontier truncation.
    pub fn dropped(&self) -> &[BitString] {
        &self.dropped
    }

    /// Returns the number of participants drawn for this level.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the number of drawn participants whose answers were excluded.
    pub fn excluded(&self) -> u64 {
        self.excluded
    }
}

/// Where a [`FrontierSearch`](super::FrontierSearch) is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing has happened yet.
    Init,
    /// The frontier is about to be asked about its extensions.
    LevelQuery,
    /// Votes are in and are about to be debiased.
    Estimate,
    /// Child estimates are about to be compared with the threshold.
    Prune,
    /// Survivors are about to become the frontier.
    Expand,
    /// The search reached full-length values or ran out of candidates.
    Finalize,
    /// The report is ready.
    Done,
    /// The search aborted with an error.
    Failed,
}

impl SearchState {
    /// Returns true for [`SearchState::Done`] and [`SearchState::Failed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Done | SearchState::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchState::Init => "Init",
            SearchState::LevelQuery => "LevelQuery",
            SearchState::Estimate => "Estimate",
            SearchState::Prune => "Prune",
            SearchState::Expand => "Expand",
            SearchState::Finalize => "Finalize",
            SearchState::Done => "Done",
            SearchState::Failed => "Failed",
        };
        f.write_str(name)
    }
}
