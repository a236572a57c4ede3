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

//! Prefix-tree search for heavy hitters.
//!
//! # Overview
//!
//! Values are `m`-bit strings, so the domain forms a binary tree of depth `m` whose nodes are
//! prefixes. A prefix is at least as frequent as any value extending it. [`FrontierSearch`]
//! walks the tree one level at a time, keeping only the prefixes whose estimated frequency may
//! still reach the threshold:
//!
//! 1. every candidate of the frontier gets its own fresh group of participants;
//! 2. each participant answers one randomized question about which extension of the candidate
//!    its value takes ([`PrivacyMechanism`](crate::mechanism::PrivacyMechanism));
//! 3. the votes are debiased into an [`Estimate`](crate::estimator::Estimate) per child;
//! 4. children failing the [`PruningRule`] against the level threshold are dropped, and the
//!    rest are ranked and truncated to the maximum frontier size.
//!
//! At depth `m` the surviving candidates are full values. Before reporting, the participants
//! not yet used may be spent on a refinement round that re-estimates each survivor with a
//! larger group. Values whose estimate reaches θ are reported.
//!
//! Pruning never reverses: a dropped prefix, and everything below it, is never asked about
//! again.
//!
//! # Cost
//!
//! A level spends `|frontier| × sample_size` answers, so a run needs at most
//! `sample_size × (1 + max_frontier × (m - 1))` participant rounds. With the default
//! single use per participant, that is a lower bound on the population size.

mod candidate;
mod config;
mod frontier;
pub(crate) mod tally;

pub use self::candidate::Candidate;
pub use self::candidate::LevelSummary;
pub use self::candidate::SearchState;
pub use self::config::PruningRule;
pub use self::config::SearchConfig;
pub use self::config::ThresholdSchedule;
pub use self::frontier::FrontierSearch;
